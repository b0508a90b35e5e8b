use crate::error::AnalyticsError;
use core_types::{Despesa, ResumoVendas, Tenant, TipoDespesa};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// How a truck's profit is split between the partners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegraDistribuicao {
    /// Vermelho: Cícero takes half, Gilberto and Jefferson split the rest after payroll.
    TresSocios,
    /// Branco: Gilberto and Jefferson take half each, payroll comes out of Jefferson's.
    DoisSocios,
}

impl RegraDistribuicao {
    /// The manager tenant has no rule of its own; its view is a [`consolidar`] of both trucks.
    pub fn do_tenant(tenant: Tenant) -> Option<Self> {
        match tenant {
            Tenant::Vermelho => Some(Self::TresSocios),
            Tenant::Branco => Some(Self::DoisSocios),
            Tenant::Jefferson => None,
        }
    }

    pub fn socios(&self) -> &'static [Socio] {
        match self {
            Self::TresSocios => &[Socio::Cicero, Socio::Gilberto, Socio::Jefferson],
            Self::DoisSocios => &[Socio::Gilberto, Socio::Jefferson],
        }
    }
}

impl fmt::Display for RegraDistribuicao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TresSocios => f.write_str("three-partner"),
            Self::DoisSocios => f.write_str("two-partner"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Socio {
    Cicero,
    Gilberto,
    Jefferson,
}

impl fmt::Display for Socio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Socio::Cicero => f.write_str("Cícero"),
            Socio::Gilberto => f.write_str("Gilberto"),
            Socio::Jefferson => f.write_str("Jefferson"),
        }
    }
}

/// Expense totals split by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TotaisDespesas {
    pub funcionario: Decimal,
    pub outras: Decimal,
}

impl TotaisDespesas {
    pub fn somar(despesas: &[Despesa]) -> Self {
        despesas.iter().fold(Self::default(), |mut totais, despesa| {
            match despesa.tipo {
                TipoDespesa::Funcionario => totais.funcionario += despesa.valor,
                TipoDespesa::Outras => totais.outras += despesa.valor,
            }
            totais
        })
    }

    pub fn total(&self) -> Decimal {
        self.funcionario + self.outras
    }
}

/// The profit breakdown of one truck for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistribuicaoLucro {
    pub regra: RegraDistribuicao,
    pub total_venda_postes: Decimal,
    pub valor_total_vendas: Decimal,
    /// Extras plus Loja freight.
    pub total_contribuicoes_extras: Decimal,
    pub despesas_funcionario: Decimal,
    pub outras_despesas: Decimal,
    pub lucro_vendas_normais: Decimal,
    pub lucro_total: Decimal,
    /// Only present under [`RegraDistribuicao::TresSocios`].
    pub parte_cicero: Option<Decimal>,
    pub parte_gilberto: Decimal,
    pub parte_jefferson: Decimal,
}

impl DistribuicaoLucro {
    pub fn parte(&self, socio: Socio) -> Option<Decimal> {
        match socio {
            Socio::Cicero => self.parte_cicero,
            Socio::Gilberto => Some(self.parte_gilberto),
            Socio::Jefferson => Some(self.parte_jefferson),
        }
    }

    /// Shares in display order, one per partner of the rule.
    pub fn partes(&self) -> Vec<(Socio, Decimal)> {
        self.regra
            .socios()
            .iter()
            .filter_map(|&socio| self.parte(socio).map(|valor| (socio, valor)))
            .collect()
    }

    pub fn soma_das_partes(&self) -> Decimal {
        self.partes().iter().map(|(_, valor)| *valor).sum()
    }
}

/// A stateless calculator for the partners' shares.
///
/// Missing summary values count as zero and negative results are reported as
/// they are; nothing is clamped or rounded here.
#[derive(Debug, Clone, Copy)]
pub struct CalculadoraLucro {
    regra: RegraDistribuicao,
}

impl CalculadoraLucro {
    pub fn new(regra: RegraDistribuicao) -> Self {
        Self { regra }
    }

    pub fn calcular(&self, resumo: Option<&ResumoVendas>, despesas: &[Despesa]) -> DistribuicaoLucro {
        let vazio = ResumoVendas::default();
        let resumo = resumo.unwrap_or(&vazio);
        let totais = TotaisDespesas::somar(despesas);

        let contribuicoes_extras = resumo.valor_total_extras + resumo.total_frete_eletrons;
        let lucro_vendas_normais = resumo.valor_total_vendas - resumo.total_venda_postes;
        let lucro_total = lucro_vendas_normais + contribuicoes_extras - totais.outras;
        let metade = lucro_total / Decimal::TWO;

        let (parte_cicero, parte_gilberto, parte_jefferson) = match self.regra {
            RegraDistribuicao::TresSocios => {
                let parte_outros_liquida = metade - totais.funcionario;
                let cada = parte_outros_liquida / Decimal::TWO;
                (Some(metade), cada, cada)
            }
            RegraDistribuicao::DoisSocios => (None, metade, metade - totais.funcionario),
        };

        tracing::debug!(regra = %self.regra, %lucro_total, "Profit distribution computed.");

        DistribuicaoLucro {
            regra: self.regra,
            total_venda_postes: resumo.total_venda_postes,
            valor_total_vendas: resumo.valor_total_vendas,
            total_contribuicoes_extras: contribuicoes_extras,
            despesas_funcionario: totais.funcionario,
            outras_despesas: totais.outras,
            lucro_vendas_normais,
            lucro_total,
            parte_cicero,
            parte_gilberto,
            parte_jefferson,
        }
    }
}

/// Both trucks side by side, with each partner's combined share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistribuicaoConsolidada {
    pub vermelho: DistribuicaoLucro,
    pub branco: DistribuicaoLucro,
    pub valor_total_vendas: Decimal,
    pub total_despesas: Decimal,
    pub lucro_total: Decimal,
    pub parte_cicero: Decimal,
    pub parte_gilberto: Decimal,
    pub parte_jefferson: Decimal,
}

pub fn consolidar(
    vermelho: DistribuicaoLucro,
    branco: DistribuicaoLucro,
) -> Result<DistribuicaoConsolidada, AnalyticsError> {
    for (esperada, recebida) in [
        (RegraDistribuicao::TresSocios, vermelho.regra),
        (RegraDistribuicao::DoisSocios, branco.regra),
    ] {
        if esperada != recebida {
            return Err(AnalyticsError::RegraIncompativel { esperada, recebida });
        }
    }

    let despesas = |d: &DistribuicaoLucro| d.despesas_funcionario + d.outras_despesas;
    Ok(DistribuicaoConsolidada {
        valor_total_vendas: vermelho.valor_total_vendas + branco.valor_total_vendas,
        total_despesas: despesas(&vermelho) + despesas(&branco),
        lucro_total: vermelho.lucro_total + branco.lucro_total,
        parte_cicero: vermelho.parte_cicero.unwrap_or_default(),
        parte_gilberto: vermelho.parte_gilberto + branco.parte_gilberto,
        parte_jefferson: vermelho.parte_jefferson + branco.parte_jefferson,
        vermelho,
        branco,
    })
}
