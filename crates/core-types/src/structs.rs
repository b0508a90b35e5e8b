use crate::enums::{SituacaoEstoque, TipoDespesa, TipoMovimento, TipoVenda};
use crate::serde_helpers::{
    data_flexivel, data_flexivel_opcional, decimal_leniente, decimal_opcional_leniente,
    inteiro_leniente,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

// Using `#[serde(rename_all = "camelCase")]` to map the backend's camelCase JSON to snake_case.

fn ativo_por_padrao() -> bool {
    true
}

fn validar_nao_negativo(valor: &Decimal) -> Result<(), ValidationError> {
    if valor.is_sign_negative() && !valor.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

fn validar_positivo(valor: &Decimal) -> Result<(), ValidationError> {
    if *valor <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

// --- Postes ---

/// A pole, the sellable reference item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poste {
    pub id: i64,
    pub codigo: String,
    #[serde(default)]
    pub descricao: String,
    #[serde(default, deserialize_with = "decimal_leniente::deserialize")]
    pub preco: Decimal,
    #[serde(default = "ativo_por_padrao")]
    pub ativo: bool,
}

/// Payload for creating or editing a pole.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NovoPoste {
    #[validate(length(min = 1, max = 50, message = "codigo is required (max 50 chars)"))]
    pub codigo: String,
    #[validate(length(min = 1, message = "descricao is required"))]
    pub descricao: String,
    #[validate(custom(function = "validar_nao_negativo"))]
    pub preco: Decimal,
    pub ativo: bool,
}

impl From<&Poste> for NovoPoste {
    fn from(poste: &Poste) -> Self {
        Self {
            codigo: poste.codigo.clone(),
            descricao: poste.descricao.clone(),
            preco: poste.preco,
            ativo: poste.ativo,
        }
    }
}

// --- Vendas ---

/// A sale as returned by the backend. Which value fields apply depends on `tipo_venda`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venda {
    pub id: i64,
    pub tipo_venda: TipoVenda,
    #[serde(with = "data_flexivel")]
    pub data_venda: NaiveDate,
    #[serde(default)]
    pub poste_id: Option<i64>,
    #[serde(default)]
    pub codigo_poste: Option<String>,
    #[serde(default)]
    pub quantidade: Option<i64>,
    #[serde(default, deserialize_with = "decimal_opcional_leniente::deserialize")]
    pub valor_venda: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opcional_leniente::deserialize")]
    pub valor_extra: Option<Decimal>,
    #[serde(default, deserialize_with = "decimal_opcional_leniente::deserialize")]
    pub frete_eletrons: Option<Decimal>,
    #[serde(default)]
    pub metodo_pagamento: Option<String>,
    #[serde(default)]
    pub vendedor: Option<String>,
    #[serde(default)]
    pub numero_nota: Option<String>,
    #[serde(default)]
    pub observacoes: Option<String>,
}

impl Venda {
    /// The one value that counts for this sale's type; zero when the backend omitted it.
    pub fn valor_principal(&self) -> Decimal {
        let valor = match self.tipo_venda {
            TipoVenda::Normal => self.valor_venda,
            TipoVenda::Extra => self.valor_extra,
            TipoVenda::Loja => self.frete_eletrons,
        };
        valor.unwrap_or_default()
    }
}

/// The type-specific part of a new sale.
#[derive(Debug, Clone, PartialEq)]
pub enum VendaDetalhe {
    Normal { poste_id: i64, quantidade: i64, valor_venda: Decimal },
    Extra { valor_extra: Decimal },
    Loja { poste_id: i64, quantidade: i64, frete_eletrons: Decimal },
}

impl VendaDetalhe {
    pub fn tipo(&self) -> TipoVenda {
        match self {
            VendaDetalhe::Normal { .. } => TipoVenda::Normal,
            VendaDetalhe::Extra { .. } => TipoVenda::Extra,
            VendaDetalhe::Loja { .. } => TipoVenda::Loja,
        }
    }
}

/// Payload for registering a sale.
///
/// Built from a [`VendaDetalhe`], so only the fields of its variant are ever filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaVenda {
    pub tipo_venda: TipoVenda,
    #[serde(with = "data_flexivel")]
    pub data_venda: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poste_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantidade: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_venda: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_extra: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frete_eletrons: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metodo_pagamento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendedor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero_nota: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

impl NovaVenda {
    pub fn new(data_venda: NaiveDate, detalhe: VendaDetalhe) -> Self {
        let mut venda = Self {
            tipo_venda: detalhe.tipo(),
            data_venda,
            poste_id: None,
            quantidade: None,
            valor_venda: None,
            valor_extra: None,
            frete_eletrons: None,
            metodo_pagamento: None,
            vendedor: None,
            numero_nota: None,
            observacoes: None,
        };
        match detalhe {
            VendaDetalhe::Normal { poste_id, quantidade, valor_venda } => {
                venda.poste_id = Some(poste_id);
                venda.quantidade = Some(quantidade);
                venda.valor_venda = Some(valor_venda);
            }
            VendaDetalhe::Extra { valor_extra } => {
                venda.valor_extra = Some(valor_extra);
            }
            VendaDetalhe::Loja { poste_id, quantidade, frete_eletrons } => {
                venda.poste_id = Some(poste_id);
                venda.quantidade = Some(quantidade);
                venda.frete_eletrons = Some(frete_eletrons);
            }
        }
        venda
    }
}

impl Validate for NovaVenda {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let (campo, valor) = match self.tipo_venda {
            TipoVenda::Normal => ("valorVenda", self.valor_venda),
            TipoVenda::Extra => ("valorExtra", self.valor_extra),
            TipoVenda::Loja => ("freteEletrons", self.frete_eletrons),
        };
        match valor {
            Some(valor) => {
                if let Err(e) = validar_positivo(&valor) {
                    errors.add(campo, e);
                }
            }
            None => errors.add(campo, ValidationError::new("required")),
        }

        if self.tipo_venda != TipoVenda::Extra {
            if self.poste_id.is_none() {
                errors.add("posteId", ValidationError::new("required"));
            }
            if self.quantidade.is_none_or(|q| q < 1) {
                let mut err = ValidationError::new("range");
                err.message = Some("quantidade must be at least 1".into());
                errors.add("quantidade", err);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

// --- Despesas ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Despesa {
    #[serde(default)]
    pub id: i64,
    #[serde(with = "data_flexivel")]
    pub data_despesa: NaiveDate,
    #[serde(default)]
    pub descricao: String,
    #[serde(default, deserialize_with = "decimal_leniente::deserialize")]
    pub valor: Decimal,
    pub tipo: TipoDespesa,
}

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NovaDespesa {
    #[serde(with = "data_flexivel")]
    pub data_despesa: NaiveDate,
    #[validate(length(min = 1, message = "descricao is required"))]
    pub descricao: String,
    #[validate(custom(function = "validar_positivo"))]
    pub valor: Decimal,
    pub tipo: TipoDespesa,
}

// --- Estoque ---

/// Current stock of one pole. The quantity may be negative after an oversell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstoqueItem {
    pub poste_id: i64,
    #[serde(default)]
    pub codigo_poste: String,
    #[serde(default)]
    pub descricao_poste: String,
    #[serde(default, deserialize_with = "decimal_leniente::deserialize")]
    pub preco_poste: Decimal,
    #[serde(default, alias = "quantidade", deserialize_with = "inteiro_leniente::deserialize")]
    pub quantidade_atual: i64,
    #[serde(default, with = "data_flexivel_opcional")]
    pub data_atualizacao: Option<NaiveDate>,
}

impl EstoqueItem {
    pub fn situacao(&self, limite_baixo: i64) -> SituacaoEstoque {
        SituacaoEstoque::classificar(self.quantidade_atual, limite_baixo)
    }

    /// Stock value at list price. Negative stock yields a negative value.
    pub fn valor_em_estoque(&self) -> Decimal {
        self.preco_poste * Decimal::from(self.quantidade_atual)
    }
}

/// Payload for `/estoque/adicionar` and `/estoque/remover`.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AjusteEstoque {
    pub poste_id: i64,
    #[validate(range(min = 1, message = "quantidade must be at least 1"))]
    pub quantidade: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacao: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovimentoEstoque {
    #[serde(default)]
    pub id: i64,
    pub poste_id: i64,
    #[serde(default)]
    pub codigo_poste: Option<String>,
    pub tipo_movimento: TipoMovimento,
    #[serde(default, deserialize_with = "inteiro_leniente::deserialize")]
    pub quantidade: i64,
    #[serde(default, with = "data_flexivel_opcional")]
    pub data_movimento: Option<NaiveDate>,
    #[serde(default)]
    pub observacao: Option<String>,
}

// --- Resumo ---

/// Server-side aggregated sales totals for a period.
///
/// Every field is read leniently: a missing key, `null` or a non-number counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumoVendas {
    #[serde(default, deserialize_with = "decimal_leniente::deserialize")]
    pub total_venda_postes: Decimal,
    #[serde(default, deserialize_with = "decimal_leniente::deserialize")]
    pub valor_total_vendas: Decimal,
    #[serde(default, deserialize_with = "decimal_leniente::deserialize")]
    pub total_frete_eletrons: Decimal,
    #[serde(default, deserialize_with = "decimal_leniente::deserialize")]
    pub valor_total_extras: Decimal,
    #[serde(default, rename = "totalVendasE", deserialize_with = "inteiro_leniente::deserialize")]
    pub total_vendas_e: i64,
    #[serde(default, rename = "totalVendasV", deserialize_with = "inteiro_leniente::deserialize")]
    pub total_vendas_v: i64,
    #[serde(default, rename = "totalVendasL", deserialize_with = "inteiro_leniente::deserialize")]
    pub total_vendas_l: i64,
}

impl ResumoVendas {
    pub fn total_vendas(&self) -> i64 {
        self.total_vendas_e + self.total_vendas_v + self.total_vendas_l
    }
}
