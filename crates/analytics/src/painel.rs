use crate::lucro::{CalculadoraLucro, DistribuicaoLucro, RegraDistribuicao, TotaisDespesas};
use core_types::{Despesa, EstoqueItem, Poste, ResumoVendas};
use rust_decimal::Decimal;
use serde::Serialize;

/// Everything the period dashboard of one truck shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PainelPeriodo {
    pub resumo: ResumoVendas,
    pub despesas: TotaisDespesas,
    pub distribuicao: DistribuicaoLucro,
    pub postes_ativos: usize,
    /// Revenue per sale. Absent when the period has no sales.
    pub ticket_medio: Option<Decimal>,
    /// Items at or below the low-stock threshold, most critical first.
    pub alertas_estoque: Vec<EstoqueItem>,
    pub limite_baixo: i64,
    pub valor_em_estoque: Decimal,
}

impl PainelPeriodo {
    pub fn montar(
        resumo: Option<&ResumoVendas>,
        despesas: &[Despesa],
        postes: &[Poste],
        estoque: &[EstoqueItem],
        regra: RegraDistribuicao,
        limite_baixo: i64,
    ) -> Self {
        let resumo = resumo.cloned().unwrap_or_default();
        let distribuicao = CalculadoraLucro::new(regra).calcular(Some(&resumo), despesas);

        let total_vendas = resumo.total_vendas();
        let ticket_medio = (total_vendas > 0).then(|| {
            let receita =
                resumo.valor_total_vendas + resumo.valor_total_extras + resumo.total_frete_eletrons;
            receita / Decimal::from(total_vendas)
        });

        let mut alertas_estoque: Vec<EstoqueItem> = estoque
            .iter()
            .filter(|item| item.situacao(limite_baixo).em_alerta())
            .cloned()
            .collect();
        alertas_estoque.sort_by_key(|item| item.quantidade_atual);

        Self {
            despesas: TotaisDespesas::somar(despesas),
            distribuicao,
            postes_ativos: postes.iter().filter(|p| p.ativo).count(),
            ticket_medio,
            alertas_estoque,
            limite_baixo,
            valor_em_estoque: estoque.iter().map(EstoqueItem::valor_em_estoque).sum(),
            resumo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::TipoDespesa;
    use rust_decimal_macros::dec;

    fn poste(id: i64, ativo: bool) -> Poste {
        Poste { id, codigo: format!("P-{id}"), descricao: String::new(), preco: dec!(100), ativo }
    }

    fn item(poste_id: i64, quantidade_atual: i64) -> EstoqueItem {
        EstoqueItem {
            poste_id,
            codigo_poste: format!("P-{poste_id}"),
            descricao_poste: String::new(),
            preco_poste: dec!(100),
            quantidade_atual,
            data_atualizacao: None,
        }
    }

    #[test]
    fn dashboard_totals() {
        let resumo = ResumoVendas {
            total_venda_postes: dec!(1000),
            valor_total_vendas: dec!(1500),
            total_frete_eletrons: dec!(100),
            valor_total_extras: dec!(50),
            total_vendas_v: 2,
            total_vendas_e: 1,
            total_vendas_l: 1,
        };
        let despesas = vec![Despesa {
            id: 1,
            data_despesa: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            descricao: "Diesel".into(),
            valor: dec!(200),
            tipo: TipoDespesa::Outras,
        }];
        let postes = vec![poste(1, true), poste(2, false), poste(3, true)];
        let estoque = vec![item(1, 10), item(2, 2), item(3, -1)];

        let painel = PainelPeriodo::montar(
            Some(&resumo),
            &despesas,
            &postes,
            &estoque,
            RegraDistribuicao::TresSocios,
            5,
        );

        assert_eq!(painel.postes_ativos, 2);
        assert_eq!(painel.ticket_medio, Some(dec!(412.5)));
        assert_eq!(painel.despesas.outras, dec!(200));
        assert_eq!(painel.distribuicao.lucro_total, dec!(450));
        let alertas: Vec<_> = painel.alertas_estoque.iter().map(|i| i.poste_id).collect();
        assert_eq!(alertas, vec![3, 2]);
        assert_eq!(painel.valor_em_estoque, dec!(1100));
    }

    #[test]
    fn no_sales_means_no_average_ticket() {
        let painel =
            PainelPeriodo::montar(None, &[], &[], &[], RegraDistribuicao::DoisSocios, 5);
        assert_eq!(painel.ticket_medio, None);
        assert_eq!(painel.distribuicao.lucro_total, Decimal::ZERO);
        assert!(painel.alertas_estoque.is_empty());
    }
}
