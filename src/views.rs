use analytics::{DistribuicaoConsolidada, DistribuicaoLucro, PainelPeriodo};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, Table};
use core_types::{
    Despesa, EstoqueItem, MovimentoEstoque, Periodo, Poste, SituacaoEstoque, Tenant, TipoMovimento,
    Venda,
};
use rust_decimal::Decimal;

/// What the dashboard page shows for the logged-in tenant.
#[derive(Debug)]
pub enum Painel {
    Caminhao {
        tenant: Tenant,
        painel: PainelPeriodo,
    },
    Consolidado {
        vermelho: PainelPeriodo,
        branco: PainelPeriodo,
        distribuicao: DistribuicaoConsolidada,
    },
}

/// Brazilian currency format, e.g. `R$ -1.234,50`.
pub fn moeda(valor: Decimal) -> String {
    let texto = format!("{:.2}", valor.round_dp(2).abs());
    let (inteiro, centavos) = texto.split_once('.').unwrap_or((texto.as_str(), "00"));

    let digitos: Vec<char> = inteiro.chars().collect();
    let mut agrupado = String::new();
    for (i, c) in digitos.iter().enumerate() {
        if i > 0 && (digitos.len() - i) % 3 == 0 {
            agrupado.push('.');
        }
        agrupado.push(*c);
    }

    let sinal = if valor.is_sign_negative() && !valor.round_dp(2).is_zero() { "-" } else { "" };
    format!("R$ {sinal}{agrupado},{centavos}")
}

fn nova_tabela(cabecalho: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(cabecalho.to_vec());
    table
}

fn celula_valor(valor: Decimal) -> Cell {
    let cell = Cell::new(moeda(valor)).set_alignment(CellAlignment::Right);
    if valor.is_sign_negative() && !valor.is_zero() {
        cell.fg(Color::Red)
    } else {
        cell
    }
}

fn opcional<T: ToString>(valor: Option<T>) -> String {
    valor.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn tabela_postes(postes: &[Poste]) -> Table {
    let mut table = nova_tabela(&["ID", "Código", "Descrição", "Preço", "Ativo"]);
    for p in postes {
        table.add_row(vec![
            Cell::new(p.id),
            Cell::new(&p.codigo),
            Cell::new(&p.descricao),
            celula_valor(p.preco),
            Cell::new(if p.ativo { "sim" } else { "não" }),
        ]);
    }
    table
}

pub fn tabela_vendas(vendas: &[Venda]) -> Table {
    let mut table = nova_tabela(&["ID", "Data", "Tipo", "Poste", "Qtd", "Valor", "Pagamento"]);
    for v in vendas {
        let poste = v
            .codigo_poste
            .clone()
            .or_else(|| v.poste_id.map(|id| format!("#{id}")));
        table.add_row(vec![
            Cell::new(v.id),
            Cell::new(v.data_venda.format("%d/%m/%Y")),
            Cell::new(v.tipo_venda.descricao()),
            Cell::new(opcional(poste)),
            Cell::new(opcional(v.quantidade)),
            celula_valor(v.valor_principal()),
            Cell::new(opcional(v.metodo_pagamento.as_deref())),
        ]);
    }
    table
}

pub fn tabela_despesas(despesas: &[Despesa]) -> Table {
    let mut table = nova_tabela(&["ID", "Data", "Tipo", "Descrição", "Valor"]);
    for d in despesas {
        table.add_row(vec![
            Cell::new(d.id),
            Cell::new(d.data_despesa.format("%d/%m/%Y")),
            Cell::new(d.tipo),
            Cell::new(&d.descricao),
            celula_valor(d.valor),
        ]);
    }
    let total: Decimal = despesas.iter().map(|d| d.valor).sum();
    table.add_row(vec![
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new("Total"),
        celula_valor(total),
    ]);
    table
}

pub fn tabela_estoque(itens: &[EstoqueItem], limite_baixo: i64) -> Table {
    let mut table = nova_tabela(&["Poste", "Descrição", "Quantidade", "Situação", "Valor em estoque"]);
    for item in itens {
        let situacao = item.situacao(limite_baixo);
        let cor = match situacao {
            SituacaoEstoque::Negativo | SituacaoEstoque::Zerado => Color::Red,
            SituacaoEstoque::Baixo => Color::Yellow,
            SituacaoEstoque::Normal => Color::Green,
        };
        table.add_row(vec![
            Cell::new(&item.codigo_poste),
            Cell::new(&item.descricao_poste),
            Cell::new(item.quantidade_atual).set_alignment(CellAlignment::Right),
            Cell::new(situacao).fg(cor),
            celula_valor(item.valor_em_estoque()),
        ]);
    }
    table
}

pub fn tabela_movimentos(movimentos: &[MovimentoEstoque]) -> Table {
    let mut table = nova_tabela(&["ID", "Data", "Poste", "Movimento", "Qtd", "Observação"]);
    for m in movimentos {
        let (rotulo, cor) = match m.tipo_movimento {
            TipoMovimento::Entrada => ("entrada", Color::Green),
            TipoMovimento::Saida => ("saída", Color::Red),
        };
        table.add_row(vec![
            Cell::new(m.id),
            Cell::new(opcional(m.data_movimento.map(|d| d.format("%d/%m/%Y")))),
            Cell::new(m.codigo_poste.clone().unwrap_or_else(|| format!("#{}", m.poste_id))),
            Cell::new(rotulo).fg(cor),
            Cell::new(m.quantidade),
            Cell::new(opcional(m.observacao.as_deref())),
        ]);
    }
    table
}

fn tabela_distribuicao(d: &DistribuicaoLucro) -> Table {
    let mut table = nova_tabela(&["", "Valor"]);
    let linhas = [
        ("Custo dos postes", d.total_venda_postes),
        ("Vendas normais", d.valor_total_vendas),
        ("Extras + frete", d.total_contribuicoes_extras),
        ("Despesas de funcionário", d.despesas_funcionario),
        ("Outras despesas", d.outras_despesas),
        ("Lucro vendas normais", d.lucro_vendas_normais),
        ("Lucro total", d.lucro_total),
    ];
    for (rotulo, valor) in linhas {
        table.add_row(vec![Cell::new(rotulo), celula_valor(valor)]);
    }
    for (socio, valor) in d.partes() {
        table.add_row(vec![Cell::new(format!("Parte {socio}")), celula_valor(valor)]);
    }
    table
}

fn resumo_caminhao(titulo: &str, painel: &PainelPeriodo) -> String {
    let r = &painel.resumo;
    let mut stats = nova_tabela(&["Vendas V", "Vendas E", "Vendas L", "Postes ativos", "Ticket médio"]);
    stats.add_row(vec![
        Cell::new(r.total_vendas_v),
        Cell::new(r.total_vendas_e),
        Cell::new(r.total_vendas_l),
        Cell::new(painel.postes_ativos),
        Cell::new(opcional(painel.ticket_medio.map(moeda))),
    ]);

    let mut texto = format!("== {titulo} ==\n{stats}\n{}\n", tabela_distribuicao(&painel.distribuicao));
    if !painel.alertas_estoque.is_empty() {
        texto.push_str(&format!(
            "Estoque em alerta ({} itens):\n{}\n",
            painel.alertas_estoque.len(),
            tabela_estoque(&painel.alertas_estoque, painel.limite_baixo)
        ));
    }
    texto
}

pub fn render_painel(painel: &Painel, periodo: Periodo) -> String {
    let cabecalho = format!(
        "Período {} a {}\n",
        periodo.inicio.format("%d/%m/%Y"),
        periodo.fim.format("%d/%m/%Y")
    );
    match painel {
        Painel::Caminhao { tenant, painel } => {
            cabecalho + &resumo_caminhao(tenant.nome_exibicao(), painel)
        }
        Painel::Consolidado { vermelho, branco, distribuicao } => {
            let mut total = nova_tabela(&["Consolidado", "Valor"]);
            for (rotulo, valor) in [
                ("Vendas normais", distribuicao.valor_total_vendas),
                ("Despesas", distribuicao.total_despesas),
                ("Lucro total", distribuicao.lucro_total),
                ("Parte Cícero", distribuicao.parte_cicero),
                ("Parte Gilberto", distribuicao.parte_gilberto),
                ("Parte Jefferson", distribuicao.parte_jefferson),
            ] {
                total.add_row(vec![Cell::new(rotulo), celula_valor(valor)]);
            }
            format!(
                "{cabecalho}{}{}== Total ==\n{total}\n",
                resumo_caminhao(Tenant::Vermelho.nome_exibicao(), vermelho),
                resumo_caminhao(Tenant::Branco.nome_exibicao(), branco),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_uses_brazilian_separators() {
        assert_eq!(moeda(dec!(1234567.5)), "R$ 1.234.567,50");
        assert_eq!(moeda(dec!(62.5)), "R$ 62,50");
        assert_eq!(moeda(dec!(-450)), "R$ -450,00");
        assert_eq!(moeda(dec!(0)), "R$ 0,00");
        assert_eq!(moeda(dec!(-0.001)), "R$ 0,00");
    }

    #[test]
    fn stock_table_lists_every_item() {
        let itens = vec![EstoqueItem {
            poste_id: 1,
            codigo_poste: "P-1".into(),
            descricao_poste: "Poste 9m".into(),
            preco_poste: dec!(100),
            quantidade_atual: -2,
            data_atualizacao: None,
        }];
        let texto = tabela_estoque(&itens, 5).to_string();
        assert!(texto.contains("P-1"));
        assert!(texto.contains("NEGATIVO"));
        assert!(texto.contains("R$ -200,00"));
    }
}
