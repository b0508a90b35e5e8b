use crate::views::{self, Painel};
use analytics::{PainelPeriodo, RegraDistribuicao, consolidar};
use anyhow::Context as _;
use api_client::{
    ApiClient, DespesaService, EstoqueService, HttpApiClient, MovimentoEstoqueService,
    PosteService, VendaService,
};
use async_trait::async_trait;
use core_types::{Filtros, Pagina, Periodo, Tenant};
use indicatif::{ProgressBar, ProgressStyle};
use lifecycle::{Navigator, Page, PageContext, PageError, RetryPolicy};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// What every page needs to load its data.
#[derive(Clone)]
pub struct Contexto {
    pub client: HttpApiClient,
    pub periodo: Periodo,
    pub limite_baixo: i64,
}

impl Contexto {
    fn client(&self) -> Arc<dyn ApiClient> {
        Arc::new(self.client.clone())
    }
}

/// Runs `fut` behind a spinner on stderr.
pub async fn com_spinner<T>(
    mensagem: &str,
    fut: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(mensagem.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let resultado = fut.await;
    spinner.finish_and_clear();
    resultado
}

/// One truck's dashboard: the four fetches run concurrently and are joined before calculating.
async fn carregar_caminhao(ctx: &Contexto, caminhao: Tenant) -> anyhow::Result<PainelPeriodo> {
    let regra = RegraDistribuicao::do_tenant(caminhao)
        .with_context(|| format!("{caminhao} has no profit split of its own"))?;
    let client: Arc<dyn ApiClient> = Arc::new(ctx.client.for_tenant(caminhao));
    let vendas = VendaService::vendas(client.clone());
    let despesas = DespesaService::despesas(client.clone());
    let postes = PosteService::postes(client.clone());
    let estoque = EstoqueService::new(client);
    let do_periodo = Filtros::periodo(ctx.periodo);
    let todos = Filtros::default();

    let (resumo, despesas, postes, estoque) = tokio::try_join!(
        vendas.resumo(ctx.periodo),
        despesas.listar(&do_periodo),
        postes.listar(&todos),
        estoque.listar(),
    )
    .with_context(|| format!("Failed to load the {caminhao} dashboard"))?;

    Ok(PainelPeriodo::montar(
        Some(&resumo),
        &despesas,
        &postes,
        &estoque,
        regra,
        ctx.limite_baixo,
    ))
}

pub async fn carregar_painel(ctx: &Contexto) -> anyhow::Result<Painel> {
    let tenant = ctx.client.tenant();
    match *tenant.caminhoes() {
        [caminhao] => {
            let painel = carregar_caminhao(ctx, caminhao).await?;
            Ok(Painel::Caminhao { tenant: caminhao, painel })
        }
        [vermelho, branco] => {
            let (vermelho, branco) =
                tokio::try_join!(carregar_caminhao(ctx, vermelho), carregar_caminhao(ctx, branco))
                    .context("Failed to load the consolidated dashboard")?;
            let distribuicao = consolidar(vermelho.distribuicao.clone(), branco.distribuicao.clone())?;
            Ok(Painel::Consolidado { vermelho, branco, distribuicao })
        }
        ref outros => anyhow::bail!("No dashboard for the trucks {outros:?}"),
    }
}

/// Loads `pagina` and renders it as text.
pub async fn renderizar(pagina: Pagina, ctx: &Contexto) -> anyhow::Result<String> {
    let filtros = Filtros::periodo(ctx.periodo);
    let texto = match pagina {
        Pagina::Painel => views::render_painel(&carregar_painel(ctx).await?, ctx.periodo),
        Pagina::Vendas => {
            let vendas = VendaService::vendas(ctx.client()).listar(&filtros).await?;
            views::tabela_vendas(&vendas).to_string()
        }
        Pagina::Despesas => {
            let despesas = DespesaService::despesas(ctx.client()).listar(&filtros).await?;
            views::tabela_despesas(&despesas).to_string()
        }
        Pagina::Estoque => {
            let itens = EstoqueService::new(ctx.client()).listar().await?;
            views::tabela_estoque(&itens, ctx.limite_baixo).to_string()
        }
        Pagina::Postes => {
            let postes = PosteService::postes(ctx.client()).listar(&Filtros::default()).await?;
            views::tabela_postes(&postes).to_string()
        }
        Pagina::Movimentos => {
            let movimentos = MovimentoEstoqueService::new(ctx.client()).listar(&filtros).await?;
            views::tabela_movimentos(&movimentos).to_string()
        }
    };
    Ok(texto)
}

/// A page of the terminal client. With `acompanhar` it re-renders on an interval
/// until the navigator leaves it.
struct PaginaTerminal {
    pagina: Pagina,
    contexto: Contexto,
    acompanhar: Option<Duration>,
}

#[async_trait]
impl Page for PaginaTerminal {
    fn pagina(&self) -> Pagina {
        self.pagina
    }

    async fn iniciar(&self, ctx: &PageContext<'_>) -> Result<(), PageError> {
        let texto = com_spinner(
            &format!("Loading {}...", ctx.rota),
            renderizar(self.pagina, &self.contexto),
        )
        .await?;
        println!("{texto}");

        if let Some(intervalo) = self.acompanhar {
            let pagina = self.pagina;
            let contexto = self.contexto.clone();
            ctx.tarefas.set_interval(intervalo, move || {
                let contexto = contexto.clone();
                async move {
                    match renderizar(pagina, &contexto).await {
                        Ok(texto) => println!("{texto}"),
                        // The last successful render stays on screen.
                        Err(e) => {
                            let erro = format!("{e:#}");
                            tracing::warn!(%erro, "Refresh failed.");
                        }
                    }
                }
            });
        }
        Ok(())
    }
}

/// A navigator with every page registered.
pub fn navegador(contexto: Contexto, acompanhar: Option<Duration>) -> Navigator {
    Pagina::ALL
        .into_iter()
        .fold(Navigator::new(RetryPolicy::page_init()), |nav, pagina| {
            nav.with_page(Arc::new(PaginaTerminal {
                pagina,
                contexto: contexto.clone(),
                acompanhar,
            }))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use configuration::Config;
    use mockito::{Matcher, Server, ServerGuard};
    use rust_decimal_macros::dec;

    fn contexto(server: &ServerGuard, tenant: Tenant) -> Contexto {
        let mut config = Config::default();
        config.api.base_url = server.url();
        config.api.retry.max_retries = 0;
        Contexto {
            client: HttpApiClient::new(&config.api, tenant).unwrap(),
            periodo: Periodo::new(
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            )
            .unwrap(),
            limite_baixo: 5,
        }
    }

    /// Answers the four dashboard endpoints for `tenant` with the same month of data.
    async fn responder_caminhao(server: &mut ServerGuard, tenant: &str) -> Vec<mockito::Mock> {
        let mut mocks = Vec::new();
        for (path, body) in [
            (
                "/vendas/resumo",
                r#"{"totalVendaPostes": 1000, "valorTotalVendas": 1500,
                    "totalFreteEletrons": 100, "valorTotalExtras": 50,
                    "totalVendasV": 2, "totalVendasE": 1, "totalVendasL": 1}"#,
            ),
            (
                "/despesas",
                r#"[{"id": 1, "dataDespesa": "2024-05-02", "descricao": "Diesel", "valor": 200, "tipo": "OUTRAS"},
                    {"id": 2, "dataDespesa": "2024-05-05", "descricao": "Ajudante", "valor": 100, "tipo": "FUNCIONARIO"}]"#,
            ),
            ("/postes", r#"[{"id": 1, "codigo": "P-1", "preco": 100, "ativo": true}]"#),
            ("/estoque", r#"[{"posteId": 1, "codigoPoste": "P-1", "quantidadeAtual": 2}]"#),
        ] {
            let mock = server
                .mock("GET", path)
                .match_query(Matcher::Any)
                .match_header("x-tenant-id", tenant)
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(body)
                .expect(1)
                .create_async()
                .await;
            mocks.push(mock);
        }
        mocks
    }

    #[tokio::test]
    async fn truck_dashboard_joins_the_four_fetches() {
        let mut server = Server::new_async().await;
        let mocks = responder_caminhao(&mut server, "branco").await;

        let painel = carregar_painel(&contexto(&server, Tenant::Branco)).await.unwrap();
        let Painel::Caminhao { tenant, painel } = painel else {
            panic!("expected a single-truck dashboard");
        };
        assert_eq!(tenant, Tenant::Branco);
        assert_eq!(painel.distribuicao.lucro_total, dec!(450));
        assert_eq!(painel.distribuicao.parte_gilberto, dec!(225));
        assert_eq!(painel.distribuicao.parte_jefferson, dec!(125));
        assert_eq!(painel.postes_ativos, 1);
        assert_eq!(painel.alertas_estoque.len(), 1);
        for mock in mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn manager_dashboard_consolidates_both_trucks() {
        let mut server = Server::new_async().await;
        let mut mocks = responder_caminhao(&mut server, "vermelho").await;
        mocks.extend(responder_caminhao(&mut server, "branco").await);

        let painel = carregar_painel(&contexto(&server, Tenant::Jefferson)).await.unwrap();
        let Painel::Consolidado { vermelho, branco, distribuicao } = painel else {
            panic!("expected the consolidated dashboard");
        };
        assert_eq!(vermelho.distribuicao.regra, RegraDistribuicao::TresSocios);
        assert_eq!(branco.distribuicao.regra, RegraDistribuicao::DoisSocios);
        assert_eq!(distribuicao.lucro_total, dec!(900));
        assert_eq!(distribuicao.parte_cicero, dec!(225));
        assert_eq!(distribuicao.parte_gilberto, dec!(287.5));
        assert_eq!(distribuicao.parte_jefferson, dec!(187.5));
        for mock in mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn one_failed_fetch_fails_the_manager_dashboard() {
        let mut server = Server::new_async().await;
        responder_caminhao(&mut server, "vermelho").await;
        server
            .mock("GET", Matcher::Any)
            .match_header("x-tenant-id", "branco")
            .with_status(404)
            .with_body(r#"{"message": "not found"}"#)
            .create_async()
            .await;

        let err = carregar_painel(&contexto(&server, Tenant::Jefferson))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("branco"), "got {err:#}");
    }
}
