mod pages;
mod views;

use analytics::exportar_csv;
use anyhow::{Context, bail};
use api_client::{
    ApiError, AuthService, DespesaService, EstoqueService, HttpApiClient, MovimentoEstoqueService,
    PosteService, VendaService,
};
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use configuration::{Config, Overrides, init_logging};
use core_types::{
    AjusteEstoque, Filtros, NovaDespesa, NovaVenda, NovoPoste, Periodo, Rota, Tenant, TipoDespesa,
    TipoVenda, VendaDetalhe,
};
use pages::Contexto;
use rust_decimal::Decimal;
use session::{Acesso, Sessao, SessionError, SessionStore, guardar};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// The main entry point for the pole sales client.
#[tokio::main]
async fn main() -> ExitCode {
    // POSTES__* overrides may live in a .env file; it is optional.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match cli.overrides.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Could not initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            relatar_erro(&e);
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Sales, stock and profit sharing for the pole delivery trucks.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in as one of the tenants (vermelho, branco, jefferson).
    Login {
        tenant: Tenant,
        /// Prompted on stdin when omitted.
        #[arg(long)]
        senha: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show who is logged in and until when.
    Sessao,
    /// Profit dashboard of the logged-in tenant.
    Painel {
        #[command(flatten)]
        periodo: PeriodoArgs,
        /// Keep refreshing at the configured interval until Ctrl-C.
        #[arg(long)]
        acompanhar: bool,
    },
    /// Open a route such as /vermelho/estoque.
    Abrir {
        rota: Rota,
        #[command(flatten)]
        periodo: PeriodoArgs,
        #[arg(long)]
        acompanhar: bool,
    },
    #[command(flatten)]
    Dados(DadosCmd),
}

/// Commands that need a valid session and talk to the backend.
#[derive(Subcommand)]
enum DadosCmd {
    /// Manage the pole catalog.
    #[command(subcommand)]
    Postes(PostesCmd),
    /// List, register and delete sales.
    #[command(subcommand)]
    Vendas(VendasCmd),
    /// List, register and delete expenses.
    #[command(subcommand)]
    Despesas(DespesasCmd),
    /// Stock levels and manual adjustments.
    #[command(subcommand)]
    Estoque(EstoqueCmd),
    /// Stock movement history.
    Movimentos {
        #[command(flatten)]
        periodo: PeriodoArgs,
        /// Only the movements of this pole (ignores the period).
        #[arg(long)]
        poste: Option<i64>,
    },
    /// Write a listing to a CSV file.
    Exportar {
        recurso: Exportavel,
        #[arg(long)]
        saida: PathBuf,
        #[command(flatten)]
        periodo: PeriodoArgs,
    },
}

/// Date range; defaults to the current month up to today.
#[derive(Args, Clone, Copy)]
struct PeriodoArgs {
    /// First day (YYYY-MM-DD).
    #[arg(long)]
    inicio: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD).
    #[arg(long)]
    fim: Option<NaiveDate>,
}

impl PeriodoArgs {
    fn resolver(&self) -> anyhow::Result<Periodo> {
        let padrao = Periodo::mes_corrente(Local::now().date_naive());
        Ok(Periodo::new(
            self.inicio.unwrap_or(padrao.inicio),
            self.fim.unwrap_or(padrao.fim),
        )?)
    }
}

#[derive(Subcommand)]
enum PostesCmd {
    Listar {
        /// Include deactivated poles.
        #[arg(long)]
        todos: bool,
    },
    Criar {
        #[arg(long)]
        codigo: String,
        #[arg(long)]
        descricao: String,
        #[arg(long)]
        preco: Decimal,
    },
    Editar {
        id: i64,
        #[arg(long)]
        codigo: Option<String>,
        #[arg(long)]
        descricao: Option<String>,
        #[arg(long)]
        preco: Option<Decimal>,
        #[arg(long)]
        ativo: Option<bool>,
    },
    /// Poles are never deleted, only deactivated.
    Desativar {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        sim: bool,
    },
}

#[derive(Subcommand)]
enum VendasCmd {
    Listar {
        #[command(flatten)]
        periodo: PeriodoArgs,
        #[arg(long)]
        tipo: Option<TipoVenda>,
        #[arg(long)]
        poste: Option<i64>,
    },
    Criar(NovaVendaArgs),
    Deletar {
        id: i64,
        #[arg(long)]
        sim: bool,
    },
}

#[derive(Args)]
struct NovaVendaArgs {
    /// V (normal), E (extra) or L (loja).
    #[arg(long)]
    tipo: TipoVenda,
    /// Defaults to today.
    #[arg(long)]
    data: Option<NaiveDate>,
    /// Required for V and L.
    #[arg(long)]
    poste: Option<i64>,
    #[arg(long, default_value_t = 1)]
    quantidade: i64,
    /// Sale value (V), extra value (E) or freight (L).
    #[arg(long)]
    valor: Decimal,
    #[arg(long)]
    pagamento: Option<String>,
    #[arg(long)]
    vendedor: Option<String>,
    #[arg(long)]
    nota: Option<String>,
    #[arg(long)]
    observacoes: Option<String>,
}

impl NovaVendaArgs {
    fn into_nova_venda(self) -> anyhow::Result<NovaVenda> {
        let data = self.data.unwrap_or_else(|| Local::now().date_naive());
        let poste = || {
            self.poste
                .with_context(|| format!("--poste is required for sales of type {}", self.tipo))
        };
        let detalhe = match self.tipo {
            TipoVenda::Normal => VendaDetalhe::Normal {
                poste_id: poste()?,
                quantidade: self.quantidade,
                valor_venda: self.valor,
            },
            TipoVenda::Extra => VendaDetalhe::Extra { valor_extra: self.valor },
            TipoVenda::Loja => VendaDetalhe::Loja {
                poste_id: poste()?,
                quantidade: self.quantidade,
                frete_eletrons: self.valor,
            },
        };
        Ok(NovaVenda {
            metodo_pagamento: self.pagamento,
            vendedor: self.vendedor,
            numero_nota: self.nota,
            observacoes: self.observacoes,
            ..NovaVenda::new(data, detalhe)
        })
    }
}

#[derive(Subcommand)]
enum DespesasCmd {
    Listar {
        #[command(flatten)]
        periodo: PeriodoArgs,
        #[arg(long)]
        tipo: Option<TipoDespesa>,
    },
    Criar {
        #[arg(long)]
        data: Option<NaiveDate>,
        #[arg(long)]
        descricao: String,
        #[arg(long)]
        valor: Decimal,
        /// FUNCIONARIO or OUTRAS.
        #[arg(long)]
        tipo: TipoDespesa,
    },
    Deletar {
        id: i64,
        #[arg(long)]
        sim: bool,
    },
}

#[derive(Subcommand)]
enum EstoqueCmd {
    Listar,
    /// Items at or below the low-stock threshold.
    Alertas,
    Adicionar(AjusteArgs),
    Remover(AjusteArgs),
}

#[derive(Args)]
struct AjusteArgs {
    #[arg(long)]
    poste: i64,
    #[arg(long)]
    quantidade: i64,
    #[arg(long)]
    observacao: Option<String>,
}

impl From<AjusteArgs> for AjusteEstoque {
    fn from(args: AjusteArgs) -> Self {
        AjusteEstoque {
            poste_id: args.poste,
            quantidade: args.quantidade,
            observacao: args.observacao,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Exportavel {
    Vendas,
    Despesas,
    Estoque,
    Postes,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run(command: Commands, config: Config) -> anyhow::Result<()> {
    let store = SessionStore::from_config(&config.session);

    match command {
        Commands::Login { tenant, senha } => {
            let senha = match senha {
                Some(senha) => senha,
                None => ler_linha(&format!("Password for {tenant}: "))?,
            };
            let auth = AuthService::new(Arc::new(HttpApiClient::new(&config.api, tenant)?));
            let sessao = store.login(&auth, tenant, &senha).await?;
            println!(
                "Logged in as {} until {}.",
                sessao.nome_exibicao,
                sessao.expira_em(store.duracao_maxima()).with_timezone(&Local).format("%d/%m/%Y %H:%M")
            );
        }
        Commands::Logout => {
            if store.encerrar()? {
                println!("Logged out.");
            } else {
                println!("No active session.");
            }
        }
        Commands::Sessao => {
            let sessao = store.carregar_valida(Utc::now())?;
            println!(
                "{} ({}) logged in at {}, valid until {}.",
                sessao.nome_exibicao,
                sessao.tenant,
                sessao.login_em.with_timezone(&Local).format("%d/%m/%Y %H:%M"),
                sessao.expira_em(store.duracao_maxima()).with_timezone(&Local).format("%d/%m/%Y %H:%M")
            );
        }
        Commands::Painel { periodo, acompanhar } => {
            let sessao = store.carregar_valida(Utc::now())?;
            let rota = Rota::painel(sessao.tenant);
            abrir(&config, &sessao, rota, periodo.resolver()?, acompanhar).await?;
        }
        Commands::Abrir { rota, periodo, acompanhar } => {
            let sessao = match store.carregar_valida(Utc::now()) {
                Ok(sessao) => Some(sessao),
                Err(SessionError::NaoAutenticado | SessionError::Expirada { .. }) => None,
                Err(e) => return Err(e.into()),
            };
            let rota = match guardar(sessao.as_ref(), &rota) {
                Acesso::Permitido => rota,
                Acesso::Redirecionar(destino) => {
                    eprintln!("{rota} belongs to another tenant, opening {destino} instead.");
                    destino
                }
                Acesso::Login => bail!("Log in with `postes login {}` to open {rota}.", rota.tenant),
            };
            if let Some(sessao) = &sessao {
                abrir(&config, sessao, rota, periodo.resolver()?, acompanhar).await?;
            }
        }
        Commands::Dados(cmd) => {
            let sessao = store.carregar_valida(Utc::now())?;
            let client = HttpApiClient::new(&config.api, sessao.tenant)?;
            executar(cmd, &config, client).await?;
        }
    }
    Ok(())
}

/// Opens `rota` through the navigator; with `acompanhar`, keeps refreshing until Ctrl-C.
async fn abrir(
    config: &Config,
    sessao: &Sessao,
    rota: Rota,
    periodo: Periodo,
    acompanhar: bool,
) -> anyhow::Result<()> {
    let contexto = Contexto {
        client: HttpApiClient::new(&config.api, sessao.tenant)?,
        periodo,
        limite_baixo: config.dashboard.low_stock_threshold,
    };
    let intervalo = acompanhar.then_some(config.dashboard.refresh_interval);
    let navegador = pages::navegador(contexto, intervalo);

    navegador.navegar(rota).await?;

    if acompanhar {
        eprintln!("Refreshing every {:?}. Press Ctrl-C to stop.", config.dashboard.refresh_interval);
        tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
        let interrompidas = navegador.encerrar();
        tracing::debug!(interrompidas, "Stopped refreshing.");
    }
    Ok(())
}

async fn executar(command: DadosCmd, config: &Config, client: HttpApiClient) -> anyhow::Result<()> {
    let client: Arc<dyn api_client::ApiClient> = Arc::new(client);
    let limite_baixo = config.dashboard.low_stock_threshold;

    match command {
        DadosCmd::Postes(cmd) => {
            let service = PosteService::postes(client);
            match cmd {
                PostesCmd::Listar { todos } => {
                    let postes = if todos {
                        service.listar(&Filtros::default()).await?
                    } else {
                        service.listar_ativos().await?
                    };
                    println!("{}", views::tabela_postes(&postes));
                }
                PostesCmd::Criar { codigo, descricao, preco } => {
                    let poste = service
                        .criar(&NovoPoste { codigo, descricao, preco, ativo: true })
                        .await?;
                    println!("Pole {} created with id {}.", poste.codigo, poste.id);
                }
                PostesCmd::Editar { id, codigo, descricao, preco, ativo } => {
                    let atual = service.buscar(id).await?;
                    let base = NovoPoste::from(&atual);
                    let dto = NovoPoste {
                        codigo: codigo.unwrap_or(base.codigo),
                        descricao: descricao.unwrap_or(base.descricao),
                        preco: preco.unwrap_or(base.preco),
                        ativo: ativo.unwrap_or(base.ativo),
                    };
                    let poste = service.atualizar(id, &dto).await?;
                    println!("{}", views::tabela_postes(&[poste]));
                }
                PostesCmd::Desativar { id, sim } => {
                    if confirmar(&format!("Deactivate pole {id}?"), sim)? {
                        let poste = service.desativar(id).await?;
                        println!("Pole {} deactivated.", poste.codigo);
                    }
                }
            }
        }
        DadosCmd::Vendas(cmd) => {
            let service = VendaService::vendas(client);
            match cmd {
                VendasCmd::Listar { periodo, tipo, poste } => {
                    let mut filtros = Filtros::periodo(periodo.resolver()?);
                    if let Some(poste) = poste {
                        filtros = filtros.com_poste(poste);
                    }
                    let mut vendas = service.listar(&filtros).await?;
                    if let Some(tipo) = tipo {
                        vendas.retain(|v| v.tipo_venda == tipo);
                    }
                    println!("{}", views::tabela_vendas(&vendas));
                }
                VendasCmd::Criar(args) => {
                    let venda = service.criar(&args.into_nova_venda()?).await?;
                    println!("{}", views::tabela_vendas(&[venda]));
                }
                VendasCmd::Deletar { id, sim } => {
                    if confirmar(&format!("Delete sale {id}?"), sim)? {
                        service.deletar(id).await?;
                        println!("Sale {id} deleted.");
                    }
                }
            }
        }
        DadosCmd::Despesas(cmd) => {
            let service = DespesaService::despesas(client);
            match cmd {
                DespesasCmd::Listar { periodo, tipo } => {
                    let mut filtros = Filtros::periodo(periodo.resolver()?);
                    if let Some(tipo) = tipo {
                        filtros = filtros.com_tipo(tipo);
                    }
                    println!("{}", views::tabela_despesas(&service.listar(&filtros).await?));
                }
                DespesasCmd::Criar { data, descricao, valor, tipo } => {
                    let despesa = service
                        .criar(&NovaDespesa {
                            data_despesa: data.unwrap_or_else(|| Local::now().date_naive()),
                            descricao,
                            valor,
                            tipo,
                        })
                        .await?;
                    println!("Expense registered with id {}.", despesa.id);
                }
                DespesasCmd::Deletar { id, sim } => {
                    if confirmar(&format!("Delete expense {id}?"), sim)? {
                        service.deletar(id).await?;
                        println!("Expense {id} deleted.");
                    }
                }
            }
        }
        DadosCmd::Estoque(cmd) => {
            let service = EstoqueService::new(client);
            match cmd {
                EstoqueCmd::Listar => {
                    println!("{}", views::tabela_estoque(&service.listar().await?, limite_baixo));
                }
                EstoqueCmd::Alertas => {
                    let alertas = service.alertas(limite_baixo).await?;
                    if alertas.is_empty() {
                        println!("No stock alerts.");
                    } else {
                        println!("{}", views::tabela_estoque(&alertas, limite_baixo));
                    }
                }
                EstoqueCmd::Adicionar(args) => {
                    service.adicionar(&args.into()).await?;
                    println!("Stock added.");
                }
                EstoqueCmd::Remover(args) => {
                    service.remover(&args.into()).await?;
                    println!("Stock removed.");
                }
            }
        }
        DadosCmd::Movimentos { periodo, poste } => {
            let service = MovimentoEstoqueService::new(client);
            let movimentos = match poste {
                Some(poste) => service.por_poste(poste).await?,
                None => service.listar(&Filtros::periodo(periodo.resolver()?)).await?,
            };
            println!("{}", views::tabela_movimentos(&movimentos));
        }
        DadosCmd::Exportar { recurso, saida, periodo } => {
            let filtros = Filtros::periodo(periodo.resolver()?);
            let (bytes, linhas) = match recurso {
                Exportavel::Vendas => {
                    let vendas = VendaService::vendas(client).listar(&filtros).await?;
                    (exportar_csv(&vendas)?, vendas.len())
                }
                Exportavel::Despesas => {
                    let despesas = DespesaService::despesas(client).listar(&filtros).await?;
                    (exportar_csv(&despesas)?, despesas.len())
                }
                Exportavel::Estoque => {
                    let itens = EstoqueService::new(client).listar().await?;
                    (exportar_csv(&itens)?, itens.len())
                }
                Exportavel::Postes => {
                    let postes = PosteService::postes(client).listar(&Filtros::default()).await?;
                    (exportar_csv(&postes)?, postes.len())
                }
            };
            std::fs::write(&saida, bytes)
                .with_context(|| format!("Failed to write {}", saida.display()))?;
            println!("{linhas} rows exported to {}.", saida.display());
        }
    }
    Ok(())
}

// ==============================================================================
// Terminal helpers
// ==============================================================================

fn ler_linha(prompt: &str) -> anyhow::Result<String> {
    eprint!("{prompt}");
    io::stderr().flush()?;
    let mut linha = String::new();
    io::stdin().lock().read_line(&mut linha)?;
    Ok(linha.trim_end_matches(['\r', '\n']).to_string())
}

/// Deletions ask first unless `--sim` was given.
fn confirmar(pergunta: &str, sim: bool) -> anyhow::Result<bool> {
    if sim {
        return Ok(true);
    }
    let resposta = ler_linha(&format!("{pergunta} [s/N] "))?;
    let confirmado = matches!(resposta.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes");
    if !confirmado {
        println!("Cancelled.");
    }
    Ok(confirmado)
}

fn relatar_erro(erro: &anyhow::Error) {
    eprintln!("Error: {erro:#}");

    let Some(api) = erro.chain().find_map(|e| e.downcast_ref::<ApiError>()) else {
        return;
    };
    match api {
        ApiError::Validacao(erros) => {
            for (campo, lista) in erros.field_errors() {
                for e in lista {
                    let mensagem = e.message.as_ref().unwrap_or(&e.code);
                    eprintln!("  {campo}: {mensagem}");
                }
            }
        }
        e if e.is_unauthorized() => {
            eprintln!("The backend refused the credentials. Log in again with `postes login <tenant>`.");
        }
        e => {
            if let Some(mensagem) = e.server_message() {
                eprintln!("  {mensagem}");
            }
        }
    }
}
