use crate::error::{NavigationError, PageError};
use crate::retry::{RetryPolicy, retry};
use crate::timers::TaskRegistry;
use async_trait::async_trait;
use core_types::{Pagina, Rota};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// What a page sees while it initializes.
pub struct PageContext<'a> {
    pub rota: Rota,
    /// Intervals and timeouts started here are stopped when the user navigates away.
    pub tarefas: &'a TaskRegistry,
}

/// A screen that can be navigated to.
#[async_trait]
pub trait Page: Send + Sync {
    fn pagina(&self) -> Pagina;

    /// Loads and renders the page. May be called again after a failure.
    async fn iniciar(&self, ctx: &PageContext<'_>) -> Result<(), PageError>;
}

/// Resets the navigation flag however `navegar` returns.
struct NavegandoGuard<'a>(&'a AtomicBool);

impl Drop for NavegandoGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Serializes page transitions and owns the tasks of the current page.
pub struct Navigator {
    pages: HashMap<Pagina, Arc<dyn Page>>,
    navegando: AtomicBool,
    atual: Mutex<Option<Rota>>,
    tarefas: TaskRegistry,
    politica: RetryPolicy,
}

impl Navigator {
    pub fn new(politica: RetryPolicy) -> Self {
        Self {
            pages: HashMap::new(),
            navegando: AtomicBool::new(false),
            atual: Mutex::new(None),
            tarefas: TaskRegistry::new(),
            politica,
        }
    }

    pub fn with_page(mut self, page: Arc<dyn Page>) -> Self {
        self.pages.insert(page.pagina(), page);
        self
    }

    pub fn atual(&self) -> Option<Rota> {
        *self.atual.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn tarefas(&self) -> &TaskRegistry {
        &self.tarefas
    }

    /// Tears down the current page and opens `rota`.
    ///
    /// Only one navigation runs at a time; a second call made while one is in
    /// flight fails with [`NavigationError::EmAndamento`].
    pub async fn navegar(&self, rota: Rota) -> Result<(), NavigationError> {
        if self
            .navegando
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(NavigationError::EmAndamento);
        }
        let _guard = NavegandoGuard(&self.navegando);

        let page = self
            .pages
            .get(&rota.pagina)
            .cloned()
            .ok_or(NavigationError::PaginaNaoRegistrada(rota.pagina))?;

        let interrompidas = self.encerrar();
        tracing::debug!(%rota, interrompidas, "Leaving current page.");

        let ctx = PageContext {
            rota,
            tarefas: &self.tarefas,
        };
        let page: &dyn Page = page.as_ref();
        let tentativas = AtomicU32::new(0);

        retry(&self.politica, |_| true, |_| {
            tentativas.fetch_add(1, Ordering::Relaxed);
            // A failed attempt may have started timers; they must not outlive it.
            self.tarefas.clear();
            page.iniciar(&ctx)
        })
        .await
        .map_err(|fonte| NavigationError::Inicializacao {
            rota,
            tentativas: tentativas.load(Ordering::Relaxed),
            fonte,
        })?;

        *self.atual.lock().unwrap_or_else(PoisonError::into_inner) = Some(rota);
        tracing::info!(%rota, "Page opened.");
        Ok(())
    }

    /// Stops every task of the current page. Returns how many were running.
    pub fn encerrar(&self) -> usize {
        *self.atual.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.tarefas.clear()
    }
}
