use core_types::{Pagina, Rota};
use thiserror::Error;

/// The error a page returns from its initialization.
pub type PageError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Another navigation is already in progress")]
    EmAndamento,

    #[error("No page registered for '{}'", .0.slug())]
    PaginaNaoRegistrada(Pagina),

    #[error("Failed to open {rota} after {tentativas} attempt(s): {fonte}")]
    Inicializacao {
        rota: Rota,
        tentativas: u32,
        #[source]
        fonte: PageError,
    },
}
