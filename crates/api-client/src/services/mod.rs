//! Per-entity accessors over the [`ApiClient`](crate::ApiClient).
//!
//! These only shape parameters (paths, query strings, payload validation); all
//! business rules live in the backend or in `analytics`.

mod despesas;
mod estoque;
mod movimentos;
mod postes;
mod recurso;
mod vendas;

pub use despesas::DespesaService;
pub use estoque::EstoqueService;
pub use movimentos::MovimentoEstoqueService;
pub use postes::PosteService;
pub use recurso::Recurso;
pub use vendas::VendaService;
