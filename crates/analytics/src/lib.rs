//! # Postes Analytics
//!
//! Pure calculations over data already fetched from the backend: the partners'
//! profit split, the period dashboard and CSV export.
//!
//! ## Architectural Principles
//!
//! - **No I/O:** depends only on `core-types`. Callers fetch, this crate computes.
//! - **Stateless calculation:** every entry point borrows its inputs and returns a
//!   new value, so the same inputs always give the same report.
//!
//! ## Public API
//!
//! - `CalculadoraLucro` / `RegraDistribuicao`: the per-truck profit split.
//! - `consolidar`: both trucks combined for the manager view.
//! - `PainelPeriodo`: dashboard figures for one period.
//! - `exportar_csv`: any list of records as CSV bytes.

pub mod error;
pub mod export;
pub mod lucro;
pub mod painel;

pub use error::AnalyticsError;
pub use export::exportar_csv;
pub use lucro::{
    CalculadoraLucro, DistribuicaoConsolidada, DistribuicaoLucro, RegraDistribuicao, Socio,
    TotaisDespesas, consolidar,
};
pub use painel::PainelPeriodo;
