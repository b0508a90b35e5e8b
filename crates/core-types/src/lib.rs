pub mod enums;
pub mod error;
pub mod filtros;
pub mod routes;
pub mod serde_helpers;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{SituacaoEstoque, Tenant, TipoDespesa, TipoMovimento, TipoVenda};
pub use error::CoreError;
pub use filtros::{Filtros, Periodo};
pub use routes::{Pagina, Rota};
pub use structs::{
    AjusteEstoque, Despesa, EstoqueItem, MovimentoEstoque, NovaDespesa, NovaVenda, NovoPoste,
    Poste, ResumoVendas, Venda, VendaDetalhe,
};
