//! Login state kept on disk between invocations, and the per-tenant route guard.

pub mod error;
pub mod guard;
pub mod store;

pub use error::SessionError;
pub use guard::{Acesso, guardar};
pub use store::{Sessao, SessionStore};
