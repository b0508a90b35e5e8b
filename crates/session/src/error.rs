use api_client::ApiError;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Not logged in. Run `postes login <tenant>` first.")]
    NaoAutenticado,

    #[error("Session started at {login_em} has expired. Please log in again.")]
    Expirada { login_em: DateTime<Utc> },

    #[error("Login failed: {0}")]
    Login(#[from] ApiError),

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
