use std::time::Duration;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("The backend answered HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Could not reach the backend: {0}")]
    Connection(String),

    #[error("Request timed out after {limite:?} (cold start: {partida_fria})")]
    Timeout { limite: Duration, partida_fria: bool },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Failed to build the HTTP request: {0}")]
    RequestBuild(String),

    #[error("Invalid input, nothing was sent: {0}")]
    Validacao(#[from] ValidationErrors),
}

impl ApiError {
    /// Connection failures, timeouts and 5xx answers may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Connection(_) | ApiError::Timeout { .. } => true,
            ApiError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// The human-readable message of an HTTP error body, when the backend sent one.
    pub fn server_message(&self) -> Option<String> {
        let ApiError::Http { body, .. } = self else {
            return None;
        };
        let json: serde_json::Value = serde_json::from_str(body).ok()?;
        ["message", "mensagem", "error"]
            .iter()
            .find_map(|campo| json.get(*campo)?.as_str().map(str::to_string))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            ApiError::RequestBuild(e.to_string())
        } else if e.is_decode() {
            ApiError::Deserialization(e.to_string())
        } else {
            ApiError::Connection(e.to_string())
        }
    }
}
