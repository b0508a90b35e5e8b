use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown tenant '{0}' (expected vermelho, branco or jefferson)")]
    TenantDesconhecido(String),

    #[error("Invalid route '{0}' (expected /<tenant>/<page>)")]
    RotaInvalida(String),

    #[error("Invalid period: start {inicio} is after end {fim}")]
    PeriodoInvalido { inicio: NaiveDate, fim: NaiveDate },
}
