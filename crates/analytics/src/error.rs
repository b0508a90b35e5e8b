use crate::lucro::RegraDistribuicao;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Expected a breakdown computed with the {esperada} rule, got {recebida}")]
    RegraIncompativel {
        esperada: RegraDistribuicao,
        recebida: RegraDistribuicao,
    },

    #[error("Nothing to export")]
    SemRegistros,

    #[error("Record {indice} is not a flat object and cannot become a CSV row")]
    RegistroInvalido { indice: usize },

    #[error("Could not serialize record: {0}")]
    Serializacao(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not finish the CSV output: {0}")]
    Escrita(String),
}
