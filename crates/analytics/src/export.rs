//! CSV export of any list of serializable records.
//!
//! The header row is the key list of the first record, in field order. Fields
//! with commas, quotes or line breaks are quoted with inner quotes doubled, and
//! the output starts with a UTF-8 byte order mark so spreadsheet tools pick the
//! right encoding.

use crate::error::AnalyticsError;
use serde::Serialize;
use serde_json::{Map, Value};

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn exportar_csv<T: Serialize>(registros: &[T]) -> Result<Vec<u8>, AnalyticsError> {
    let linhas = registros
        .iter()
        .enumerate()
        .map(|(indice, registro)| -> Result<Map<String, Value>, AnalyticsError> {
            match serde_json::to_value(registro)? {
                Value::Object(campos) => Ok(campos),
                _ => Err(AnalyticsError::RegistroInvalido { indice }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let Some(primeira) = linhas.first() else {
        return Err(AnalyticsError::SemRegistros);
    };
    let cabecalho: Vec<String> = primeira.keys().cloned().collect();

    let mut writer = csv::WriterBuilder::new().from_writer(UTF8_BOM.to_vec());
    writer.write_record(&cabecalho)?;
    for campos in &linhas {
        writer.write_record(cabecalho.iter().map(|chave| celula(campos.get(chave))))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AnalyticsError::Escrita(e.to_string()))?;
    tracing::debug!(linhas = linhas.len(), colunas = cabecalho.len(), "CSV exported.");
    Ok(bytes)
}

fn celula(valor: Option<&Value>) -> String {
    match valor {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(outro) => outro.to_string(),
    }
}
