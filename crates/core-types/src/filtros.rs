use crate::enums::TipoDespesa;
use crate::error::CoreError;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// An inclusive date range used by every dashboard and listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periodo {
    pub inicio: NaiveDate,
    pub fim: NaiveDate,
}

impl Periodo {
    pub fn new(inicio: NaiveDate, fim: NaiveDate) -> Result<Self, CoreError> {
        if inicio > fim {
            return Err(CoreError::PeriodoInvalido { inicio, fim });
        }
        Ok(Self { inicio, fim })
    }

    /// First day of the month up to `hoje`, the default range of the dashboards.
    pub fn mes_corrente(hoje: NaiveDate) -> Self {
        let inicio = hoje.with_day(1).unwrap_or(hoje);
        Self { inicio, fim: hoje }
    }
}

/// Optional query-string filters accepted by the listing endpoints.
///
/// `None` fields are omitted from the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filtros {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_inicio: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_fim: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poste_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<TipoDespesa>,
}

impl Filtros {
    pub fn periodo(periodo: Periodo) -> Self {
        Self {
            data_inicio: Some(periodo.inicio),
            data_fim: Some(periodo.fim),
            ..Self::default()
        }
    }

    pub fn com_poste(mut self, poste_id: i64) -> Self {
        self.poste_id = Some(poste_id);
        self
    }

    pub fn com_tipo(mut self, tipo: TipoDespesa) -> Self {
        self.tipo = Some(tipo);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
