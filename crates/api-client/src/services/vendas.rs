use super::recurso::{Recurso, with_query};
use crate::ApiClient;
use crate::error::ApiError;
use core_types::{Filtros, NovaVenda, Periodo, ResumoVendas, Venda};
use std::sync::Arc;

pub type VendaService = Recurso<Venda, NovaVenda>;

impl Recurso<Venda, NovaVenda> {
    pub fn vendas(client: Arc<dyn ApiClient>) -> Self {
        Self::new(client, "/vendas")
    }

    /// Server-side totals for the period. An empty answer is an all-zero summary.
    pub async fn resumo(&self, periodo: Periodo) -> Result<ResumoVendas, ApiError> {
        let endpoint = with_query("/vendas/resumo", &Filtros::periodo(periodo))?;
        let resumo: Option<ResumoVendas> = self.client.get(&endpoint).await?;
        Ok(resumo.unwrap_or_default())
    }
}
