use super::recurso::with_query;
use crate::ApiClient;
use crate::error::ApiError;
use core_types::{Filtros, MovimentoEstoque};
use std::sync::Arc;

/// Read-only history of stock entries and exits.
#[derive(Clone)]
pub struct MovimentoEstoqueService {
    client: Arc<dyn ApiClient>,
}

impl MovimentoEstoqueService {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn listar(&self, filtros: &Filtros) -> Result<Vec<MovimentoEstoque>, ApiError> {
        let endpoint = with_query("/movimento-estoque", filtros)?;
        let movimentos: Option<Vec<MovimentoEstoque>> = self.client.get(&endpoint).await?;
        Ok(movimentos.unwrap_or_default())
    }

    pub async fn por_poste(&self, poste_id: i64) -> Result<Vec<MovimentoEstoque>, ApiError> {
        let movimentos: Option<Vec<MovimentoEstoque>> = self
            .client
            .get(&format!("/movimento-estoque/poste/{poste_id}"))
            .await?;
        Ok(movimentos.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fake::FakeClient;
    use core_types::TipoMovimento;
    use serde_json::json;

    #[tokio::test]
    async fn history_by_pole() {
        let fake = Arc::new(FakeClient::default().responde(json!([
            {"id": 1, "posteId": 9, "tipoMovimento": "ENTRADA", "quantidade": 10, "dataMovimento": "2024-05-01"},
            {"id": 2, "posteId": 9, "tipoMovimento": "SAIDA", "quantidade": 4}
        ])));
        let movimentos = MovimentoEstoqueService::new(fake.clone()).por_poste(9).await.unwrap();

        assert_eq!(movimentos.len(), 2);
        assert_eq!(movimentos[1].tipo_movimento, TipoMovimento::Saida);
        assert_eq!(fake.chamadas()[0].1, "/movimento-estoque/poste/9");
    }
}
