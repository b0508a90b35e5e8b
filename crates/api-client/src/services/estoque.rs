use crate::ApiClient;
use crate::error::ApiError;
use core_types::{AjusteEstoque, EstoqueItem};
use std::sync::Arc;
use validator::Validate;

/// Current stock per pole and manual adjustments.
#[derive(Clone)]
pub struct EstoqueService {
    client: Arc<dyn ApiClient>,
}

impl EstoqueService {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub async fn listar(&self) -> Result<Vec<EstoqueItem>, ApiError> {
        let itens: Option<Vec<EstoqueItem>> = self.client.get("/estoque").await?;
        Ok(itens.unwrap_or_default())
    }

    pub async fn adicionar(&self, ajuste: &AjusteEstoque) -> Result<(), ApiError> {
        self.ajustar("/estoque/adicionar", ajuste).await
    }

    /// Removal may drive the quantity negative; the backend accepts oversells.
    pub async fn remover(&self, ajuste: &AjusteEstoque) -> Result<(), ApiError> {
        self.ajustar("/estoque/remover", ajuste).await
    }

    /// Items at or below `limite_baixo`, most critical first.
    pub async fn alertas(&self, limite_baixo: i64) -> Result<Vec<EstoqueItem>, ApiError> {
        let mut itens = self.listar().await?;
        itens.retain(|item| item.situacao(limite_baixo).em_alerta());
        itens.sort_by_key(|item| item.quantidade_atual);
        Ok(itens)
    }

    async fn ajustar(&self, endpoint: &str, ajuste: &AjusteEstoque) -> Result<(), ApiError> {
        ajuste.validate()?;
        let _: serde_json::Value = self.client.post(endpoint, ajuste).await?;
        tracing::info!(
            endpoint,
            poste_id = ajuste.poste_id,
            quantidade = ajuste.quantidade,
            "Stock adjusted."
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fake::FakeClient;
    use serde_json::json;

    #[tokio::test]
    async fn alerts_put_negative_stock_first() {
        let fake = Arc::new(FakeClient::default().responde(json!([
            {"posteId": 1, "codigoPoste": "P-1", "quantidadeAtual": 20},
            {"posteId": 2, "codigoPoste": "P-2", "quantidadeAtual": 3},
            {"posteId": 3, "codigoPoste": "P-3", "quantidadeAtual": -4},
            {"posteId": 4, "codigoPoste": "P-4", "quantidadeAtual": 0}
        ])));
        let alertas = EstoqueService::new(fake).alertas(5).await.unwrap();
        let ids: Vec<_> = alertas.iter().map(|i| i.poste_id).collect();
        assert_eq!(ids, vec![3, 4, 2]);
    }

    #[tokio::test]
    async fn adjustments_post_to_their_endpoints() {
        let fake = Arc::new(FakeClient::default());
        let service = EstoqueService::new(fake.clone());
        let ajuste = AjusteEstoque { poste_id: 7, quantidade: 2, observacao: None };

        service.adicionar(&ajuste).await.unwrap();
        service.remover(&ajuste).await.unwrap();

        let endpoints: Vec<_> = fake.chamadas().into_iter().map(|(_, e, _)| e).collect();
        assert_eq!(endpoints, vec!["/estoque/adicionar", "/estoque/remover"]);
    }

    #[tokio::test]
    async fn zero_quantity_adjustment_is_rejected_locally() {
        let fake = Arc::new(FakeClient::default());
        let ajuste = AjusteEstoque { poste_id: 7, quantidade: 0, observacao: None };
        let err = EstoqueService::new(fake.clone()).adicionar(&ajuste).await.unwrap_err();
        assert!(matches!(err, ApiError::Validacao(_)));
        assert!(fake.chamadas().is_empty());
    }
}
