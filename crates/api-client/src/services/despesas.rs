use super::recurso::Recurso;
use crate::ApiClient;
use core_types::{Despesa, NovaDespesa};
use std::sync::Arc;

pub type DespesaService = Recurso<Despesa, NovaDespesa>;

impl Recurso<Despesa, NovaDespesa> {
    pub fn despesas(client: Arc<dyn ApiClient>) -> Self {
        Self::new(client, "/despesas")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::services::fake::FakeClient;
    use core_types::{Filtros, TipoDespesa};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[tokio::test]
    async fn lists_expenses_leniently() {
        let fake = Arc::new(FakeClient::default().responde(json!([
            {"id": 1, "dataDespesa": "2024-05-02", "descricao": "Ajudante", "valor": 100, "tipo": "FUNCIONARIO"},
            {"id": 2, "dataDespesa": "2024-05-03T00:00:00", "descricao": "Diesel", "valor": null, "tipo": "OUTRAS"}
        ])));
        let despesas = DespesaService::despesas(fake)
            .listar(&Filtros::default())
            .await
            .unwrap();

        assert_eq!(despesas[0].tipo, TipoDespesa::Funcionario);
        assert_eq!(despesas[0].valor, dec!(100));
        assert_eq!(despesas[1].valor, dec!(0));
    }

    #[tokio::test]
    async fn delete_failure_is_propagated() {
        let fake = Arc::new(FakeClient::default().falha(ApiError::Http {
            status: 409,
            body: r#"{"message": "em uso"}"#.into(),
        }));
        let err = DespesaService::despesas(fake.clone()).deletar(3).await.unwrap_err();
        assert_eq!(err.server_message().as_deref(), Some("em uso"));
        assert_eq!(fake.chamadas()[0].1, "/despesas/3");
    }
}
