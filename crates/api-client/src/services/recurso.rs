use crate::ApiClient;
use crate::error::ApiError;
use core_types::Filtros;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use validator::Validate;

/// Appends the non-empty filters to `path` as a query string.
pub(crate) fn with_query(path: &str, filtros: &Filtros) -> Result<String, ApiError> {
    if filtros.is_empty() {
        return Ok(path.to_string());
    }
    let query =
        serde_qs::to_string(filtros).map_err(|e| ApiError::RequestBuild(e.to_string()))?;
    Ok(format!("{path}?{query}"))
}

/// CRUD over one REST collection: entities `T`, written through payloads `N`.
pub struct Recurso<T, N> {
    pub(crate) client: Arc<dyn ApiClient>,
    path: &'static str,
    _tipos: PhantomData<fn() -> (T, N)>,
}

impl<T, N> Clone for Recurso<T, N> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path,
            _tipos: PhantomData,
        }
    }
}

impl<T, N> Recurso<T, N>
where
    T: DeserializeOwned,
    N: Serialize + Validate + Sync,
{
    pub fn new(client: Arc<dyn ApiClient>, path: &'static str) -> Self {
        Self {
            client,
            path,
            _tipos: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Lists the collection. A `null` body counts as an empty list.
    pub async fn listar(&self, filtros: &Filtros) -> Result<Vec<T>, ApiError> {
        let endpoint = with_query(self.path, filtros)?;
        let itens: Option<Vec<T>> = self.client.get(&endpoint).await?;
        Ok(itens.unwrap_or_default())
    }

    pub async fn buscar(&self, id: i64) -> Result<T, ApiError> {
        self.client.get(&format!("{}/{id}", self.path)).await
    }

    pub async fn criar(&self, dto: &N) -> Result<T, ApiError> {
        dto.validate()?;
        self.client.post(self.path, dto).await
    }

    pub async fn atualizar(&self, id: i64, dto: &N) -> Result<T, ApiError> {
        dto.validate()?;
        self.client.put(&format!("{}/{id}", self.path), dto).await
    }

    pub async fn deletar(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("{}/{id}", self.path)).await?;
        tracing::info!(path = self.path, id, "Record deleted.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;
    use crate::services::fake::FakeClient;
    use chrono::NaiveDate;
    use core_types::{NovoPoste, Periodo, Poste, TipoDespesa};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn data(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn query_string_only_carries_present_filters() {
        assert_eq!(with_query("/vendas", &Filtros::default()).unwrap(), "/vendas");

        let periodo = Periodo::new(data(1), data(10)).unwrap();
        let endpoint = with_query("/vendas", &Filtros::periodo(periodo)).unwrap();
        assert_eq!(endpoint, "/vendas?dataInicio=2024-05-01&dataFim=2024-05-10");

        let endpoint =
            with_query("/despesas", &Filtros::default().com_tipo(TipoDespesa::Funcionario)).unwrap();
        assert_eq!(endpoint, "/despesas?tipo=FUNCIONARIO");
    }

    #[tokio::test]
    async fn crud_maps_to_rest_paths() {
        let fake = Arc::new(
            FakeClient::default()
                .responde(json!([{"id": 1, "codigo": "P-1", "preco": 10}]))
                .responde(json!({"id": 1, "codigo": "P-1", "preco": 10}))
                .responde(json!({"id": 2, "codigo": "P-2", "preco": 20}))
                .responde(json!({"id": 2, "codigo": "P-2", "preco": 25})),
        );
        let postes: Recurso<Poste, NovoPoste> = Recurso::new(fake.clone(), "/postes");
        let dto = NovoPoste {
            codigo: "P-2".into(),
            descricao: "Poste 9m".into(),
            preco: dec!(20),
            ativo: true,
        };

        assert_eq!(postes.listar(&Filtros::default()).await.unwrap().len(), 1);
        assert_eq!(postes.buscar(1).await.unwrap().codigo, "P-1");
        assert_eq!(postes.criar(&dto).await.unwrap().id, 2);
        assert_eq!(postes.atualizar(2, &dto).await.unwrap().preco, dec!(25));
        postes.deletar(2).await.unwrap();

        let chamadas: Vec<_> = fake
            .chamadas()
            .into_iter()
            .map(|(m, e, _)| (m, e))
            .collect();
        assert_eq!(
            chamadas,
            vec![
                (Method::GET, "/postes".to_string()),
                (Method::GET, "/postes/1".to_string()),
                (Method::POST, "/postes".to_string()),
                (Method::PUT, "/postes/2".to_string()),
                (Method::DELETE, "/postes/2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn invalid_payload_is_never_sent() {
        let fake = Arc::new(FakeClient::default());
        let postes: Recurso<Poste, NovoPoste> = Recurso::new(fake.clone(), "/postes");
        let dto = NovoPoste {
            codigo: String::new(),
            descricao: "Sem código".into(),
            preco: dec!(-5),
            ativo: true,
        };

        let err = postes.criar(&dto).await.unwrap_err();
        let ApiError::Validacao(erros) = err else {
            panic!("expected a validation error");
        };
        assert!(erros.field_errors().contains_key("codigo"));
        assert!(erros.field_errors().contains_key("preco"));
        assert!(fake.chamadas().is_empty());
    }

    #[tokio::test]
    async fn null_listing_is_empty() {
        let fake = Arc::new(FakeClient::default());
        let postes: Recurso<Poste, NovoPoste> = Recurso::new(fake, "/postes");
        assert!(postes.listar(&Filtros::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn errors_bubble_up_unchanged() {
        let fake = Arc::new(FakeClient::default().falha(ApiError::Http {
            status: 500,
            body: "boom".into(),
        }));
        let postes: Recurso<Poste, NovoPoste> = Recurso::new(fake, "/postes");
        let err = postes.buscar(3).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
