use super::recurso::Recurso;
use crate::ApiClient;
use crate::error::ApiError;
use core_types::{Filtros, NovoPoste, Poste};
use std::sync::Arc;

pub type PosteService = Recurso<Poste, NovoPoste>;

impl Recurso<Poste, NovoPoste> {
    pub fn postes(client: Arc<dyn ApiClient>) -> Self {
        Self::new(client, "/postes")
    }

    /// Poles referenced by sales cannot be deleted, so removal means switching them off.
    pub async fn desativar(&self, id: i64) -> Result<Poste, ApiError> {
        let atual = self.buscar(id).await?;
        if !atual.ativo {
            return Ok(atual);
        }
        let dto = NovoPoste {
            ativo: false,
            ..NovoPoste::from(&atual)
        };
        let poste = self.atualizar(id, &dto).await?;
        tracing::info!(id, codigo = %poste.codigo, "Pole deactivated.");
        Ok(poste)
    }

    pub async fn listar_ativos(&self) -> Result<Vec<Poste>, ApiError> {
        let mut postes = self.listar(&Filtros::default()).await?;
        postes.retain(|p| p.ativo);
        Ok(postes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;
    use crate::services::fake::FakeClient;
    use serde_json::json;

    #[tokio::test]
    async fn deactivation_keeps_the_record() {
        let fake = Arc::new(
            FakeClient::default()
                .responde(json!({"id": 4, "codigo": "P-4", "descricao": "Poste 11m", "preco": 300, "ativo": true}))
                .responde(json!({"id": 4, "codigo": "P-4", "descricao": "Poste 11m", "preco": 300, "ativo": false})),
        );
        let poste = PosteService::postes(fake.clone()).desativar(4).await.unwrap();
        assert!(!poste.ativo);

        let chamadas = fake.chamadas();
        assert_eq!(chamadas.len(), 2);
        let (method, endpoint, body) = &chamadas[1];
        assert_eq!(*method, Method::PUT);
        assert_eq!(endpoint, "/postes/4");
        let body = body.as_ref().unwrap();
        assert_eq!(body["ativo"], false);
        assert_eq!(body["codigo"], "P-4");
        assert!(chamadas.iter().all(|(m, _, _)| *m != Method::DELETE));
    }

    #[tokio::test]
    async fn already_inactive_pole_is_left_alone() {
        let fake = Arc::new(FakeClient::default().responde(
            json!({"id": 4, "codigo": "P-4", "descricao": "Poste 11m", "preco": 300, "ativo": false}),
        ));
        PosteService::postes(fake.clone()).desativar(4).await.unwrap();
        assert_eq!(fake.chamadas().len(), 1);
    }

    #[tokio::test]
    async fn active_listing_filters_inactive_poles() {
        let fake = Arc::new(FakeClient::default().responde(json!([
            {"id": 1, "codigo": "P-1", "preco": 10, "ativo": true},
            {"id": 2, "codigo": "P-2", "preco": 10, "ativo": false},
            {"id": 3, "codigo": "P-3", "preco": 10}
        ])));
        let ativos = PosteService::postes(fake).listar_ativos().await.unwrap();
        let ids: Vec<_> = ativos.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
