use crate::cache::ResponseCache;
use async_trait::async_trait;
use configuration::ApiConfig;
use core_types::Tenant;
use lifecycle::{RetryPolicy, retry};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub mod auth;
pub mod cache;
pub mod error;
pub mod responses;
pub mod services;

// --- Public API ---
pub use auth::AuthService;
pub use error::ApiError;
pub use reqwest::Method;
pub use responses::{LoginRequest, LoginResponse};
pub use services::{
    DespesaService, EstoqueService, MovimentoEstoqueService, PosteService, Recurso, VendaService,
};

/// The header every request carries to scope it to one tenant.
pub const TENANT_HEADER: &str = "X-Tenant-Id";

/// The abstract interface to the backend.
///
/// Services only depend on this trait, so the HTTP implementation can be
/// swapped for a fake in tests.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// The tenant every request of this client is scoped to.
    fn tenant(&self) -> Tenant;

    /// Issues one logical request and returns the JSON body.
    ///
    /// Empty bodies come back as `Value::Null`; non-JSON text as `Value::String`.
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError>;
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::RequestBuild(e.to_string()))
}

/// Typed helpers over the raw JSON interface.
impl dyn ApiClient {
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        decode(self.request(Method::GET, endpoint, None).await?)
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        decode(self.request(Method::POST, endpoint, Some(&body)).await?)
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        decode(self.request(Method::PUT, endpoint, Some(&body)).await?)
    }

    pub async fn delete(&self, endpoint: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, endpoint, None).await.map(|_| ())
    }
}

/// A concrete implementation of the `ApiClient` over HTTP.
#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    tenant: Tenant,
    timeout: Duration,
    cold_start_timeout: Duration,
    // Shared by clones: the backend only has one cold start per session.
    warm: Arc<AtomicBool>,
    retry: RetryPolicy,
    cache: Option<ResponseCache>,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig, tenant: Tenant) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::RequestBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tenant,
            timeout: config.timeout,
            cold_start_timeout: config.cold_start_timeout,
            warm: Arc::new(AtomicBool::new(false)),
            retry: RetryPolicy::new(
                config.retry.max_retries,
                config.retry.base_delay,
                config.retry.max_delay,
            ),
            cache: config
                .cache
                .enabled
                .then(|| ResponseCache::new(config.cache.ttl)),
        })
    }

    /// A client for another tenant sharing the connection pool, cache and warm-up state.
    pub fn for_tenant(&self, tenant: Tenant) -> Self {
        Self {
            tenant,
            ..self.clone()
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// One attempt, bounded by the timeout of the current warm-up state.
    async fn send_once(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let cold_start = !self.warm.load(Ordering::Acquire);
        let limite = if cold_start {
            self.cold_start_timeout
        } else {
            self.timeout
        };

        let mut request = self
            .client
            .request(method, self.url(endpoint))
            .header(CONTENT_TYPE, "application/json")
            .header(TENANT_HEADER, self.tenant.as_str());
        if let Some(body) = body {
            request = request.json(body);
        }

        match tokio::time::timeout(limite, self.execute(request)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout {
                limite,
                partida_fria: cold_start,
            }),
        }
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        // Any answer, even an error, means the backend is awake.
        self.warm.store(true, Ordering::Release);

        let status = response.status();
        let declared_empty = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");
        if !status.is_success() {
            // The status is what matters here; a body that fails to arrive is just empty.
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let text = response.text().await?;

        if status.as_u16() == 204 || status.as_u16() == 205 || declared_empty || text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    fn tenant(&self) -> Tenant {
        self.tenant
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let is_get = method == Method::GET;
        let cache_key = is_get.then(|| ResponseCache::key(self.tenant, endpoint));

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(hit) = cache.get(key) {
                tracing::debug!(tenant = %self.tenant, endpoint, "Cache hit.");
                return Ok(hit);
            }
        }

        // POST is not idempotent: a retried timeout could register a sale twice.
        let policy = if method == Method::POST {
            RetryPolicy::none()
        } else {
            self.retry
        };

        let generation = self.cache.as_ref().map(ResponseCache::generation);
        let started = Instant::now();
        let result = retry(&policy, ApiError::is_transient, |_| {
            self.send_once(method.clone(), endpoint, body)
        })
        .await;

        match &result {
            Ok(value) => {
                tracing::debug!(
                    tenant = %self.tenant,
                    %method,
                    endpoint,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Request completed."
                );
                if let Some(cache) = &self.cache {
                    match (cache_key, generation) {
                        (Some(key), Some(generation)) => {
                            if !cache.insert_if_current(key, value.clone(), generation) {
                                tracing::debug!(endpoint, "Response predates a write, not cached.");
                            }
                        }
                        _ => cache.invalidate_all(),
                    }
                }
            }
            Err(e) => {
                tracing::warn!(tenant = %self.tenant, %method, endpoint, error = %e, "Request failed.");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::{CacheConfig, RetryConfig};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::io::Write;

    fn config(base_url: String) -> ApiConfig {
        ApiConfig {
            base_url,
            timeout: Duration::from_secs(5),
            cold_start_timeout: Duration::from_secs(5),
            retry: RetryConfig {
                max_retries: 2,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
            },
            cache: CacheConfig {
                enabled: true,
                ttl: Duration::from_secs(300),
            },
        }
    }

    fn client(server: &Server, tenant: Tenant) -> Arc<dyn ApiClient> {
        Arc::new(HttpApiClient::new(&config(server.url()), tenant).unwrap())
    }

    #[tokio::test]
    async fn sends_tenant_and_content_type_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/postes")
            .match_header("x-tenant-id", "branco")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 1, "codigo": "P-1", "preco": 100}]"#)
            .create_async()
            .await;

        let value: Value = client(&server, Tenant::Branco).get("/postes").await.unwrap();
        assert_eq!(value[0]["codigo"], "P-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_bodies_are_null() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", "/vendas/7")
            .with_status(204)
            .create_async()
            .await;
        server
            .mock("PUT", "/postes/1")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let api = client(&server, Tenant::Vermelho);
        let deleted = api.request(Method::DELETE, "/vendas/7", None).await.unwrap();
        assert_eq!(deleted, Value::Null);
        let updated = api.request(Method::PUT, "/postes/1", Some(&json!({}))).await.unwrap();
        assert_eq!(updated, Value::Null);
    }

    #[tokio::test]
    async fn non_json_bodies_are_returned_as_text() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/estoque")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let value = client(&server, Tenant::Vermelho)
            .request(Method::GET, "/estoque", None)
            .await
            .unwrap();
        assert_eq!(value, Value::String("ok".into()));
    }

    #[tokio::test]
    async fn client_errors_carry_status_and_body_and_are_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/postes/99")
            .with_status(404)
            .with_body(r#"{"message": "Poste não encontrado"}"#)
            .expect(1)
            .create_async()
            .await;

        let err = client(&server, Tenant::Vermelho)
            .get::<Value>("/postes/99")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.server_message().as_deref(), Some("Poste não encontrado"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_errors_are_retried_with_backoff() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/vendas/resumo")
            .with_status(503)
            .with_body("unavailable")
            .expect(3)
            .create_async()
            .await;

        let err = client(&server, Tenant::Vermelho)
            .get::<Value>("/vendas/resumo")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 503, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn posts_are_attempted_once() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/vendas")
            .with_status(502)
            .expect(1)
            .create_async()
            .await;

        let result = client(&server, Tenant::Vermelho)
            .post::<_, Value>("/vendas", &json!({"tipoVenda": "E"}))
            .await;
        assert!(result.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_responses_are_cached_until_a_write() {
        let mut server = Server::new_async().await;
        let listing = server
            .mock("GET", "/despesas")
            .match_query(Matcher::UrlEncoded("dataInicio".into(), "2024-05-01".into()))
            .with_status(200)
            .with_body("[]")
            .expect(2)
            .create_async()
            .await;
        server
            .mock("POST", "/despesas")
            .with_status(201)
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let api = client(&server, Tenant::Branco);
        let endpoint = "/despesas?dataInicio=2024-05-01";
        api.get::<Value>(endpoint).await.unwrap();
        api.get::<Value>(endpoint).await.unwrap();
        api.post::<_, Value>("/despesas", &json!({})).await.unwrap();
        api.get::<Value>(endpoint).await.unwrap();

        listing.assert_async().await;
    }

    #[tokio::test]
    async fn cache_is_scoped_by_tenant() {
        let mut server = Server::new_async().await;
        let vermelho = server
            .mock("GET", "/estoque")
            .match_header("x-tenant-id", "vermelho")
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;
        let branco = server
            .mock("GET", "/estoque")
            .match_header("x-tenant-id", "branco")
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let base = HttpApiClient::new(&config(server.url()), Tenant::Vermelho).unwrap();
        let outro = base.for_tenant(Tenant::Branco);
        base.request(Method::GET, "/estoque", None).await.unwrap();
        outro.request(Method::GET, "/estoque", None).await.unwrap();
        base.request(Method::GET, "/estoque", None).await.unwrap();

        vermelho.assert_async().await;
        branco.assert_async().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn listing_in_flight_during_a_write_is_not_cached() {
        let mut server = Server::new_async().await;
        let listing = server
            .mock("GET", "/postes")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(300));
                w.write_all(br#"["OLD"]"#)
            })
            .expect(1)
            .create_async()
            .await;
        server
            .mock("PUT", "/postes/1")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let api = HttpApiClient::new(&config(server.url()), Tenant::Vermelho).unwrap();
        let lento = {
            let api = api.clone();
            tokio::spawn(async move { api.request(Method::GET, "/postes", None).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        api.request(Method::PUT, "/postes/1", Some(&json!({"ativo": false})))
            .await
            .unwrap();

        let antigo = lento.await.unwrap().unwrap();
        assert_eq!(antigo, json!(["OLD"]));
        let cache = api.cache.as_ref().unwrap();
        assert!(cache.is_empty(), "stale listing cached: {} entries", cache.len());
        listing.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_survives_an_unreadable_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/estoque")
            .with_status(500)
            .with_chunked_body(|w| {
                w.write_all(br#"{"message": "Falha"#)?;
                w.flush()?;
                std::thread::sleep(Duration::from_millis(50));
                Err(std::io::Error::other("connection reset"))
            })
            .create_async()
            .await;

        let mut cfg = config(server.url());
        cfg.retry.max_retries = 0;
        let api = HttpApiClient::new(&cfg, Tenant::Vermelho).unwrap();

        let err = api.request(Method::GET, "/estoque", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_connection_error() {
        let mut cfg = config("http://127.0.0.1:1".into());
        cfg.retry.max_retries = 0;
        let api = HttpApiClient::new(&cfg, Tenant::Vermelho).unwrap();

        let err = api.request(Method::GET, "/postes", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Connection(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_cold_start_times_out() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/postes")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(500));
                w.write_all(b"[]")
            })
            .create_async()
            .await;

        let mut cfg = config(server.url());
        cfg.retry.max_retries = 0;
        cfg.cold_start_timeout = Duration::from_millis(100);
        let api = HttpApiClient::new(&cfg, Tenant::Vermelho).unwrap();

        let err = api.request(Method::GET, "/postes", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout { partida_fria: true, .. }), "got {err:?}");
    }
}
