use crate::error::ApiError;
use crate::responses::{LoginRequest, LoginResponse};
use crate::ApiClient;
use core_types::Tenant;
use std::sync::Arc;
use validator::Validate;

/// Tenant-scoped login against the backend.
pub struct AuthService {
    client: Arc<dyn ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    /// Checks the tenant's password and returns the identity to store in the session.
    ///
    /// A backend that answers for a different tenant than requested is treated as a
    /// failed login.
    pub async fn login(&self, tenant: Tenant, password: &str) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            tenant_id: tenant,
            password: password.to_string(),
        };
        request.validate()?;

        let mut response: LoginResponse = self.client.post("/auth/login", &request).await?;
        if response.tenant_id != tenant {
            return Err(ApiError::Http {
                status: 403,
                body: format!("login answered for tenant '{}'", response.tenant_id),
            });
        }
        if response.display_name.trim().is_empty() {
            response.display_name = tenant.nome_exibicao().to_string();
        }

        tracing::info!(%tenant, "Login accepted.");
        Ok(response)
    }
}
