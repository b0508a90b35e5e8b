use core_types::Tenant;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// The body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub tenant_id: Tenant,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// A successful login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub tenant_id: Tenant,
    #[serde(default)]
    pub display_name: String,
}
