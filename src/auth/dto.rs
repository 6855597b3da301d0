use serde::{Deserialize, Serialize};

use crate::users::repo::User;

/// Request body for signup. Role is never read from here; it is fixed by
/// the endpoint. Unknown fields land in `extra` and are stored as free-form
/// profile attributes after reserved keys are stripped.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Request body for login. Fields are optional so a missing credential is
/// reported by the handler, not as a framework deserialization error.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub status: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: bool,
    pub message: &'static str,
    pub token: String,
    pub user: User, // password_hash is skipped during serialization
}
