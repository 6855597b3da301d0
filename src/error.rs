use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// Machine-readable failure tag carried next to the human message, so
/// callers can branch on kind instead of string-matching `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    DuplicateEmail,
    NotFound,
    InvalidCredentials,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::DuplicateEmail => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            // Deliberately 400, not 401: login rejections never reveal
            // whether the account exists.
            ErrorKind::InvalidCredentials => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            detail: None,
        }
    }

    pub fn duplicate_email() -> Self {
        Self {
            kind: ErrorKind::DuplicateEmail,
            message: "This email already exists".into(),
            detail: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: "User not found".into(),
            detail: None,
        }
    }

    /// Same envelope for unknown email and wrong password.
    pub fn invalid_credentials() -> Self {
        Self {
            kind: ErrorKind::InvalidCredentials,
            message: "unable to login".into(),
            detail: Some("Incorrect email or password".into()),
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: "Server error".into(),
            detail: Some(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "status": false,
            "kind": self.kind,
            "message": self.message,
        });
        if let Some(detail) = self.detail {
            body["data"] = json!({ "error": detail });
        }
        (self.kind.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn kinds_map_to_normalized_statuses() {
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorKind::InvalidCredentials.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorKind::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn duplicate_email_envelope() {
        let (status, body) = body_json(ApiError::duplicate_email()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], serde_json::json!(false));
        assert_eq!(body["kind"], "duplicate_email");
        assert_eq!(body["message"], "This email already exists");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn invalid_credentials_envelope_carries_detail() {
        let (status, body) = body_json(ApiError::invalid_credentials()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_credentials");
        assert_eq!(body["message"], "unable to login");
        assert_eq!(body["data"]["error"], "Incorrect email or password");
    }

    #[tokio::test]
    async fn internal_envelope_echoes_error_string() {
        let (status, body) = body_json(ApiError::internal("boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "internal");
        assert_eq!(body["message"], "Server error");
        assert_eq!(body["data"]["error"], "boom");
    }
}
