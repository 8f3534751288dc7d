//! Error envelope shared by every HTTP handler.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Body of every error response: `{"error": {...}}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Vec<Value>,
    pub trace_id: String,
    pub timestamp: String,
}

/// Application errors with their HTTP mapping.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<Value>,
        code: String,
        message: String,
    },

    #[error("conflict: {message}")]
    Conflict {
        details: Vec<Value>,
        code: String,
        message: String,
    },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(details: Vec<Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            code: "validation_error".to_string(),
            message: message.into(),
        }
    }

    pub fn conflict(details: Vec<Value>, message: impl Into<String>) -> Self {
        Self::Conflict {
            details,
            code: "conflict".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    /// Bad request with a caller-chosen machine code, e.g. `invalid_state`.
    pub fn bad_request_with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: code.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = serde_json::json!({ "field": "body", "error": rejection.body_text() });
        if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
            AppError::validation(vec![detail], "request body does not match the expected shape")
        } else {
            AppError::bad_request_with_code("invalid_body", rejection.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let trace_id = Uuid::new_v4();

        let (code, message, details) = match self {
            AppError::Validation {
                details,
                code,
                message,
            }
            | AppError::Conflict {
                details,
                code,
                message,
            } => (code, message, details),
            AppError::NotFound { message, code } | AppError::BadRequest { message, code } => {
                (code, message, Vec::new())
            }
            AppError::Internal(err) => {
                tracing::error!(error = ?err, %trace_id, "internal error");
                ("internal_error".to_string(), err.to_string(), Vec::new())
            }
        };

        if status.is_client_error() {
            tracing::warn!(
                %trace_id,
                error_code = %code,
                status_code = status.as_u16(),
                %message,
                "request rejected"
            );
        }

        // Release builds do not leak internal error text.
        let message = if cfg!(not(debug_assertions)) && status.is_server_error() {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code,
                message,
                details,
                trace_id: trace_id.to_string(),
                timestamp: OffsetDateTime::now_utc().to_string(),
            },
        };

        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_maps_to_422_with_details() {
        let details = vec![json!({"field": "name", "error": "must not be empty"})];
        let response = AppError::validation(details.clone(), "invalid request").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["message"], "invalid request");
        assert_eq!(body["error"]["details"], json!(details));
        assert!(Uuid::parse_str(body["error"]["trace_id"].as_str().unwrap()).is_ok());
        assert!(body["error"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn not_found_has_empty_details() {
        let response = AppError::not_found("library with ID 7 not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["details"], json!([]));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            AppError::conflict(vec![], "duplicate").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::bad_request_with_code("invalid_state", "already out").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("store unavailable")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn custom_bad_request_code_is_kept() {
        let response =
            AppError::bad_request_with_code("invalid_state", "book is already checked out")
                .into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "invalid_state");
    }
}
