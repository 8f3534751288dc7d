use serde_json::json;
use thiserror::Error;

use lms_db::DbError;
use lms_domain::DomainError;
use lms_http::AppError;

use crate::validation::ValidationErrors;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a command or query handler.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("ID in route ({route}) does not match ID in body ({body})")]
    IdMismatch { route: u64, body: u64 },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Validation(errors) => {
                AppError::validation(errors.to_details(), "request failed validation")
            }
            ServiceError::NotFound { .. } => AppError::not_found(message),
            ServiceError::IdMismatch { .. } => AppError::bad_request(message),
            ServiceError::Domain(err) => match err {
                DomainError::NotFound(_) => AppError::not_found(message),
                DomainError::DuplicateKey { isbn } => {
                    AppError::conflict(vec![json!({ "field": "isbn", "value": isbn })], message)
                }
                DomainError::InvalidArgument(_) => AppError::bad_request(message),
                DomainError::InvalidState(_) => {
                    AppError::bad_request_with_code("invalid_state", message)
                }
            },
            // A concurrent delete can make a loaded row vanish before commit.
            ServiceError::Db(DbError::Missing { .. }) => AppError::not_found(message),
            ServiceError::Db(DbError::Conflict { entity, id }) => AppError::conflict(
                vec![json!({ "entity": entity, "id": id })],
                message,
            ),
            ServiceError::Db(err @ DbError::AlreadyExists { .. }) => AppError::Internal(err.into()),
        }
    }
}
