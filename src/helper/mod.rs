use crate::DbPool;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use serde_json::json;
use thiserror::Error;

pub mod admin_helpers;
pub mod contact_helpers;
pub mod form_helpers;
pub mod media_helpers;
pub mod media_storage;
pub mod membership_helpers;
pub mod sanitization_helpers;

/// Failures surfaced by the back-office workflows.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("A member with email '{0}' already exists")]
    DuplicateEmail(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to write media file: {0}")]
    StorageWriteFailed(#[source] std::io::Error),
    #[error("Failed to read media storage: {0}")]
    StorageReadFailed(#[source] std::io::Error),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("R2D2 Pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

impl WorkflowError {
    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        WorkflowError::NotFound { entity, id }
    }
}

impl ResponseError for WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
            WorkflowError::DuplicateEmail(_) => StatusCode::CONFLICT,
            WorkflowError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => {
                log::error!("Request failed: {}", self);
                "An internal error occurred.".to_string()
            }
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

pub(crate) fn get_conn(pool: &DbPool) -> Result<PooledConnection<SqliteConnectionManager>, WorkflowError> {
    pool.get().map_err(WorkflowError::Pool)
}
