use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{documents::DocumentError, numbering::NumberingError};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Numbering(#[from] NumberingError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Numbering(err) => numbering_status(err),
            ApiError::Document(err) => match err {
                DocumentError::NotFound(_) | DocumentError::CompanyNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                DocumentError::InvalidState { .. } | DocumentError::NumberCollision { .. } => {
                    StatusCode::CONFLICT
                }
                DocumentError::Validation(_) => StatusCode::BAD_REQUEST,
                DocumentError::Numbering(inner) => numbering_status(inner),
                DocumentError::StorageConflict(_) => StatusCode::SERVICE_UNAVAILABLE,
                DocumentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

fn numbering_status(err: &NumberingError) -> StatusCode {
    match err {
        NumberingError::CompanyNotFound(_) => StatusCode::NOT_FOUND,
        NumberingError::InvalidYear(_) | NumberingError::InvalidSeed(_) => StatusCode::BAD_REQUEST,
        NumberingError::CounterInUse { .. } => StatusCode::CONFLICT,
        NumberingError::StorageConflict(_) => StatusCode::SERVICE_UNAVAILABLE,
        NumberingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
            "internal error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ApiResponse::<()>::error(&message))).into_response()
    }
}
