use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use db::models::{
    document::{CreateDocument, Document},
    document_event::DocumentEvent,
};
use serde::{Deserialize, Serialize};
use services::services::documents::DocumentService;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct IssueDocument {
    /// Defaults to today (UTC)
    pub issue_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct VoidDocument {
    pub reason: Option<String>,
}

pub async fn create_document(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateDocument>,
) -> Result<ResponseJson<ApiResponse<Document>>, ApiError> {
    let document = DocumentService::create_draft(&state.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(document)))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Document>>, ApiError> {
    let document = DocumentService::find(&state.db().pool, document_id).await?;
    Ok(ResponseJson(ApiResponse::success(document)))
}

/// POST /api/documents/{document_id}/issue
/// Assigns the next number for the document's company, type and issue year. The body may be
/// omitted entirely.
pub async fn issue_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    payload: Option<axum::Json<IssueDocument>>,
) -> Result<ResponseJson<ApiResponse<Document>>, ApiError> {
    let issue_date = payload
        .and_then(|axum::Json(body)| body.issue_date)
        .unwrap_or_else(|| Utc::now().date_naive());
    let document = DocumentService::issue(&state.db().pool, document_id, issue_date).await?;
    Ok(ResponseJson(ApiResponse::success(document)))
}

pub async fn void_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    payload: Option<axum::Json<VoidDocument>>,
) -> Result<ResponseJson<ApiResponse<Document>>, ApiError> {
    let reason = payload.and_then(|axum::Json(body)| body.reason);
    let document = DocumentService::void(&state.db().pool, document_id, reason).await?;
    Ok(ResponseJson(ApiResponse::success(document)))
}

pub async fn get_document_events(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<DocumentEvent>>>, ApiError> {
    let events = DocumentService::events(&state.db().pool, document_id).await?;
    Ok(ResponseJson(ApiResponse::success(events)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/documents", post(create_document))
        .nest(
            "/documents/{document_id}",
            Router::new()
                .route("/", get(get_document))
                .route("/issue", post(issue_document))
                .route("/void", post(void_document))
                .route("/events", get(get_document_events)),
        )
}
