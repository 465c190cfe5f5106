//! Routes for document counters: listing, advisory previews and seeding.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::document_counter::{CounterKey, DocType, DocumentCounter};
use serde::{Deserialize, Serialize};
use services::services::numbering::{NextNumberPreview, NumberingService};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SeedCounter {
    pub current_number: i64,
}

pub async fn get_counters(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<DocumentCounter>>>, ApiError> {
    let counters = NumberingService::counters(&state.db().pool, company_id).await?;
    Ok(ResponseJson(ApiResponse::success(counters)))
}

/// GET /api/companies/{company_id}/counters/{doc_type}/{year}/next
/// Display only: the number is not reserved.
pub async fn preview_next_number(
    State(state): State<AppState>,
    Path((company_id, doc_type, year)): Path<(Uuid, DocType, i32)>,
) -> Result<ResponseJson<ApiResponse<NextNumberPreview>>, ApiError> {
    let key = CounterKey::new(company_id, doc_type, year);
    let preview = NumberingService::preview(&state.db().pool, &key).await?;
    Ok(ResponseJson(ApiResponse::success(preview)))
}

/// PUT /api/companies/{company_id}/counters/{doc_type}/{year}
/// Only accepted before the first number under the key.
pub async fn seed_counter(
    State(state): State<AppState>,
    Path((company_id, doc_type, year)): Path<(Uuid, DocType, i32)>,
    axum::Json(payload): axum::Json<SeedCounter>,
) -> Result<ResponseJson<ApiResponse<DocumentCounter>>, ApiError> {
    let key = CounterKey::new(company_id, doc_type, year);
    let counter = NumberingService::seed(&state.db().pool, &key, payload.current_number).await?;
    Ok(ResponseJson(ApiResponse::success(counter)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().nest(
        "/companies/{company_id}/counters",
        Router::new()
            .route("/", get(get_counters))
            .route("/{doc_type}/{year}", put(seed_counter))
            .route("/{doc_type}/{year}/next", get(preview_next_number)),
    )
}
