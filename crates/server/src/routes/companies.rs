use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    company::{Company, CreateCompany},
    document::Document,
    document_counter::DocType,
};
use serde::Deserialize;
use services::services::documents::DocumentService;
use tracing::info;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct DocumentListQuery {
    pub doc_type: Option<DocType>,
}

pub async fn create_company(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateCompany>,
) -> Result<ResponseJson<ApiResponse<Company>>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("company name is required".to_string()));
    }
    let company = Company::create(&state.db().pool, &payload, Uuid::new_v4()).await?;
    info!(company_id = %company.id, "Company created");
    Ok(ResponseJson(ApiResponse::success(company)))
}

pub async fn get_companies(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Company>>>, ApiError> {
    let companies = Company::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(companies)))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Company>>, ApiError> {
    let company = Company::find_by_id(&state.db().pool, company_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("company {company_id} not found")))?;
    Ok(ResponseJson(ApiResponse::success(company)))
}

/// GET /api/companies/{company_id}/documents?doc_type=invoice
pub async fn get_company_documents(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<DocumentListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Document>>>, ApiError> {
    let documents =
        DocumentService::list_for_company(&state.db().pool, company_id, query.doc_type).await?;
    Ok(ResponseJson(ApiResponse::success(documents)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/companies", get(get_companies).post(create_company))
        .route("/companies/{company_id}", get(get_company))
        .route("/companies/{company_id}/documents", get(get_company_documents))
}
