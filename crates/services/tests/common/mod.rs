#![allow(dead_code)]

use std::time::Duration;

use chrono::NaiveDate;
use db::{
    DBOptions, DBService,
    models::{
        company::{Company, CreateCompany},
        document::{CreateDocument, Document},
        document_counter::DocType,
    },
};
use services::services::documents::DocumentService;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

/// File-backed database so every pooled connection sees the same data.
pub async fn test_db() -> (TempDir, DBService) {
    test_db_with_busy_timeout(Duration::from_secs(10)).await
}

pub async fn test_db_with_busy_timeout(busy_timeout: Duration) -> (TempDir, DBService) {
    let dir = TempDir::new().unwrap();
    let options = DBOptions {
        max_connections: 8,
        busy_timeout,
        acquire_timeout: Duration::from_secs(10),
    };
    let db = DBService::open(dir.path().join("numbering.db"), &options)
        .await
        .unwrap();
    (dir, db)
}

pub async fn create_company(pool: &SqlitePool, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    Company::create(
        pool,
        &CreateCompany {
            name: name.to_string(),
            tax_id: None,
        },
        id,
    )
    .await
    .unwrap();
    id
}

pub async fn create_draft(pool: &SqlitePool, company_id: Uuid, doc_type: DocType) -> Document {
    DocumentService::create_draft(
        pool,
        &CreateDocument {
            company_id,
            doc_type,
            counterparty: Some("Globex".to_string()),
            description: None,
            corrects_document_id: None,
        },
    )
    .await
    .unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
