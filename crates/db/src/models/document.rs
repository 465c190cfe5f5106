use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::document_counter::{CounterKey, DocType};

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "document_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Issued,
    Sent,
    Void,
}

/// Invoice, quote, credit note or purchase invoice.
///
/// `number`, `year` and `issue_date` are `None` exactly while the document is a draft.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Document {
    pub id: Uuid,
    pub company_id: Uuid,
    pub doc_type: DocType,
    pub status: DocumentStatus,
    pub year: Option<i32>,
    pub number: Option<i64>,
    pub issue_date: Option<NaiveDate>,
    pub counterparty: Option<String>,
    pub description: Option<String>,
    pub corrects_document_id: Option<Uuid>, // Invoice a credit note rectifies
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDocument {
    pub company_id: Uuid,
    pub doc_type: DocType,
    pub counterparty: Option<String>,
    pub description: Option<String>,
    pub corrects_document_id: Option<Uuid>,
}

const DOCUMENT_COLUMNS: &str = "id, company_id, doc_type, status, year, number, issue_date, \
     counterparty, description, corrects_document_id, created_at, updated_at";

impl Document {
    pub fn is_draft(&self) -> bool {
        self.status == DocumentStatus::Draft
    }

    pub fn counter_key(&self, year: i32) -> CounterKey {
        CounterKey::new(self.company_id, self.doc_type, year)
    }

    /// Formatted number such as `FAC-2026-0001`, once one has been assigned
    pub fn reference(&self) -> Option<String> {
        match (self.year, self.number) {
            (Some(year), Some(number)) => Some(self.doc_type.format_reference(year, number)),
            _ => None,
        }
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_by_company(
        pool: &SqlitePool,
        company_id: Uuid,
        doc_type: Option<DocType>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            r#"SELECT {DOCUMENT_COLUMNS}
               FROM documents
               WHERE company_id = $1 AND ($2 IS NULL OR doc_type = $2)
               ORDER BY created_at DESC"#
        ))
        .bind(company_id)
        .bind(doc_type)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_number(
        pool: &SqlitePool,
        key: &CounterKey,
        number: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            r#"SELECT {DOCUMENT_COLUMNS}
               FROM documents
               WHERE company_id = $1 AND doc_type = $2 AND year = $3 AND number = $4"#
        ))
        .bind(key.company_id)
        .bind(key.doc_type)
        .bind(key.year)
        .bind(number)
        .fetch_optional(pool)
        .await
    }

    /// Insert a new draft.
    pub async fn create<'e, E>(
        executor: E,
        data: &CreateDocument,
        document_id: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Document>(&format!(
            r#"INSERT INTO documents (id, company_id, doc_type, counterparty, description, corrects_document_id)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {DOCUMENT_COLUMNS}"#
        ))
        .bind(document_id)
        .bind(data.company_id)
        .bind(data.doc_type)
        .bind(&data.counterparty)
        .bind(&data.description)
        .bind(data.corrects_document_id)
        .fetch_one(executor)
        .await
    }

    /// Move a draft to `status` with its number.
    ///
    /// Guarded on the document still being an unnumbered draft; returns `None` when it is not,
    /// in which case the caller must roll back whatever number it allocated.
    pub async fn assign_number<'e, E>(
        executor: E,
        id: Uuid,
        status: DocumentStatus,
        year: i32,
        number: i64,
        issue_date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Document>(&format!(
            r#"UPDATE documents
               SET status = $2, year = $3, number = $4, issue_date = $5,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND status = 'draft' AND number IS NULL
               RETURNING {DOCUMENT_COLUMNS}"#
        ))
        .bind(id)
        .bind(status)
        .bind(year)
        .bind(number)
        .bind(issue_date)
        .fetch_optional(executor)
        .await
    }

    /// Void an issued or sent document, keeping its number. `None` if it was in any other state.
    pub async fn mark_void<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Document>(&format!(
            r#"UPDATE documents
               SET status = 'void', updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND status IN ('issued', 'sent')
               RETURNING {DOCUMENT_COLUMNS}"#
        ))
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}
