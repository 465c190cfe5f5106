use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::document::DocumentStatus;

/// Kind of numbered document. All kinds share one numbering algorithm, keyed by this tag.
#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    TS,
    EnumString,
    EnumIter,
    Display,
)]
#[sqlx(type_name = "doc_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocType {
    Invoice,
    Quote,
    CreditNote,
    PurchaseInvoice,
}

impl DocType {
    pub const fn prefix(self) -> &'static str {
        match self {
            DocType::Invoice => "FAC",
            DocType::Quote => "PRE",
            DocType::CreditNote => "REC",
            DocType::PurchaseInvoice => "FP",
        }
    }

    /// Status a draft of this kind moves to when it receives its number
    pub const fn issued_status(self) -> DocumentStatus {
        match self {
            DocType::Quote => DocumentStatus::Sent,
            DocType::Invoice | DocType::CreditNote | DocType::PurchaseInvoice => {
                DocumentStatus::Issued
            }
        }
    }

    /// Human-facing reference, e.g. `FAC-2026-0007`
    pub fn format_reference(self, year: i32, number: i64) -> String {
        format!("{}-{}-{:04}", self.prefix(), year, number)
    }
}

/// Identity of one numbering sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
pub struct CounterKey {
    pub company_id: Uuid,
    pub doc_type: DocType,
    pub year: i32,
}

impl CounterKey {
    pub fn new(company_id: Uuid, doc_type: DocType, year: i32) -> Self {
        Self {
            company_id,
            doc_type,
            year,
        }
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.company_id, self.doc_type, self.year)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct DocumentCounter {
    pub company_id: Uuid,
    pub year: i32,
    pub doc_type: DocType,
    pub current_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentCounter {
    pub fn key(&self) -> CounterKey {
        CounterKey::new(self.company_id, self.doc_type, self.year)
    }

    /// Increment the counter for `key` and return the new value, creating the row at 1 on first use.
    ///
    /// This is a single upsert statement, so the read and the write cannot be separated by
    /// another writer. Run it on the same transaction as the document update that consumes the
    /// number: rolling that transaction back also rolls back the increment.
    pub async fn allocate<'e, E>(executor: E, key: &CounterKey) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO document_counters (company_id, year, doc_type, current_number)
               VALUES ($1, $2, $3, 1)
               ON CONFLICT(company_id, year, doc_type) DO UPDATE SET
                   current_number = document_counters.current_number + 1,
                   updated_at = datetime('now', 'subsec')
               RETURNING current_number"#,
        )
        .bind(key.company_id)
        .bind(key.year)
        .bind(key.doc_type)
        .fetch_one(executor)
        .await
    }

    /// Last number handed out for `key`, 0 if none has been.
    pub async fn current<'e, E>(executor: E, key: &CounterKey) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let current = sqlx::query_scalar::<_, i64>(
            r#"SELECT current_number
               FROM document_counters
               WHERE company_id = $1 AND year = $2 AND doc_type = $3"#,
        )
        .bind(key.company_id)
        .bind(key.year)
        .bind(key.doc_type)
        .fetch_optional(executor)
        .await?;
        Ok(current.unwrap_or(0))
    }

    pub async fn find(pool: &SqlitePool, key: &CounterKey) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, DocumentCounter>(
            r#"SELECT company_id, year, doc_type, current_number, created_at, updated_at
               FROM document_counters
               WHERE company_id = $1 AND year = $2 AND doc_type = $3"#,
        )
        .bind(key.company_id)
        .bind(key.year)
        .bind(key.doc_type)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_company(
        pool: &SqlitePool,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, DocumentCounter>(
            r#"SELECT company_id, year, doc_type, current_number, created_at, updated_at
               FROM document_counters
               WHERE company_id = $1
               ORDER BY year DESC, doc_type ASC"#,
        )
        .bind(company_id)
        .fetch_all(pool)
        .await
    }

    /// Set the counter so the next allocation returns `current_number + 1`.
    ///
    /// Only for keys nothing has been allocated under yet: the row is absent or at 0 and no
    /// document carries a number for the key. Returns `None` without writing anything otherwise.
    pub async fn seed<'e, E>(
        executor: E,
        key: &CounterKey,
        current_number: i64,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, DocumentCounter>(
            r#"INSERT INTO document_counters (company_id, year, doc_type, current_number)
               SELECT $1, $2, $3, $4
               WHERE NOT EXISTS (
                   SELECT 1 FROM documents
                   WHERE company_id = $1 AND year = $2 AND doc_type = $3 AND number IS NOT NULL
               )
               ON CONFLICT(company_id, year, doc_type) DO UPDATE SET
                   current_number = excluded.current_number,
                   updated_at = datetime('now', 'subsec')
               WHERE document_counters.current_number = 0
               RETURNING company_id, year, doc_type, current_number, created_at, updated_at"#,
        )
        .bind(key.company_id)
        .bind(key.year)
        .bind(key.doc_type)
        .bind(current_number)
        .fetch_optional(executor)
        .await
    }
}
