use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Lifecycle step recorded in the audit trail
#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display)]
#[sqlx(type_name = "document_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DocumentAction {
    Created,
    Issued,
    Voided,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct DocumentEvent {
    pub id: Uuid,
    pub document_id: Uuid,
    pub company_id: Uuid,
    pub action: DocumentAction,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DocumentEvent {
    pub async fn create<'e, E>(
        executor: E,
        document_id: Uuid,
        company_id: Uuid,
        action: DocumentAction,
        details: Option<String>,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, DocumentEvent>(
            r#"INSERT INTO document_events (id, document_id, company_id, action, details)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, document_id, company_id, action, details, created_at"#,
        )
        .bind(id)
        .bind(document_id)
        .bind(company_id)
        .bind(action)
        .bind(details)
        .fetch_one(executor)
        .await
    }

    /// Newest first
    pub async fn find_by_document_id(
        pool: &SqlitePool,
        document_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, DocumentEvent>(
            r#"SELECT id, document_id, company_id, action, details, created_at
               FROM document_events
               WHERE document_id = $1
               ORDER BY created_at DESC, rowid DESC"#,
        )
        .bind(document_id)
        .fetch_all(pool)
        .await
    }
}
