use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCompany {
    pub name: String,
    pub tax_id: Option<String>,
}

impl Company {
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Company>(
            r#"SELECT id, name, tax_id, created_at, updated_at
               FROM companies
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Company>(
            r#"SELECT id, name, tax_id, created_at, updated_at
               FROM companies
               ORDER BY name ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateCompany,
        company_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Company>(
            r#"INSERT INTO companies (id, name, tax_id)
               VALUES ($1, $2, $3)
               RETURNING id, name, tax_id, created_at, updated_at"#,
        )
        .bind(company_id)
        .bind(&data.name)
        .bind(&data.tax_id)
        .fetch_one(pool)
        .await
    }
}
