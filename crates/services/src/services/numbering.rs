//! Per-company, per-year, per-document-type sequential numbering.
//!
//! Numbers come from one counter row per [`CounterKey`]. Allocation is a single upsert run on the
//! caller's transaction, so SQLite's writer lock serializes concurrent callers and a rollback
//! takes the increment with it: no gaps, no duplicates.

use db::models::{
    company::Company,
    document_counter::{CounterKey, DocumentCounter},
};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{debug, info, warn};
use ts_rs::TS;
use uuid::Uuid;

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

// Primary SQLite result codes that mean another connection holds the lock
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

#[derive(Debug, Error)]
pub enum NumberingError {
    #[error("company {0} not found")]
    CompanyNotFound(Uuid),
    #[error("year {0} is out of range")]
    InvalidYear(i32),
    #[error("counter {key} is already in use (at {current}), it can only be seeded before its first number")]
    CounterInUse { key: CounterKey, current: i64 },
    #[error("cannot seed a counter at {0}")]
    InvalidSeed(i64),
    #[error("storage busy, no number was issued: {0}")]
    StorageConflict(#[source] sqlx::Error),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for NumberingError {
    fn from(err: sqlx::Error) -> Self {
        if is_transient(&err) {
            NumberingError::StorageConflict(err)
        } else {
            NumberingError::Database(err)
        }
    }
}

/// True when the error comes from lock contention or pool exhaustion and the whole operation can
/// be retried.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
            .unwrap_or(false),
        _ => false,
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// Advisory preview of the next number for a key.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct NextNumberPreview {
    pub key: CounterKey,
    pub next_number: i64,
    pub reference: String,
}

pub struct NumberingService;

impl NumberingService {
    /// Allocate the next number for `key` in its own transaction.
    ///
    /// Prefer [`NumberingService::allocate_in`] when the number is going onto a document: the
    /// counter and the document must commit together.
    pub async fn allocate(pool: &SqlitePool, key: &CounterKey) -> Result<i64, NumberingError> {
        let mut tx = pool.begin().await?;
        let number = Self::allocate_in(&mut tx, key).await?;
        tx.commit().await?;
        Ok(number)
    }

    /// Allocate the next number for `key` on an open transaction.
    pub async fn allocate_in(
        conn: &mut SqliteConnection,
        key: &CounterKey,
    ) -> Result<i64, NumberingError> {
        validate_year(key.year)?;

        let number = DocumentCounter::allocate(&mut *conn, key)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    NumberingError::CompanyNotFound(key.company_id)
                } else {
                    e.into()
                }
            })?;

        debug!(
            company_id = %key.company_id,
            doc_type = %key.doc_type,
            year = key.year,
            number,
            "Allocated document number"
        );
        Ok(number)
    }

    /// Number the next allocation for `key` would return.
    ///
    /// Read without any lock: a concurrent allocation can take this number first. Only for
    /// display, never as a reservation.
    pub async fn peek_next(pool: &SqlitePool, key: &CounterKey) -> Result<i64, NumberingError> {
        validate_year(key.year)?;
        ensure_company(pool, key.company_id).await?;
        Ok(DocumentCounter::current(pool, key).await? + 1)
    }

    pub async fn preview(
        pool: &SqlitePool,
        key: &CounterKey,
    ) -> Result<NextNumberPreview, NumberingError> {
        let next_number = Self::peek_next(pool, key).await?;
        Ok(NextNumberPreview {
            key: *key,
            next_number,
            reference: key.doc_type.format_reference(key.year, next_number),
        })
    }

    /// Continue numbering for `key` after `current_number`, e.g. when moving over from another
    /// system mid-year. Only allowed before the key's first number: once anything has been
    /// allocated, moving the counter would leave a gap.
    pub async fn seed(
        pool: &SqlitePool,
        key: &CounterKey,
        current_number: i64,
    ) -> Result<DocumentCounter, NumberingError> {
        validate_year(key.year)?;
        if current_number < 0 {
            return Err(NumberingError::InvalidSeed(current_number));
        }
        ensure_company(pool, key.company_id).await?;

        match DocumentCounter::seed(pool, key, current_number).await? {
            Some(counter) => {
                info!(
                    company_id = %key.company_id,
                    doc_type = %key.doc_type,
                    year = key.year,
                    current_number,
                    "Document counter seeded"
                );
                Ok(counter)
            }
            None => {
                let current = DocumentCounter::current(pool, key).await?;
                warn!(
                    company_id = %key.company_id,
                    doc_type = %key.doc_type,
                    year = key.year,
                    current,
                    requested = current_number,
                    "Refused to seed a document counter already in use"
                );
                Err(NumberingError::CounterInUse { key: *key, current })
            }
        }
    }

    pub async fn counters(
        pool: &SqlitePool,
        company_id: Uuid,
    ) -> Result<Vec<DocumentCounter>, NumberingError> {
        ensure_company(pool, company_id).await?;
        Ok(DocumentCounter::find_by_company(pool, company_id).await?)
    }
}

fn validate_year(year: i32) -> Result<(), NumberingError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(NumberingError::InvalidYear(year))
    }
}

async fn ensure_company(pool: &SqlitePool, company_id: Uuid) -> Result<(), NumberingError> {
    Company::find_by_id(pool, company_id)
        .await?
        .map(|_| ())
        .ok_or(NumberingError::CompanyNotFound(company_id))
}
