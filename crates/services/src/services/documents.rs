//! Document lifecycle: drafts, issuance (the one transition that takes a number) and voiding.

use chrono::{Datelike, NaiveDate};
use db::models::{
    company::Company,
    document::{CreateDocument, Document, DocumentStatus},
    document_counter::DocType,
    document_event::{DocumentAction, DocumentEvent},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::numbering::{NumberingError, NumberingService, is_transient};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document {0} not found")]
    NotFound(Uuid),
    #[error("company {0} not found")]
    CompanyNotFound(Uuid),
    #[error("cannot {action} document {id}: it is {status}")]
    InvalidState {
        id: Uuid,
        status: DocumentStatus,
        action: &'static str,
    },
    #[error("{reference} is already used by another document")]
    NumberCollision { reference: String },
    #[error("invalid document: {0}")]
    Validation(String),
    #[error(transparent)]
    Numbering(#[from] NumberingError),
    #[error("storage busy, document left unchanged: {0}")]
    StorageConflict(#[source] sqlx::Error),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for DocumentError {
    fn from(err: sqlx::Error) -> Self {
        if is_transient(&err) {
            DocumentError::StorageConflict(err)
        } else {
            DocumentError::Database(err)
        }
    }
}

pub struct DocumentService;

impl DocumentService {
    pub async fn create_draft(
        pool: &SqlitePool,
        data: &CreateDocument,
    ) -> Result<Document, DocumentError> {
        if Company::find_by_id(pool, data.company_id).await?.is_none() {
            return Err(DocumentError::CompanyNotFound(data.company_id));
        }
        Self::validate_correction(pool, data).await?;

        let mut tx = pool.begin().await?;
        let document = Document::create(&mut *tx, data, Uuid::new_v4()).await?;
        DocumentEvent::create(
            &mut *tx,
            document.id,
            document.company_id,
            DocumentAction::Created,
            None,
        )
        .await?;
        tx.commit().await?;

        info!(
            document_id = %document.id,
            company_id = %document.company_id,
            doc_type = %document.doc_type,
            "Draft document created"
        );
        Ok(document)
    }

    /// Credit notes rectify a numbered invoice of the same company; nothing else carries a
    /// correction reference.
    async fn validate_correction(
        pool: &SqlitePool,
        data: &CreateDocument,
    ) -> Result<(), DocumentError> {
        match (data.doc_type, data.corrects_document_id) {
            (DocType::CreditNote, None) => Err(DocumentError::Validation(
                "a credit note must reference the invoice it corrects".to_string(),
            )),
            (DocType::CreditNote, Some(target_id)) => {
                let target = Document::find_by_id(pool, target_id).await?.ok_or_else(|| {
                    DocumentError::Validation(format!("corrected document {target_id} not found"))
                })?;
                if target.company_id != data.company_id || target.doc_type != DocType::Invoice {
                    return Err(DocumentError::Validation(format!(
                        "document {target_id} is not an invoice of this company"
                    )));
                }
                if target.number.is_none() {
                    return Err(DocumentError::Validation(format!(
                        "invoice {target_id} has not been issued"
                    )));
                }
                Ok(())
            }
            (_, Some(_)) => Err(DocumentError::Validation(format!(
                "only credit notes can reference a corrected document, got {}",
                data.doc_type
            ))),
            (_, None) => Ok(()),
        }
    }

    /// Give a draft its sequential number and move it to its issued state.
    ///
    /// The counter increment, the document update and the audit event commit together; any
    /// failure leaves the document a draft and the counter where it was.
    pub async fn issue(
        pool: &SqlitePool,
        id: Uuid,
        issue_date: NaiveDate,
    ) -> Result<Document, DocumentError> {
        let draft = Document::find_by_id(pool, id)
            .await?
            .ok_or(DocumentError::NotFound(id))?;
        if !draft.is_draft() || draft.number.is_some() {
            warn!(document_id = %id, status = %draft.status, "Refused to issue non-draft document");
            return Err(DocumentError::InvalidState {
                id,
                status: draft.status,
                action: "issue",
            });
        }

        let year = issue_date.year();
        let key = draft.counter_key(year);
        let status = draft.doc_type.issued_status();

        // The allocation is the transaction's first statement, so it takes the write lock before
        // anything is read and never needs a lock upgrade.
        let mut tx = pool.begin().await?;
        let number = NumberingService::allocate_in(&mut tx, &key).await?;

        let issued =
            match Document::assign_number(&mut *tx, id, status, year, number, issue_date).await {
                Ok(Some(document)) => document,
                Ok(None) => {
                    // Someone else issued it between our check and the lock.
                    tx.rollback().await?;
                    let current = Document::find_by_id(pool, id)
                        .await?
                        .ok_or(DocumentError::NotFound(id))?;
                    return Err(DocumentError::InvalidState {
                        id,
                        status: current.status,
                        action: "issue",
                    });
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    tx.rollback().await?;
                    let reference = key.doc_type.format_reference(year, number);
                    warn!(document_id = %id, reference = %reference, "Document number already taken");
                    return Err(DocumentError::NumberCollision { reference });
                }
                Err(err) => return Err(err.into()),
            };

        let reference = issued.reference();
        DocumentEvent::create(
            &mut *tx,
            issued.id,
            issued.company_id,
            DocumentAction::Issued,
            reference.clone(),
        )
        .await?;
        tx.commit().await?;

        info!(
            document_id = %issued.id,
            company_id = %issued.company_id,
            doc_type = %issued.doc_type,
            year,
            number,
            reference = reference.as_deref().unwrap_or_default(),
            "Document issued"
        );
        Ok(issued)
    }

    /// Void an issued or sent document. The number stays assigned and is never reused.
    pub async fn void(
        pool: &SqlitePool,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Document, DocumentError> {
        let mut tx = pool.begin().await?;
        let Some(voided) = Document::mark_void(&mut *tx, id).await? else {
            tx.rollback().await?;
            let current = Document::find_by_id(pool, id)
                .await?
                .ok_or(DocumentError::NotFound(id))?;
            warn!(document_id = %id, status = %current.status, "Refused to void document");
            return Err(DocumentError::InvalidState {
                id,
                status: current.status,
                action: "void",
            });
        };
        DocumentEvent::create(
            &mut *tx,
            voided.id,
            voided.company_id,
            DocumentAction::Voided,
            reason,
        )
        .await?;
        tx.commit().await?;

        info!(document_id = %voided.id, reference = ?voided.reference(), "Document voided");
        Ok(voided)
    }

    pub async fn find(pool: &SqlitePool, id: Uuid) -> Result<Document, DocumentError> {
        Document::find_by_id(pool, id)
            .await?
            .ok_or(DocumentError::NotFound(id))
    }

    pub async fn list_for_company(
        pool: &SqlitePool,
        company_id: Uuid,
        doc_type: Option<DocType>,
    ) -> Result<Vec<Document>, DocumentError> {
        if Company::find_by_id(pool, company_id).await?.is_none() {
            return Err(DocumentError::CompanyNotFound(company_id));
        }
        Ok(Document::find_by_company(pool, company_id, doc_type).await?)
    }

    pub async fn events(pool: &SqlitePool, id: Uuid) -> Result<Vec<DocumentEvent>, DocumentError> {
        Self::find(pool, id).await?;
        Ok(DocumentEvent::find_by_document_id(pool, id).await?)
    }
}
