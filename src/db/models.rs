use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{CommitJournalEntry, Transaction, TransactionKind, TransactionStatus};
use crate::ports::LedgerError;

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub kind: String,
    pub source_account: String,
    pub destination_account: String,
    pub amount: i64,
    pub fee: i64,
    pub status: String,
    pub cbs_reference: String,
    pub payment_id: Option<String>,
    pub note: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl TransactionRow {
    pub fn into_domain(self) -> Result<Transaction, LedgerError> {
        let kind = TransactionKind::parse(&self.kind)
            .ok_or_else(|| LedgerError::Database(format!("unknown transaction kind: {}", self.kind)))?;
        let status = TransactionStatus::parse(&self.status).ok_or_else(|| {
            LedgerError::Database(format!("unknown transaction status: {}", self.status))
        })?;

        Ok(Transaction {
            id: self.id,
            kind,
            source_account: self.source_account,
            destination_account: self.destination_account,
            amount: self.amount,
            fee: self.fee,
            status,
            cbs_reference: self.cbs_reference,
            payment_id: self.payment_id,
            note: self.note,
            owner: self.owner,
            created_at: self.created_at,
            processed_at: self.processed_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct CommitJournalRow {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl CommitJournalRow {
    pub fn into_domain(self) -> CommitJournalEntry {
        CommitJournalEntry {
            id: self.id,
            transaction_id: self.transaction_id,
            created_at: self.created_at,
            resolved_at: self.resolved_at,
        }
    }
}
