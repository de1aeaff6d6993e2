//! Contracts for the external collaborators the orchestration core depends
//! on. Implementations live in `cbs/`, `gateway/` and `adapters/`; tests
//! substitute in-process mocks.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    Account, Bill, CbsStatus, Channel, CommitJournalEntry, PaymentInquiry, PaymentReceipt,
    Transaction, TransactionFilter, TransferReceipt,
};

/// Failure of an upstream service call.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a ledger operation.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("transaction not found")]
    NotFound,

    /// The conditional write matched no row because the transaction already
    /// left `initiated`.
    #[error("transaction already processed")]
    Conflict,

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => LedgerError::NotFound,
            other => LedgerError::Database(other.to_string()),
        }
    }
}

/// Core-banking readiness gate.
#[async_trait]
pub trait CbsStatusService: Send + Sync {
    async fn get_status(&self) -> Result<CbsStatus, ServiceError>;
}

/// Account/balance lookup against the CBS.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn get(&self, account_number: &str) -> Result<Account, ServiceError>;
}

/// Biller payment gateway: a non-committing inquiry and a committing payment.
///
/// `payment` moves funds upstream and is not guaranteed idempotent; callers
/// must ensure it runs at most once per transaction.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn inquiry(&self, channel: &Channel, bill: &Bill) -> Result<PaymentInquiry, ServiceError>;

    async fn payment(&self, bill: &Bill) -> Result<PaymentReceipt, ServiceError>;
}

/// CBS account-to-account transfer. Committing; same at-most-once discipline
/// as [`PaymentGateway::payment`].
#[async_trait]
pub trait TransferGateway: Send + Sync {
    async fn transfer(
        &self,
        source_account: &str,
        destination_account: &str,
        amount: i64,
        remark: &str,
    ) -> Result<TransferReceipt, ServiceError>;
}

/// Local system of record for transactions.
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    async fn create(&self, tx: &Transaction) -> Result<(), LedgerError>;

    async fn get(&self, id: Uuid) -> Result<Transaction, LedgerError>;

    async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, LedgerError>;

    /// Move a row from `initiated` to `completed`, recording the upstream
    /// reference and fee. Single conditional write: returns
    /// [`LedgerError::Conflict`] when the row exists but already left
    /// `initiated`, so concurrent processors cannot both win.
    async fn complete(&self, id: Uuid, reference: &str, fee: i64) -> Result<(), LedgerError>;

    /// Record commit intent before a funds-moving gateway call.
    async fn journal_commit(&self, transaction_id: Uuid) -> Result<(), LedgerError>;

    /// Mark all commit intents for a transaction resolved.
    async fn resolve_commit(&self, transaction_id: Uuid) -> Result<(), LedgerError>;

    async fn unresolved_commits(&self) -> Result<Vec<CommitJournalEntry>, LedgerError>;

    /// Connectivity probe for health reporting.
    async fn ping(&self) -> Result<(), LedgerError>;
}
