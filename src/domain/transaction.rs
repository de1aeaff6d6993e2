//! Transaction domain entity.
//! Framework-agnostic representation of a ledger row and its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operation kind a transaction was created by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    TapMoney,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::TapMoney => "tap_money",
            TransactionKind::Transfer => "transfer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tap_money" => Some(TransactionKind::TapMoney),
            "transfer" => Some(TransactionKind::Transfer),
            _ => None,
        }
    }
}

/// Lifecycle state of a transaction.
///
/// Only `initiated` rows may be processed; `completed` and `failed` are
/// terminal. `pending` and `failed` can appear on rows written by other
/// channels, this service never writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Initiated,
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Initiated => "initiated",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "initiated" => Some(TransactionStatus::Initiated),
            "pending" => Some(TransactionStatus::Pending),
            "completed" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }

    /// Processing is only allowed from `initiated`.
    pub fn can_process(&self) -> bool {
        matches!(self, TransactionStatus::Initiated)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger row. `amount` is in minor currency units and never changes after
/// creation; `cbs_reference` is written exactly once, when the row completes.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub source_account: String,
    pub destination_account: String,
    pub amount: i64,
    pub fee: i64,
    pub status: TransactionStatus,
    pub cbs_reference: String,
    pub payment_id: Option<String>,
    pub note: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        source_account: String,
        destination_account: String,
        amount: i64,
        note: String,
        owner: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            source_account,
            destination_account,
            amount,
            fee: 0,
            status: TransactionStatus::Initiated,
            cbs_reference: String::new(),
            payment_id: None,
            note,
            owner,
            created_at: Utc::now(),
            processed_at: None,
        }
    }
}

/// Owner-scoped ledger query.
#[derive(Debug, Clone)]
pub struct TransactionFilter {
    pub owner: String,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl TransactionFilter {
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            kind: None,
            status: None,
            limit: 20,
            offset: 0,
        }
    }
}

/// Commit-intent record. A row exists for every funds-moving gateway call;
/// `resolved_at` is set only after the ledger row reached its terminal state.
#[derive(Debug, Clone, Serialize)]
pub struct CommitJournalEntry {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}
