//! Owner-scoped ledger queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    AuthUser, Transaction, TransactionFilter, TransactionKind, TransactionStatus,
};
use crate::error::AppError;
use crate::ports::{LedgerError, TransactionLedger};

#[derive(Debug, Default, Deserialize)]
pub struct ListRequest {
    pub kind: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TransactionData {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub source_account: String,
    pub destination_account: String,
    pub amount: i64,
    pub fee: i64,
    pub note: String,
    pub cbs_reference: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<Transaction> for TransactionData {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            kind: tx.kind,
            status: tx.status,
            source_account: tx.source_account,
            destination_account: tx.destination_account,
            amount: tx.amount,
            fee: tx.fee,
            note: tx.note,
            cbs_reference: tx.cbs_reference,
            created_at: tx.created_at,
            processed_at: tx.processed_at,
        }
    }
}

#[derive(Clone)]
pub struct TransactionQueryService {
    ledger: Arc<dyn TransactionLedger>,
}

impl TransactionQueryService {
    pub fn new(ledger: Arc<dyn TransactionLedger>) -> Self {
        Self { ledger }
    }

    /// List is always constrained to the caller's own transactions.
    pub async fn list(
        &self,
        caller: &AuthUser,
        req: ListRequest,
    ) -> Result<Vec<TransactionData>, AppError> {
        let kind = match req.kind.as_deref() {
            None => None,
            Some(raw) => Some(
                TransactionKind::parse(raw)
                    .ok_or_else(|| AppError::bad_request(format!("unknown kind: {}", raw)))?,
            ),
        };
        let status = match req.status.as_deref() {
            None => None,
            Some(raw) => Some(
                TransactionStatus::parse(raw)
                    .ok_or_else(|| AppError::bad_request(format!("unknown status: {}", raw)))?,
            ),
        };

        let filter = TransactionFilter {
            owner: caller.username.clone(),
            kind,
            status,
            limit: req.limit.unwrap_or(20).clamp(1, 100),
            offset: req.offset.unwrap_or(0).max(0),
        };

        let txs = match self.ledger.list(&filter).await {
            Ok(txs) => txs,
            Err(e) => {
                tracing::error!(error = %e, "Failed to get transactions");
                return Err(AppError::internal());
            }
        };

        Ok(txs.into_iter().map(TransactionData::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<TransactionData, AppError> {
        match self.ledger.get(id).await {
            Ok(tx) => Ok(TransactionData::from(tx)),
            Err(LedgerError::NotFound) => Err(AppError::not_found("Transaction was not found")),
            Err(e) => {
                tracing::error!(error = %e, "Failed to get transaction");
                Err(AppError::internal())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::testing::MemoryLedger;

    fn seeded_ledger() -> Arc<MemoryLedger> {
        let ledger = Arc::new(MemoryLedger::default());
        ledger.seed(Transaction::new(
            TransactionKind::Transfer,
            "123456".into(),
            "654321".into(),
            10_000,
            String::new(),
            "jdoe".into(),
        ));
        ledger.seed(Transaction::new(
            TransactionKind::TapMoney,
            "123456".into(),
            "6013501000500719".into(),
            20_000,
            String::new(),
            "jdoe".into(),
        ));
        ledger.seed(Transaction::new(
            TransactionKind::Transfer,
            "999999".into(),
            "654321".into(),
            30_000,
            String::new(),
            "other".into(),
        ));
        ledger
    }

    #[tokio::test]
    async fn list_is_scoped_to_caller() {
        let service = TransactionQueryService::new(seeded_ledger());

        let txs = service
            .list(&AuthUser::new("jdoe"), ListRequest::default())
            .await
            .unwrap();

        assert_eq!(txs.len(), 2);
        assert!(txs.iter().all(|tx| tx.source_account == "123456"));
    }

    #[tokio::test]
    async fn list_filters_by_kind() {
        let service = TransactionQueryService::new(seeded_ledger());

        let txs = service
            .list(
                &AuthUser::new("jdoe"),
                ListRequest {
                    kind: Some("tap_money".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].kind, TransactionKind::TapMoney);
    }

    #[tokio::test]
    async fn list_rejects_unknown_filter_values() {
        let service = TransactionQueryService::new(seeded_ledger());

        let err = service
            .list(
                &AuthUser::new("jdoe"),
                ListRequest {
                    status: Some("limbo".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn get_unknown_transaction_is_not_found() {
        let service = TransactionQueryService::new(Arc::new(MemoryLedger::default()));

        let err = service.get(Uuid::new_v4()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
