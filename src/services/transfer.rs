//! Account-to-account transfer orchestration.
//!
//! Two-phase lifecycle: `initiate` validates readiness and funds and records
//! an `initiated` ledger row; `process` commits the funds movement through
//! the CBS and moves the row to `completed`. The ledger's conditional
//! completion is the idempotency barrier: a row can only be committed once.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::ensure_cbs_ready;
use crate::domain::{AuthUser, Transaction, TransactionKind, TransactionStatus};
use crate::error::AppError;
use crate::ports::{
    AccountRepository, CbsStatusService, LedgerError, ServiceError, TransactionLedger,
    TransferGateway,
};

#[derive(Debug, Deserialize)]
pub struct InitiateRequest {
    pub source_account: String,
    pub destination_account: String,
    pub amount: i64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct InitiateResponse {
    pub id: Uuid,
    pub status: TransactionStatus,
}

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub transaction_id: Uuid,
    /// Echoed by clients; the commit always uses the amount persisted at
    /// initiation.
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub id: Uuid,
    pub status: TransactionStatus,
}

#[derive(Clone)]
pub struct TransferService {
    cbs: Arc<dyn CbsStatusService>,
    accounts: Arc<dyn AccountRepository>,
    gateway: Arc<dyn TransferGateway>,
    ledger: Arc<dyn TransactionLedger>,
}

impl TransferService {
    pub fn new(
        cbs: Arc<dyn CbsStatusService>,
        accounts: Arc<dyn AccountRepository>,
        gateway: Arc<dyn TransferGateway>,
        ledger: Arc<dyn TransactionLedger>,
    ) -> Self {
        Self {
            cbs,
            accounts,
            gateway,
            ledger,
        }
    }

    pub async fn initiate(
        &self,
        caller: &AuthUser,
        req: InitiateRequest,
    ) -> Result<InitiateResponse, AppError> {
        ensure_cbs_ready(self.cbs.as_ref()).await?;

        let source = match self.accounts.get(&req.source_account).await {
            Ok(account) => account,
            Err(e) => return Err(account_lookup_error(&req.source_account, e)),
        };
        if !source.can_transfer(req.amount) {
            tracing::warn!(
                account_balance = source.balance,
                request_amount = req.amount,
                "Insufficient balance"
            );
            return Err(AppError::bad_request("Insufficient balance"));
        }

        let destination = match self.accounts.get(&req.destination_account).await {
            Ok(account) => account,
            Err(e) => return Err(account_lookup_error(&req.destination_account, e)),
        };

        let tx = Transaction::new(
            TransactionKind::Transfer,
            source.account_number,
            destination.account_number,
            req.amount,
            req.note,
            caller.username.clone(),
        );

        if let Err(e) = self.ledger.create(&tx).await {
            tracing::error!(error = %e, "Failed to create transaction");
            return Err(AppError::internal());
        }

        Ok(InitiateResponse {
            id: tx.id,
            status: tx.status,
        })
    }

    pub async fn process(
        &self,
        _caller: &AuthUser,
        req: ProcessRequest,
    ) -> Result<ProcessResponse, AppError> {
        ensure_cbs_ready(self.cbs.as_ref()).await?;

        let tx = match self.ledger.get(req.transaction_id).await {
            Ok(tx) => tx,
            Err(LedgerError::NotFound) => {
                return Err(AppError::not_found("Transaction was not found"))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to get transaction");
                return Err(AppError::internal());
            }
        };
        if !tx.status.can_process() {
            tracing::warn!(
                transaction_id = %tx.id,
                status = %tx.status,
                "Transaction is not in a valid state to be processed"
            );
            return Err(AppError::conflict("Transaction is already processed"));
        }

        // Balance may have drifted since initiation; re-check against the
        // persisted amount, never the request's.
        let source = match self.accounts.get(&tx.source_account).await {
            Ok(account) => account,
            Err(e) => return Err(account_lookup_error(&tx.source_account, e)),
        };
        if !source.can_transfer(tx.amount) {
            tracing::warn!(
                account_balance = source.balance,
                transaction_amount = tx.amount,
                "Insufficient balance"
            );
            return Err(AppError::bad_request("Insufficient balance"));
        }

        // Record commit intent before the funds-moving call so an unresolved
        // entry marks any transaction whose upstream outcome is unknown.
        if let Err(e) = self.ledger.journal_commit(tx.id).await {
            tracing::error!(transaction_id = %tx.id, error = %e, "Failed to journal commit intent");
            return Err(AppError::internal());
        }

        let remark = make_transfer_remark(&tx.source_account, &tx.destination_account, tx.id);
        let receipt = match self
            .gateway
            .transfer(&tx.source_account, &tx.destination_account, tx.amount, &remark)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                // Row stays `initiated`; the caller may retry this call.
                tracing::error!(transaction_id = %tx.id, error = %e, "Failed to transfer amount");
                return Err(AppError::internal());
            }
        };

        match self.ledger.complete(tx.id, &receipt.reference, 0).await {
            Ok(()) => {}
            Err(LedgerError::Conflict) => {
                tracing::warn!(
                    transaction_id = %tx.id,
                    "Transaction completed by another processor"
                );
                return Err(AppError::conflict("Transaction is already processed"));
            }
            Err(LedgerError::NotFound) => {
                return Err(AppError::not_found("Transaction was not found"))
            }
            Err(e) => {
                // Funds moved upstream but the ledger still says `initiated`;
                // the journal entry stays unresolved for reconciliation.
                tracing::error!(
                    transaction_id = %tx.id,
                    reference = %receipt.reference,
                    error = %e,
                    "Failed to update transaction after successful transfer"
                );
                return Err(AppError::internal());
            }
        }

        if let Err(e) = self.ledger.resolve_commit(tx.id).await {
            tracing::warn!(transaction_id = %tx.id, error = %e, "Failed to resolve commit journal");
        }

        Ok(ProcessResponse {
            id: tx.id,
            status: TransactionStatus::Completed,
        })
    }
}

fn account_lookup_error(account_number: &str, e: ServiceError) -> AppError {
    match e {
        ServiceError::NotFound(_) => {
            tracing::warn!(account_number = %account_number, "Account not found");
            AppError::not_found("Account not found")
        }
        ServiceError::Unavailable(reason) => {
            tracing::error!(account_number = %account_number, error = %reason, "Failed to get account");
            AppError::internal()
        }
    }
}

/// Audit remark correlating the ledger row with the CBS journal.
fn make_transfer_remark(source_account: &str, destination_account: &str, id: Uuid) -> String {
    format!("TRF {} {} BNKKRD {}", source_account, destination_account, id)
}
