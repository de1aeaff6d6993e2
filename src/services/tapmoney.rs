//! Tap-money orchestration: top up a prepaid card from an account through
//! the biller payment gateway.
//!
//! `inquiry` runs the gateway's non-committing eligibility check and records
//! an `initiated` ledger row; `payment` commits the funds movement with the
//! persisted bill and completes the row with the gateway's reference and fee.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::ensure_cbs_ready;
use crate::domain::{
    AuthUser, Bill, Channel, Transaction, TransactionKind, TransactionStatus,
};
use crate::error::AppError;
use crate::ports::{
    AccountRepository, CbsStatusService, LedgerError, PaymentGateway, ServiceError,
    TransactionLedger,
};

pub const SUCCESSFUL_MESSAGE: &str = "Payment successful";

#[derive(Debug, Deserialize)]
pub struct InquiryRequest {
    pub card_number: String,
    pub source_account: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct InquiryResponse {
    pub id: Uuid,
    pub payment_id: String,
    pub status: TransactionStatus,
    pub card_number: String,
    pub source_account: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub transaction_id: Uuid,
    /// Echoed by clients; the commit always uses the amount persisted at
    /// inquiry.
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub message: String,
    pub status: TransactionStatus,
    pub amount: i64,
    pub card_number: String,
    pub note: String,
    pub fee: i64,
}

#[derive(Clone)]
pub struct TapMoneyService {
    cbs: Arc<dyn CbsStatusService>,
    accounts: Arc<dyn AccountRepository>,
    payments: Arc<dyn PaymentGateway>,
    ledger: Arc<dyn TransactionLedger>,
    channel: Channel,
    biller_code: String,
}

impl TapMoneyService {
    pub fn new(
        cbs: Arc<dyn CbsStatusService>,
        accounts: Arc<dyn AccountRepository>,
        payments: Arc<dyn PaymentGateway>,
        ledger: Arc<dyn TransactionLedger>,
        channel: Channel,
        biller_code: String,
    ) -> Self {
        Self {
            cbs,
            accounts,
            payments,
            ledger,
            channel,
            biller_code,
        }
    }

    pub async fn inquiry(
        &self,
        caller: &AuthUser,
        req: InquiryRequest,
    ) -> Result<InquiryResponse, AppError> {
        ensure_cbs_ready(self.cbs.as_ref()).await?;

        let source = match self.accounts.get(&req.source_account).await {
            Ok(account) => account,
            Err(ServiceError::NotFound(_)) => {
                tracing::warn!(account_number = %req.source_account, "Source account not found");
                return Err(AppError::not_found("Source account was not found"));
            }
            Err(e) => {
                tracing::error!(account_number = %req.source_account, error = %e, "Failed to get account");
                return Err(AppError::internal());
            }
        };
        if !source.can_transfer(req.amount) {
            tracing::warn!(
                account_balance = source.balance,
                request_amount = req.amount,
                "Insufficient balance"
            );
            return Err(AppError::bad_request("Insufficient balance"));
        }

        let bill = Bill {
            source_account: source.account_number.clone(),
            destination_account: req.card_number.clone(),
            biller_code: self.biller_code.clone(),
            amount: req.amount,
        };
        let inquiry = match self.payments.inquiry(&self.channel, &bill).await {
            Ok(inquiry) => inquiry,
            Err(e) => {
                // The gateway vets the card; a rejection here almost always
                // means the caller sent a bad card number.
                tracing::warn!(error = %e, "Inquiry to payment service failed");
                return Err(AppError::bad_request("Invalid card number"));
            }
        };

        let mut tx = Transaction::new(
            TransactionKind::TapMoney,
            source.account_number,
            req.card_number.clone(),
            req.amount,
            String::new(),
            caller.username.clone(),
        );
        tx.payment_id = Some(inquiry.payment_id.clone());

        if let Err(e) = self.ledger.create(&tx).await {
            tracing::error!(error = %e, "Create transaction failed");
            return Err(AppError::internal());
        }

        Ok(InquiryResponse {
            id: tx.id,
            payment_id: inquiry.payment_id,
            status: tx.status,
            card_number: req.card_number,
            source_account: req.source_account,
            amount: tx.amount,
        })
    }

    pub async fn payment(
        &self,
        _caller: &AuthUser,
        req: PaymentRequest,
    ) -> Result<PaymentResponse, AppError> {
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

        let source = match self.accounts.get(&tx.source_account).await {
            Ok(account) => account,
            Err(ServiceError::NotFound(_)) => {
                tracing::warn!(account_number = %tx.source_account, "Source account not found");
                return Err(AppError::not_found("Source account was not found"));
            }
            Err(e) => {
                tracing::error!(account_number = %tx.source_account, error = %e, "Failed to get account");
                return Err(AppError::internal());
            }
        };
        if !source.can_transfer(tx.amount) {
            tracing::warn!(
                account_balance = source.balance,
                transaction_amount = tx.amount,
                "Insufficient balance"
            );
            return Err(AppError::bad_request("Insufficient balance"));
        }

        if let Err(e) = self.ledger.journal_commit(tx.id).await {
            tracing::error!(transaction_id = %tx.id, error = %e, "Failed to journal commit intent");
            return Err(AppError::internal());
        }

        // The bill is rebuilt from the ledger row, not the request.
        let bill = Bill {
            source_account: tx.source_account.clone(),
            destination_account: tx.destination_account.clone(),
            biller_code: self.biller_code.clone(),
            amount: tx.amount,
        };
        let receipt = match self.payments.payment(&bill).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::error!(transaction_id = %tx.id, error = %e, "Payment to payment service failed");
                return Err(AppError::internal());
            }
        };

        match self
            .ledger
            .complete(tx.id, &receipt.reference, receipt.fee)
            .await
        {
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
                tracing::error!(
                    transaction_id = %tx.id,
                    reference = %receipt.reference,
                    error = %e,
                    "Failed to update transaction after successful payment"
                );
                return Err(AppError::internal());
            }
        }

        if let Err(e) = self.ledger.resolve_commit(tx.id).await {
            tracing::warn!(transaction_id = %tx.id, error = %e, "Failed to resolve commit journal");
        }

        Ok(PaymentResponse {
            id: tx.id,
            message: SUCCESSFUL_MESSAGE.to_string(),
            status: TransactionStatus::Completed,
            amount: tx.amount,
            card_number: tx.destination_account,
            note: tx.note,
            fee: receipt.fee,
        })
    }
}
