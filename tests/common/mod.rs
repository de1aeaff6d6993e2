//! Shared fixtures for router-level tests: in-process collaborator doubles
//! wired into an `AppState`, plus JWT helpers.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use corepay::config::Config;
use corepay::domain::{
    Account, Bill, CbsStatus, Channel, CommitJournalEntry, PaymentInquiry, PaymentReceipt,
    Transaction, TransactionFilter, TransactionStatus, TransferReceipt,
};
use corepay::middleware::auth::Claims;
use corepay::ports::{
    AccountRepository, CbsStatusService, LedgerError, PaymentGateway, ServiceError,
    TransactionLedger, TransferGateway,
};
use corepay::services::{TapMoneyService, TransactionQueryService, TransferService};
use corepay::AppState;

pub const JWT_SECRET: &str = "test-secret";
pub const ADMIN_API_KEY: &str = "admin-secret-key";

pub struct ReadyCbs;

#[async_trait]
impl CbsStatusService for ReadyCbs {
    async fn get_status(&self) -> Result<CbsStatus, ServiceError> {
        Ok(CbsStatus {
            system_date: "2026-08-07".to_string(),
            is_eod: false,
            is_stand_in: false,
        })
    }
}

pub struct MapAccounts {
    accounts: HashMap<String, i64>,
}

impl MapAccounts {
    pub fn new(accounts: &[(&str, i64)]) -> Self {
        Self {
            accounts: accounts
                .iter()
                .map(|(number, balance)| (number.to_string(), *balance))
                .collect(),
        }
    }
}

#[async_trait]
impl AccountRepository for MapAccounts {
    async fn get(&self, account_number: &str) -> Result<Account, ServiceError> {
        self.accounts
            .get(account_number)
            .map(|balance| Account {
                account_number: account_number.to_string(),
                full_name: "John Doe".to_string(),
                account_type: "savings".to_string(),
                balance: *balance,
            })
            .ok_or_else(|| ServiceError::NotFound(format!("account {}", account_number)))
    }
}

pub struct OkPayments;

#[async_trait]
impl PaymentGateway for OkPayments {
    async fn inquiry(&self, _channel: &Channel, _bill: &Bill) -> Result<PaymentInquiry, ServiceError> {
        Ok(PaymentInquiry {
            payment_id: "pay-123".to_string(),
            status: "Approved".to_string(),
        })
    }

    async fn payment(&self, _bill: &Bill) -> Result<PaymentReceipt, ServiceError> {
        Ok(PaymentReceipt {
            status: "Approved".to_string(),
            reference: "REF-889900".to_string(),
            fee: 1_500,
        })
    }
}

pub struct OkTransfers;

#[async_trait]
impl TransferGateway for OkTransfers {
    async fn transfer(
        &self,
        _source_account: &str,
        _destination_account: &str,
        _amount: i64,
        _remark: &str,
    ) -> Result<TransferReceipt, ServiceError> {
        Ok(TransferReceipt {
            reference: "FT26081234".to_string(),
        })
    }
}

#[derive(Default)]
pub struct MemLedger {
    rows: Mutex<HashMap<Uuid, Transaction>>,
    journal: Mutex<Vec<CommitJournalEntry>>,
}

#[async_trait]
impl TransactionLedger for MemLedger {
    async fn create(&self, tx: &Transaction) -> Result<(), LedgerError> {
        self.rows.lock().unwrap().insert(tx.id, tx.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Transaction, LedgerError> {
        self.rows
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(LedgerError::NotFound)
    }

    async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, LedgerError> {
        let rows = self.rows.lock().unwrap();
        let mut matched: Vec<Transaction> = rows
            .values()
            .filter(|tx| tx.owner == filter.owner)
            .filter(|tx| filter.kind.map_or(true, |kind| tx.kind == kind))
            .filter(|tx| filter.status.map_or(true, |status| tx.status == status))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn complete(&self, id: Uuid, reference: &str, fee: i64) -> Result<(), LedgerError> {
        let mut rows = self.rows.lock().unwrap();
        let tx = rows.get_mut(&id).ok_or(LedgerError::NotFound)?;
        if tx.status != TransactionStatus::Initiated {
            return Err(LedgerError::Conflict);
        }
        tx.status = TransactionStatus::Completed;
        tx.cbs_reference = reference.to_string();
        tx.fee = fee;
        tx.processed_at = Some(Utc::now());
        Ok(())
    }

    async fn journal_commit(&self, transaction_id: Uuid) -> Result<(), LedgerError> {
        self.journal.lock().unwrap().push(CommitJournalEntry {
            id: Uuid::new_v4(),
            transaction_id,
            created_at: Utc::now(),
            resolved_at: None,
        });
        Ok(())
    }

    async fn resolve_commit(&self, transaction_id: Uuid) -> Result<(), LedgerError> {
        for entry in self.journal.lock().unwrap().iter_mut() {
            if entry.transaction_id == transaction_id && entry.resolved_at.is_none() {
                entry.resolved_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn unresolved_commits(&self) -> Result<Vec<CommitJournalEntry>, LedgerError> {
        Ok(self
            .journal
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.resolved_at.is_none())
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), LedgerError> {
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        server_port: 3000,
        database_url: "postgres://localhost:5432/corepay_test".to_string(),
        cbs_base_url: "http://cbs.local".to_string(),
        cbs_username: "svc".to_string(),
        cbs_password: "secret".to_string(),
        gateway_base_url: "http://gateway.local".to_string(),
        gateway_username: "svc".to_string(),
        gateway_password: "secret".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        admin_api_key: ADMIN_API_KEY.to_string(),
        tapmoney_channel_id: "01".to_string(),
        tapmoney_biller_code: "99999".to_string(),
    }
}

/// State over mocked collaborators: two known accounts, always-succeeding
/// gateways, an in-memory ledger.
pub fn test_state() -> AppState {
    let cbs: Arc<dyn CbsStatusService> = Arc::new(ReadyCbs);
    let accounts: Arc<dyn AccountRepository> = Arc::new(MapAccounts::new(&[
        ("001201001479315", 50_000),
        ("001201009997777", 0),
    ]));
    let payments: Arc<dyn PaymentGateway> = Arc::new(OkPayments);
    let transfers_gateway: Arc<dyn TransferGateway> = Arc::new(OkTransfers);
    let ledger: Arc<dyn TransactionLedger> = Arc::new(MemLedger::default());

    let transfers = TransferService::new(
        cbs.clone(),
        accounts.clone(),
        transfers_gateway,
        ledger.clone(),
    );
    let tapmoney = TapMoneyService::new(
        cbs.clone(),
        accounts,
        payments,
        ledger.clone(),
        Channel {
            id: "01".to_string(),
        },
        "99999".to_string(),
    );
    let transactions = TransactionQueryService::new(ledger.clone());

    AppState {
        config: Arc::new(test_config()),
        ledger,
        cbs_status: cbs,
        transfers,
        tapmoney,
        transactions,
    }
}

pub fn token_for(username: &str) -> String {
    let claims = Claims {
        sub: username.to_string(),
        exp: (Utc::now().timestamp() + 3_600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encoding")
}
