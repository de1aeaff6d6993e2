pub mod account;
pub mod cbs;
pub mod payment;
pub mod transaction;
pub mod user;

pub use account::Account;
pub use cbs::CbsStatus;
pub use payment::{Bill, Channel, PaymentInquiry, PaymentReceipt, TransferReceipt};
pub use transaction::{
    CommitJournalEntry, Transaction, TransactionFilter, TransactionKind, TransactionStatus,
};
pub use user::AuthUser;
