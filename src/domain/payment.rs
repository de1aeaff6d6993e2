//! Payment gateway value types.

/// Payment channel the gateway bills the call against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
}

/// A bill presented to the gateway: who pays, who receives, how much.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bill {
    pub source_account: String,
    pub destination_account: String,
    pub biller_code: String,
    pub amount: i64,
}

/// Result of a non-committing gateway inquiry.
#[derive(Debug, Clone)]
pub struct PaymentInquiry {
    pub payment_id: String,
    pub status: String,
}

/// Result of a committing gateway payment. `fee` is the admin fee the gateway
/// charged, in minor units.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub status: String,
    pub reference: String,
    pub fee: i64,
}

/// Result of a committing CBS transfer.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub reference: String,
}
