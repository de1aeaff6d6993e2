//! HTTP clients for the core banking system.

pub mod account;
pub mod auth;
pub mod status;
pub mod transfer;

pub use account::CbsAccountClient;
pub use auth::CbsAuthClient;
pub use status::CbsStatusClient;
pub use transfer::CbsTransferClient;

use failsafe::{backoff, failure_policy, StateMachine};
use std::time::Duration;
use thiserror::Error;

use crate::ports::ServiceError;

/// CBS responses wrap payloads in a `statusCode`/`statusDescription` envelope;
/// `"00"` marks success.
pub const CBS_SUCCESS_CODE: &str = "00";

pub(crate) type Breaker =
    StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>;

pub(crate) fn default_breaker() -> Breaker {
    let backoff = backoff::equal_jittered(Duration::from_secs(60), Duration::from_secs(120));
    let policy = failure_policy::consecutive_failures(3, backoff);
    failsafe::Config::new().failure_policy(policy).build()
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}

#[derive(Error, Debug)]
pub enum CbsError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),

    #[error("CBS rejected the call: [{code}] {description}")]
    Rejected { code: String, description: String },

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("circuit breaker open")]
    CircuitOpen,
}

impl From<CbsError> for ServiceError {
    fn from(e: CbsError) -> Self {
        match e {
            CbsError::AccountNotFound(account) => ServiceError::NotFound(format!("account {}", account)),
            other => ServiceError::Unavailable(other.to_string()),
        }
    }
}
