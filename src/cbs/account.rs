//! Account-inquiry client. Resolves an account number to its holder and
//! current balance through the CBS transaction endpoint.

use async_trait::async_trait;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::Error as FailsafeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{default_breaker, http_client, Breaker, CbsAuthClient, CbsError, CBS_SUCCESS_CODE};
use crate::domain::Account;
use crate::ports::{AccountRepository, ServiceError};

const TRANSACTION_TYPE_INQUIRY: &str = "inquiry";

#[derive(Debug, Serialize)]
struct AccountInquiryRequest {
    #[serde(rename = "tipeTransaksi")]
    transaction_type: &'static str,
    #[serde(rename = "noRekening")]
    account_number: String,
}

#[derive(Debug, Deserialize)]
struct AccountInquiryResponse {
    #[serde(rename = "statusCode")]
    status_code: String,
    #[serde(rename = "statusDescription", default)]
    status_description: String,
    #[serde(default)]
    data: AccountDetails,
}

#[derive(Debug, Deserialize, Default)]
struct AccountDetails {
    #[serde(rename = "noRekening", default)]
    account_number: String,
    #[serde(rename = "tipeRekening", default)]
    account_type: String,
    #[serde(rename = "nama", default)]
    name: String,
    #[serde(rename = "saldo", default)]
    balance: String,
}

impl AccountDetails {
    /// Balance arrives as a decimal string of minor units.
    fn balance_minor_units(&self) -> i64 {
        self.balance.parse().unwrap_or(0)
    }
}

pub struct CbsAccountClient {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<CbsAuthClient>,
    circuit_breaker: Breaker,
}

impl CbsAccountClient {
    pub fn new(base_url: String, auth: Arc<CbsAuthClient>) -> Self {
        Self {
            client: http_client(),
            base_url,
            auth,
            circuit_breaker: default_breaker(),
        }
    }

    async fn fetch_account(&self, account_number: &str) -> Result<Account, CbsError> {
        let url = format!("{}/api/transaction", self.base_url.trim_end_matches('/'));
        let client = self.client.clone();
        let auth = self.auth.clone();
        let request = AccountInquiryRequest {
            transaction_type: TRANSACTION_TYPE_INQUIRY,
            account_number: account_number.to_string(),
        };
        let requested = account_number.to_string();

        let result = self
            .circuit_breaker
            .call(async move {
                let token = auth.token().await?;
                let response = client
                    .post(&url)
                    .bearer_auth(token)
                    .json(&request)
                    .send()
                    .await?;
                if !response.status().is_success() {
                    return Err(CbsError::Status(response.status()));
                }

                let body: AccountInquiryResponse = response.json().await?;
                if body.status_code != CBS_SUCCESS_CODE {
                    // The CBS answers the inquiry itself but rejects the
                    // account; treat the rejection as a missing account.
                    tracing::debug!(
                        code = %body.status_code,
                        description = %body.status_description,
                        "CBS rejected account inquiry"
                    );
                    return Err(CbsError::AccountNotFound(requested));
                }

                Ok(Account {
                    balance: body.data.balance_minor_units(),
                    account_number: body.data.account_number,
                    full_name: body.data.name,
                    account_type: body.data.account_type,
                })
            })
            .await;

        match result {
            Ok(account) => Ok(account),
            Err(FailsafeError::Rejected) => Err(CbsError::CircuitOpen),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

#[async_trait]
impl AccountRepository for CbsAccountClient {
    async fn get(&self, account_number: &str) -> Result<Account, ServiceError> {
        self.fetch_account(account_number)
            .await
            .map_err(ServiceError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn client_for(server: &mockito::Server) -> CbsAccountClient {
        let auth = Arc::new(CbsAuthClient::new(
            server.url(),
            "svc".into(),
            "secret".into(),
        ));
        CbsAccountClient::new(server.url(), auth)
    }

    fn token_mock(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "tok-1", "expires_in": 3600}"#)
    }

    #[tokio::test]
    async fn resolves_account_with_balance() {
        let mut server = mockito::Server::new_async().await;
        let _token = token_mock(&mut server).create_async().await;
        let _account = server
            .mock("POST", "/api/transaction")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "tipeTransaksi": "inquiry",
                "noRekening": "001201001479315"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "statusCode": "00",
                    "statusDescription": "Success",
                    "data": {
                        "noRekening": "001201001479315",
                        "tipeRekening": "savings",
                        "nama": "John Doe",
                        "saldo": "50000"
                    }
                }"#,
            )
            .create_async()
            .await;

        let account = client_for(&server)
            .await
            .get("001201001479315")
            .await
            .unwrap();

        assert_eq!(account.account_number, "001201001479315");
        assert_eq!(account.full_name, "John Doe");
        assert_eq!(account.balance, 50_000);
        assert!(account.can_transfer(10_000));
    }

    #[tokio::test]
    async fn rejected_inquiry_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _token = token_mock(&mut server).create_async().await;
        let _account = server
            .mock("POST", "/api/transaction")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"statusCode": "14", "statusDescription": "Invalid account"}"#)
            .create_async()
            .await;

        let result = client_for(&server).await.get("999999999").await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn http_error_maps_to_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _token = token_mock(&mut server).create_async().await;
        let _account = server
            .mock("POST", "/api/transaction")
            .with_status(502)
            .create_async()
            .await;

        let result = client_for(&server).await.get("001201001479315").await;

        assert!(matches!(result, Err(ServiceError::Unavailable(_))));
    }

    #[test]
    fn unparseable_balance_defaults_to_zero() {
        let details = AccountDetails {
            balance: "not-a-number".to_string(),
            ..Default::default()
        };
        assert_eq!(details.balance_minor_units(), 0);
    }
}
