//! Transfer client: the committing CBS funds-movement call. Not idempotent
//! upstream; callers must invoke it at most once per transaction.

use async_trait::async_trait;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::Error as FailsafeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{default_breaker, http_client, Breaker, CbsAuthClient, CbsError, CBS_SUCCESS_CODE};
use crate::domain::TransferReceipt;
use crate::ports::{ServiceError, TransferGateway};

/// The CBS bills transfer fees separately; this channel always submits zero.
const TRANSFER_FEE: &str = "0";

#[derive(Debug, Serialize)]
struct TransferRequest {
    #[serde(rename = "noRekeningKredit")]
    credit_account_number: String,
    #[serde(rename = "noRekeningDebit")]
    debit_account_number: String,
    #[serde(rename = "nominal")]
    amount: String,
    #[serde(rename = "keteranganTransaksi")]
    transaction_info: String,
    #[serde(rename = "biaya")]
    fee: &'static str,
}

#[derive(Debug, Deserialize)]
struct TransferResponse {
    #[serde(rename = "statusCode")]
    status_code: String,
    #[serde(rename = "statusDescription", default)]
    status_description: String,
    #[serde(rename = "transactionReference", default)]
    transaction_reference: String,
}

pub struct CbsTransferClient {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<CbsAuthClient>,
    circuit_breaker: Breaker,
}

impl CbsTransferClient {
    pub fn new(base_url: String, auth: Arc<CbsAuthClient>) -> Self {
        Self {
            client: http_client(),
            base_url,
            auth,
            circuit_breaker: default_breaker(),
        }
    }

    async fn submit_transfer(
        &self,
        source_account: &str,
        destination_account: &str,
        amount: i64,
        remark: &str,
    ) -> Result<TransferReceipt, CbsError> {
        let url = format!("{}/api/transaction", self.base_url.trim_end_matches('/'));
        let client = self.client.clone();
        let auth = self.auth.clone();
        let request = TransferRequest {
            credit_account_number: source_account.to_string(),
            debit_account_number: destination_account.to_string(),
            amount: amount.to_string(),
            transaction_info: remark.to_string(),
            fee: TRANSFER_FEE,
        };

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

                let body: TransferResponse = response.json().await?;
                if body.status_code != CBS_SUCCESS_CODE {
                    return Err(CbsError::Rejected {
                        code: body.status_code,
                        description: body.status_description,
                    });
                }

                Ok(TransferReceipt {
                    reference: body.transaction_reference,
                })
            })
            .await;

        match result {
            Ok(receipt) => Ok(receipt),
            Err(FailsafeError::Rejected) => Err(CbsError::CircuitOpen),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

#[async_trait]
impl TransferGateway for CbsTransferClient {
    async fn transfer(
        &self,
        source_account: &str,
        destination_account: &str,
        amount: i64,
        remark: &str,
    ) -> Result<TransferReceipt, ServiceError> {
        self.submit_transfer(source_account, destination_account, amount, remark)
            .await
            .map_err(ServiceError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn client_for(server: &mockito::Server) -> CbsTransferClient {
        let auth = Arc::new(CbsAuthClient::new(
            server.url(),
            "svc".into(),
            "secret".into(),
        ));
        CbsTransferClient::new(server.url(), auth)
    }

    fn token_mock(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "tok-1", "expires_in": 3600}"#)
    }

    #[tokio::test]
    async fn submits_transfer_and_returns_reference() {
        let mut server = mockito::Server::new_async().await;
        let _token = token_mock(&mut server).create_async().await;
        let _transfer = server
            .mock("POST", "/api/transaction")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "noRekeningKredit": "123456",
                "noRekeningDebit": "654321",
                "nominal": "10000",
                "keteranganTransaksi": "TRF 123456 654321 BNKKRD tx-1",
                "biaya": "0"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "statusCode": "00",
                    "statusDescription": "Success",
                    "transactionReference": "FT26081234"
                }"#,
            )
            .create_async()
            .await;

        let receipt = client_for(&server)
            .await
            .transfer("123456", "654321", 10_000, "TRF 123456 654321 BNKKRD tx-1")
            .await
            .unwrap();

        assert_eq!(receipt.reference, "FT26081234");
    }

    #[tokio::test]
    async fn rejected_transfer_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _token = token_mock(&mut server).create_async().await;
        let _transfer = server
            .mock("POST", "/api/transaction")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"statusCode": "51", "statusDescription": "Insufficient funds"}"#)
            .create_async()
            .await;

        let result = client_for(&server)
            .await
            .transfer("123456", "654321", 10_000, "remark")
            .await;

        assert!(matches!(result, Err(ServiceError::Unavailable(_))));
    }
}
