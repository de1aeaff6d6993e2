//! Biller gateway client. `inquiry` is a non-committing eligibility/fee
//! check; `payment` moves funds and must be called at most once per
//! transaction.

use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Error as FailsafeError, StateMachine};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::{Bill, Channel, PaymentInquiry, PaymentReceipt};
use crate::ports::{PaymentGateway, ServiceError};

/// Gateway responses use a `ResponseCode` envelope; `"00"` marks success.
const GATEWAY_SUCCESS_CODE: &str = "00";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),

    #[error("gateway rejected the call: [{code}] {description}")]
    Rejected { code: String, description: String },

    #[error("circuit breaker open")]
    CircuitOpen,
}

impl From<GatewayError> for ServiceError {
    fn from(e: GatewayError) -> Self {
        ServiceError::Unavailable(e.to_string())
    }
}

#[derive(Debug, Serialize)]
struct GatewayRequest {
    #[serde(rename = "ChannelId")]
    channel_id: String,
    #[serde(rename = "CoreInfo")]
    core_info: CoreInfo,
    #[serde(rename = "ThirdPartyInfo")]
    third_party_info: ThirdPartyInfo,
}

#[derive(Debug, Serialize)]
struct CoreInfo {
    #[serde(rename = "SourceAccount")]
    source_account: String,
    #[serde(rename = "Amount")]
    amount: String,
}

#[derive(Debug, Serialize)]
struct ThirdPartyInfo {
    #[serde(rename = "BillNumber")]
    bill_number: String,
    #[serde(rename = "BillerCode")]
    biller_code: String,
    #[serde(rename = "UserName")]
    user_name: String,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    #[serde(rename = "ResponseCode")]
    response_code: String,
    #[serde(rename = "ResponseDescription", default)]
    response_description: String,
    #[serde(rename = "TraceId", default)]
    trace_id: String,
    #[serde(rename = "ThirdPartyInfo", default)]
    third_party_info: ThirdPartyInfoResponse,
}

#[derive(Debug, Deserialize, Default)]
struct ThirdPartyInfoResponse {
    #[serde(rename = "ReferenceNumber", default)]
    reference_number: String,
    #[serde(rename = "AdminFee", default)]
    admin_fee: String,
}

impl ThirdPartyInfoResponse {
    fn admin_fee_minor_units(&self) -> i64 {
        self.admin_fee.parse().unwrap_or(0)
    }
}

pub struct PaymentGatewayClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl PaymentGatewayClient {
    pub fn new(base_url: String, username: String, password: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(Duration::from_secs(60), Duration::from_secs(120));
        let policy = failure_policy::consecutive_failures(3, backoff);
        let circuit_breaker = failsafe::Config::new().failure_policy(policy).build();

        Self {
            client,
            base_url,
            username,
            password,
            circuit_breaker,
        }
    }

    fn build_request(&self, channel_id: &str, bill: &Bill) -> GatewayRequest {
        GatewayRequest {
            channel_id: channel_id.to_string(),
            core_info: CoreInfo {
                source_account: bill.source_account.clone(),
                amount: bill.amount.to_string(),
            },
            third_party_info: ThirdPartyInfo {
                bill_number: bill.destination_account.clone(),
                biller_code: bill.biller_code.clone(),
                user_name: self.username.clone(),
            },
        }
    }

    async fn invoke(
        &self,
        operation: &str,
        request: GatewayRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        let url = format!(
            "{}/invoke/bill.payment.providers:{}",
            self.base_url.trim_end_matches('/'),
            operation
        );
        let client = self.client.clone();
        let username = self.username.clone();
        let password = self.password.clone();

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client
                    .post(&url)
                    .basic_auth(username, Some(password))
                    .json(&request)
                    .send()
                    .await?;
                if !response.status().is_success() {
                    return Err(GatewayError::Status(response.status()));
                }

                let body: GatewayResponse = response.json().await?;
                if body.response_code != GATEWAY_SUCCESS_CODE {
                    return Err(GatewayError::Rejected {
                        code: body.response_code,
                        description: body.response_description,
                    });
                }

                Ok(body)
            })
            .await;

        match result {
            Ok(body) => Ok(body),
            Err(FailsafeError::Rejected) => Err(GatewayError::CircuitOpen),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

#[async_trait]
impl PaymentGateway for PaymentGatewayClient {
    async fn inquiry(&self, channel: &Channel, bill: &Bill) -> Result<PaymentInquiry, ServiceError> {
        let request = self.build_request(&channel.id, bill);
        let body = self.invoke("inquiry", request).await?;

        Ok(PaymentInquiry {
            payment_id: body.trace_id,
            status: body.response_description,
        })
    }

    async fn payment(&self, bill: &Bill) -> Result<PaymentReceipt, ServiceError> {
        // The gateway identifies the bill by account/biller; the channel id is
        // fixed at inquiry time and not resent here.
        let request = self.build_request("", bill);
        let body = self.invoke("payment", request).await?;

        Ok(PaymentReceipt {
            fee: body.third_party_info.admin_fee_minor_units(),
            reference: body.third_party_info.reference_number,
            status: body.response_description,
        })
    }
}
