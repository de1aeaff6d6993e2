//! Core-status client: reports whether the CBS is inside an end-of-day
//! window and whether stand-in mode is active.

use async_trait::async_trait;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::Error as FailsafeError;
use serde::Deserialize;
use std::sync::Arc;

use super::{default_breaker, http_client, Breaker, CbsAuthClient, CbsError, CBS_SUCCESS_CODE};
use crate::domain::CbsStatus;
use crate::ports::{CbsStatusService, ServiceError};

#[derive(Debug, Deserialize)]
struct CbsStatusResponse {
    #[serde(rename = "statusCode")]
    status_code: String,
    #[serde(rename = "statusDescription", default)]
    status_description: String,
    #[serde(default)]
    data: CbsStatusData,
}

#[derive(Debug, Deserialize, Default)]
struct CbsStatusData {
    #[serde(rename = "systemDate", default)]
    system_date: String,
    #[serde(rename = "eodStatus", default)]
    eod_status: String,
    #[serde(rename = "standinStatus", default)]
    standin_status: String,
}

impl CbsStatusData {
    fn is_eod(&self) -> bool {
        self.eod_status == "STARTED"
    }

    fn is_stand_in(&self) -> bool {
        self.standin_status == "Y"
    }
}

pub struct CbsStatusClient {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<CbsAuthClient>,
    circuit_breaker: Breaker,
}

impl CbsStatusClient {
    pub fn new(base_url: String, auth: Arc<CbsAuthClient>) -> Self {
        Self {
            client: http_client(),
            base_url,
            auth,
            circuit_breaker: default_breaker(),
        }
    }

    async fn fetch_status(&self) -> Result<CbsStatus, CbsError> {
        let url = format!("{}/api/ref/core-status", self.base_url.trim_end_matches('/'));
        let client = self.client.clone();
        let auth = self.auth.clone();

        let result = self
            .circuit_breaker
            .call(async move {
                let token = auth.token().await?;
                let response = client.post(&url).bearer_auth(token).send().await?;
                if !response.status().is_success() {
                    return Err(CbsError::Status(response.status()));
                }

                let body: CbsStatusResponse = response.json().await?;
                if body.status_code != CBS_SUCCESS_CODE {
                    return Err(CbsError::Rejected {
                        code: body.status_code,
                        description: body.status_description,
                    });
                }

                Ok(CbsStatus {
                    system_date: body.data.system_date.clone(),
                    is_eod: body.data.is_eod(),
                    is_stand_in: body.data.is_stand_in(),
                })
            })
            .await;

        match result {
            Ok(status) => Ok(status),
            Err(FailsafeError::Rejected) => Err(CbsError::CircuitOpen),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

#[async_trait]
impl CbsStatusService for CbsStatusClient {
    async fn get_status(&self) -> Result<CbsStatus, ServiceError> {
        self.fetch_status().await.map_err(ServiceError::from)
    }
}
