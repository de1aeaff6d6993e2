//! CBS sign-on. Tokens are fetched with the resource-owner password grant and
//! cached until shortly before expiry; all CBS clients share one instance.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{http_client, CbsError};

/// Refresh this many seconds before the reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 30;
const DEFAULT_EXPIRES_IN_SECS: i64 = 300;

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at > Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

pub struct CbsAuthClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    cached: RwLock<Option<CachedToken>>,
}

impl CbsAuthClient {
    pub fn new(base_url: String, username: String, password: String) -> Self {
        Self {
            client: http_client(),
            base_url,
            username,
            password,
            cached: RwLock::new(None),
        }
    }

    /// Returns a valid bearer token, reusing the cached one when possible.
    pub async fn token(&self) -> Result<String, CbsError> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh() {
                return Ok(token.value.clone());
            }
        }

        let mut guard = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = guard.as_ref() {
            if token.is_fresh() {
                return Ok(token.value.clone());
            }
        }

        let url = format!("{}/token", self.base_url.trim_end_matches('/'));
        let form = [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("grant_type", "password"),
        ];

        let response = self.client.post(&url).form(&form).send().await?;
        if !response.status().is_success() {
            return Err(CbsError::Status(response.status()));
        }

        let body: TokenResponse = response.json().await?;
        let expires_in = body.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        *guard = Some(CachedToken {
            value: body.access_token.clone(),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        });

        Ok(body.access_token)
    }
}
