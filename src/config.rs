use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub cbs_base_url: String,
    pub cbs_username: String,
    pub cbs_password: String,
    pub gateway_base_url: String,
    pub gateway_username: String,
    pub gateway_password: String,
    pub jwt_secret: String,
    pub admin_api_key: String,
    /// Payment channel this service bills tap-money calls against.
    pub tapmoney_channel_id: String,
    /// Biller code for tap-money card top-ups.
    pub tapmoney_biller_code: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            cbs_base_url: env::var("CBS_BASE_URL")?,
            cbs_username: env::var("CBS_USERNAME")?,
            cbs_password: env::var("CBS_PASSWORD")?,
            gateway_base_url: env::var("GATEWAY_BASE_URL")?,
            gateway_username: env::var("GATEWAY_USERNAME")?,
            gateway_password: env::var("GATEWAY_PASSWORD")?,
            jwt_secret: env::var("JWT_SECRET")?,
            admin_api_key: env::var("ADMIN_API_KEY")?,
            tapmoney_channel_id: env::var("TAPMONEY_CHANNEL_ID")
                .unwrap_or_else(|_| "01".to_string()),
            tapmoney_biller_code: env::var("TAPMONEY_BILLER_CODE")
                .unwrap_or_else(|_| "99999".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_defaults_are_overridable() {
        let config = Config {
            server_port: 3000,
            database_url: "postgres://localhost:5432/corepay".to_string(),
            cbs_base_url: "http://cbs.local".to_string(),
            cbs_username: "svc".to_string(),
            cbs_password: "secret".to_string(),
            gateway_base_url: "http://gateway.local".to_string(),
            gateway_username: "svc".to_string(),
            gateway_password: "secret".to_string(),
            jwt_secret: "jwt-secret".to_string(),
            admin_api_key: "admin-key".to_string(),
            tapmoney_channel_id: "02".to_string(),
            tapmoney_biller_code: "88888".to_string(),
        };

        assert_eq!(config.tapmoney_channel_id, "02");
        assert_eq!(config.tapmoney_biller_code, "88888");
    }
}
