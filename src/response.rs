//! Uniform response envelope shared by every endpoint.

use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub name: String,
    pub message: String,
}

/// `{"success": …, "data": …, "errors": …, "serverTime": …}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorBody>,
    #[serde(rename = "serverTime")]
    pub server_time: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            errors: None,
            server_time: Utc::now().timestamp_millis(),
        }
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            errors: Some(ErrorBody {
                name: name.into(),
                message: message.into(),
            }),
            server_time: Utc::now().timestamp_millis(),
        }
    }
}

/// Shortcut for handlers: 200 with a success envelope.
pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::ok(data)))
}
