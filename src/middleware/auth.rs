//! Caller authentication. User endpoints carry a JWT whose subject becomes
//! the [`AuthUser`] request extension; the admin surface uses a static
//! bearer key.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::AuthUser;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req)
        .ok_or_else(|| AppError::unauthorized("Missing authorization token"))?;

    let decoded = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Token validation failed");
        AppError::unauthorized("Invalid authorization token")
    })?;

    req.extensions_mut().insert(AuthUser::new(decoded.claims.sub));
    Ok(next.run(req).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let admin_api_key = &state.config.admin_api_key;
    match auth_header {
        Some(auth) if auth == format!("Bearer {}", admin_api_key) || auth == *admin_api_key => {
            Ok(next.run(req).await)
        }
        _ => Err(AppError::unauthorized("Invalid admin credentials")),
    }
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}
