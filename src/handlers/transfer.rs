use axum::{extract::State, response::IntoResponse, Extension, Json};

use crate::domain::AuthUser;
use crate::error::AppError;
use crate::response;
use crate::services::transfer::{InitiateRequest, ProcessRequest};
use crate::validation;
use crate::AppState;

pub async fn initiate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<InitiateRequest>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_account_number("source_account", &req.source_account)?;
    validation::validate_account_number("destination_account", &req.destination_account)?;
    validation::validate_amount(
        "amount",
        req.amount,
        validation::TRANSFER_AMOUNT_MIN,
        validation::TRANSFER_AMOUNT_MAX,
    )?;
    validation::validate_note(&req.note)?;

    let res = state.transfers.initiate(&user, req).await?;
    Ok(response::ok(res))
}

pub async fn process(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ProcessRequest>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_note(&req.note)?;

    let res = state.transfers.process(&user, req).await?;
    Ok(response::ok(res))
}
