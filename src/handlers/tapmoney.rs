use axum::{extract::State, response::IntoResponse, Extension, Json};

use crate::domain::AuthUser;
use crate::error::AppError;
use crate::response;
use crate::services::tapmoney::{InquiryRequest, PaymentRequest};
use crate::validation;
use crate::AppState;

pub async fn inquiry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<InquiryRequest>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_card_number(&req.card_number)?;
    validation::validate_account_number("source_account", &req.source_account)?;
    validation::validate_amount(
        "amount",
        req.amount,
        validation::TAPMONEY_AMOUNT_MIN,
        validation::TAPMONEY_AMOUNT_MAX,
    )?;

    let res = state.tapmoney.inquiry(&user, req).await?;
    Ok(response::ok(res))
}

pub async fn payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<PaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_note(&req.note)?;

    let res = state.tapmoney.payment(&user, req).await?;
    Ok(response::ok(res))
}
