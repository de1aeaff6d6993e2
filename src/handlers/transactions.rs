use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;

use crate::domain::AuthUser;
use crate::error::AppError;
use crate::response;
use crate::services::transactions::ListRequest;
use crate::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(req): Query<ListRequest>,
) -> Result<impl IntoResponse, AppError> {
    let txs = state.transactions.list(&user, req).await?;
    Ok(response::ok(txs))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state.transactions.get(id).await?;
    Ok(response::ok(tx))
}
