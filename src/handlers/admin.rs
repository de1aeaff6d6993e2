use axum::{extract::State, response::IntoResponse};

use crate::error::AppError;
use crate::response;
use crate::AppState;

/// Commit-journal rows still waiting on a ledger update. Every entry is a
/// transaction whose upstream outcome may not match the local ledger.
pub async fn reconciliation(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entries = match state.ledger.unresolved_commits().await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load unresolved commit journal entries");
            return Err(AppError::internal());
        }
    };

    Ok(response::ok(entries))
}
