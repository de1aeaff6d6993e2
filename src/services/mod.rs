//! Orchestration services. Each drives the two-phase transaction lifecycle
//! against the injected collaborators; none holds mutable state of its own.

pub mod tapmoney;
pub mod transactions;
pub mod transfer;

pub use tapmoney::TapMoneyService;
pub use transactions::TransactionQueryService;
pub use transfer::TransferService;

use crate::error::AppError;
use crate::ports::CbsStatusService;

/// Every money-movement call starts here: abort unless the CBS is taking
/// live transactions. No collaborator is touched after a negative answer.
pub(crate) async fn ensure_cbs_ready(cbs: &dyn CbsStatusService) -> Result<(), AppError> {
    let status = match cbs.get_status().await {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get CBS status");
            return Err(AppError::internal());
        }
    };

    if status.not_ready() {
        tracing::error!(
            is_eod = status.is_eod,
            is_stand_in = status.is_stand_in,
            "CBS is not ready for transactions"
        );
        return Err(AppError::internal());
    }

    Ok(())
}
