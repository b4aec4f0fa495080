use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::lifecycle::otp;
use crate::models::request::{DeliveryRequest, RequestStatus};
use crate::state::AppState;
use crate::store::CasFailure;

/// Owner cancels a request that nobody has claimed yet. Anything past
/// `pending` is out of reach; a cancel racing a claim is settled by
/// whichever conditional update lands first.
pub fn cancel(
    state: &AppState,
    request_id: Uuid,
    caller_id: Uuid,
) -> Result<DeliveryRequest, AppError> {
    let result = state
        .requests
        .update_if_status(request_id, RequestStatus::Pending, |req| {
            if req.requester_id != caller_id {
                return Err(AppError::InvalidTransition(
                    "only the requester may cancel their request".to_string(),
                ));
            }

            req.status = RequestStatus::Cancelled;
            Ok(())
        });

    match result {
        Ok(updated) => {
            state.metrics.open_requests.dec();
            info!(request_id = %request_id, "request cancelled");
            Ok(updated)
        }
        Err(CasFailure::NotFound) => Err(AppError::RequestNotFound(request_id)),
        Err(CasFailure::Conflict { actual }) => Err(AppError::InvalidTransition(format!(
            "cannot cancel a {actual} request"
        ))),
        Err(CasFailure::Vetoed(err)) => Err(err),
    }
}

/// Deliverer finishes the handoff by presenting the requester's code. The
/// deliverer check and the code check run under the same entry lock as the
/// status comparison, and a successful transition consumes the code.
pub fn complete(
    state: &AppState,
    request_id: Uuid,
    caller_id: Uuid,
    submitted_otp: &str,
) -> Result<DeliveryRequest, AppError> {
    let result = state
        .requests
        .update_if_status(request_id, RequestStatus::InProgress, |req| {
            if req.deliverer_id != Some(caller_id) {
                return Err(AppError::InvalidTransition(
                    "only the assigned deliverer may complete this request".to_string(),
                ));
            }

            otp::verify(req, submitted_otp)?;

            req.otp = None;
            req.status = RequestStatus::Completed;
            Ok(())
        });

    match result {
        Ok(updated) => {
            state
                .metrics
                .handoffs_total
                .with_label_values(&["completed"])
                .inc();
            state.metrics.open_requests.dec();
            info!(request_id = %request_id, deliverer_id = %caller_id, "delivery completed");
            Ok(updated)
        }
        Err(CasFailure::NotFound) => Err(AppError::RequestNotFound(request_id)),
        Err(CasFailure::Conflict { actual }) => Err(AppError::InvalidTransition(format!(
            "cannot complete a {actual} request"
        ))),
        Err(CasFailure::Vetoed(err)) => {
            if err == AppError::InvalidOtp {
                state
                    .metrics
                    .handoffs_total
                    .with_label_values(&["invalid_otp"])
                    .inc();
            }
            Err(err)
        }
    }
}
