use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::lifecycle::otp;
use crate::models::request::{DeliveryRequest, RequestStatus};
use crate::state::AppState;
use crate::store::CasFailure;

/// Binds a deliverer to a pending request and mints its handoff code, all
/// inside the store's per-entry critical section. Under any number of
/// racing callers exactly one wins; the rest observe `AlreadyClaimed`.
///
/// The returned request still carries the code internally; the API layer
/// never serializes it, so the deliverer cannot read it off the response.
pub fn accept(
    state: &AppState,
    request_id: Uuid,
    deliverer_id: Uuid,
) -> Result<DeliveryRequest, AppError> {
    let result = state
        .requests
        .update_if_status(request_id, RequestStatus::Pending, |req| {
            if req.requester_id == deliverer_id {
                return Err(AppError::SelfDelivery);
            }

            req.deliverer_id = Some(deliverer_id);
            req.otp = Some(otp::generate());
            req.status = RequestStatus::InProgress;
            Ok(())
        });

    match result {
        Ok(updated) => {
            state
                .metrics
                .claims_total
                .with_label_values(&["won"])
                .inc();
            info!(request_id = %request_id, deliverer_id = %deliverer_id, "request claimed");
            Ok(updated)
        }
        Err(CasFailure::NotFound) => Err(AppError::RequestNotFound(request_id)),
        Err(CasFailure::Conflict { .. }) => {
            state
                .metrics
                .claims_total
                .with_label_values(&["lost"])
                .inc();
            Err(AppError::AlreadyClaimed)
        }
        Err(CasFailure::Vetoed(err)) => {
            state
                .metrics
                .claims_total
                .with_label_values(&["rejected"])
                .inc();
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    use super::accept;
    use crate::error::AppError;
    use crate::models::request::{DeliveryMethod, DeliveryRequest, RequestStatus};
    use crate::state::AppState;

    fn seed_pending(state: &AppState, requester_id: Uuid) -> Uuid {
        state.requests.create(DeliveryRequest {
            id: Uuid::new_v4(),
            requester_id,
            deliverer_id: None,
            item_description: "Amazon Box".to_string(),
            pickup_location: "Main Gate".to_string(),
            delivery_method: DeliveryMethod::Campus,
            delivery_location_details: "Library".to_string(),
            requester_phone: "9876543210".to_string(),
            estimated_price: Some(30.0),
            special_instructions: None,
            otp: None,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        })
    }

    #[test]
    fn accept_binds_deliverer_and_mints_code() {
        let state = AppState::new();
        let id = seed_pending(&state, Uuid::new_v4());
        let deliverer = Uuid::new_v4();

        let updated = accept(&state, id, deliverer).unwrap();

        assert_eq!(updated.status, RequestStatus::InProgress);
        assert_eq!(updated.deliverer_id, Some(deliverer));
        let code = updated.otp.expect("otp minted on claim");
        assert_eq!(code.len(), 4);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn self_delivery_is_rejected_and_request_stays_pending() {
        let state = AppState::new();
        let requester = Uuid::new_v4();
        let id = seed_pending(&state, requester);

        assert_eq!(accept(&state, id, requester), Err(AppError::SelfDelivery));

        let stored = state.requests.get(id).unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert!(stored.deliverer_id.is_none());
        assert!(stored.otp.is_none());
    }

    #[test]
    fn second_claim_loses() {
        let state = AppState::new();
        let id = seed_pending(&state, Uuid::new_v4());
        let winner = Uuid::new_v4();

        accept(&state, id, winner).unwrap();

        assert_eq!(
            accept(&state, id, Uuid::new_v4()),
            Err(AppError::AlreadyClaimed)
        );
        assert_eq!(state.requests.get(id).unwrap().deliverer_id, Some(winner));
    }

    #[test]
    fn unknown_request_is_not_found() {
        let state = AppState::new();
        let id = Uuid::new_v4();

        assert_eq!(
            accept(&state, id, Uuid::new_v4()),
            Err(AppError::RequestNotFound(id))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_claims_have_exactly_one_winner() {
        let state = Arc::new(AppState::new());
        let id = seed_pending(&state, Uuid::new_v4());

        let deliverers: Vec<Uuid> = (0..32).map(|_| Uuid::new_v4()).collect();
        let mut handles = Vec::new();
        for deliverer in deliverers.clone() {
            let state = state.clone();
            handles.push(tokio::spawn(async move {
                accept(&state, id, deliverer).map(|req| req.deliverer_id)
            }));
        }

        let mut winners = Vec::new();
        let mut losses = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(bound) => winners.push(bound),
                Err(AppError::AlreadyClaimed) => losses += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(losses, deliverers.len() - 1);
        assert_eq!(state.requests.get(id).unwrap().deliverer_id, winners[0]);
    }
}
