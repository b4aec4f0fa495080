use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::request::{DeliveryRequest, RequestStatus};
use crate::store::RequestStore;

/// What a prospective deliverer sees while browsing open jobs.
#[derive(Debug, Serialize)]
pub struct AvailableRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub item_description: String,
    pub pickup_location: String,
    pub delivery_location_details: String,
    pub estimated_price: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A requester's view of their own request. This is the only projection
/// that ever exposes the handoff code, and only while the delivery is
/// in progress.
#[derive(Debug, Serialize)]
pub struct OwnedRequest {
    pub id: Uuid,
    pub item_description: String,
    pub delivery_location_details: String,
    pub status: RequestStatus,
    pub deliverer_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A deliverer's view of a claimed job. Carries the requester's contact
/// details for the handoff, never the code.
#[derive(Debug, Serialize)]
pub struct ActiveDelivery {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub item_description: String,
    pub pickup_location: String,
    pub delivery_location_details: String,
    pub requester_phone: String,
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UserStats {
    pub requests_created: usize,
    pub deliveries_completed: usize,
}

fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    items
}

/// Pending requests a deliverer could claim. A requester never sees their
/// own job as claimable.
pub fn list_available(store: &RequestStore, caller_id: Uuid) -> Vec<AvailableRequest> {
    let items = store
        .snapshot()
        .into_iter()
        .filter(|req| req.status == RequestStatus::Pending && req.requester_id != caller_id)
        .map(|req| AvailableRequest {
            id: req.id,
            requester_id: req.requester_id,
            item_description: req.item_description,
            pickup_location: req.pickup_location,
            delivery_location_details: req.delivery_location_details,
            estimated_price: req.estimated_price,
            created_at: req.created_at,
        })
        .collect();

    newest_first(items, |req| req.created_at)
}

pub fn list_mine(store: &RequestStore, requester_id: Uuid) -> Vec<OwnedRequest> {
    let items = store
        .snapshot()
        .into_iter()
        .filter(|req| req.requester_id == requester_id)
        .map(owned_view)
        .collect();

    newest_first(items, |req| req.created_at)
}

fn owned_view(req: DeliveryRequest) -> OwnedRequest {
    let otp = if req.status == RequestStatus::InProgress {
        req.otp
    } else {
        None
    };

    OwnedRequest {
        id: req.id,
        item_description: req.item_description,
        delivery_location_details: req.delivery_location_details,
        status: req.status,
        deliverer_id: req.deliverer_id,
        otp,
        created_at: req.created_at,
    }
}

/// The caller's active (claimed, not yet handed off) deliveries.
pub fn list_claimed(store: &RequestStore, deliverer_id: Uuid) -> Vec<ActiveDelivery> {
    let items = store
        .snapshot()
        .into_iter()
        .filter(|req| {
            req.status == RequestStatus::InProgress && req.deliverer_id == Some(deliverer_id)
        })
        .map(|req| ActiveDelivery {
            id: req.id,
            requester_id: req.requester_id,
            item_description: req.item_description,
            pickup_location: req.pickup_location,
            delivery_location_details: req.delivery_location_details,
            requester_phone: req.requester_phone,
            special_instructions: req.special_instructions,
            created_at: req.created_at,
        })
        .collect();

    newest_first(items, |req| req.created_at)
}

pub fn stats(store: &RequestStore, user_id: Uuid) -> UserStats {
    let snapshot = store.snapshot();

    UserStats {
        requests_created: snapshot
            .iter()
            .filter(|req| req.requester_id == user_id)
            .count(),
        deliveries_completed: snapshot
            .iter()
            .filter(|req| {
                req.status == RequestStatus::Completed && req.deliverer_id == Some(user_id)
            })
            .count(),
    }
}
