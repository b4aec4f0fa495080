use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api::rest::Identity;
use crate::error::AppError;
use crate::lifecycle::{claim, transitions};
use crate::models::request::{
    hostel_location_details, phone_has_enough_digits, DeliveryMethod, DeliveryRequest,
    RequestStatus,
};
use crate::queries;
use crate::queries::{ActiveDelivery, AvailableRequest, OwnedRequest, UserStats};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/requests", post(create_request).get(list_available))
        .route("/api/requests/:id/accept", patch(accept_request))
        .route("/api/requests/:id/complete", post(complete_request))
        .route("/api/requests/:id/cancel", patch(cancel_request))
        .route("/api/my-requests", get(my_requests))
        .route("/api/my-deliveries", get(my_deliveries))
        .route("/api/my-stats", get(my_stats))
}

#[derive(Deserialize)]
pub struct CreateRequestPayload {
    pub item_description: String,
    pub pickup_location: String,
    pub requester_phone: String,
    pub delivery_method: DeliveryMethod,
    pub hostel_type: Option<String>,
    pub hostel_block: Option<String>,
    pub hostel_room: Option<String>,
    pub campus_location: Option<String>,
    pub special_instructions: Option<String>,
    pub estimated_price: Option<f64>,
}

#[derive(Deserialize)]
pub struct CompleteRequestPayload {
    pub otp: String,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

/// Builds the denormalized destination string, enforcing that the fields
/// present match the chosen delivery method.
fn location_details(payload: &CreateRequestPayload) -> Result<String, AppError> {
    match payload.delivery_method {
        DeliveryMethod::Hostel => {
            let hostel_type = required(&payload.hostel_type, "hostel_type")?;
            let block = required(&payload.hostel_block, "hostel_block")?;
            let room = required(&payload.hostel_room, "hostel_room")?;
            Ok(hostel_location_details(hostel_type, block, room))
        }
        DeliveryMethod::Campus => {
            let location = required(&payload.campus_location, "campus_location")?;
            Ok(location.to_string())
        }
    }
}

async fn create_request(
    State(state): State<Arc<AppState>>,
    Identity(requester_id): Identity,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let item_description = payload.item_description.trim();
    if item_description.len() < 3 {
        return Err(AppError::Validation(
            "item_description must be at least 3 characters".to_string(),
        ));
    }

    let pickup_location = payload.pickup_location.trim();
    if pickup_location.len() < 3 {
        return Err(AppError::Validation(
            "pickup_location must be at least 3 characters".to_string(),
        ));
    }

    if !phone_has_enough_digits(&payload.requester_phone) {
        return Err(AppError::Validation(
            "requester_phone must contain at least 10 digits".to_string(),
        ));
    }

    if let Some(price) = payload.estimated_price {
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::Validation(
                "estimated_price must be a non-negative number".to_string(),
            ));
        }
    }

    let delivery_location_details = location_details(&payload)?;

    let request = DeliveryRequest {
        id: Uuid::new_v4(),
        requester_id,
        deliverer_id: None,
        item_description: item_description.to_string(),
        pickup_location: pickup_location.to_string(),
        delivery_method: payload.delivery_method,
        delivery_location_details,
        requester_phone: payload.requester_phone.trim().to_string(),
        estimated_price: payload.estimated_price,
        special_instructions: payload
            .special_instructions
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        otp: None,
        status: RequestStatus::Pending,
        created_at: Utc::now(),
    };

    state.requests.create(request.clone());
    state.metrics.requests_created_total.inc();
    state.metrics.open_requests.inc();
    info!(request_id = %request.id, requester_id = %requester_id, "delivery request created");

    Ok(Json(request))
}

async fn list_available(
    State(state): State<Arc<AppState>>,
    Identity(caller_id): Identity,
) -> Json<Vec<AvailableRequest>> {
    Json(queries::list_available(&state.requests, caller_id))
}

async fn accept_request(
    State(state): State<Arc<AppState>>,
    Identity(deliverer_id): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let updated = claim::accept(&state, id, deliverer_id)?;
    Ok(Json(updated))
}

async fn complete_request(
    State(state): State<Arc<AppState>>,
    Identity(deliverer_id): Identity,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteRequestPayload>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let updated = transitions::complete(&state, id, deliverer_id, payload.otp.trim())?;
    Ok(Json(updated))
}

async fn cancel_request(
    State(state): State<Arc<AppState>>,
    Identity(caller_id): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryRequest>, AppError> {
    let updated = transitions::cancel(&state, id, caller_id)?;
    Ok(Json(updated))
}

async fn my_requests(
    State(state): State<Arc<AppState>>,
    Identity(requester_id): Identity,
) -> Json<Vec<OwnedRequest>> {
    Json(queries::list_mine(&state.requests, requester_id))
}

async fn my_deliveries(
    State(state): State<Arc<AppState>>,
    Identity(deliverer_id): Identity,
) -> Json<Vec<ActiveDelivery>> {
    Json(queries::list_claimed(&state.requests, deliverer_id))
}

async fn my_stats(
    State(state): State<Arc<AppState>>,
    Identity(user_id): Identity,
) -> Json<UserStats> {
    Json(queries::stats(&state.requests, user_id))
}
