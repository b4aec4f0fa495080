use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Campus,
    Hostel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The system-of-record entity. The handoff code is deliberately excluded
/// from serialization; read projections decide who gets to see it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeliveryRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub deliverer_id: Option<Uuid>,
    pub item_description: String,
    pub pickup_location: String,
    pub delivery_method: DeliveryMethod,
    pub delivery_location_details: String,
    pub requester_phone: String,
    pub estimated_price: Option<f64>,
    pub special_instructions: Option<String>,
    #[serde(skip_serializing)]
    pub otp: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Canonical denormalized destination string for the hostel method.
pub fn hostel_location_details(hostel_type: &str, block: &str, room: &str) -> String {
    format!("{hostel_type}, {block} Block, Room {room}")
}

/// A phone field is usable if it carries at least 10 digits, whatever
/// separators the user typed around them.
pub fn phone_has_enough_digits(phone: &str) -> bool {
    phone.chars().filter(char::is_ascii_digit).count() >= 10
}
