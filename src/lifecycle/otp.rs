use rand::Rng;

use crate::error::AppError;
use crate::models::request::DeliveryRequest;

pub const OTP_LEN: usize = 4;

/// Mints a fresh handoff code, uniform over 0000-9999. Codes are scoped to
/// a single request, so collisions across requests are fine.
pub fn generate() -> String {
    let code: u32 = rand::rng().random_range(0..10_000);
    format!("{code:04}")
}

/// Checks a submitted code against the request's active one. Leading zeros
/// are significant: the comparison is over the exact 4-character string.
/// Verification never mutates; the code is consumed only by the completed
/// transition itself.
pub fn verify(request: &DeliveryRequest, submitted: &str) -> Result<(), AppError> {
    match request.otp.as_deref() {
        Some(active) if active == submitted => Ok(()),
        _ => Err(AppError::InvalidOtp),
    }
}
