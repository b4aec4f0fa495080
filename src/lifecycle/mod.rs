pub mod claim;
pub mod otp;
pub mod transitions;
