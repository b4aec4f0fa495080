pub mod api;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod queries;
pub mod state;
pub mod store;
