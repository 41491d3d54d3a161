//! # Turnover Server
//!
//! HTTP administrative surface and CLI over `turnover-core`.

pub mod api;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
