//! Wire-level contract of the HTTP surface: paths, envelopes and payloads.

pub mod routes;
pub mod types;

pub use types::ApiResponse;
