//! Persistence layer: repository ports and the adapters implementing them.

pub mod infrastructure;
pub mod ports;

#[cfg(feature = "database")]
pub use infrastructure::postgres::connect;
