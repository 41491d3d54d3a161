//! Core data model definitions shared across turnover crates.
#![allow(missing_docs)]

mod macros;

pub mod booking;
pub mod cleaning;
pub mod error;
pub mod exclusion;
pub mod ids;
pub mod linen_order;
pub mod operator;
pub mod property;

// Intentionally curated re-exports for downstream consumers.
pub use booking::{Booking, BookingSource, BookingTuple};
pub use cleaning::{Cleaning, CleaningStatus};
pub use error::{ModelError, Result as ModelResult};
pub use exclusion::{CancelledCleaningRecord, ExclusionReason, SyncExclusion};
pub use ids::{
    BookingId, CleaningId, ExclusionId, LinenOrderId, OperatorId, PropertyId,
    UserId,
};
pub use linen_order::{
    GhostOrderKind, LinenOrder, LinenOrderStatus, OrderItem, PriceList,
};
pub use operator::{Operator, OperatorStatus};
pub use property::{GeoPoint, ManifestLine, Property, ServiceConfig};

pub use chrono;
pub use rust_decimal;
