pub mod bookings;
pub mod cancellations;
pub mod cleanings;
pub mod exclusions;
pub mod inventory;
pub mod linen_orders;
pub mod operators;
pub mod properties;
