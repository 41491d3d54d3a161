//! Domain services operating over the unit of work.

pub mod access;
/// Operator assignment and candidate ranking.
pub mod assignment;
pub mod audit;
pub mod cascade;
pub mod exclusions;
pub mod linen;
pub mod notifications;
/// Booking feed reconciliation.
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;
