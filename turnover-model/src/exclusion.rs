use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::booking::BookingSource;
use crate::ids::{CleaningId, ExclusionId, PropertyId, UserId};
use crate::macros::storage_labels;

/// Why a `(property, date, source)` slot must not be regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ExclusionReason {
    Cancelled,
    Moved,
    Deleted,
}

storage_labels!(ExclusionReason, "exclusion reason", {
    Cancelled => "CANCELLED",
    Moved => "MOVED",
    Deleted => "DELETED",
});

/// Append-only tombstone consulted by every sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncExclusion {
    pub id: ExclusionId,
    pub property_id: PropertyId,
    pub original_date: NaiveDate,
    pub booking_source: BookingSource,
    pub reason: ExclusionReason,
    /// Destination date for `Moved` entries.
    pub new_date: Option<NaiveDate>,
    pub cleaning_id: Option<CleaningId>,
    pub created_at: DateTime<Utc>,
}

/// Human-readable audit trail of a cancel, move or delete. Independent of the
/// exclusion ledger and never consulted by sync.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CancelledCleaningRecord {
    pub id: Uuid,
    pub cleaning_id: CleaningId,
    pub property_id: PropertyId,
    pub scheduled_date: NaiveDate,
    pub booking_source: Option<BookingSource>,
    pub kind: ExclusionReason,
    pub reason: String,
    pub new_date: Option<NaiveDate>,
    pub recorded_by: UserId,
    pub recorded_at: DateTime<Utc>,
}
