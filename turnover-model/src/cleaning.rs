use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::booking::BookingSource;
use crate::ids::{BookingId, CleaningId, OperatorId, PropertyId};
use crate::macros::storage_labels;

/// Cleaning lifecycle.
///
/// `Scheduled -> Assigned -> InProgress -> Completed`, with `Cancelled` as a
/// terminal side exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum CleaningStatus {
    Scheduled,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

storage_labels!(CleaningStatus, "cleaning status", {
    Scheduled => "SCHEDULED",
    Assigned => "ASSIGNED",
    InProgress => "IN_PROGRESS",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

impl CleaningStatus {
    /// Statuses from which a cleaning may still be cancelled or moved by an
    /// owner.
    pub const MUTABLE: &'static [CleaningStatus] =
        &[CleaningStatus::Scheduled, CleaningStatus::Assigned];

    pub fn is_active(&self) -> bool {
        !matches!(self, CleaningStatus::Cancelled)
    }

    pub fn is_mutable(&self) -> bool {
        Self::MUTABLE.contains(self)
    }
}

/// A turnover cleaning job for one property on one calendar date.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cleaning {
    pub id: CleaningId,
    pub property_id: PropertyId,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub status: CleaningStatus,
    pub booking_source: Option<BookingSource>,
    pub booking_id: Option<BookingId>,
    /// Assigned operators in assignment order; index 0 is the primary.
    #[cfg_attr(feature = "serde", serde(default))]
    pub operators: Vec<OperatorId>,
    pub manually_modified: bool,
    /// Date the cleaning occupied before its first move.
    pub original_date: Option<NaiveDate>,
    pub price: Decimal,
    pub guests_count: u32,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cleaning {
    pub fn primary_operator(&self) -> Option<OperatorId> {
        self.operators.first().copied()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// The date the feed originally observed for this slot.
    pub fn source_date(&self) -> NaiveDate {
        self.original_date.unwrap_or(self.scheduled_date)
    }
}
