use chrono::{NaiveDate, TimeDelta};
use rust_decimal::Decimal;
use serde::Serialize;
use turnover_model::{
    BookingId, BookingSource, Cleaning, CleaningId, GhostOrderKind, LinenOrderId, PropertyId,
};
use uuid::Uuid;

/// Two or more live cleanings on one `(property, date)` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateCluster {
    pub property_id: PropertyId,
    pub date: NaiveDate,
    pub cleaning_ids: Vec<CleaningId>,
    /// Set when every member carries the same booking.
    pub shared_booking_id: Option<BookingId>,
    pub shared_source: Option<BookingSource>,
    /// Milliseconds between the first and last creation timestamp.
    pub creation_spread_ms: i64,
    /// Members were created within the race window, which points at two
    /// overlapping sync passes.
    pub likely_sync_race: bool,
}

impl DuplicateCluster {
    pub(crate) fn from_members(members: &[Cleaning], race_window: TimeDelta) -> Option<Self> {
        let first = members.first()?;
        if members.len() < 2 {
            return None;
        }

        let shared_booking_id = first
            .booking_id
            .filter(|id| members.iter().all(|c| c.booking_id == Some(*id)));
        let shared_source = first
            .booking_source
            .filter(|source| members.iter().all(|c| c.booking_source == Some(*source)));

        let earliest = members.iter().map(|c| c.created_at).min()?;
        let latest = members.iter().map(|c| c.created_at).max()?;
        let spread = latest - earliest;

        Some(Self {
            property_id: first.property_id,
            date: first.scheduled_date,
            cleaning_ids: members.iter().map(|c| c.id).collect(),
            shared_booking_id,
            shared_source,
            creation_spread_ms: spread.num_milliseconds(),
            likely_sync_race: spread <= race_window,
        })
    }

    pub fn size(&self) -> usize {
        self.cleaning_ids.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanKind {
    Cleaning,
    LinenOrder,
    Booking,
}

/// A record whose property no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanRecord {
    pub kind: OrphanKind,
    pub id: Uuid,
    pub property_id: PropertyId,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GhostOrder {
    pub order_id: LinenOrderId,
    pub property_id: PropertyId,
    pub scheduled_date: NaiveDate,
    pub kind: GhostOrderKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillAction {
    WouldCreate,
    WouldBind,
    Created,
    Bound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBackfill {
    pub cleaning_id: CleaningId,
    pub scheduled_date: NaiveDate,
    pub action: BackfillAction,
    pub order_id: Option<LinenOrderId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRepair {
    pub cleaning_id: CleaningId,
    pub before: Decimal,
    pub after: Decimal,
    pub applied: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub dry_run: bool,
    pub scanned_cleanings: usize,
    pub scanned_orders: usize,
    pub scanned_bookings: usize,
    pub duplicates: Vec<DuplicateCluster>,
    pub orphans: Vec<OrphanRecord>,
    pub ghost_orders: Vec<GhostOrder>,
    pub missing_orders: Vec<OrderBackfill>,
    pub price_repairs: Vec<PriceRepair>,
    /// Repairs that failed; the pass carries on past them.
    pub errors: Vec<String>,
}

impl AuditReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
            && self.orphans.is_empty()
            && self.ghost_orders.is_empty()
            && self.missing_orders.is_empty()
            && self.price_repairs.is_empty()
            && self.errors.is_empty()
    }
}
