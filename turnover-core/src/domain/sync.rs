//! Turns feed checkouts into cleanings, idempotently.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};
use turnover_model::{
    Booking, BookingSource, BookingTuple, Cleaning, CleaningId, CleaningStatus,
    LinenOrderId, Property, PropertyId,
};

use super::exclusions::ExclusionLedger;
use super::linen::OrderLinkageResolver;
use crate::application::TurnoverUnitOfWork;
use crate::database::ports::{
    bookings::NewBooking,
    cleanings::{CleaningPatch, NewCleaning},
};
use crate::error::Result;
use crate::settings::TurnoverSettings;

/// Statuses a cleaning can hold while it still occupies its slot.
const OCCUPYING: &[CleaningStatus] = &[
    CleaningStatus::Scheduled,
    CleaningStatus::Assigned,
    CleaningStatus::InProgress,
    CleaningStatus::Completed,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    Malformed { detail: String },
    PropertyMissing,
    PropertyInactive,
    Excluded,
    AlreadyScheduled { cleaning_id: CleaningId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum SyncDecision {
    Created {
        cleaning_id: CleaningId,
        order_id: Option<LinenOrderId>,
    },
    /// A booking link was filled in on an existing cleaning.
    Updated { cleaning_id: CleaningId },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TupleOutcome {
    pub property_id: PropertyId,
    pub date: NaiveDate,
    pub source: BookingSource,
    pub external_uid: String,
    #[serde(flatten)]
    pub decision: SyncDecision,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: usize,
    pub skipped: usize,
    pub updated: usize,
    pub orders_created: usize,
    /// Cleanings created whose order could not be resolved; the audit
    /// backfill picks these up.
    pub order_failures: usize,
    pub outcomes: Vec<TupleOutcome>,
}

impl SyncReport {
    fn push(&mut self, tuple: &BookingTuple, decision: SyncDecision) {
        match &decision {
            SyncDecision::Created { .. } => self.created += 1,
            SyncDecision::Updated { .. } => self.updated += 1,
            SyncDecision::Skipped(_) => self.skipped += 1,
        }
        self.outcomes.push(TupleOutcome {
            property_id: tuple.property_id,
            date: tuple.checkout_date(),
            source: tuple.source,
            external_uid: tuple.external_uid.clone(),
            decision,
        });
    }
}

#[derive(Clone)]
pub struct CleaningSynchronizer {
    uow: Arc<TurnoverUnitOfWork>,
    ledger: ExclusionLedger,
    resolver: OrderLinkageResolver,
    settings: TurnoverSettings,
}

impl std::fmt::Debug for CleaningSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleaningSynchronizer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CleaningSynchronizer {
    pub fn new(uow: Arc<TurnoverUnitOfWork>, settings: TurnoverSettings) -> Self {
        Self {
            ledger: ExclusionLedger::new(uow.exclusions.clone()),
            resolver: OrderLinkageResolver::new(uow.clone()),
            uow,
            settings,
        }
    }

    /// Apply a batch of feed observations. Tuples are processed in order;
    /// replaying the same batch creates nothing new.
    pub async fn reconcile(&self, tuples: &[BookingTuple]) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        for tuple in tuples {
            let decision = self.reconcile_one(tuple, &mut report).await?;
            debug!(
                property_id = %tuple.property_id,
                external_uid = %tuple.external_uid,
                decision = ?decision,
                "sync decision"
            );
            report.push(tuple, decision);
        }

        info!(
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            orders_created = report.orders_created,
            "sync pass finished"
        );
        Ok(report)
    }

    async fn reconcile_one(
        &self,
        tuple: &BookingTuple,
        report: &mut SyncReport,
    ) -> Result<SyncDecision> {
        if let Some(detail) = validate(tuple) {
            return Ok(SyncDecision::Skipped(SkipReason::Malformed { detail }));
        }
        let date = tuple.checkout_date();

        let Some(property) = self.uow.properties.get(tuple.property_id).await? else {
            return Ok(SyncDecision::Skipped(SkipReason::PropertyMissing));
        };
        if !property.active {
            return Ok(SyncDecision::Skipped(SkipReason::PropertyInactive));
        }

        let booking = self
            .uow
            .bookings
            .upsert(NewBooking {
                property_id: property.id,
                source: tuple.source,
                external_uid: tuple.external_uid.trim().to_string(),
                check_in: tuple.check_in.date(),
                check_out: date,
                guests_count: None,
            })
            .await?;

        if self.ledger.is_excluded(property.id, date, tuple.source).await? {
            return Ok(SyncDecision::Skipped(SkipReason::Excluded));
        }

        let existing = self
            .uow
            .cleanings
            .find_active_for_slot(property.id, date)
            .await?;
        if let Some(current) = existing.first() {
            return self.link_existing(current, &booking).await;
        }

        let cleaning = self.create_cleaning(&property, &booking, date).await?;
        let order_id = match self.resolver.ensure_order_for(&cleaning, &property).await {
            Ok(Some(resolution)) => {
                if resolution.is_created() {
                    report.orders_created += 1;
                }
                Some(resolution.order().id)
            }
            Ok(None) => None,
            Err(err) => {
                report.order_failures += 1;
                warn!(
                    cleaning_id = %cleaning.id,
                    error = %err,
                    "linen order resolution failed after cleaning creation"
                );
                None
            }
        };

        Ok(SyncDecision::Created {
            cleaning_id: cleaning.id,
            order_id,
        })
    }

    /// The only write allowed on an existing cleaning: fill a missing booking
    /// link, and never on a manually edited one.
    async fn link_existing(&self, current: &Cleaning, booking: &Booking) -> Result<SyncDecision> {
        let linkable = !current.manually_modified
            && current.booking_id.is_none()
            && current
                .booking_source
                .is_none_or(|source| source == booking.source);
        if !linkable {
            return Ok(SyncDecision::Skipped(SkipReason::AlreadyScheduled {
                cleaning_id: current.id,
            }));
        }

        let patch = CleaningPatch {
            booking_link: Some((booking.source, booking.id)),
            ..CleaningPatch::default()
        };
        match self
            .uow
            .cleanings
            .update_if_status(current.id, OCCUPYING, patch)
            .await?
        {
            Some(updated) => {
                info!(
                    cleaning_id = %updated.id,
                    booking_id = %booking.id,
                    "filled missing booking link"
                );
                Ok(SyncDecision::Updated {
                    cleaning_id: updated.id,
                })
            }
            None => Ok(SyncDecision::Skipped(SkipReason::AlreadyScheduled {
                cleaning_id: current.id,
            })),
        }
    }

    async fn create_cleaning(
        &self,
        property: &Property,
        booking: &Booking,
        date: NaiveDate,
    ) -> Result<Cleaning> {
        let cleaning = self
            .uow
            .cleanings
            .insert(NewCleaning {
                property_id: property.id,
                scheduled_date: date,
                scheduled_time: property
                    .checkout_time
                    .unwrap_or(self.settings.default_checkout_time),
                status: CleaningStatus::Scheduled,
                booking_source: Some(booking.source),
                booking_id: Some(booking.id),
                operators: Vec::new(),
                manually_modified: false,
                price: property.cleaning_base_price,
                guests_count: booking.guests_count.unwrap_or(property.max_guests),
            })
            .await?;

        info!(
            cleaning_id = %cleaning.id,
            property_id = %property.id,
            date = %date,
            source = %booking.source,
            "cleaning created from feed"
        );
        Ok(cleaning)
    }
}

fn validate(tuple: &BookingTuple) -> Option<String> {
    if tuple.external_uid.trim().is_empty() {
        return Some("empty external uid".into());
    }
    if tuple.check_out < tuple.check_in {
        return Some(format!(
            "checkout {} precedes checkin {}",
            tuple.check_out, tuple.check_in
        ));
    }
    None
}
