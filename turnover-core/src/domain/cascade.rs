//! Manual lifecycle operations on a cleaning and their cascade to the sync
//! ledger and bound linen orders.
//!
//! Ordering per cascade: tombstone first, then the cleaning write, then the
//! orders. Nothing is rolled back; every step re-reads state, so a retry of a
//! partially applied cascade finishes the remaining work.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use turnover_model::{
    Cleaning, CleaningId, CleaningStatus, ExclusionReason, LinenOrder, LinenOrderId,
    LinenOrderStatus, Property,
};

use super::access::Actor;
use super::exclusions::ExclusionLedger;
use super::notifications::{NotificationDispatcher, NotificationKind, notify_operators};
use crate::application::TurnoverUnitOfWork;
use crate::database::ports::{
    cancellations::NewCancelledCleaningRecord, cleanings::CleaningPatch,
};
use crate::error::{Result, TurnoverError};

const ADMIN_CANCELLABLE: &[CleaningStatus] = &[
    CleaningStatus::Scheduled,
    CleaningStatus::Assigned,
    CleaningStatus::InProgress,
];

/// Per-order results of a cascade step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderCascade {
    /// Orders cancelled or rescheduled by this call.
    pub changed: usize,
    /// Orders already dispatched, left as they are.
    pub untouched: usize,
    /// Orders already cancelled before this call.
    pub already_cancelled: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancelOutcome {
    pub cleaning: Cleaning,
    pub tombstone_written: bool,
    /// The cleaning was already cancelled; only the order cascade ran.
    pub retried: bool,
    pub orders_cancelled: usize,
    pub orders_untouched: usize,
    pub orders_already_cancelled: usize,
    pub orders_failed: usize,
    pub notifications_sent: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub cleaning: Cleaning,
    pub previous_date: NaiveDate,
    pub tombstone_written: bool,
    pub orders_rescheduled: usize,
    pub orders_untouched: usize,
    pub orders_failed: usize,
    pub notifications_sent: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub cleaning_id: CleaningId,
    pub tombstone_written: bool,
    pub orders_cancelled: usize,
    pub orders_untouched: usize,
    pub orders_failed: usize,
}

#[derive(Clone)]
pub struct CascadeManager {
    uow: Arc<TurnoverUnitOfWork>,
    ledger: ExclusionLedger,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl std::fmt::Debug for CascadeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeManager").finish_non_exhaustive()
    }
}

impl CascadeManager {
    pub fn new(uow: Arc<TurnoverUnitOfWork>, notifier: Arc<dyn NotificationDispatcher>) -> Self {
        Self {
            ledger: ExclusionLedger::new(uow.exclusions.clone()),
            uow,
            notifier,
        }
    }

    pub async fn cancel(
        &self,
        id: CleaningId,
        reason: &str,
        actor: &Actor,
    ) -> Result<CancelOutcome> {
        let (cleaning, property) = self.load(id).await?;
        actor.authorize_for(&property)?;

        if cleaning.status == CleaningStatus::Cancelled {
            return self.finish_cancel(cleaning, false, true).await;
        }
        let allowed = cancellable_from(&cleaning, actor)?;

        let mut tombstone_written = false;
        if let Some(source) = cleaning.booking_source {
            let date = cleaning.source_date();
            self.ledger
                .record_exclusion(
                    property.id,
                    date,
                    source,
                    ExclusionReason::Cancelled,
                    Some(cleaning.id),
                    None,
                )
                .await?;
            self.uow
                .cancellations
                .record(NewCancelledCleaningRecord {
                    cleaning_id: cleaning.id,
                    property_id: property.id,
                    scheduled_date: cleaning.scheduled_date,
                    booking_source: Some(source),
                    kind: ExclusionReason::Cancelled,
                    reason: reason.to_string(),
                    new_date: None,
                    recorded_by: actor.id(),
                })
                .await?;
            tombstone_written = true;
        }

        let patch = CleaningPatch {
            status: Some(CleaningStatus::Cancelled),
            cancellation: Some((reason.to_string(), Utc::now())),
            ..CleaningPatch::default()
        };
        let cancelled = match self
            .uow
            .cleanings
            .update_if_status(cleaning.id, allowed, patch)
            .await?
        {
            Some(cancelled) => cancelled,
            None => {
                // Someone else got there first; a concurrent cancel is fine.
                let current = self.reload(cleaning.id).await?;
                if current.status != CleaningStatus::Cancelled {
                    return Err(TurnoverError::Conflict(format!(
                        "cleaning {} changed to {} during cancel",
                        current.id, current.status
                    )));
                }
                return self.finish_cancel(current, tombstone_written, true).await;
            }
        };

        info!(
            cleaning_id = %cancelled.id,
            property_id = %cancelled.property_id,
            before = %cleaning.status,
            actor = %actor.id(),
            "cleaning cancelled"
        );
        self.finish_cancel(cancelled, tombstone_written, false).await
    }

    async fn finish_cancel(
        &self,
        cleaning: Cleaning,
        tombstone_written: bool,
        retried: bool,
    ) -> Result<CancelOutcome> {
        let orders = self.cancel_bound_orders(&cleaning).await?;
        let notifications_sent = if retried {
            0
        } else {
            notify_operators(
                self.notifier.as_ref(),
                NotificationKind::Cancelled,
                &cleaning.operators,
                &cleaning,
                cleaning.cancellation_reason.as_deref(),
            )
            .await
        };

        if orders.failed > 0 {
            warn!(
                cleaning_id = %cleaning.id,
                failed = orders.failed,
                "cancel cascade left orders unprocessed"
            );
        }

        Ok(CancelOutcome {
            cleaning,
            tombstone_written,
            retried,
            orders_cancelled: orders.changed,
            orders_untouched: orders.untouched,
            orders_already_cancelled: orders.already_cancelled,
            orders_failed: orders.failed,
            notifications_sent,
        })
    }

    /// Move a cleaning to `new_date`, optionally changing its time. Moving to
    /// the date it already has with no new time is a no-op apart from
    /// re-running the order reschedule.
    pub async fn move_cleaning(
        &self,
        id: CleaningId,
        new_date: NaiveDate,
        new_time: Option<NaiveTime>,
        actor: &Actor,
    ) -> Result<MoveOutcome> {
        let (cleaning, property) = self.load(id).await?;
        actor.authorize_for(&property)?;

        if !cleaning.status.is_mutable() {
            return Err(TurnoverError::InvalidState(format!(
                "cannot move a cleaning in status {}",
                cleaning.status
            )));
        }

        let previous_date = cleaning.scheduled_date;
        let date_changed = new_date != previous_date;
        let time_changed = new_time.is_some_and(|time| time != cleaning.scheduled_time);

        if !date_changed && !time_changed {
            let orders = self.reschedule_bound_orders(&cleaning, previous_date).await?;
            return Ok(MoveOutcome {
                cleaning,
                previous_date,
                tombstone_written: false,
                orders_rescheduled: orders.changed,
                orders_untouched: orders.untouched,
                orders_failed: orders.failed,
                notifications_sent: 0,
            });
        }

        if date_changed {
            let occupied = self
                .uow
                .cleanings
                .find_active_for_slot(property.id, new_date)
                .await?
                .into_iter()
                .any(|other| other.id != cleaning.id);
            if occupied {
                return Err(TurnoverError::Conflict(format!(
                    "property {} already has a cleaning on {new_date}",
                    property.id
                )));
            }
        }

        let mut tombstone_written = false;
        if date_changed && let Some(source) = cleaning.booking_source {
            self.ledger
                .record_exclusion(
                    property.id,
                    previous_date,
                    source,
                    ExclusionReason::Moved,
                    Some(cleaning.id),
                    Some(new_date),
                )
                .await?;
            self.uow
                .cancellations
                .record(NewCancelledCleaningRecord {
                    cleaning_id: cleaning.id,
                    property_id: property.id,
                    scheduled_date: previous_date,
                    booking_source: Some(source),
                    kind: ExclusionReason::Moved,
                    reason: format!("moved to {new_date}"),
                    new_date: Some(new_date),
                    recorded_by: actor.id(),
                })
                .await?;
            tombstone_written = true;
        }

        let patch = CleaningPatch {
            scheduled_date: date_changed.then_some(new_date),
            scheduled_time: new_time,
            original_date: date_changed.then_some(previous_date),
            manually_modified: Some(true),
            ..CleaningPatch::default()
        };
        let moved = self
            .uow
            .cleanings
            .update_if_status(cleaning.id, CleaningStatus::MUTABLE, patch)
            .await?
            .ok_or_else(|| {
                TurnoverError::Conflict(format!(
                    "cleaning {} left a movable status during move",
                    cleaning.id
                ))
            })?;

        info!(
            cleaning_id = %moved.id,
            from = %previous_date,
            to = %moved.scheduled_date,
            time = %moved.scheduled_time,
            actor = %actor.id(),
            "cleaning moved"
        );

        let orders = self.reschedule_bound_orders(&moved, previous_date).await?;
        let detail = format!("{} {}", moved.scheduled_date, moved.scheduled_time);
        let notifications_sent = notify_operators(
            self.notifier.as_ref(),
            NotificationKind::Moved,
            &moved.operators,
            &moved,
            Some(&detail),
        )
        .await;

        Ok(MoveOutcome {
            cleaning: moved,
            previous_date,
            tombstone_written,
            orders_rescheduled: orders.changed,
            orders_untouched: orders.untouched,
            orders_failed: orders.failed,
            notifications_sent,
        })
    }

    /// Admin hard delete. Source-linked cleanings leave a DELETED tombstone.
    pub async fn force_delete(&self, id: CleaningId, actor: &Actor) -> Result<DeleteOutcome> {
        let (cleaning, property) = self.load(id).await?;
        actor.require_admin()?;

        let mut tombstone_written = false;
        if let Some(source) = cleaning.booking_source {
            self.ledger
                .record_exclusion(
                    property.id,
                    cleaning.source_date(),
                    source,
                    ExclusionReason::Deleted,
                    Some(cleaning.id),
                    None,
                )
                .await?;
            self.uow
                .cancellations
                .record(NewCancelledCleaningRecord {
                    cleaning_id: cleaning.id,
                    property_id: property.id,
                    scheduled_date: cleaning.scheduled_date,
                    booking_source: Some(source),
                    kind: ExclusionReason::Deleted,
                    reason: "deleted by administrator".into(),
                    new_date: None,
                    recorded_by: actor.id(),
                })
                .await?;
            tombstone_written = true;
        }

        let orders = self.cancel_bound_orders(&cleaning).await?;
        let deleted = self.uow.cleanings.delete(cleaning.id).await?;
        if deleted && cleaning.is_active() {
            notify_operators(
                self.notifier.as_ref(),
                NotificationKind::Cancelled,
                &cleaning.operators,
                &cleaning,
                Some("deleted"),
            )
            .await;
        }

        info!(
            cleaning_id = %cleaning.id,
            status = %cleaning.status,
            actor = %actor.id(),
            "cleaning force-deleted"
        );

        Ok(DeleteOutcome {
            cleaning_id: cleaning.id,
            tombstone_written,
            orders_cancelled: orders.changed,
            orders_untouched: orders.untouched,
            orders_failed: orders.failed,
        })
    }

    async fn load(&self, id: CleaningId) -> Result<(Cleaning, Property)> {
        let cleaning = self.reload(id).await?;
        let property = self
            .uow
            .properties
            .get(cleaning.property_id)
            .await?
            .ok_or_else(|| TurnoverError::not_found("property", cleaning.property_id))?;
        Ok((cleaning, property))
    }

    async fn reload(&self, id: CleaningId) -> Result<Cleaning> {
        self.uow
            .cleanings
            .get(id)
            .await?
            .ok_or_else(|| TurnoverError::not_found("cleaning", id))
    }

    /// Orders bound by id, plus legacy unbound rows on `date`.
    async fn bound_orders(&self, cleaning: &Cleaning, date: NaiveDate) -> Result<Vec<LinenOrder>> {
        let mut orders: BTreeMap<LinenOrderId, LinenOrder> = BTreeMap::new();
        for order in self.uow.linen_orders.find_by_cleaning(cleaning.id).await? {
            orders.insert(order.id, order);
        }
        for order in self
            .uow
            .linen_orders
            .find_for_slot(cleaning.property_id, date)
            .await?
        {
            if order.is_bound_to(cleaning.id, cleaning.property_id, date) {
                orders.insert(order.id, order);
            }
        }
        Ok(orders.into_values().collect())
    }

    async fn cancel_bound_orders(&self, cleaning: &Cleaning) -> Result<OrderCascade> {
        let mut tally = OrderCascade::default();
        for order in self.bound_orders(cleaning, cleaning.scheduled_date).await? {
            if order.status == LinenOrderStatus::Cancelled {
                tally.already_cancelled += 1;
                continue;
            }
            if !order.status.is_cancellable() {
                tally.untouched += 1;
                continue;
            }
            match self
                .uow
                .linen_orders
                .transition_status(
                    order.id,
                    LinenOrderStatus::NOT_DISPATCHED,
                    LinenOrderStatus::Cancelled,
                )
                .await
            {
                Ok(Some(_)) => {
                    tally.changed += 1;
                    info!(order_id = %order.id, before = %order.status, "linen order cancelled");
                }
                // Dispatched or cancelled between read and write.
                Ok(None) => tally.untouched += 1,
                Err(err) => {
                    tally.failed += 1;
                    warn!(order_id = %order.id, error = %err, "linen order cancel failed");
                }
            }
        }
        Ok(tally)
    }

    async fn reschedule_bound_orders(
        &self,
        cleaning: &Cleaning,
        previous_date: NaiveDate,
    ) -> Result<OrderCascade> {
        let mut tally = OrderCascade::default();
        for order in self.bound_orders(cleaning, previous_date).await? {
            if order.status == LinenOrderStatus::Cancelled {
                tally.already_cancelled += 1;
                continue;
            }
            if order.scheduled_date == cleaning.scheduled_date {
                continue;
            }
            if !order.status.is_cancellable() {
                tally.untouched += 1;
                continue;
            }
            match self
                .uow
                .linen_orders
                .reschedule(
                    order.id,
                    LinenOrderStatus::NOT_DISPATCHED,
                    cleaning.scheduled_date,
                )
                .await
            {
                Ok(Some(_)) => {
                    tally.changed += 1;
                    info!(
                        order_id = %order.id,
                        from = %order.scheduled_date,
                        to = %cleaning.scheduled_date,
                        "linen order rescheduled"
                    );
                }
                Ok(None) => tally.untouched += 1,
                Err(err) => {
                    tally.failed += 1;
                    warn!(order_id = %order.id, error = %err, "linen order reschedule failed");
                }
            }
        }
        Ok(tally)
    }
}

/// Statuses the cancel CAS may start from for this actor.
fn cancellable_from(cleaning: &Cleaning, actor: &Actor) -> Result<&'static [CleaningStatus]> {
    match cleaning.status {
        CleaningStatus::Scheduled | CleaningStatus::Assigned => {
            Ok(if actor.is_admin() {
                ADMIN_CANCELLABLE
            } else {
                CleaningStatus::MUTABLE
            })
        }
        CleaningStatus::InProgress if actor.is_admin() => Ok(ADMIN_CANCELLABLE),
        status => Err(TurnoverError::InvalidState(format!(
            "cannot cancel a cleaning in status {status}"
        ))),
    }
}
