//! Append-only tombstones marking `(property, date, source)` slots that a
//! sync pass must never regenerate.
//!
//! Matching is by calendar date only. Callers holding a timestamp go through
//! [`ExclusionLedger::is_excluded_at`], which strips the time of day first.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;
use turnover_model::{
    BookingSource, CleaningId, ExclusionId, ExclusionReason, PropertyId, SyncExclusion,
};

use crate::database::ports::exclusions::{NewSyncExclusion, SyncExclusionsRepository};
use crate::error::Result;

#[derive(Clone)]
pub struct ExclusionLedger {
    repository: Arc<dyn SyncExclusionsRepository>,
}

impl std::fmt::Debug for ExclusionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExclusionLedger").finish_non_exhaustive()
    }
}

impl ExclusionLedger {
    pub fn new(repository: Arc<dyn SyncExclusionsRepository>) -> Self {
        Self { repository }
    }

    /// Append a tombstone. Recording an already-excluded slot again only adds
    /// a redundant entry.
    pub async fn record_exclusion(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
        source: BookingSource,
        reason: ExclusionReason,
        cleaning_id: Option<CleaningId>,
        new_date: Option<NaiveDate>,
    ) -> Result<ExclusionId> {
        let entry = self
            .repository
            .append(NewSyncExclusion {
                property_id,
                original_date: date,
                booking_source: source,
                reason,
                new_date: new_date.filter(|_| reason == ExclusionReason::Moved),
                cleaning_id,
            })
            .await?;

        info!(
            exclusion_id = %entry.id,
            property_id = %property_id,
            date = %date,
            source = %source,
            reason = %reason,
            "sync exclusion recorded"
        );
        Ok(entry.id)
    }

    pub async fn is_excluded(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
        source: BookingSource,
    ) -> Result<bool> {
        self.repository.exists(property_id, date, source).await
    }

    pub async fn is_excluded_at(
        &self,
        property_id: PropertyId,
        at: NaiveDateTime,
        source: BookingSource,
    ) -> Result<bool> {
        self.is_excluded(property_id, at.date(), source).await
    }

    pub async fn list_for_property(&self, property_id: PropertyId) -> Result<Vec<SyncExclusion>> {
        self.repository.list_for_property(property_id).await
    }
}
