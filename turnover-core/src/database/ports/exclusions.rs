use async_trait::async_trait;
use chrono::NaiveDate;
use turnover_model::{
    BookingSource, CleaningId, ExclusionReason, PropertyId, SyncExclusion,
};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewSyncExclusion {
    pub property_id: PropertyId,
    pub original_date: NaiveDate,
    pub booking_source: BookingSource,
    pub reason: ExclusionReason,
    pub new_date: Option<NaiveDate>,
    pub cleaning_id: Option<CleaningId>,
}

/// Append-only tombstone store. There is deliberately no update or delete.
#[async_trait]
pub trait SyncExclusionsRepository: Send + Sync {
    async fn append(&self, exclusion: NewSyncExclusion) -> Result<SyncExclusion>;

    /// Indexed point lookup on `(property, date, source)`.
    async fn exists(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
        source: BookingSource,
    ) -> Result<bool>;

    async fn list_for_property(&self, property_id: PropertyId) -> Result<Vec<SyncExclusion>>;
}
