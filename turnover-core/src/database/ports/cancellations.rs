use async_trait::async_trait;
use chrono::NaiveDate;
use turnover_model::{
    BookingSource, CancelledCleaningRecord, CleaningId, ExclusionReason,
    PropertyId, UserId,
};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewCancelledCleaningRecord {
    pub cleaning_id: CleaningId,
    pub property_id: PropertyId,
    pub scheduled_date: NaiveDate,
    pub booking_source: Option<BookingSource>,
    pub kind: ExclusionReason,
    pub reason: String,
    pub new_date: Option<NaiveDate>,
    pub recorded_by: UserId,
}

#[async_trait]
pub trait CancelledCleaningsRepository: Send + Sync {
    async fn record(
        &self,
        record: NewCancelledCleaningRecord,
    ) -> Result<CancelledCleaningRecord>;

    async fn list_for_cleaning(
        &self,
        cleaning_id: CleaningId,
    ) -> Result<Vec<CancelledCleaningRecord>>;
}
