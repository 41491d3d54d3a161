use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use turnover_model::{
    BookingId, BookingSource, Cleaning, CleaningId, CleaningStatus, OperatorId,
    PropertyId,
};

use super::{Page, PageRequest};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewCleaning {
    pub property_id: PropertyId,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub status: CleaningStatus,
    pub booking_source: Option<BookingSource>,
    pub booking_id: Option<BookingId>,
    pub operators: Vec<OperatorId>,
    pub manually_modified: bool,
    pub price: Decimal,
    pub guests_count: u32,
}

/// Field-level changes applied atomically to one cleaning.
#[derive(Debug, Clone, Default)]
pub struct CleaningPatch {
    pub status: Option<CleaningStatus>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub original_date: Option<NaiveDate>,
    pub operators: Option<Vec<OperatorId>>,
    pub booking_link: Option<(BookingSource, BookingId)>,
    pub price: Option<Decimal>,
    pub manually_modified: Option<bool>,
    pub cancellation: Option<(String, DateTime<Utc>)>,
}

impl CleaningPatch {
    /// Applies the patch to an in-memory copy. Adapters without native
    /// partial updates use this to stay consistent with the SQL adapter.
    pub fn apply(&self, cleaning: &mut Cleaning, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            cleaning.status = status;
        }
        if let Some(date) = self.scheduled_date {
            cleaning.scheduled_date = date;
        }
        if let Some(time) = self.scheduled_time {
            cleaning.scheduled_time = time;
        }
        if let Some(original) = self.original_date
            && cleaning.original_date.is_none()
        {
            cleaning.original_date = Some(original);
        }
        if let Some(operators) = &self.operators {
            cleaning.operators = operators.clone();
        }
        if let Some((source, booking_id)) = self.booking_link {
            cleaning.booking_source = Some(source);
            cleaning.booking_id = Some(booking_id);
        }
        if let Some(price) = self.price {
            cleaning.price = price;
        }
        if let Some(flag) = self.manually_modified {
            cleaning.manually_modified = flag;
        }
        if let Some((reason, at)) = &self.cancellation {
            cleaning.cancellation_reason = Some(reason.clone());
            cleaning.cancelled_at = Some(*at);
        }
        cleaning.updated_at = now;
    }
}

#[derive(Debug, Clone, Default)]
pub struct CleaningFilter {
    pub property_id: Option<PropertyId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub include_cancelled: bool,
}

impl CleaningFilter {
    pub fn active() -> Self {
        Self::default()
    }

    pub fn matches(&self, cleaning: &Cleaning) -> bool {
        if !self.include_cancelled && !cleaning.is_active() {
            return false;
        }
        if let Some(property_id) = self.property_id
            && cleaning.property_id != property_id
        {
            return false;
        }
        if let Some(from) = self.from
            && cleaning.scheduled_date < from
        {
            return false;
        }
        if let Some(to) = self.to
            && cleaning.scheduled_date > to
        {
            return false;
        }
        true
    }
}

#[async_trait]
pub trait CleaningsRepository: Send + Sync {
    async fn get(&self, id: CleaningId) -> Result<Option<Cleaning>>;

    /// Non-cancelled cleanings occupying `(property, date)`. More than one
    /// entry means a duplicate cluster.
    async fn find_active_for_slot(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
    ) -> Result<Vec<Cleaning>>;

    async fn insert(&self, cleaning: NewCleaning) -> Result<Cleaning>;

    /// Apply `patch` only while the stored status is one of `expected`.
    /// Returns `None` when the guard fails or the cleaning is gone.
    /// `original_date` in the patch is only written when none is stored.
    async fn update_if_status(
        &self,
        id: CleaningId,
        expected: &[CleaningStatus],
        patch: CleaningPatch,
    ) -> Result<Option<Cleaning>>;

    async fn delete(&self, id: CleaningId) -> Result<bool>;

    async fn list_page(
        &self,
        filter: &CleaningFilter,
        page: PageRequest,
    ) -> Result<Page<Cleaning>>;
}
