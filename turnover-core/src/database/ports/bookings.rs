use async_trait::async_trait;
use chrono::NaiveDate;
use turnover_model::{Booking, BookingId, BookingSource, PropertyId};

use super::{Page, PageRequest};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub property_id: PropertyId,
    pub source: BookingSource,
    pub external_uid: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests_count: Option<u32>,
}

#[async_trait]
pub trait BookingsRepository: Send + Sync {
    /// Insert or refresh the booking identified by `(source, external_uid)`.
    /// Dates and property follow the latest observation; an existing guest
    /// count is kept when the new observation carries none.
    async fn upsert(&self, booking: NewBooking) -> Result<Booking>;

    async fn get(&self, id: BookingId) -> Result<Option<Booking>>;

    async fn list_page(&self, page: PageRequest) -> Result<Page<Booking>>;

    async fn delete(&self, id: BookingId) -> Result<bool>;
}
