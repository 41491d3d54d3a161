use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use turnover_model::{
    CleaningId, LinenOrder, LinenOrderId, LinenOrderStatus, OrderItem, PropertyId,
};

use super::{Page, PageRequest};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewLinenOrder {
    pub property_id: PropertyId,
    pub cleaning_id: Option<CleaningId>,
    pub scheduled_date: NaiveDate,
    pub status: LinenOrderStatus,
    pub items: Vec<OrderItem>,
    pub total_price_override: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct LinenOrderFilter {
    pub property_id: Option<PropertyId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub include_cancelled: bool,
}

impl LinenOrderFilter {
    pub fn matches(&self, order: &LinenOrder) -> bool {
        if !self.include_cancelled && !order.status.is_active() {
            return false;
        }
        if let Some(property_id) = self.property_id
            && order.property_id != property_id
        {
            return false;
        }
        if let Some(from) = self.from
            && order.scheduled_date < from
        {
            return false;
        }
        if let Some(to) = self.to
            && order.scheduled_date > to
        {
            return false;
        }
        true
    }
}

#[async_trait]
pub trait LinenOrdersRepository: Send + Sync {
    async fn get(&self, id: LinenOrderId) -> Result<Option<LinenOrder>>;

    /// Orders carrying `cleaning_id`, any status.
    async fn find_by_cleaning(&self, cleaning_id: CleaningId) -> Result<Vec<LinenOrder>>;

    /// Orders scheduled on `(property, date)`, bound or not, any status.
    async fn find_for_slot(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
    ) -> Result<Vec<LinenOrder>>;

    async fn insert(&self, order: NewLinenOrder) -> Result<LinenOrder>;

    /// Compare-and-set status transition.
    async fn transition_status(
        &self,
        id: LinenOrderId,
        expected: &[LinenOrderStatus],
        to: LinenOrderStatus,
    ) -> Result<Option<LinenOrder>>;

    /// Move the delivery date while the status is still one of `expected`.
    async fn reschedule(
        &self,
        id: LinenOrderId,
        expected: &[LinenOrderStatus],
        date: NaiveDate,
    ) -> Result<Option<LinenOrder>>;

    /// Attach a legacy unbound row to a cleaning. Returns `None` if the row
    /// was bound in the meantime.
    async fn bind_cleaning(
        &self,
        id: LinenOrderId,
        cleaning_id: CleaningId,
    ) -> Result<Option<LinenOrder>>;

    async fn delete(&self, id: LinenOrderId) -> Result<bool>;

    async fn list_page(
        &self,
        filter: &LinenOrderFilter,
        page: PageRequest,
    ) -> Result<Page<LinenOrder>>;
}
