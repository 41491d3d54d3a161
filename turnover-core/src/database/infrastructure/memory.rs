//! In-memory store implementing every repository port.
//!
//! Used by unit tests and by downstream route tests. Each collection sits
//! behind its own mutex, so single-document operations are atomic while
//! nothing spans collections, matching the production store's guarantees.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use turnover_model::{
    Booking, BookingId, BookingSource, CancelledCleaningRecord, Cleaning,
    CleaningId, CleaningStatus, LinenOrder, LinenOrderId, LinenOrderStatus,
    Operator, OperatorId, PriceList, Property, PropertyId, SyncExclusion,
    ExclusionId,
};
use uuid::Uuid;

use crate::database::ports::{
    Page, PageRequest,
    bookings::{BookingsRepository, NewBooking},
    cancellations::{CancelledCleaningsRepository, NewCancelledCleaningRecord},
    cleanings::{CleaningFilter, CleaningPatch, CleaningsRepository, NewCleaning},
    exclusions::{NewSyncExclusion, SyncExclusionsRepository},
    inventory::InventoryRepository,
    linen_orders::{LinenOrderFilter, LinenOrdersRepository, NewLinenOrder},
    operators::OperatorsRepository,
    properties::PropertiesRepository,
};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct InMemoryTurnoverStore {
    properties: Mutex<HashMap<PropertyId, Property>>,
    bookings: Mutex<BTreeMap<BookingId, Booking>>,
    cleanings: Mutex<BTreeMap<CleaningId, Cleaning>>,
    orders: Mutex<BTreeMap<LinenOrderId, LinenOrder>>,
    exclusions: Mutex<Vec<SyncExclusion>>,
    cancellations: Mutex<Vec<CancelledCleaningRecord>>,
    operators: Mutex<BTreeMap<OperatorId, Operator>>,
    prices: Mutex<PriceList>,
}

impl InMemoryTurnoverStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_property(&self, property: Property) {
        self.properties.lock().await.insert(property.id, property);
    }

    pub async fn remove_property(&self, id: PropertyId) {
        self.properties.lock().await.remove(&id);
    }

    pub async fn put_operator(&self, operator: Operator) {
        self.operators.lock().await.insert(operator.id, operator);
    }

    pub async fn set_prices(&self, prices: PriceList) {
        *self.prices.lock().await = prices;
    }

    /// Store a cleaning verbatim, bypassing `insert` defaults.
    pub async fn put_cleaning(&self, cleaning: Cleaning) {
        self.cleanings.lock().await.insert(cleaning.id, cleaning);
    }

    /// Store an order verbatim, bypassing `insert` defaults.
    pub async fn put_order(&self, order: LinenOrder) {
        self.orders.lock().await.insert(order.id, order);
    }

    pub async fn put_booking(&self, booking: Booking) {
        self.bookings.lock().await.insert(booking.id, booking);
    }

    pub async fn all_cleanings(&self) -> Vec<Cleaning> {
        self.cleanings.lock().await.values().cloned().collect()
    }

    pub async fn all_orders(&self) -> Vec<LinenOrder> {
        self.orders.lock().await.values().cloned().collect()
    }

    pub async fn all_exclusions(&self) -> Vec<SyncExclusion> {
        self.exclusions.lock().await.clone()
    }
}

fn page_of<K: Ord + Copy + AsRef<Uuid>, V: Clone>(
    rows: &BTreeMap<K, V>,
    page: PageRequest,
    keep: impl Fn(&V) -> bool,
) -> Page<V>
where
    V: HasId,
{
    let items: Vec<V> = rows
        .iter()
        .filter(|(key, _)| page.after.is_none_or(|after| *key.as_ref() > after))
        .map(|(_, value)| value)
        .filter(|value| keep(value))
        .take(page.limit)
        .cloned()
        .collect();
    Page::from_items(items, page.limit, V::uuid)
}

trait HasId {
    fn uuid(&self) -> Uuid;
}

impl HasId for Cleaning {
    fn uuid(&self) -> Uuid {
        self.id.to_uuid()
    }
}

impl HasId for LinenOrder {
    fn uuid(&self) -> Uuid {
        self.id.to_uuid()
    }
}

impl HasId for Booking {
    fn uuid(&self) -> Uuid {
        self.id.to_uuid()
    }
}

#[async_trait]
impl PropertiesRepository for InMemoryTurnoverStore {
    async fn get(&self, id: PropertyId) -> Result<Option<Property>> {
        Ok(self.properties.lock().await.get(&id).cloned())
    }
}

#[async_trait]
impl BookingsRepository for InMemoryTurnoverStore {
    async fn upsert(&self, booking: NewBooking) -> Result<Booking> {
        let mut bookings = self.bookings.lock().await;
        let now = Utc::now();
        if let Some(existing) = bookings.values_mut().find(|row| {
            row.source == booking.source && row.external_uid == booking.external_uid
        }) {
            existing.property_id = booking.property_id;
            existing.check_in = booking.check_in;
            existing.check_out = booking.check_out;
            existing.guests_count = booking.guests_count.or(existing.guests_count);
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let row = Booking {
            id: BookingId::new(),
            property_id: booking.property_id,
            source: booking.source,
            external_uid: booking.external_uid,
            check_in: booking.check_in,
            check_out: booking.check_out,
            guests_count: booking.guests_count,
            created_at: now,
            updated_at: now,
        };
        bookings.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get(&self, id: BookingId) -> Result<Option<Booking>> {
        Ok(self.bookings.lock().await.get(&id).cloned())
    }

    async fn list_page(&self, page: PageRequest) -> Result<Page<Booking>> {
        let bookings = self.bookings.lock().await;
        Ok(page_of(&bookings, page, |_| true))
    }

    async fn delete(&self, id: BookingId) -> Result<bool> {
        Ok(self.bookings.lock().await.remove(&id).is_some())
    }
}

#[async_trait]
impl CleaningsRepository for InMemoryTurnoverStore {
    async fn get(&self, id: CleaningId) -> Result<Option<Cleaning>> {
        Ok(self.cleanings.lock().await.get(&id).cloned())
    }

    async fn find_active_for_slot(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
    ) -> Result<Vec<Cleaning>> {
        Ok(self
            .cleanings
            .lock()
            .await
            .values()
            .filter(|c| c.property_id == property_id && c.scheduled_date == date)
            .filter(|c| c.is_active())
            .cloned()
            .collect())
    }

    async fn insert(&self, cleaning: NewCleaning) -> Result<Cleaning> {
        let now = Utc::now();
        let row = Cleaning {
            id: CleaningId::new(),
            property_id: cleaning.property_id,
            scheduled_date: cleaning.scheduled_date,
            scheduled_time: cleaning.scheduled_time,
            status: cleaning.status,
            booking_source: cleaning.booking_source,
            booking_id: cleaning.booking_id,
            operators: cleaning.operators,
            manually_modified: cleaning.manually_modified,
            original_date: None,
            price: cleaning.price,
            guests_count: cleaning.guests_count,
            cancellation_reason: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };
        self.cleanings.lock().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_if_status(
        &self,
        id: CleaningId,
        expected: &[CleaningStatus],
        patch: CleaningPatch,
    ) -> Result<Option<Cleaning>> {
        let mut cleanings = self.cleanings.lock().await;
        let Some(row) = cleanings.get_mut(&id) else {
            return Ok(None);
        };
        if !expected.contains(&row.status) {
            return Ok(None);
        }
        patch.apply(row, Utc::now());
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: CleaningId) -> Result<bool> {
        Ok(self.cleanings.lock().await.remove(&id).is_some())
    }

    async fn list_page(
        &self,
        filter: &CleaningFilter,
        page: PageRequest,
    ) -> Result<Page<Cleaning>> {
        let cleanings = self.cleanings.lock().await;
        Ok(page_of(&cleanings, page, |c| filter.matches(c)))
    }
}

#[async_trait]
impl LinenOrdersRepository for InMemoryTurnoverStore {
    async fn get(&self, id: LinenOrderId) -> Result<Option<LinenOrder>> {
        Ok(self.orders.lock().await.get(&id).cloned())
    }

    async fn find_by_cleaning(&self, cleaning_id: CleaningId) -> Result<Vec<LinenOrder>> {
        Ok(self
            .orders
            .lock()
            .await
            .values()
            .filter(|o| o.cleaning_id == Some(cleaning_id))
            .cloned()
            .collect())
    }

    async fn find_for_slot(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
    ) -> Result<Vec<LinenOrder>> {
        Ok(self
            .orders
            .lock()
            .await
            .values()
            .filter(|o| o.property_id == property_id && o.scheduled_date == date)
            .cloned()
            .collect())
    }

    async fn insert(&self, order: NewLinenOrder) -> Result<LinenOrder> {
        let now = Utc::now();
        let row = LinenOrder {
            id: LinenOrderId::new(),
            property_id: order.property_id,
            cleaning_id: order.cleaning_id,
            scheduled_date: order.scheduled_date,
            status: order.status,
            items: order.items,
            total_price_override: order.total_price_override,
            created_at: now,
            updated_at: now,
        };
        self.orders.lock().await.insert(row.id, row.clone());
        Ok(row)
    }

    async fn transition_status(
        &self,
        id: LinenOrderId,
        expected: &[LinenOrderStatus],
        to: LinenOrderStatus,
    ) -> Result<Option<LinenOrder>> {
        let mut orders = self.orders.lock().await;
        match orders.get_mut(&id) {
            Some(row) if expected.contains(&row.status) => {
                row.status = to;
                row.updated_at = Utc::now();
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn reschedule(
        &self,
        id: LinenOrderId,
        expected: &[LinenOrderStatus],
        date: NaiveDate,
    ) -> Result<Option<LinenOrder>> {
        let mut orders = self.orders.lock().await;
        match orders.get_mut(&id) {
            Some(row) if expected.contains(&row.status) => {
                row.scheduled_date = date;
                row.updated_at = Utc::now();
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn bind_cleaning(
        &self,
        id: LinenOrderId,
        cleaning_id: CleaningId,
    ) -> Result<Option<LinenOrder>> {
        let mut orders = self.orders.lock().await;
        match orders.get_mut(&id) {
            Some(row) if row.cleaning_id.is_none() => {
                row.cleaning_id = Some(cleaning_id);
                row.updated_at = Utc::now();
                Ok(Some(row.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: LinenOrderId) -> Result<bool> {
        Ok(self.orders.lock().await.remove(&id).is_some())
    }

    async fn list_page(
        &self,
        filter: &LinenOrderFilter,
        page: PageRequest,
    ) -> Result<Page<LinenOrder>> {
        let orders = self.orders.lock().await;
        Ok(page_of(&orders, page, |o| filter.matches(o)))
    }
}

#[async_trait]
impl SyncExclusionsRepository for InMemoryTurnoverStore {
    async fn append(&self, exclusion: NewSyncExclusion) -> Result<SyncExclusion> {
        let row = SyncExclusion {
            id: ExclusionId::new(),
            property_id: exclusion.property_id,
            original_date: exclusion.original_date,
            booking_source: exclusion.booking_source,
            reason: exclusion.reason,
            new_date: exclusion.new_date,
            cleaning_id: exclusion.cleaning_id,
            created_at: Utc::now(),
        };
        self.exclusions.lock().await.push(row.clone());
        Ok(row)
    }

    async fn exists(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
        source: BookingSource,
    ) -> Result<bool> {
        Ok(self.exclusions.lock().await.iter().any(|row| {
            row.property_id == property_id
                && row.original_date == date
                && row.booking_source == source
        }))
    }

    async fn list_for_property(&self, property_id: PropertyId) -> Result<Vec<SyncExclusion>> {
        Ok(self
            .exclusions
            .lock()
            .await
            .iter()
            .filter(|row| row.property_id == property_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CancelledCleaningsRepository for InMemoryTurnoverStore {
    async fn record(
        &self,
        record: NewCancelledCleaningRecord,
    ) -> Result<CancelledCleaningRecord> {
        let row = CancelledCleaningRecord {
            id: Uuid::now_v7(),
            cleaning_id: record.cleaning_id,
            property_id: record.property_id,
            scheduled_date: record.scheduled_date,
            booking_source: record.booking_source,
            kind: record.kind,
            reason: record.reason,
            new_date: record.new_date,
            recorded_by: record.recorded_by,
            recorded_at: Utc::now(),
        };
        self.cancellations.lock().await.push(row.clone());
        Ok(row)
    }

    async fn list_for_cleaning(
        &self,
        cleaning_id: CleaningId,
    ) -> Result<Vec<CancelledCleaningRecord>> {
        Ok(self
            .cancellations
            .lock()
            .await
            .iter()
            .filter(|row| row.cleaning_id == cleaning_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OperatorsRepository for InMemoryTurnoverStore {
    async fn get(&self, id: OperatorId) -> Result<Option<Operator>> {
        Ok(self.operators.lock().await.get(&id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Operator>> {
        Ok(self
            .operators
            .lock()
            .await
            .values()
            .filter(|operator| operator.is_active())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InventoryRepository for InMemoryTurnoverStore {
    async fn price_list(&self) -> Result<PriceList> {
        Ok(self.prices.lock().await.clone())
    }
}
