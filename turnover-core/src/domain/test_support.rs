//! Fixtures shared by the domain unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use turnover_model::{
    BookingSource, BookingTuple, Cleaning, CleaningId, CleaningStatus, GeoPoint,
    LinenOrder, LinenOrderId, LinenOrderStatus, Operator, OperatorId, OperatorStatus,
    OrderItem, PriceList, Property, PropertyId, UserId,
};

use crate::application::TurnoverUnitOfWork;
use crate::database::infrastructure::memory::InMemoryTurnoverStore;

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn time(value: &str) -> NaiveTime {
    NaiveTime::parse_from_str(value, "%H:%M:%S").unwrap()
}

pub fn property() -> Property {
    Property {
        id: PropertyId::new(),
        name: "Trastevere loft".into(),
        owner_id: UserId::new(),
        active: true,
        uses_own_linen: false,
        cleaning_base_price: Decimal::new(4500, 2),
        service_configs: BTreeMap::new(),
        max_guests: 4,
        bedrooms: 2,
        bathrooms: 1,
        checkout_time: Some(time("11:00:00")),
        location: Some(GeoPoint::new(41.8893, 12.4700)),
    }
}

pub fn cleaning(property: &Property, day: &str) -> Cleaning {
    let now = Utc::now();
    Cleaning {
        id: CleaningId::new(),
        property_id: property.id,
        scheduled_date: date(day),
        scheduled_time: time("11:00:00"),
        status: CleaningStatus::Scheduled,
        booking_source: Some(BookingSource::Airbnb),
        booking_id: None,
        operators: Vec::new(),
        manually_modified: false,
        original_date: None,
        price: property.cleaning_base_price,
        guests_count: property.max_guests,
        cancellation_reason: None,
        cancelled_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn order(
    property: &Property,
    cleaning: Option<&Cleaning>,
    day: &str,
    status: LinenOrderStatus,
) -> LinenOrder {
    let now = Utc::now();
    LinenOrder {
        id: LinenOrderId::new(),
        property_id: property.id,
        cleaning_id: cleaning.map(|c| c.id),
        scheduled_date: date(day),
        status,
        items: vec![OrderItem {
            item_id: "bath_towel".into(),
            quantity: 4,
            unit_price: Some(Decimal::new(250, 2)),
        }],
        total_price_override: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn operator(name: &str, location: Option<GeoPoint>, rating: Option<f32>) -> Operator {
    Operator {
        id: OperatorId::new(),
        name: name.into(),
        status: OperatorStatus::Active,
        rating,
        last_known_location: location,
    }
}

pub fn tuple(property: &Property, checkout: &str, uid: &str) -> BookingTuple {
    let check_out = date(checkout).and_time(time("10:00:00"));
    BookingTuple {
        property_id: property.id,
        check_in: check_out - chrono::Duration::days(3),
        check_out,
        source: BookingSource::Airbnb,
        external_uid: uid.into(),
    }
}

pub fn prices() -> PriceList {
    PriceList::new()
        .with_price("double_sheet", Decimal::new(300, 2))
        .with_price("single_sheet", Decimal::new(200, 2))
        .with_price("pillowcase", Decimal::new(80, 2))
        .with_price("bath_towel", Decimal::new(250, 2))
        .with_price("hand_towel", Decimal::new(120, 2))
        .with_price("face_towel", Decimal::new(90, 2))
        .with_price("bath_mat", Decimal::new(150, 2))
}

/// A store holding one active shared-linen property and a price list.
pub async fn seeded() -> (Arc<InMemoryTurnoverStore>, Arc<TurnoverUnitOfWork>, Property) {
    let store = Arc::new(InMemoryTurnoverStore::new());
    let property = property();
    store.put_property(property.clone()).await;
    store.set_prices(prices()).await;
    let uow = Arc::new(TurnoverUnitOfWork::in_memory(store.clone()));
    (store, uow, property)
}
