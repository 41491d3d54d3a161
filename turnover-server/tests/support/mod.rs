use std::{collections::BTreeMap, sync::Arc};

use axum_test::TestServer;
use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use turnover_core::{
    TurnoverUnitOfWork,
    database::infrastructure::memory::InMemoryTurnoverStore,
    domain::notifications::TracingNotifier,
};
use turnover_model::{
    BookingSource, Cleaning, CleaningId, CleaningStatus, GeoPoint, Operator, OperatorId,
    OperatorStatus, PriceList, Property, PropertyId, UserId,
};
use turnover_server::{
    AppState,
    infra::{
        config::Config,
        middleware::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER},
    },
    routes::create_app,
};

// Code is used by test modules, but not in every one of them
#[allow(unused)]
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryTurnoverStore>,
    pub property: Property,
    pub admin: UserId,
}

#[allow(unused)]
pub async fn build_test_app() -> TestApp {
    let store = Arc::new(InMemoryTurnoverStore::new());
    let property = property(UserId::new());
    store.put_property(property.clone()).await;
    store
        .set_prices(
            PriceList::new()
                .with_price("bath_towel", Decimal::new(250, 2))
                .with_price("double_sheet", Decimal::new(300, 2)),
        )
        .await;

    let unit_of_work = Arc::new(TurnoverUnitOfWork::in_memory(store.clone()));
    let state = AppState::new(
        unit_of_work,
        Arc::new(Config::default()),
        Arc::new(TracingNotifier),
    );
    let server = TestServer::new(create_app(state)).expect("test server");

    TestApp {
        server,
        store,
        property,
        admin: UserId::new(),
    }
}

#[allow(unused)]
impl TestApp {
    pub fn owner(&self) -> UserId {
        self.property.owner_id
    }

    pub async fn seed_cleaning(&self, day: &str) -> Cleaning {
        let now = Utc::now();
        let cleaning = Cleaning {
            id: CleaningId::new(),
            property_id: self.property.id,
            scheduled_date: date(day),
            scheduled_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            status: CleaningStatus::Scheduled,
            booking_source: Some(BookingSource::Airbnb),
            booking_id: None,
            operators: Vec::new(),
            manually_modified: false,
            original_date: None,
            price: self.property.cleaning_base_price,
            guests_count: 2,
            cancellation_reason: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.put_cleaning(cleaning.clone()).await;
        cleaning
    }

    pub async fn seed_operator(&self, name: &str, location: Option<GeoPoint>) -> Operator {
        let operator = Operator {
            id: OperatorId::new(),
            name: name.into(),
            status: OperatorStatus::Active,
            rating: Some(4.0),
            last_known_location: location,
        };
        self.store.put_operator(operator.clone()).await;
        operator
    }
}

pub fn property(owner_id: UserId) -> Property {
    Property {
        id: PropertyId::new(),
        name: "Canal studio".into(),
        owner_id,
        active: true,
        uses_own_linen: false,
        cleaning_base_price: Decimal::new(4000, 2),
        service_configs: BTreeMap::new(),
        max_guests: 2,
        bedrooms: 1,
        bathrooms: 1,
        checkout_time: NaiveTime::from_hms_opt(10, 30, 0),
        location: Some(GeoPoint::new(45.4408, 12.3155)),
    }
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

/// Header pairs identifying an actor.
#[allow(unused)]
pub fn as_admin(id: UserId) -> [(&'static str, String); 2] {
    [
        (ACTOR_ROLE_HEADER, "admin".to_string()),
        (ACTOR_ID_HEADER, id.to_string()),
    ]
}

#[allow(unused)]
pub fn as_owner(id: UserId) -> [(&'static str, String); 2] {
    [
        (ACTOR_ROLE_HEADER, "owner".to_string()),
        (ACTOR_ID_HEADER, id.to_string()),
    ]
}

/// Attach actor headers to a request.
#[allow(unused)]
pub fn acting(
    request: axum_test::TestRequest,
    headers: [(&'static str, String); 2],
) -> axum_test::TestRequest {
    headers
        .into_iter()
        .fold(request, |request, (name, value)| request.add_header(name, value))
}
