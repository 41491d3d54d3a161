use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

#[cfg(any(test, feature = "test-utils"))]
use crate::database::infrastructure::memory::InMemoryTurnoverStore;
#[cfg(feature = "database")]
use crate::database::infrastructure::postgres::{
    PostgresBookingsRepository, PostgresCancelledCleaningsRepository,
    PostgresCleaningsRepository, PostgresInventoryRepository,
    PostgresLinenOrdersRepository, PostgresOperatorsRepository,
    PostgresPropertiesRepository, PostgresSyncExclusionsRepository,
};
use crate::database::ports::{
    bookings::BookingsRepository, cancellations::CancelledCleaningsRepository,
    cleanings::CleaningsRepository, exclusions::SyncExclusionsRepository,
    inventory::InventoryRepository, linen_orders::LinenOrdersRepository,
    operators::OperatorsRepository, properties::PropertiesRepository,
};

/// Aggregates every repository port the turnover services depend on.
#[derive(Clone)]
pub struct TurnoverUnitOfWork {
    pub properties: Arc<dyn PropertiesRepository>,
    pub bookings: Arc<dyn BookingsRepository>,
    pub cleanings: Arc<dyn CleaningsRepository>,
    pub linen_orders: Arc<dyn LinenOrdersRepository>,
    pub exclusions: Arc<dyn SyncExclusionsRepository>,
    pub cancellations: Arc<dyn CancelledCleaningsRepository>,
    pub operators: Arc<dyn OperatorsRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
}

impl fmt::Debug for TurnoverUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnoverUnitOfWork")
            .field("properties", &type_name_of_val(self.properties.as_ref()))
            .field("bookings", &type_name_of_val(self.bookings.as_ref()))
            .field("cleanings", &type_name_of_val(self.cleanings.as_ref()))
            .field("linen_orders", &type_name_of_val(self.linen_orders.as_ref()))
            .field("exclusions", &type_name_of_val(self.exclusions.as_ref()))
            .field(
                "cancellations",
                &type_name_of_val(self.cancellations.as_ref()),
            )
            .field("operators", &type_name_of_val(self.operators.as_ref()))
            .field("inventory", &type_name_of_val(self.inventory.as_ref()))
            .finish()
    }
}

#[derive(Default)]
pub struct TurnoverUnitOfWorkBuilder {
    properties: Option<Arc<dyn PropertiesRepository>>,
    bookings: Option<Arc<dyn BookingsRepository>>,
    cleanings: Option<Arc<dyn CleaningsRepository>>,
    linen_orders: Option<Arc<dyn LinenOrdersRepository>>,
    exclusions: Option<Arc<dyn SyncExclusionsRepository>>,
    cancellations: Option<Arc<dyn CancelledCleaningsRepository>>,
    operators: Option<Arc<dyn OperatorsRepository>>,
    inventory: Option<Arc<dyn InventoryRepository>>,
}

impl fmt::Debug for TurnoverUnitOfWorkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnoverUnitOfWorkBuilder")
            .field("properties", &self.properties.is_some())
            .field("bookings", &self.bookings.is_some())
            .field("cleanings", &self.cleanings.is_some())
            .field("linen_orders", &self.linen_orders.is_some())
            .field("exclusions", &self.exclusions.is_some())
            .field("cancellations", &self.cancellations.is_some())
            .field("operators", &self.operators.is_some())
            .field("inventory", &self.inventory.is_some())
            .finish()
    }
}

impl TurnoverUnitOfWorkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties(mut self, repo: Arc<dyn PropertiesRepository>) -> Self {
        self.properties = Some(repo);
        self
    }

    pub fn with_bookings(mut self, repo: Arc<dyn BookingsRepository>) -> Self {
        self.bookings = Some(repo);
        self
    }

    pub fn with_cleanings(mut self, repo: Arc<dyn CleaningsRepository>) -> Self {
        self.cleanings = Some(repo);
        self
    }

    pub fn with_linen_orders(mut self, repo: Arc<dyn LinenOrdersRepository>) -> Self {
        self.linen_orders = Some(repo);
        self
    }

    pub fn with_exclusions(mut self, repo: Arc<dyn SyncExclusionsRepository>) -> Self {
        self.exclusions = Some(repo);
        self
    }

    pub fn with_cancellations(
        mut self,
        repo: Arc<dyn CancelledCleaningsRepository>,
    ) -> Self {
        self.cancellations = Some(repo);
        self
    }

    pub fn with_operators(mut self, repo: Arc<dyn OperatorsRepository>) -> Self {
        self.operators = Some(repo);
        self
    }

    pub fn with_inventory(mut self, repo: Arc<dyn InventoryRepository>) -> Self {
        self.inventory = Some(repo);
        self
    }

    /// Build a validated unit of work. Returns a string error naming the
    /// first missing repository.
    pub fn build(self) -> Result<TurnoverUnitOfWork, String> {
        Ok(TurnoverUnitOfWork {
            properties: self
                .properties
                .ok_or_else(|| "missing PropertiesRepository".to_string())?,
            bookings: self
                .bookings
                .ok_or_else(|| "missing BookingsRepository".to_string())?,
            cleanings: self
                .cleanings
                .ok_or_else(|| "missing CleaningsRepository".to_string())?,
            linen_orders: self
                .linen_orders
                .ok_or_else(|| "missing LinenOrdersRepository".to_string())?,
            exclusions: self
                .exclusions
                .ok_or_else(|| "missing SyncExclusionsRepository".to_string())?,
            cancellations: self.cancellations.ok_or_else(|| {
                "missing CancelledCleaningsRepository".to_string()
            })?,
            operators: self
                .operators
                .ok_or_else(|| "missing OperatorsRepository".to_string())?,
            inventory: self
                .inventory
                .ok_or_else(|| "missing InventoryRepository".to_string())?,
        })
    }
}

#[cfg(feature = "database")]
impl TurnoverUnitOfWork {
    /// Compose every Postgres-backed repository over one pool.
    pub fn from_postgres(pool: sqlx::PgPool) -> Result<Self, String> {
        TurnoverUnitOfWorkBuilder::new().with_postgres(pool).build()
    }
}

#[cfg(feature = "database")]
impl TurnoverUnitOfWorkBuilder {
    pub fn with_postgres(self, pool: sqlx::PgPool) -> Self {
        self.with_properties(Arc::new(PostgresPropertiesRepository::new(pool.clone())))
            .with_bookings(Arc::new(PostgresBookingsRepository::new(pool.clone())))
            .with_cleanings(Arc::new(PostgresCleaningsRepository::new(pool.clone())))
            .with_linen_orders(Arc::new(PostgresLinenOrdersRepository::new(pool.clone())))
            .with_exclusions(Arc::new(PostgresSyncExclusionsRepository::new(pool.clone())))
            .with_cancellations(Arc::new(PostgresCancelledCleaningsRepository::new(
                pool.clone(),
            )))
            .with_operators(Arc::new(PostgresOperatorsRepository::new(pool.clone())))
            .with_inventory(Arc::new(PostgresInventoryRepository::new(pool)))
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl TurnoverUnitOfWork {
    /// Every port served by the same in-memory store.
    pub fn in_memory(store: Arc<InMemoryTurnoverStore>) -> Self {
        Self {
            properties: store.clone(),
            bookings: store.clone(),
            cleanings: store.clone(),
            linen_orders: store.clone(),
            exclusions: store.clone(),
            cancellations: store.clone(),
            operators: store.clone(),
            inventory: store,
        }
    }
}
