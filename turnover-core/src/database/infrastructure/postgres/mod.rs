//! PostgreSQL infrastructure adapters implementing the database ports.

use std::time::Duration;

use sqlx::{PgPool, Row, postgres::PgPoolOptions, postgres::PgRow};
use tracing::info;

use crate::error::{Result, TurnoverError};

pub mod repositories;

pub use repositories::bookings::PostgresBookingsRepository;
pub use repositories::cancellations::PostgresCancelledCleaningsRepository;
pub use repositories::cleanings::PostgresCleaningsRepository;
pub use repositories::exclusions::PostgresSyncExclusionsRepository;
pub use repositories::inventory::PostgresInventoryRepository;
pub use repositories::linen_orders::PostgresLinenOrdersRepository;
pub use repositories::operators::PostgresOperatorsRepository;
pub use repositories::properties::PostgresPropertiesRepository;

/// Open a connection pool sized for the reconciliation workload.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .test_before_acquire(true)
        .connect(url)
        .await
        .map_err(|e| TurnoverError::Storage(format!("Database connection failed: {e}")))?;

    info!(max_connections, "database pool initialized");
    Ok(pool)
}

/// Read one column, naming it in the error.
pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| TurnoverError::Storage(format!("Failed to read {name}: {e}")))
}

/// Non-negative counters are stored as INTEGER.
pub(crate) fn count_column(row: &PgRow, name: &str) -> Result<u32> {
    let raw: i32 = column(row, name)?;
    u32::try_from(raw)
        .map_err(|_| TurnoverError::Storage(format!("Negative value in {name}: {raw}")))
}

pub(crate) fn count_param(value: u32) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| TurnoverError::InvalidInput(format!("Count out of range: {value}")))
}

pub(crate) fn storage_error(action: &str) -> impl FnOnce(sqlx::Error) -> TurnoverError + '_ {
    move |e| TurnoverError::Storage(format!("Failed to {action}: {e}"))
}
