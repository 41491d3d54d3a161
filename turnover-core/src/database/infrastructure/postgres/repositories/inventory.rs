use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use turnover_model::PriceList;

use super::super::storage_error;
use crate::database::ports::inventory::InventoryRepository;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PostgresInventoryRepository {
    pool: PgPool,
}

impl PostgresInventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryRepository for PostgresInventoryRepository {
    async fn price_list(&self) -> Result<PriceList> {
        let rows: Vec<(String, Decimal)> =
            sqlx::query_as("SELECT item_id, unit_price FROM inventory_items")
                .fetch_all(&self.pool)
                .await
                .map_err(storage_error("load inventory prices"))?;

        Ok(PriceList(rows.into_iter().collect()))
    }
}
