use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, postgres::PgRow, types::Json};
use turnover_model::{
    CleaningId, LinenOrder, LinenOrderId, LinenOrderStatus, OrderItem, PropertyId,
};
use uuid::Uuid;

use super::super::{column, storage_error};
use crate::database::ports::{
    Page, PageRequest,
    linen_orders::{LinenOrderFilter, LinenOrdersRepository, NewLinenOrder},
};
use crate::error::{Result, TurnoverError};

const ORDER_COLUMNS: &str = "id, property_id, cleaning_id, scheduled_date, status, items, \
     total_price_override, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresLinenOrdersRepository {
    pool: PgPool,
}

impl PostgresLinenOrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<LinenOrder> {
        let id: Uuid = column(row, "id")?;
        let property_id: Uuid = column(row, "property_id")?;
        let cleaning_id: Option<Uuid> = column(row, "cleaning_id")?;
        let status: String = column(row, "status")?;
        let items: Json<Vec<OrderItem>> = column(row, "items")?;

        Ok(LinenOrder {
            id: LinenOrderId(id),
            property_id: PropertyId(property_id),
            cleaning_id: cleaning_id.map(CleaningId),
            scheduled_date: column(row, "scheduled_date")?,
            status: status.parse()?,
            items: items.0,
            total_price_override: column(row, "total_price_override")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }

    fn status_labels(statuses: &[LinenOrderStatus]) -> Vec<String> {
        statuses.iter().map(|status| status.as_str().to_string()).collect()
    }

    fn map_rows(rows: &[PgRow]) -> Result<Vec<LinenOrder>> {
        rows.iter().map(Self::map_row).collect()
    }
}

#[async_trait]
impl LinenOrdersRepository for PostgresLinenOrdersRepository {
    async fn get(&self, id: LinenOrderId) -> Result<Option<LinenOrder>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM linen_orders WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.to_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("load linen order"))?;

        row.map(|row| Self::map_row(&row)).transpose()
    }

    async fn find_by_cleaning(&self, cleaning_id: CleaningId) -> Result<Vec<LinenOrder>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM linen_orders WHERE cleaning_id = $1 ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(cleaning_id.to_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("load linen orders for cleaning"))?;

        Self::map_rows(&rows)
    }

    async fn find_for_slot(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
    ) -> Result<Vec<LinenOrder>> {
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM linen_orders
            WHERE property_id = $1
              AND scheduled_date = $2
            ORDER BY id
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(property_id.to_uuid())
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("load linen orders for slot"))?;

        Self::map_rows(&rows)
    }

    async fn insert(&self, order: NewLinenOrder) -> Result<LinenOrder> {
        let sql = format!(
            r#"
            INSERT INTO linen_orders (
                id, property_id, cleaning_id, scheduled_date, status, items,
                total_price_override
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(LinenOrderId::new().to_uuid())
            .bind(order.property_id.to_uuid())
            .bind(order.cleaning_id.map(|id| id.to_uuid()))
            .bind(order.scheduled_date)
            .bind(order.status.as_str())
            .bind(Json(&order.items))
            .bind(order.total_price_override)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("insert linen order"))?;

        Self::map_row(&row)
    }

    async fn transition_status(
        &self,
        id: LinenOrderId,
        expected: &[LinenOrderStatus],
        to: LinenOrderStatus,
    ) -> Result<Option<LinenOrder>> {
        let sql = format!(
            r#"
            UPDATE linen_orders
            SET status = $3, updated_at = NOW()
            WHERE id = $1
              AND status = ANY($2)
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id.to_uuid())
            .bind(Self::status_labels(expected))
            .bind(to.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("transition linen order"))?;

        row.map(|row| Self::map_row(&row)).transpose()
    }

    async fn reschedule(
        &self,
        id: LinenOrderId,
        expected: &[LinenOrderStatus],
        date: NaiveDate,
    ) -> Result<Option<LinenOrder>> {
        let sql = format!(
            r#"
            UPDATE linen_orders
            SET scheduled_date = $3, updated_at = NOW()
            WHERE id = $1
              AND status = ANY($2)
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id.to_uuid())
            .bind(Self::status_labels(expected))
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("reschedule linen order"))?;

        row.map(|row| Self::map_row(&row)).transpose()
    }

    async fn bind_cleaning(
        &self,
        id: LinenOrderId,
        cleaning_id: CleaningId,
    ) -> Result<Option<LinenOrder>> {
        let sql = format!(
            r#"
            UPDATE linen_orders
            SET cleaning_id = $2, updated_at = NOW()
            WHERE id = $1
              AND cleaning_id IS NULL
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id.to_uuid())
            .bind(cleaning_id.to_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("bind linen order"))?;

        row.map(|row| Self::map_row(&row)).transpose()
    }

    async fn delete(&self, id: LinenOrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM linen_orders WHERE id = $1")
            .bind(id.to_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_error("delete linen order"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_page(
        &self,
        filter: &LinenOrderFilter,
        page: PageRequest,
    ) -> Result<Page<LinenOrder>> {
        let limit = i64::try_from(page.limit)
            .map_err(|_| TurnoverError::InvalidInput("page limit too large".into()))?;
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM linen_orders
            WHERE ($1::uuid IS NULL OR id > $1)
              AND ($2::uuid IS NULL OR property_id = $2)
              AND ($3::date IS NULL OR scheduled_date >= $3)
              AND ($4::date IS NULL OR scheduled_date <= $4)
              AND ($5 OR status <> 'CANCELLED')
            ORDER BY id
            LIMIT $6
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(page.after)
            .bind(filter.property_id.map(|id| id.to_uuid()))
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.include_cancelled)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("list linen orders"))?;

        let items = Self::map_rows(&rows)?;
        Ok(Page::from_items(items, page.limit, |order| order.id.to_uuid()))
    }
}
