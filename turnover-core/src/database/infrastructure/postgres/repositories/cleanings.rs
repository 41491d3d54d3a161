use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, postgres::PgRow};
use turnover_model::{
    BookingId, Cleaning, CleaningId, CleaningStatus, OperatorId, PropertyId,
};
use uuid::Uuid;

use super::super::{column, count_column, count_param, storage_error};
use crate::database::ports::{
    Page, PageRequest,
    cleanings::{CleaningFilter, CleaningPatch, CleaningsRepository, NewCleaning},
};
use crate::error::{Result, TurnoverError};

const CLEANING_COLUMNS: &str = "id, property_id, scheduled_date, scheduled_time, status, \
     booking_source, booking_id, operators, manually_modified, original_date, price, \
     guests_count, cancellation_reason, cancelled_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresCleaningsRepository {
    pool: PgPool,
}

impl PostgresCleaningsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<Cleaning> {
        let id: Uuid = column(row, "id")?;
        let property_id: Uuid = column(row, "property_id")?;
        let status: String = column(row, "status")?;
        let booking_source: Option<String> = column(row, "booking_source")?;
        let booking_id: Option<Uuid> = column(row, "booking_id")?;
        let operators: Vec<Uuid> = column(row, "operators")?;

        Ok(Cleaning {
            id: CleaningId(id),
            property_id: PropertyId(property_id),
            scheduled_date: column(row, "scheduled_date")?,
            scheduled_time: column(row, "scheduled_time")?,
            status: status.parse()?,
            booking_source: booking_source.map(|source| source.parse()).transpose()?,
            booking_id: booking_id.map(BookingId),
            operators: operators.into_iter().map(OperatorId).collect(),
            manually_modified: column(row, "manually_modified")?,
            original_date: column(row, "original_date")?,
            price: column(row, "price")?,
            guests_count: count_column(row, "guests_count")?,
            cancellation_reason: column(row, "cancellation_reason")?,
            cancelled_at: column(row, "cancelled_at")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }

    fn status_labels(statuses: &[CleaningStatus]) -> Vec<String> {
        statuses.iter().map(|status| status.as_str().to_string()).collect()
    }
}

#[async_trait]
impl CleaningsRepository for PostgresCleaningsRepository {
    async fn get(&self, id: CleaningId) -> Result<Option<Cleaning>> {
        let sql = format!("SELECT {CLEANING_COLUMNS} FROM cleanings WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.to_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("load cleaning"))?;

        row.map(|row| Self::map_row(&row)).transpose()
    }

    async fn find_active_for_slot(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
    ) -> Result<Vec<Cleaning>> {
        let sql = format!(
            r#"
            SELECT {CLEANING_COLUMNS}
            FROM cleanings
            WHERE property_id = $1
              AND scheduled_date = $2
              AND status <> 'CANCELLED'
            ORDER BY created_at, id
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(property_id.to_uuid())
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("load cleanings for slot"))?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn insert(&self, cleaning: NewCleaning) -> Result<Cleaning> {
        let operators: Vec<Uuid> = cleaning.operators.iter().map(OperatorId::to_uuid).collect();
        let sql = format!(
            r#"
            INSERT INTO cleanings (
                id, property_id, scheduled_date, scheduled_time, status,
                booking_source, booking_id, operators, manually_modified,
                price, guests_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {CLEANING_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(CleaningId::new().to_uuid())
            .bind(cleaning.property_id.to_uuid())
            .bind(cleaning.scheduled_date)
            .bind(cleaning.scheduled_time)
            .bind(cleaning.status.as_str())
            .bind(cleaning.booking_source.map(|source| source.as_str()))
            .bind(cleaning.booking_id.map(|id| id.to_uuid()))
            .bind(operators)
            .bind(cleaning.manually_modified)
            .bind(cleaning.price)
            .bind(count_param(cleaning.guests_count)?)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("insert cleaning"))?;

        Self::map_row(&row)
    }

    async fn update_if_status(
        &self,
        id: CleaningId,
        expected: &[CleaningStatus],
        patch: CleaningPatch,
    ) -> Result<Option<Cleaning>> {
        let operators: Option<Vec<Uuid>> = patch
            .operators
            .as_ref()
            .map(|ids| ids.iter().map(OperatorId::to_uuid).collect());
        let (link_source, link_booking) = match patch.booking_link {
            Some((source, booking_id)) => (Some(source.as_str()), Some(booking_id.to_uuid())),
            None => (None, None),
        };
        let (cancel_reason, cancelled_at) = match patch.cancellation {
            Some((reason, at)) => (Some(reason), Some(at)),
            None => (None, None),
        };

        let sql = format!(
            r#"
            UPDATE cleanings
            SET
                status = COALESCE($3, status),
                scheduled_date = COALESCE($4, scheduled_date),
                scheduled_time = COALESCE($5, scheduled_time),
                original_date = COALESCE(original_date, $6),
                operators = COALESCE($7, operators),
                booking_source = COALESCE($8, booking_source),
                booking_id = COALESCE($9, booking_id),
                price = COALESCE($10, price),
                manually_modified = COALESCE($11, manually_modified),
                cancellation_reason = COALESCE($12, cancellation_reason),
                cancelled_at = COALESCE($13, cancelled_at),
                updated_at = NOW()
            WHERE id = $1
              AND status = ANY($2)
            RETURNING {CLEANING_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(id.to_uuid())
            .bind(Self::status_labels(expected))
            .bind(patch.status.map(|status| status.as_str()))
            .bind(patch.scheduled_date)
            .bind(patch.scheduled_time)
            .bind(patch.original_date)
            .bind(operators)
            .bind(link_source)
            .bind(link_booking)
            .bind(patch.price)
            .bind(patch.manually_modified)
            .bind(cancel_reason)
            .bind(cancelled_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("update cleaning"))?;

        row.map(|row| Self::map_row(&row)).transpose()
    }

    async fn delete(&self, id: CleaningId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cleanings WHERE id = $1")
            .bind(id.to_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_error("delete cleaning"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_page(
        &self,
        filter: &CleaningFilter,
        page: PageRequest,
    ) -> Result<Page<Cleaning>> {
        let limit = i64::try_from(page.limit)
            .map_err(|_| TurnoverError::InvalidInput("page limit too large".into()))?;
        let sql = format!(
            r#"
            SELECT {CLEANING_COLUMNS}
            FROM cleanings
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
            .map_err(storage_error("list cleanings"))?;

        let items = rows
            .iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::from_items(items, page.limit, |cleaning| cleaning.id.to_uuid()))
    }
}
