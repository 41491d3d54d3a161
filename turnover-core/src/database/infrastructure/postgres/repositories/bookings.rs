use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgRow};
use turnover_model::{Booking, BookingId, PropertyId};
use uuid::Uuid;

use super::super::{column, count_param, storage_error};
use crate::database::ports::{
    Page, PageRequest,
    bookings::{BookingsRepository, NewBooking},
};
use crate::error::{Result, TurnoverError};

const BOOKING_COLUMNS: &str = "id, property_id, source, external_uid, check_in, \
     check_out, guests_count, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresBookingsRepository {
    pool: PgPool,
}

impl PostgresBookingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<Booking> {
        let id: Uuid = column(row, "id")?;
        let property_id: Uuid = column(row, "property_id")?;
        let source: String = column(row, "source")?;
        let guests_count: Option<i32> = column(row, "guests_count")?;

        Ok(Booking {
            id: BookingId(id),
            property_id: PropertyId(property_id),
            source: source.parse()?,
            external_uid: column(row, "external_uid")?,
            check_in: column(row, "check_in")?,
            check_out: column(row, "check_out")?,
            guests_count: guests_count.and_then(|count| u32::try_from(count).ok()),
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl BookingsRepository for PostgresBookingsRepository {
    async fn upsert(&self, booking: NewBooking) -> Result<Booking> {
        let guests = booking.guests_count.map(count_param).transpose()?;
        let sql = format!(
            r#"
            INSERT INTO bookings
                (id, property_id, source, external_uid, check_in, check_out, guests_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source, external_uid) DO UPDATE
            SET
                property_id = EXCLUDED.property_id,
                check_in = EXCLUDED.check_in,
                check_out = EXCLUDED.check_out,
                guests_count = COALESCE(EXCLUDED.guests_count, bookings.guests_count),
                updated_at = NOW()
            RETURNING {BOOKING_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(BookingId::new().to_uuid())
            .bind(booking.property_id.to_uuid())
            .bind(booking.source.as_str())
            .bind(&booking.external_uid)
            .bind(booking.check_in)
            .bind(booking.check_out)
            .bind(guests)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error("upsert booking"))?;

        Self::map_row(&row)
    }

    async fn get(&self, id: BookingId) -> Result<Option<Booking>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.to_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("load booking"))?;

        row.map(|row| Self::map_row(&row)).transpose()
    }

    async fn list_page(&self, page: PageRequest) -> Result<Page<Booking>> {
        let limit = i64::try_from(page.limit)
            .map_err(|_| TurnoverError::InvalidInput("page limit too large".into()))?;
        let sql = format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE ($1::uuid IS NULL OR id > $1)
            ORDER BY id
            LIMIT $2
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(page.after)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error("list bookings"))?;

        let items = rows
            .iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::from_items(items, page.limit, |booking| booking.id.to_uuid()))
    }

    async fn delete(&self, id: BookingId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id.to_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_error("delete booking"))?;

        Ok(result.rows_affected() > 0)
    }
}
