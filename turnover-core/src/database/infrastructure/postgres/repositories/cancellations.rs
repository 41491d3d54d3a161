use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgRow};
use turnover_model::{CancelledCleaningRecord, CleaningId, PropertyId, UserId};
use uuid::Uuid;

use super::super::{column, storage_error};
use crate::database::ports::cancellations::{
    CancelledCleaningsRepository, NewCancelledCleaningRecord,
};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PostgresCancelledCleaningsRepository {
    pool: PgPool,
}

impl PostgresCancelledCleaningsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<CancelledCleaningRecord> {
        let cleaning_id: Uuid = column(row, "cleaning_id")?;
        let property_id: Uuid = column(row, "property_id")?;
        let booking_source: Option<String> = column(row, "booking_source")?;
        let kind: String = column(row, "kind")?;
        let recorded_by: Uuid = column(row, "recorded_by")?;

        Ok(CancelledCleaningRecord {
            id: column(row, "id")?,
            cleaning_id: CleaningId(cleaning_id),
            property_id: PropertyId(property_id),
            scheduled_date: column(row, "scheduled_date")?,
            booking_source: booking_source.map(|source| source.parse()).transpose()?,
            kind: kind.parse()?,
            reason: column(row, "reason")?,
            new_date: column(row, "new_date")?,
            recorded_by: UserId(recorded_by),
            recorded_at: column(row, "recorded_at")?,
        })
    }
}

#[async_trait]
impl CancelledCleaningsRepository for PostgresCancelledCleaningsRepository {
    async fn record(
        &self,
        record: NewCancelledCleaningRecord,
    ) -> Result<CancelledCleaningRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO cancelled_cleanings (
                id, cleaning_id, property_id, scheduled_date, booking_source,
                kind, reason, new_date, recorded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                id,
                cleaning_id,
                property_id,
                scheduled_date,
                booking_source,
                kind,
                reason,
                new_date,
                recorded_by,
                recorded_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(record.cleaning_id.to_uuid())
        .bind(record.property_id.to_uuid())
        .bind(record.scheduled_date)
        .bind(record.booking_source.map(|source| source.as_str()))
        .bind(record.kind.as_str())
        .bind(&record.reason)
        .bind(record.new_date)
        .bind(record.recorded_by.to_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error("record cancelled cleaning"))?;

        Self::map_row(&row)
    }

    async fn list_for_cleaning(
        &self,
        cleaning_id: CleaningId,
    ) -> Result<Vec<CancelledCleaningRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                cleaning_id,
                property_id,
                scheduled_date,
                booking_source,
                kind,
                reason,
                new_date,
                recorded_by,
                recorded_at
            FROM cancelled_cleanings
            WHERE cleaning_id = $1
            ORDER BY recorded_at, id
            "#,
        )
        .bind(cleaning_id.to_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("list cancelled cleanings"))?;

        rows.iter().map(Self::map_row).collect()
    }
}
