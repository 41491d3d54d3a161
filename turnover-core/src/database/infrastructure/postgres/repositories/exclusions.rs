use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, postgres::PgRow};
use turnover_model::{
    BookingSource, CleaningId, ExclusionId, PropertyId, SyncExclusion,
};
use uuid::Uuid;

use super::super::{column, storage_error};
use crate::database::ports::exclusions::{NewSyncExclusion, SyncExclusionsRepository};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PostgresSyncExclusionsRepository {
    pool: PgPool,
}

impl PostgresSyncExclusionsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<SyncExclusion> {
        let id: Uuid = column(row, "id")?;
        let property_id: Uuid = column(row, "property_id")?;
        let source: String = column(row, "booking_source")?;
        let reason: String = column(row, "reason")?;
        let cleaning_id: Option<Uuid> = column(row, "cleaning_id")?;

        Ok(SyncExclusion {
            id: ExclusionId(id),
            property_id: PropertyId(property_id),
            original_date: column(row, "original_date")?,
            booking_source: source.parse()?,
            reason: reason.parse()?,
            new_date: column(row, "new_date")?,
            cleaning_id: cleaning_id.map(CleaningId),
            created_at: column(row, "created_at")?,
        })
    }
}

#[async_trait]
impl SyncExclusionsRepository for PostgresSyncExclusionsRepository {
    async fn append(&self, exclusion: NewSyncExclusion) -> Result<SyncExclusion> {
        let row = sqlx::query(
            r#"
            INSERT INTO sync_exclusions (
                id, property_id, original_date, booking_source, reason,
                new_date, cleaning_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id,
                property_id,
                original_date,
                booking_source,
                reason,
                new_date,
                cleaning_id,
                created_at
            "#,
        )
        .bind(ExclusionId::new().to_uuid())
        .bind(exclusion.property_id.to_uuid())
        .bind(exclusion.original_date)
        .bind(exclusion.booking_source.as_str())
        .bind(exclusion.reason.as_str())
        .bind(exclusion.new_date)
        .bind(exclusion.cleaning_id.map(|id| id.to_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error("append sync exclusion"))?;

        Self::map_row(&row)
    }

    async fn exists(
        &self,
        property_id: PropertyId,
        date: NaiveDate,
        source: BookingSource,
    ) -> Result<bool> {
        let found: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM sync_exclusions
                WHERE property_id = $1
                  AND original_date = $2
                  AND booking_source = $3
            )
            "#,
        )
        .bind(property_id.to_uuid())
        .bind(date)
        .bind(source.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error("check sync exclusion"))?;

        Ok(found)
    }

    async fn list_for_property(&self, property_id: PropertyId) -> Result<Vec<SyncExclusion>> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                property_id,
                original_date,
                booking_source,
                reason,
                new_date,
                cleaning_id,
                created_at
            FROM sync_exclusions
            WHERE property_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(property_id.to_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("list sync exclusions"))?;

        rows.iter().map(Self::map_row).collect()
    }
}
