use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveTime;
use rust_decimal::Decimal;
use sqlx::{PgPool, postgres::PgRow, types::Json};
use turnover_model::{GeoPoint, Property, PropertyId, ServiceConfig, UserId};
use uuid::Uuid;

use super::super::{column, count_column, storage_error};
use crate::database::ports::properties::PropertiesRepository;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PostgresPropertiesRepository {
    pool: PgPool,
}

impl PostgresPropertiesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<Property> {
        let id: Uuid = column(row, "id")?;
        let owner_id: Uuid = column(row, "owner_id")?;
        let service_configs: Json<BTreeMap<u32, ServiceConfig>> =
            column(row, "service_configs")?;
        let location: Option<Json<GeoPoint>> = column(row, "location")?;
        let checkout_time: Option<NaiveTime> = column(row, "checkout_time")?;
        let cleaning_base_price: Decimal = column(row, "cleaning_base_price")?;

        Ok(Property {
            id: PropertyId(id),
            name: column(row, "name")?,
            owner_id: UserId(owner_id),
            active: column(row, "active")?,
            uses_own_linen: column(row, "uses_own_linen")?,
            cleaning_base_price,
            service_configs: service_configs.0,
            max_guests: count_column(row, "max_guests")?,
            bedrooms: count_column(row, "bedrooms")?,
            bathrooms: count_column(row, "bathrooms")?,
            checkout_time,
            location: location.map(|json| json.0),
        })
    }
}

#[async_trait]
impl PropertiesRepository for PostgresPropertiesRepository {
    async fn get(&self, id: PropertyId) -> Result<Option<Property>> {
        let row = sqlx::query(
            r#"
            SELECT
                id,
                name,
                owner_id,
                active,
                uses_own_linen,
                cleaning_base_price,
                service_configs,
                max_guests,
                bedrooms,
                bathrooms,
                checkout_time,
                location
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("load property"))?;

        row.map(|row| Self::map_row(&row)).transpose()
    }
}
