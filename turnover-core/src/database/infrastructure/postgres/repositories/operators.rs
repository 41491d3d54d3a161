use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgRow, types::Json};
use turnover_model::{GeoPoint, Operator, OperatorId};
use uuid::Uuid;

use super::super::{column, storage_error};
use crate::database::ports::operators::OperatorsRepository;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct PostgresOperatorsRepository {
    pool: PgPool,
}

impl PostgresOperatorsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<Operator> {
        let id: Uuid = column(row, "id")?;
        let status: String = column(row, "status")?;
        let location: Option<Json<GeoPoint>> = column(row, "last_known_location")?;

        Ok(Operator {
            id: OperatorId(id),
            name: column(row, "name")?,
            status: status.parse()?,
            rating: column(row, "rating")?,
            last_known_location: location.map(|json| json.0),
        })
    }
}

#[async_trait]
impl OperatorsRepository for PostgresOperatorsRepository {
    async fn get(&self, id: OperatorId) -> Result<Option<Operator>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, status, rating, last_known_location
            FROM operators
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("load operator"))?;

        row.map(|row| Self::map_row(&row)).transpose()
    }

    async fn list_active(&self) -> Result<Vec<Operator>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, status, rating, last_known_location
            FROM operators
            WHERE status = 'ACTIVE'
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("list operators"))?;

        rows.iter().map(Self::map_row).collect()
    }
}
