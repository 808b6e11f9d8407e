//! PostgreSQL service area repository implementation

use async_trait::async_trait;
use bincycle_types::ServiceArea;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::ServiceAreaRow;
use crate::repo::{CreateServiceArea, ServiceAreaRepository};

/// PostgreSQL service area repository
#[derive(Clone)]
pub struct PgServiceAreaRepository {
    pool: PgPool,
}

impl PgServiceAreaRepository {
    /// Create a new service area repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceAreaRepository for PgServiceAreaRepository {
    async fn find_active_by_zip(&self, zip_code: &str) -> DbResult<Option<ServiceArea>> {
        let row = sqlx::query_as::<_, ServiceAreaRow>(
            r#"
            SELECT id, name, city, state, zip_code, is_active, service_multiplier, created_at
            FROM service_areas
            WHERE zip_code = $1 AND is_active = TRUE
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(zip_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ServiceArea::from))
    }

    async fn create(&self, area: CreateServiceArea) -> DbResult<ServiceArea> {
        let row = sqlx::query_as::<_, ServiceAreaRow>(
            r#"
            INSERT INTO service_areas (name, city, state, zip_code, service_multiplier)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, city, state, zip_code, is_active, service_multiplier, created_at
            "#,
        )
        .bind(&area.name)
        .bind(&area.city)
        .bind(&area.state)
        .bind(&area.zip_code)
        .bind(area.service_multiplier)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
