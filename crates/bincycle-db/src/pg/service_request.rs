//! PostgreSQL service request repository implementation

use async_trait::async_trait;
use bincycle_types::{ServiceRequest, ServiceRequestId, ServiceRequestStatus, UserId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::ServiceRequestRow;
use crate::repo::{CreateServiceRequest, RequestUpdate, ServiceRequestRepository};

const COLUMNS: &str = "id, user_id, subscription_id, service_type, status, requested_date, \
     scheduled_date, completed_date, notes, assigned_employee_id, created_at, updated_at";

const NON_TERMINAL: &str = "status NOT IN ('completed', 'cancelled')";

/// PostgreSQL service request repository
#[derive(Clone)]
pub struct PgServiceRequestRepository {
    pool: PgPool,
}

impl PgServiceRequestRepository {
    /// Create a new service request repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn convert_all(rows: Vec<ServiceRequestRow>) -> DbResult<Vec<ServiceRequest>> {
    rows.into_iter().map(ServiceRequest::try_from).collect()
}

#[async_trait]
impl ServiceRequestRepository for PgServiceRequestRepository {
    async fn find_by_id(&self, id: ServiceRequestId) -> DbResult<Option<ServiceRequest>> {
        let row = sqlx::query_as::<_, ServiceRequestRow>(&format!(
            "SELECT {COLUMNS} FROM service_requests WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ServiceRequest::try_from).transpose()
    }

    async fn create(&self, request: CreateServiceRequest) -> DbResult<ServiceRequest> {
        let row = sqlx::query_as::<_, ServiceRequestRow>(&format!(
            r#"
            INSERT INTO service_requests (user_id, subscription_id, service_type, status,
                                          requested_date, scheduled_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(request.user_id.as_str())
        .bind(request.subscription_id.map(|id| id.0))
        .bind(&request.service_type)
        .bind(request.status.as_str())
        .bind(request.requested_date)
        .bind(request.scheduled_date)
        .fetch_one(&self.pool)
        .await?;

        ServiceRequest::try_from(row)
    }

    async fn update_if_status(
        &self,
        id: ServiceRequestId,
        expected: &[ServiceRequestStatus],
        update: RequestUpdate,
    ) -> DbResult<Option<ServiceRequest>> {
        let expected: Vec<String> = expected.iter().map(|s| s.as_str().to_string()).collect();

        let row = sqlx::query_as::<_, ServiceRequestRow>(&format!(
            r#"
            UPDATE service_requests
            SET status = COALESCE($3, status),
                assigned_employee_id = COALESCE($4, assigned_employee_id),
                completed_date = COALESCE($5, completed_date),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE id = $1 AND status = ANY($2)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.0)
        .bind(expected)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.assigned_employee_id.map(|e| e.0))
        .bind(update.completed_date)
        .bind(update.notes)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ServiceRequest::try_from).transpose()
    }

    async fn find_upcoming_for_user(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<ServiceRequest>> {
        let rows = sqlx::query_as::<_, ServiceRequestRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM service_requests
            WHERE user_id = $1 AND scheduled_date >= $2 AND {NON_TERMINAL}
            ORDER BY scheduled_date ASC, id ASC
            LIMIT $3
            "#
        ))
        .bind(user_id.as_str())
        .bind(from)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn find_assigned_between(
        &self,
        employee_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<ServiceRequest>> {
        let rows = sqlx::query_as::<_, ServiceRequestRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM service_requests
            WHERE assigned_employee_id = $1
              AND scheduled_date >= $2 AND scheduled_date < $3
              AND {NON_TERMINAL}
            ORDER BY scheduled_date ASC, id ASC
            "#
        ))
        .bind(employee_id.as_str())
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn find_scheduled_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<ServiceRequest>> {
        let rows = sqlx::query_as::<_, ServiceRequestRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM service_requests
            WHERE status = 'scheduled' AND scheduled_date >= $1 AND scheduled_date < $2
            ORDER BY scheduled_date ASC, id ASC
            "#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn find_history_for_user(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<ServiceRequest>> {
        let rows = sqlx::query_as::<_, ServiceRequestRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM service_requests
            WHERE user_id = $1
            ORDER BY scheduled_date DESC NULLS LAST, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn find_in_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<ServiceRequest>> {
        // A NULL bound disables that side of the filter.
        let rows = sqlx::query_as::<_, ServiceRequestRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM service_requests
            WHERE ($1::timestamptz IS NULL OR scheduled_date >= $1)
              AND ($2::timestamptz IS NULL OR scheduled_date <= $2)
            ORDER BY scheduled_date DESC NULLS LAST, id DESC
            "#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn count_completed_for_user_between(
        &self,
        user_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM service_requests
            WHERE user_id = $1 AND status = 'completed'
              AND completed_date >= $2 AND completed_date < $3
            "#,
        )
        .bind(user_id.as_str())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_scheduled_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM service_requests WHERE scheduled_date >= $1 AND scheduled_date < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM service_requests WHERE completed_date >= $1 AND completed_date < $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
