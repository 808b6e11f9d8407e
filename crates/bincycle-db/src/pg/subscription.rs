//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use bincycle_types::{Subscription, SubscriptionId, SubscriptionStatus, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::SubscriptionRow;
use crate::repo::{CreateSubscription, PlanSnapshot, SubscriptionRepository};

const COLUMNS: &str = "id, user_id, plan_name, monthly_price, status, start_date, end_date, \
     next_billing_date, processor_subscription_id, processor_customer_id, billing_cycle, \
     bins_included, pickups_per_week, created_at, updated_at";

/// PostgreSQL subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn convert(row: Option<SubscriptionRow>) -> DbResult<Option<Subscription>> {
    row.map(Subscription::try_from).transpose()
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_id(&self, id: SubscriptionId) -> DbResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        convert(row)
    }

    async fn find_active_by_user_id(&self, user_id: &UserId) -> DbResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM subscriptions
            WHERE user_id = $1 AND status = 'active'
            ORDER BY id ASC
            LIMIT 1
            "#
        ))
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        convert(row)
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> DbResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1 ORDER BY id ASC"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn list(&self, limit: i64, offset: i64) -> DbResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM subscriptions
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn create(&self, sub: CreateSubscription) -> DbResult<Subscription> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            INSERT INTO subscriptions (user_id, plan_name, monthly_price, status, start_date,
                                       next_billing_date, billing_cycle, bins_included,
                                       pickups_per_week)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(sub.user_id.as_str())
        .bind(&sub.snapshot.plan_name)
        .bind(sub.snapshot.monthly_price)
        .bind(sub.status.as_str())
        .bind(sub.start_date)
        .bind(sub.next_billing_date)
        .bind(sub.billing_cycle.as_str())
        .bind(sub.snapshot.bins_included)
        .bind(sub.snapshot.pickups_per_week)
        .fetch_one(&self.pool)
        .await?;

        Subscription::try_from(row)
    }

    async fn update_plan(
        &self,
        id: SubscriptionId,
        snapshot: PlanSnapshot,
    ) -> DbResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            UPDATE subscriptions
            SET plan_name = $2, monthly_price = $3, bins_included = $4,
                pickups_per_week = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.0)
        .bind(&snapshot.plan_name)
        .bind(snapshot.monthly_price)
        .bind(snapshot.bins_included)
        .bind(snapshot.pickups_per_week)
        .fetch_optional(&self.pool)
        .await?;

        convert(row)
    }

    async fn cancel(
        &self,
        id: SubscriptionId,
        ended_at: DateTime<Utc>,
    ) -> DbResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            UPDATE subscriptions
            SET status = 'cancelled',
                end_date = COALESCE(end_date, $2),
                updated_at = CASE WHEN status = 'cancelled' THEN updated_at ELSE NOW() END
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.0)
        .bind(ended_at)
        .fetch_optional(&self.pool)
        .await?;

        convert(row)
    }

    async fn update_status(
        &self,
        id: SubscriptionId,
        status: SubscriptionStatus,
    ) -> DbResult<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            UPDATE subscriptions
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status <> 'cancelled'
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.0)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        convert(row)
    }

    async fn activate_exclusive(&self, id: SubscriptionId) -> DbResult<Option<Subscription>> {
        let mut tx = self.pool.begin().await?;

        let user_id: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM subscriptions WHERE id = $1 FOR UPDATE")
                .bind(id.0)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(user_id) = user_id else {
            tx.rollback().await?;
            return Ok(None);
        };

        // Serialize activations per user; row locks alone do not cover
        // two different subscriptions of the same user.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&user_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            UPDATE subscriptions
            SET status = 'active', updated_at = NOW()
            WHERE id = $1
              AND status <> 'cancelled'
              AND NOT EXISTS (
                  SELECT 1 FROM subscriptions other
                  WHERE other.user_id = $2 AND other.id <> $1 AND other.status = 'active'
              )
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.0)
        .bind(&user_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        convert(row)
    }

    async fn count_by_status(&self, status: SubscriptionStatus) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn sum_monthly_price_by_status(&self, status: SubscriptionStatus) -> DbResult<Decimal> {
        let sum: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(monthly_price), 0) FROM subscriptions WHERE status = $1",
        )
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(sum)
    }
}
