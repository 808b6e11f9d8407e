//! PostgreSQL plan repository implementation

use async_trait::async_trait;
use bincycle_types::{PlanId, SubscriptionPlan};
use sqlx::PgPool;

use crate::error::{DbError, DbResult};
use crate::models::PlanRow;
use crate::repo::{CreatePlan, PlanRepository};

/// PostgreSQL plan repository
#[derive(Clone)]
pub struct PgPlanRepository {
    pool: PgPool,
}

impl PgPlanRepository {
    /// Create a new plan repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanRepository for PgPlanRepository {
    async fn find_active(&self) -> DbResult<Vec<SubscriptionPlan>> {
        let rows = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT * FROM plans
            WHERE is_active = TRUE
            ORDER BY monthly_price ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SubscriptionPlan::try_from).collect()
    }

    async fn find_active_by_id(&self, id: PlanId) -> DbResult<Option<SubscriptionPlan>> {
        let row = sqlx::query_as::<_, PlanRow>(
            "SELECT * FROM plans WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SubscriptionPlan::try_from).transpose()
    }

    async fn create(&self, plan: CreatePlan) -> DbResult<SubscriptionPlan> {
        let features = &plan.features;
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            INSERT INTO plans (name, description, monthly_price, yearly_price, setup_fee,
                               bins_included, pickups_per_week, holiday_adjustment,
                               gps_tracking, sms_notifications, email_notifications,
                               mobile_app, priority_support, account_manager,
                               service_reports, support_level, is_popular, is_enterprise,
                               badge_color)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.monthly_price)
        .bind(plan.yearly_price)
        .bind(plan.setup_fee)
        .bind(plan.bins_included)
        .bind(plan.pickups_per_week)
        .bind(features.holiday_adjustment)
        .bind(features.gps_tracking)
        .bind(features.sms_notifications)
        .bind(features.email_notifications)
        .bind(features.mobile_app)
        .bind(features.priority_support)
        .bind(features.account_manager)
        .bind(features.service_reports)
        .bind(features.support_level.as_str())
        .bind(plan.is_popular)
        .bind(plan.is_enterprise)
        .bind(&plan.badge_color)
        .fetch_one(&self.pool)
        .await?;

        SubscriptionPlan::try_from(row)
    }

    async fn deactivate(&self, id: PlanId) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE plans SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id.0)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}
