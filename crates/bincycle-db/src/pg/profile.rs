//! PostgreSQL customer profile repository implementation

use async_trait::async_trait;
use bincycle_types::{CustomerProfile, ProfileDetails, UserId};
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::CustomerProfileRow;
use crate::repo::CustomerProfileRepository;

/// PostgreSQL customer profile repository
#[derive(Clone)]
pub struct PgCustomerProfileRepository {
    pool: PgPool,
}

impl PgCustomerProfileRepository {
    /// Create a new customer profile repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerProfileRepository for PgCustomerProfileRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> DbResult<Option<CustomerProfile>> {
        let row = sqlx::query_as::<_, CustomerProfileRow>(
            "SELECT * FROM customer_profiles WHERE user_id = $1",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CustomerProfile::try_from).transpose()
    }

    async fn upsert(&self, user_id: &UserId, details: ProfileDetails) -> DbResult<CustomerProfile> {
        let row = sqlx::query_as::<_, CustomerProfileRow>(
            r#"
            INSERT INTO customer_profiles (user_id, service_address, service_city, service_state,
                                           service_zip_code, preferred_service_day,
                                           preferred_service_time, special_instructions,
                                           allow_weekend_service, allow_holiday_service,
                                           notification_preference)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id) DO UPDATE
            SET service_address = EXCLUDED.service_address,
                service_city = EXCLUDED.service_city,
                service_state = EXCLUDED.service_state,
                service_zip_code = EXCLUDED.service_zip_code,
                preferred_service_day = EXCLUDED.preferred_service_day,
                preferred_service_time = EXCLUDED.preferred_service_time,
                special_instructions = EXCLUDED.special_instructions,
                allow_weekend_service = EXCLUDED.allow_weekend_service,
                allow_holiday_service = EXCLUDED.allow_holiday_service,
                notification_preference = EXCLUDED.notification_preference,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id.as_str())
        .bind(&details.service_address)
        .bind(&details.service_city)
        .bind(&details.service_state)
        .bind(&details.service_zip_code)
        .bind(&details.preferred_service_day)
        .bind(&details.preferred_service_time)
        .bind(&details.special_instructions)
        .bind(details.allow_weekend_service)
        .bind(details.allow_holiday_service)
        .bind(details.notification_preference.as_str())
        .fetch_one(&self.pool)
        .await?;

        CustomerProfile::try_from(row)
    }
}
