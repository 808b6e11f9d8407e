//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.
//! Status and cycle columns are stored as text and parsed into the
//! `bincycle-types` enums on the way out.

use bincycle_types::{
    CustomerProfile, Payment, PaymentId, PlanFeatures, PlanId, ProfileDetails, ProfileId,
    ServiceArea, ServiceAreaId, ServiceRequest, ServiceRequestId, Subscription, SubscriptionId,
    SubscriptionPlan, UserId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::error::DbError;

/// Plan row from the database
#[derive(Debug, Clone, FromRow)]
pub struct PlanRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub monthly_price: Decimal,
    pub yearly_price: Decimal,
    pub setup_fee: Decimal,
    pub bins_included: i32,
    pub pickups_per_week: i32,
    pub holiday_adjustment: bool,
    pub gps_tracking: bool,
    pub sms_notifications: bool,
    pub email_notifications: bool,
    pub mobile_app: bool,
    pub priority_support: bool,
    pub account_manager: bool,
    pub service_reports: bool,
    pub support_level: String,
    pub is_active: bool,
    pub is_popular: bool,
    pub is_enterprise: bool,
    pub badge_color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Service area row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ServiceAreaRow {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub is_active: bool,
    pub service_multiplier: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: i64,
    pub user_id: String,
    pub plan_name: String,
    pub monthly_price: Decimal,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub next_billing_date: DateTime<Utc>,
    pub processor_subscription_id: Option<String>,
    pub processor_customer_id: Option<String>,
    pub billing_cycle: String,
    pub bins_included: i32,
    pub pickups_per_week: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment row from the database
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: i64,
    pub subscription_id: i64,
    pub amount: Decimal,
    pub status: String,
    pub payment_intent_id: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Service request row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRequestRow {
    pub id: i64,
    pub user_id: String,
    pub subscription_id: Option<i64>,
    pub service_type: String,
    pub status: String,
    pub requested_date: DateTime<Utc>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub assigned_employee_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customer profile row from the database
#[derive(Debug, Clone, FromRow)]
pub struct CustomerProfileRow {
    pub id: i64,
    pub user_id: String,
    pub service_address: Option<String>,
    pub service_city: Option<String>,
    pub service_state: Option<String>,
    pub service_zip_code: Option<String>,
    pub preferred_service_day: Option<String>,
    pub preferred_service_time: Option<String>,
    pub special_instructions: Option<String>,
    pub allow_weekend_service: bool,
    pub allow_holiday_service: bool,
    pub notification_preference: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Conversion implementations from Row types to bincycle-types domain types

impl TryFrom<PlanRow> for SubscriptionPlan {
    type Error = DbError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PlanId(row.id),
            name: row.name,
            description: row.description,
            monthly_price: row.monthly_price,
            yearly_price: row.yearly_price,
            setup_fee: row.setup_fee,
            bins_included: row.bins_included,
            pickups_per_week: row.pickups_per_week,
            features: PlanFeatures {
                holiday_adjustment: row.holiday_adjustment,
                gps_tracking: row.gps_tracking,
                sms_notifications: row.sms_notifications,
                email_notifications: row.email_notifications,
                mobile_app: row.mobile_app,
                priority_support: row.priority_support,
                account_manager: row.account_manager,
                service_reports: row.service_reports,
                support_level: row.support_level.parse()?,
            },
            is_active: row.is_active,
            is_popular: row.is_popular,
            is_enterprise: row.is_enterprise,
            badge_color: row.badge_color,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<ServiceAreaRow> for ServiceArea {
    fn from(row: ServiceAreaRow) -> Self {
        Self {
            id: ServiceAreaId(row.id),
            name: row.name,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            is_active: row.is_active,
            service_multiplier: row.service_multiplier,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DbError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SubscriptionId(row.id),
            user_id: UserId(row.user_id),
            plan_name: row.plan_name,
            monthly_price: row.monthly_price,
            status: row.status.parse()?,
            start_date: row.start_date,
            end_date: row.end_date,
            next_billing_date: row.next_billing_date,
            processor_subscription_id: row.processor_subscription_id,
            processor_customer_id: row.processor_customer_id,
            billing_cycle: row.billing_cycle.parse()?,
            bins_included: row.bins_included,
            pickups_per_week: row.pickups_per_week,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DbError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PaymentId(row.id),
            subscription_id: SubscriptionId(row.subscription_id),
            amount: row.amount,
            status: row.status.parse()?,
            payment_intent_id: row.payment_intent_id,
            payment_date: row.payment_date,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<ServiceRequestRow> for ServiceRequest {
    type Error = DbError;

    fn try_from(row: ServiceRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ServiceRequestId(row.id),
            user_id: UserId(row.user_id),
            subscription_id: row.subscription_id.map(SubscriptionId),
            service_type: row.service_type,
            status: row.status.parse()?,
            requested_date: row.requested_date,
            scheduled_date: row.scheduled_date,
            completed_date: row.completed_date,
            notes: row.notes,
            assigned_employee_id: row.assigned_employee_id.map(UserId),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<CustomerProfileRow> for CustomerProfile {
    type Error = DbError;

    fn try_from(row: CustomerProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProfileId(row.id),
            user_id: UserId(row.user_id),
            details: ProfileDetails {
                service_address: row.service_address,
                service_city: row.service_city,
                service_state: row.service_state,
                service_zip_code: row.service_zip_code,
                preferred_service_day: row.preferred_service_day,
                preferred_service_time: row.preferred_service_time,
                special_instructions: row.special_instructions,
                allow_weekend_service: row.allow_weekend_service,
                allow_holiday_service: row.allow_holiday_service,
                notification_preference: row.notification_preference.parse()?,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bincycle_types::{BillingCycle, SubscriptionStatus};

    fn subscription_row(status: &str, cycle: &str) -> SubscriptionRow {
        let now = Utc::now();
        SubscriptionRow {
            id: 1,
            user_id: "user-1".to_string(),
            plan_name: "Basic Plan".to_string(),
            monthly_price: Decimal::new(2900, 2),
            status: status.to_string(),
            start_date: now,
            end_date: None,
            next_billing_date: now,
            processor_subscription_id: None,
            processor_customer_id: None,
            billing_cycle: cycle.to_string(),
            bins_included: 1,
            pickups_per_week: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_subscription_row_converts() {
        let sub = Subscription::try_from(subscription_row("past_due", "yearly")).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::PastDue);
        assert_eq!(sub.billing_cycle, BillingCycle::Yearly);
        assert_eq!(sub.user_id, UserId::new("user-1"));
    }

    #[test]
    fn test_unknown_stored_status_is_decode_error() {
        let err = Subscription::try_from(subscription_row("frozen", "monthly")).unwrap_err();
        assert!(matches!(err, DbError::Decode(_)));
    }
}
