//! Repository traits
//!
//! Define async repository interfaces for database operations. Every
//! mutating method applies its full set of field changes as one statement
//! (or one transaction), so readers never observe a half-applied update.

use std::sync::Arc;

use async_trait::async_trait;
use bincycle_types::{
    BillingCycle, CustomerProfile, Payment, PaymentStatus, PlanFeatures, PlanId, ProfileDetails,
    ServiceArea, ServiceRequest, ServiceRequestId, ServiceRequestStatus, Subscription,
    SubscriptionId, SubscriptionPlan, SubscriptionStatus, UserId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::DbResult;

/// Plan catalog repository trait
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// All active plans, cheapest monthly price first
    async fn find_active(&self) -> DbResult<Vec<SubscriptionPlan>>;

    /// Find a plan by ID, ignoring deactivated plans
    async fn find_active_by_id(&self, id: PlanId) -> DbResult<Option<SubscriptionPlan>>;

    /// Create a new plan
    async fn create(&self, plan: CreatePlan) -> DbResult<SubscriptionPlan>;

    /// Retire a plan (plans are never deleted).
    ///
    /// Fails with [`DbError::NotFound`](crate::DbError::NotFound) if no plan has this id.
    async fn deactivate(&self, id: PlanId) -> DbResult<()>;
}

/// Create plan input
#[derive(Debug, Clone)]
pub struct CreatePlan {
    pub name: String,
    pub description: String,
    pub monthly_price: Decimal,
    pub yearly_price: Decimal,
    pub setup_fee: Decimal,
    pub bins_included: i32,
    pub pickups_per_week: i32,
    pub features: PlanFeatures,
    pub is_popular: bool,
    pub is_enterprise: bool,
    pub badge_color: String,
}

impl CreatePlan {
    /// A one-bin, weekly-pickup plan with no setup fee
    pub fn new(name: impl Into<String>, monthly_price: Decimal, yearly_price: Decimal) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            monthly_price,
            yearly_price,
            setup_fee: Decimal::ZERO,
            bins_included: 1,
            pickups_per_week: 1,
            features: PlanFeatures::default(),
            is_popular: false,
            is_enterprise: false,
            badge_color: "#007bff".to_string(),
        }
    }

    /// Set bins and weekly pickups
    pub fn with_capacity(mut self, bins_included: i32, pickups_per_week: i32) -> Self {
        self.bins_included = bins_included;
        self.pickups_per_week = pickups_per_week;
        self
    }
}

/// Service area repository trait
#[async_trait]
pub trait ServiceAreaRepository: Send + Sync {
    /// Find the active area whose zip code equals `zip_code` exactly
    async fn find_active_by_zip(&self, zip_code: &str) -> DbResult<Option<ServiceArea>>;

    /// Create a new service area
    async fn create(&self, area: CreateServiceArea) -> DbResult<ServiceArea>;
}

/// Create service area input
#[derive(Debug, Clone)]
pub struct CreateServiceArea {
    pub name: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub service_multiplier: Decimal,
}

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a subscription by ID
    async fn find_by_id(&self, id: SubscriptionId) -> DbResult<Option<Subscription>>;

    /// Find the lowest-id subscription in `Active` status for a user
    async fn find_active_by_user_id(&self, user_id: &UserId) -> DbResult<Option<Subscription>>;

    /// All subscriptions for a user, oldest first
    async fn find_by_user_id(&self, user_id: &UserId) -> DbResult<Vec<Subscription>>;

    /// All subscriptions, newest first
    async fn list(&self, limit: i64, offset: i64) -> DbResult<Vec<Subscription>>;

    /// Create a new subscription
    async fn create(&self, sub: CreateSubscription) -> DbResult<Subscription>;

    /// Replace the plan snapshot; status is left untouched
    async fn update_plan(
        &self,
        id: SubscriptionId,
        snapshot: PlanSnapshot,
    ) -> DbResult<Option<Subscription>>;

    /// Set status to cancelled. The end date is stamped only on the first call.
    async fn cancel(
        &self,
        id: SubscriptionId,
        ended_at: DateTime<Utc>,
    ) -> DbResult<Option<Subscription>>;

    /// Set status unless the subscription is cancelled.
    ///
    /// Returns `None` when the subscription does not exist or is cancelled.
    async fn update_status(
        &self,
        id: SubscriptionId,
        status: SubscriptionStatus,
    ) -> DbResult<Option<Subscription>>;

    /// Set status to active unless the subscription is cancelled or another
    /// subscription of the same user is already active.
    ///
    /// The check and the write happen under a per-user lock. Returns `None`
    /// when any condition fails.
    async fn activate_exclusive(&self, id: SubscriptionId) -> DbResult<Option<Subscription>>;

    /// Count subscriptions in a status
    async fn count_by_status(&self, status: SubscriptionStatus) -> DbResult<i64>;

    /// Sum of `monthly_price` over subscriptions in a status
    async fn sum_monthly_price_by_status(&self, status: SubscriptionStatus) -> DbResult<Decimal>;
}

/// Create subscription input
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub user_id: UserId,
    pub snapshot: PlanSnapshot,
    pub status: SubscriptionStatus,
    pub billing_cycle: BillingCycle,
    pub start_date: DateTime<Utc>,
    pub next_billing_date: DateTime<Utc>,
}

/// Plan fields copied onto a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSnapshot {
    pub plan_name: String,
    pub monthly_price: Decimal,
    pub bins_included: i32,
    pub pickups_per_week: i32,
}

/// Payment repository trait
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Payments across all of a user's subscriptions, newest payment date first
    async fn find_by_user_id(&self, user_id: &UserId) -> DbResult<Vec<Payment>>;

    /// Record a payment (used by the payment collaborator)
    async fn create(&self, payment: CreatePayment) -> DbResult<Payment>;
}

/// Create payment input
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub subscription_id: SubscriptionId,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_intent_id: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Service request repository trait
#[async_trait]
pub trait ServiceRequestRepository: Send + Sync {
    /// Find a service request by ID
    async fn find_by_id(&self, id: ServiceRequestId) -> DbResult<Option<ServiceRequest>>;

    /// Create a new service request
    async fn create(&self, request: CreateServiceRequest) -> DbResult<ServiceRequest>;

    /// Apply `update` only if the current status is one of `expected`.
    ///
    /// This is a compare-and-set: the status check and every field write
    /// happen atomically. Returns `None` when the request does not exist or
    /// its status did not match.
    async fn update_if_status(
        &self,
        id: ServiceRequestId,
        expected: &[ServiceRequestStatus],
        update: RequestUpdate,
    ) -> DbResult<Option<ServiceRequest>>;

    /// A user's non-terminal requests scheduled at or after `from`, soonest first
    async fn find_upcoming_for_user(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<ServiceRequest>>;

    /// An employee's non-terminal requests scheduled in `[start, end)`, soonest first
    async fn find_assigned_between(
        &self,
        employee_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<ServiceRequest>>;

    /// Requests in exactly `Scheduled` status scheduled in `[start, end)`, soonest first
    async fn find_scheduled_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<ServiceRequest>>;

    /// All of a user's requests, latest scheduled date first
    async fn find_history_for_user(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<ServiceRequest>>;

    /// All requests with a scheduled date inside the optional inclusive
    /// bounds, latest scheduled date first
    async fn find_in_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<ServiceRequest>>;

    /// Completed requests of a user with a completion date in `[start, end)`
    async fn count_completed_for_user_between(
        &self,
        user_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64>;

    /// Requests of any status scheduled in `[start, end)`
    async fn count_scheduled_between(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> DbResult<i64>;

    /// Requests completed in `[start, end)`
    async fn count_completed_between(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> DbResult<i64>;
}

/// Create service request input
#[derive(Debug, Clone)]
pub struct CreateServiceRequest {
    pub user_id: UserId,
    pub subscription_id: Option<SubscriptionId>,
    pub service_type: String,
    pub status: ServiceRequestStatus,
    pub requested_date: DateTime<Utc>,
    pub scheduled_date: Option<DateTime<Utc>>,
}

/// Field changes for a conditional service request update.
///
/// `None` leaves the column as it is.
#[derive(Debug, Clone, Default)]
pub struct RequestUpdate {
    pub status: Option<ServiceRequestStatus>,
    pub assigned_employee_id: Option<UserId>,
    pub completed_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Customer profile repository trait
#[async_trait]
pub trait CustomerProfileRepository: Send + Sync {
    /// Find the profile for a user
    async fn find_by_user_id(&self, user_id: &UserId) -> DbResult<Option<CustomerProfile>>;

    /// Insert the profile, or overwrite the details of the existing one
    async fn upsert(&self, user_id: &UserId, details: ProfileDetails) -> DbResult<CustomerProfile>;
}

/// All repositories behind trait objects, as consumed by the engine
#[derive(Clone)]
pub struct Stores {
    pub plans: Arc<dyn PlanRepository>,
    pub areas: Arc<dyn ServiceAreaRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub service_requests: Arc<dyn ServiceRequestRepository>,
    pub profiles: Arc<dyn CustomerProfileRepository>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
