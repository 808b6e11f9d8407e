//! Dashboard aggregation
//!
//! Read-only views composed from the subscription, service request and
//! profile components. Nothing here is cached; every call reads the latest
//! committed state.

use bincycle_types::{CustomerProfile, ServiceRequest, Subscription, UserId};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::calendar::today;
use crate::{CustomerProfiles, EngineResult, ServiceRequestWorkflow, SubscriptionManager};

/// What a customer sees on login
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDashboard {
    pub subscription: Option<Subscription>,
    pub upcoming_services: Vec<ServiceRequest>,
    pub completed_services_this_month: i64,
    /// Earliest scheduled date among `upcoming_services`
    pub next_service_date: Option<DateTime<Utc>>,
    pub customer_profile: Option<CustomerProfile>,
}

/// Operations summary for managers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerDashboard {
    pub total_active_customers: i64,
    pub todays_services: i64,
    pub completed_today: i64,
    /// Sum of `monthly_price` over active subscriptions
    pub monthly_revenue: Decimal,
    /// Percentage in `[0, 100]`
    pub completion_rate: f64,
}

/// `completed / scheduled * 100`, or `0.0` when nothing was scheduled
pub fn completion_rate(completed: i64, scheduled: i64) -> f64 {
    if scheduled <= 0 {
        return 0.0;
    }
    completed as f64 / scheduled as f64 * 100.0
}

/// Dashboard aggregator
#[derive(Clone)]
pub struct DashboardAggregator {
    subscriptions: SubscriptionManager,
    requests: ServiceRequestWorkflow,
    profiles: CustomerProfiles,
}

impl DashboardAggregator {
    pub fn new(
        subscriptions: SubscriptionManager,
        requests: ServiceRequestWorkflow,
        profiles: CustomerProfiles,
    ) -> Self {
        Self {
            subscriptions,
            requests,
            profiles,
        }
    }

    /// Build the customer view for `user_id`
    pub async fn customer_dashboard(&self, user_id: &UserId) -> EngineResult<CustomerDashboard> {
        let subscription = self.subscriptions.active_subscription(user_id).await?;
        let upcoming_services = self.requests.upcoming_services(user_id).await?;
        let completed_services_this_month = self
            .requests
            .completed_services_count(user_id, today().month())
            .await?;
        let customer_profile = self.profiles.get_profile(user_id).await?;

        let next_service_date = upcoming_services
            .iter()
            .filter_map(|r| r.scheduled_date)
            .min();

        tracing::debug!(
            user_id = %user_id,
            upcoming = upcoming_services.len(),
            completed_this_month = completed_services_this_month,
            "Customer dashboard built"
        );

        Ok(CustomerDashboard {
            subscription,
            upcoming_services,
            completed_services_this_month,
            next_service_date,
            customer_profile,
        })
    }

    /// Build the manager view for the current UTC day
    pub async fn manager_dashboard(&self) -> EngineResult<ManagerDashboard> {
        let date = today();

        let total_active_customers = self.subscriptions.active_count().await?;
        let todays_services = self.requests.scheduled_count_on(date).await?;
        let completed_today = self.requests.completed_count_on(date).await?;
        let monthly_revenue = self.subscriptions.active_monthly_revenue().await?;

        let dashboard = ManagerDashboard {
            total_active_customers,
            todays_services,
            completed_today,
            monthly_revenue,
            completion_rate: completion_rate(completed_today, todays_services),
        };
        tracing::debug!(?dashboard, "Manager dashboard built");
        Ok(dashboard)
    }
}

impl std::fmt::Debug for DashboardAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardAggregator").finish_non_exhaustive()
    }
}
