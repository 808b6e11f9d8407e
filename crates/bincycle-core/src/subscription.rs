//! Subscription lifecycle
//!
//! The engine drives `Trial` (on create) and `Cancelled` (on cancel). The
//! `Active`, `Paused` and `PastDue` states belong to the billing process,
//! which reaches them only through [`SubscriptionManager::set_billing_status`].

use std::sync::Arc;

use bincycle_db::{CreateSubscription, PaymentRepository, Stores, SubscriptionRepository};
use bincycle_types::{
    BillingCycle, Payment, PlanId, Subscription, SubscriptionId, SubscriptionStatus, UserId,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use crate::pricing::plan_snapshot;
use crate::{EngineConfig, EngineError, EngineResult, Page, PlanCatalog};

/// Subscription lifecycle manager
#[derive(Clone)]
pub struct SubscriptionManager {
    catalog: PlanCatalog,
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentRepository>,
    config: EngineConfig,
}

impl SubscriptionManager {
    /// Create a new subscription manager
    pub fn new(
        catalog: PlanCatalog,
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentRepository>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            subscriptions,
            payments,
            config,
        }
    }

    /// Create a subscription manager from the storage bundle
    pub fn from_stores(stores: &Stores, config: EngineConfig) -> Self {
        Self::new(
            PlanCatalog::from_stores(stores),
            Arc::clone(&stores.subscriptions),
            Arc::clone(&stores.payments),
            config,
        )
    }

    /// Start a trial subscription on a plan
    pub async fn create(
        &self,
        user_id: &UserId,
        plan_id: PlanId,
        cycle: BillingCycle,
    ) -> EngineResult<Subscription> {
        let plan = self.catalog.require_plan(plan_id).await?;
        let now = Utc::now();
        let next_billing_date = Duration::try_days(self.config.trial_days)
            .and_then(|trial| now.checked_add_signed(trial))
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "trial of {} days is out of range",
                    self.config.trial_days
                ))
            })?;

        let sub = self
            .subscriptions
            .create(CreateSubscription {
                user_id: user_id.clone(),
                snapshot: plan_snapshot(&plan, cycle),
                status: SubscriptionStatus::Trial,
                billing_cycle: cycle,
                start_date: now,
                next_billing_date,
            })
            .await?;

        tracing::info!(
            subscription_id = %sub.id,
            user_id = %user_id,
            plan = %plan.name,
            cycle = %cycle,
            monthly_price = %sub.monthly_price,
            "Subscription created"
        );
        Ok(sub)
    }

    /// Move a subscription to another plan, keeping its billing cycle and status
    pub async fn change_plan(
        &self,
        subscription_id: SubscriptionId,
        new_plan_id: PlanId,
    ) -> EngineResult<Subscription> {
        let current = self.require(subscription_id).await?;
        let plan = self.catalog.require_plan(new_plan_id).await?;

        let sub = self
            .subscriptions
            .update_plan(subscription_id, plan_snapshot(&plan, current.billing_cycle))
            .await?
            .ok_or_else(|| EngineError::not_found("subscription", subscription_id))?;

        tracing::info!(
            subscription_id = %subscription_id,
            from = %current.plan_name,
            to = %sub.plan_name,
            "Subscription plan changed"
        );
        Ok(sub)
    }

    /// Cancel a subscription. Cancelling twice succeeds and keeps the first end date.
    pub async fn cancel(&self, subscription_id: SubscriptionId) -> EngineResult<Subscription> {
        let sub = self
            .subscriptions
            .cancel(subscription_id, Utc::now())
            .await?
            .ok_or_else(|| EngineError::not_found("subscription", subscription_id))?;

        tracing::info!(subscription_id = %subscription_id, user_id = %sub.user_id, "Subscription cancelled");
        Ok(sub)
    }

    /// Entry point for the billing process to move a subscription between
    /// `Active`, `Paused` and `PastDue`.
    ///
    /// Activation fails with `Conflict` if the user already has another
    /// active subscription. Nothing leaves `Cancelled`.
    pub async fn set_billing_status(
        &self,
        subscription_id: SubscriptionId,
        status: SubscriptionStatus,
    ) -> EngineResult<Subscription> {
        match status {
            SubscriptionStatus::Trial => {
                return Err(EngineError::Validation(
                    "subscriptions cannot re-enter trial".to_string(),
                ))
            }
            SubscriptionStatus::Cancelled => {
                return Err(EngineError::Validation(
                    "use cancel to end a subscription".to_string(),
                ))
            }
            _ => {}
        }

        let updated = if status == SubscriptionStatus::Active {
            self.subscriptions.activate_exclusive(subscription_id).await?
        } else {
            self.subscriptions.update_status(subscription_id, status).await?
        };

        match updated {
            Some(sub) => {
                tracing::info!(subscription_id = %subscription_id, status = %status, "Billing status updated");
                Ok(sub)
            }
            None => Err(self.explain_rejected_status(subscription_id, status).await),
        }
    }

    async fn explain_rejected_status(
        &self,
        subscription_id: SubscriptionId,
        status: SubscriptionStatus,
    ) -> EngineError {
        let current = match self.subscriptions.find_by_id(subscription_id).await {
            Ok(Some(sub)) => sub,
            Ok(None) => return EngineError::not_found("subscription", subscription_id),
            Err(e) => return e.into(),
        };

        let reason = if current.status.is_terminal() {
            format!("subscription {subscription_id} is cancelled")
        } else {
            format!(
                "user {} already has an active subscription",
                current.user_id
            )
        };
        tracing::warn!(subscription_id = %subscription_id, target = %status, %reason, "Billing status change rejected");
        EngineError::Conflict(reason)
    }

    /// The user's active subscription, if any.
    ///
    /// Only `Active` counts; trials and paused subscriptions do not. If
    /// several rows are active the lowest id wins.
    pub async fn active_subscription(&self, user_id: &UserId) -> EngineResult<Option<Subscription>> {
        Ok(self.subscriptions.find_active_by_user_id(user_id).await?)
    }

    /// Look up a subscription
    pub async fn get(&self, subscription_id: SubscriptionId) -> EngineResult<Option<Subscription>> {
        Ok(self.subscriptions.find_by_id(subscription_id).await?)
    }

    /// Every subscription a user has held, oldest first
    pub async fn subscriptions_for_user(&self, user_id: &UserId) -> EngineResult<Vec<Subscription>> {
        Ok(self.subscriptions.find_by_user_id(user_id).await?)
    }

    /// All subscriptions, newest first. `page_size` defaults to the configured size.
    pub async fn list_subscriptions(
        &self,
        page_size: Option<i64>,
        page: i64,
    ) -> EngineResult<Vec<Subscription>> {
        let page = Page::new(page_size.unwrap_or(self.config.subscription_page_size), page)?;
        Ok(self.subscriptions.list(page.limit(), page.offset()).await?)
    }

    /// Payments across the user's subscriptions, newest first
    pub async fn payment_history(&self, user_id: &UserId) -> EngineResult<Vec<Payment>> {
        Ok(self.payments.find_by_user_id(user_id).await?)
    }

    /// Number of subscriptions in `Active` status
    pub async fn active_count(&self) -> EngineResult<i64> {
        Ok(self
            .subscriptions
            .count_by_status(SubscriptionStatus::Active)
            .await?)
    }

    /// Sum of the monthly price snapshots of active subscriptions
    pub async fn active_monthly_revenue(&self) -> EngineResult<Decimal> {
        Ok(self
            .subscriptions
            .sum_monthly_price_by_status(SubscriptionStatus::Active)
            .await?)
    }

    async fn require(&self, subscription_id: SubscriptionId) -> EngineResult<Subscription> {
        self.subscriptions
            .find_by_id(subscription_id)
            .await?
            .ok_or_else(|| EngineError::not_found("subscription", subscription_id))
    }
}

impl std::fmt::Debug for SubscriptionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
