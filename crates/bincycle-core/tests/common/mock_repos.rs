//! Mock repositories for testing
//!
//! In-memory stand-ins for the Postgres repositories. Ordering and filtering
//! follow the SQL in `bincycle-db`.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bincycle_db::{
    CreatePayment, CreatePlan, CreateServiceArea, CreateServiceRequest, CreateSubscription,
    CustomerProfileRepository, DbError, DbResult, PaymentRepository, PlanRepository, PlanSnapshot,
    RequestUpdate, ServiceAreaRepository, ServiceRequestRepository, Stores,
    SubscriptionRepository,
};
use bincycle_types::{
    CustomerProfile, Payment, PlanId, ProfileDetails, ProfileId, ServiceArea, ServiceAreaId,
    ServiceRequest, ServiceRequestId, ServiceRequestStatus, Subscription, SubscriptionId,
    SubscriptionPlan, SubscriptionStatus, UserId,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

fn next_id(seq: &AtomicI64) -> i64 {
    seq.fetch_add(1, Ordering::SeqCst) + 1
}

// ============================================================================
// Plans and service areas
// ============================================================================

/// In-memory plan repository
#[derive(Default, Clone)]
pub struct MockPlanRepository {
    plans: Arc<DashMap<PlanId, SubscriptionPlan>>,
    seq: Arc<AtomicI64>,
}

#[async_trait]
impl PlanRepository for MockPlanRepository {
    async fn find_active(&self) -> DbResult<Vec<SubscriptionPlan>> {
        let mut plans: Vec<_> = self
            .plans
            .iter()
            .filter(|p| p.is_active)
            .map(|p| p.value().clone())
            .collect();
        plans.sort_by_key(|p| (p.monthly_price, p.id));
        Ok(plans)
    }

    async fn find_active_by_id(&self, id: PlanId) -> DbResult<Option<SubscriptionPlan>> {
        Ok(self
            .plans
            .get(&id)
            .filter(|p| p.is_active)
            .map(|p| p.value().clone()))
    }

    async fn create(&self, plan: CreatePlan) -> DbResult<SubscriptionPlan> {
        let now = Utc::now();
        let row = SubscriptionPlan {
            id: PlanId(next_id(&self.seq)),
            name: plan.name,
            description: plan.description,
            monthly_price: plan.monthly_price,
            yearly_price: plan.yearly_price,
            setup_fee: plan.setup_fee,
            bins_included: plan.bins_included,
            pickups_per_week: plan.pickups_per_week,
            features: plan.features,
            is_active: true,
            is_popular: plan.is_popular,
            is_enterprise: plan.is_enterprise,
            badge_color: plan.badge_color,
            created_at: now,
            updated_at: now,
        };
        self.plans.insert(row.id, row.clone());
        Ok(row)
    }

    async fn deactivate(&self, id: PlanId) -> DbResult<()> {
        let Some(mut plan) = self.plans.get_mut(&id) else {
            return Err(DbError::NotFound);
        };
        plan.is_active = false;
        plan.updated_at = Utc::now();
        Ok(())
    }
}

/// In-memory service area repository
#[derive(Default, Clone)]
pub struct MockServiceAreaRepository {
    areas: Arc<DashMap<ServiceAreaId, ServiceArea>>,
    seq: Arc<AtomicI64>,
}

impl MockServiceAreaRepository {
    /// Flip an area's active flag
    #[allow(dead_code)]
    pub fn set_active(&self, zip_code: &str, active: bool) {
        for mut area in self.areas.iter_mut() {
            if area.zip_code == zip_code {
                area.is_active = active;
            }
        }
    }
}

#[async_trait]
impl ServiceAreaRepository for MockServiceAreaRepository {
    async fn find_active_by_zip(&self, zip_code: &str) -> DbResult<Option<ServiceArea>> {
        Ok(self
            .areas
            .iter()
            .filter(|a| a.is_active && a.zip_code == zip_code)
            .min_by_key(|a| a.id)
            .map(|a| a.value().clone()))
    }

    async fn create(&self, area: CreateServiceArea) -> DbResult<ServiceArea> {
        let row = ServiceArea {
            id: ServiceAreaId(next_id(&self.seq)),
            name: area.name,
            city: area.city,
            state: area.state,
            zip_code: area.zip_code,
            is_active: true,
            service_multiplier: area.service_multiplier,
            created_at: Utc::now(),
        };
        self.areas.insert(row.id, row.clone());
        Ok(row)
    }
}

// ============================================================================
// Subscriptions and payments
// ============================================================================

/// In-memory subscription repository
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subs: Arc<DashMap<SubscriptionId, Subscription>>,
    seq: Arc<AtomicI64>,
    activation: Arc<Mutex<()>>,
}

impl MockSubscriptionRepository {
    /// Overwrite a status directly, as an external writer would
    #[allow(dead_code)]
    pub fn force_status(&self, id: SubscriptionId, status: SubscriptionStatus) {
        if let Some(mut sub) = self.subs.get_mut(&id) {
            sub.status = status;
        }
    }

    fn by_user(&self, user_id: &UserId) -> Vec<Subscription> {
        let mut subs: Vec<_> = self
            .subs
            .iter()
            .filter(|s| &s.user_id == user_id)
            .map(|s| s.value().clone())
            .collect();
        subs.sort_by_key(|s| s.id);
        subs
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_id(&self, id: SubscriptionId) -> DbResult<Option<Subscription>> {
        Ok(self.subs.get(&id).map(|s| s.value().clone()))
    }

    async fn find_active_by_user_id(&self, user_id: &UserId) -> DbResult<Option<Subscription>> {
        Ok(self
            .by_user(user_id)
            .into_iter()
            .find(|s| s.status == SubscriptionStatus::Active))
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> DbResult<Vec<Subscription>> {
        Ok(self.by_user(user_id))
    }

    async fn list(&self, limit: i64, offset: i64) -> DbResult<Vec<Subscription>> {
        let mut subs: Vec<_> = self.subs.iter().map(|s| s.value().clone()).collect();
        subs.sort_by_key(|s| Reverse((s.created_at, s.id)));
        Ok(subs
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn create(&self, sub: CreateSubscription) -> DbResult<Subscription> {
        let now = Utc::now();
        let row = Subscription {
            id: SubscriptionId(next_id(&self.seq)),
            user_id: sub.user_id,
            plan_name: sub.snapshot.plan_name,
            monthly_price: sub.snapshot.monthly_price,
            status: sub.status,
            start_date: sub.start_date,
            end_date: None,
            next_billing_date: sub.next_billing_date,
            processor_subscription_id: None,
            processor_customer_id: None,
            billing_cycle: sub.billing_cycle,
            bins_included: sub.snapshot.bins_included,
            pickups_per_week: sub.snapshot.pickups_per_week,
            created_at: now,
            updated_at: now,
        };
        self.subs.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_plan(
        &self,
        id: SubscriptionId,
        snapshot: PlanSnapshot,
    ) -> DbResult<Option<Subscription>> {
        Ok(self.subs.get_mut(&id).map(|mut sub| {
            sub.plan_name = snapshot.plan_name;
            sub.monthly_price = snapshot.monthly_price;
            sub.bins_included = snapshot.bins_included;
            sub.pickups_per_week = snapshot.pickups_per_week;
            sub.updated_at = Utc::now();
            sub.clone()
        }))
    }

    async fn cancel(
        &self,
        id: SubscriptionId,
        ended_at: DateTime<Utc>,
    ) -> DbResult<Option<Subscription>> {
        Ok(self.subs.get_mut(&id).map(|mut sub| {
            if sub.status != SubscriptionStatus::Cancelled {
                sub.status = SubscriptionStatus::Cancelled;
                sub.updated_at = Utc::now();
            }
            if sub.end_date.is_none() {
                sub.end_date = Some(ended_at);
            }
            sub.clone()
        }))
    }

    async fn update_status(
        &self,
        id: SubscriptionId,
        status: SubscriptionStatus,
    ) -> DbResult<Option<Subscription>> {
        Ok(self.subs.get_mut(&id).and_then(|mut sub| {
            if sub.status == SubscriptionStatus::Cancelled {
                return None;
            }
            sub.status = status;
            sub.updated_at = Utc::now();
            Some(sub.clone())
        }))
    }

    async fn activate_exclusive(&self, id: SubscriptionId) -> DbResult<Option<Subscription>> {
        let _guard = self.activation.lock().expect("activation lock poisoned");

        let Some(user_id) = self.subs.get(&id).map(|s| s.user_id.clone()) else {
            return Ok(None);
        };
        let other_active = self
            .by_user(&user_id)
            .iter()
            .any(|s| s.id != id && s.status == SubscriptionStatus::Active);
        if other_active {
            return Ok(None);
        }

        Ok(self.subs.get_mut(&id).and_then(|mut sub| {
            if sub.status == SubscriptionStatus::Cancelled {
                return None;
            }
            sub.status = SubscriptionStatus::Active;
            sub.updated_at = Utc::now();
            Some(sub.clone())
        }))
    }

    async fn count_by_status(&self, status: SubscriptionStatus) -> DbResult<i64> {
        Ok(self.subs.iter().filter(|s| s.status == status).count() as i64)
    }

    async fn sum_monthly_price_by_status(&self, status: SubscriptionStatus) -> DbResult<Decimal> {
        Ok(self
            .subs
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.monthly_price)
            .sum())
    }
}

/// In-memory payment repository, joined against a subscription repository
#[derive(Clone)]
pub struct MockPaymentRepository {
    payments: Arc<DashMap<i64, Payment>>,
    subs: MockSubscriptionRepository,
    seq: Arc<AtomicI64>,
}

impl MockPaymentRepository {
    pub fn new(subs: MockSubscriptionRepository) -> Self {
        Self {
            payments: Arc::default(),
            subs,
            seq: Arc::default(),
        }
    }
}

#[async_trait]
impl PaymentRepository for MockPaymentRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> DbResult<Vec<Payment>> {
        let owned: Vec<SubscriptionId> = self.subs.by_user(user_id).iter().map(|s| s.id).collect();
        let mut payments: Vec<_> = self
            .payments
            .iter()
            .filter(|p| owned.contains(&p.subscription_id))
            .map(|p| p.value().clone())
            .collect();
        payments.sort_by_key(|p| Reverse((p.payment_date, p.id)));
        Ok(payments)
    }

    async fn create(&self, payment: CreatePayment) -> DbResult<Payment> {
        let row = Payment {
            id: next_id(&self.seq).into(),
            subscription_id: payment.subscription_id,
            amount: payment.amount,
            status: payment.status,
            payment_intent_id: payment.payment_intent_id,
            payment_date: payment.payment_date,
            notes: payment.notes,
            created_at: Utc::now(),
        };
        self.payments.insert(row.id.0, row.clone());
        Ok(row)
    }
}

// ============================================================================
// Service requests
// ============================================================================

/// In-memory service request repository
#[derive(Default, Clone)]
pub struct MockServiceRequestRepository {
    requests: Arc<DashMap<ServiceRequestId, ServiceRequest>>,
    seq: Arc<AtomicI64>,
}

impl MockServiceRequestRepository {
    fn collect(&self, keep: impl Fn(&ServiceRequest) -> bool) -> Vec<ServiceRequest> {
        self.requests
            .iter()
            .filter(|r| keep(r.value()))
            .map(|r| r.value().clone())
            .collect()
    }

    /// Move a request's completion stamp, for month-boundary tests
    #[allow(dead_code)]
    pub fn set_completed_date(&self, id: ServiceRequestId, at: DateTime<Utc>) {
        if let Some(mut request) = self.requests.get_mut(&id) {
            request.completed_date = Some(at);
        }
    }
}

fn in_range(date: Option<DateTime<Utc>>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    date.is_some_and(|d| d >= start && d < end)
}

fn soonest_first(requests: &mut [ServiceRequest]) {
    requests.sort_by_key(|r| (r.scheduled_date, r.id));
}

/// Scheduled date descending with missing dates last, like `DESC NULLS LAST`
fn latest_first(requests: &mut [ServiceRequest]) {
    requests.sort_by_key(|r| (r.scheduled_date.is_none(), Reverse(r.scheduled_date), Reverse(r.id)));
}

#[async_trait]
impl ServiceRequestRepository for MockServiceRequestRepository {
    async fn find_by_id(&self, id: ServiceRequestId) -> DbResult<Option<ServiceRequest>> {
        Ok(self.requests.get(&id).map(|r| r.value().clone()))
    }

    async fn create(&self, request: CreateServiceRequest) -> DbResult<ServiceRequest> {
        let now = Utc::now();
        let row = ServiceRequest {
            id: ServiceRequestId(next_id(&self.seq)),
            user_id: request.user_id,
            subscription_id: request.subscription_id,
            service_type: request.service_type,
            status: request.status,
            requested_date: request.requested_date,
            scheduled_date: request.scheduled_date,
            completed_date: None,
            notes: None,
            assigned_employee_id: None,
            created_at: now,
            updated_at: now,
        };
        self.requests.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_if_status(
        &self,
        id: ServiceRequestId,
        expected: &[ServiceRequestStatus],
        update: RequestUpdate,
    ) -> DbResult<Option<ServiceRequest>> {
        // get_mut holds the shard write lock across check and write
        let Some(mut request) = self.requests.get_mut(&id) else {
            return Ok(None);
        };
        if !expected.contains(&request.status) {
            return Ok(None);
        }

        if let Some(status) = update.status {
            request.status = status;
        }
        if let Some(employee) = update.assigned_employee_id {
            request.assigned_employee_id = Some(employee);
        }
        if let Some(completed) = update.completed_date {
            request.completed_date = Some(completed);
        }
        if let Some(notes) = update.notes {
            request.notes = Some(notes);
        }
        request.updated_at = Utc::now();
        Ok(Some(request.clone()))
    }

    async fn find_upcoming_for_user(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<ServiceRequest>> {
        let mut requests = self.collect(|r| {
            &r.user_id == user_id
                && !r.status.is_terminal()
                && r.scheduled_date.is_some_and(|d| d >= from)
        });
        soonest_first(&mut requests);
        requests.truncate(limit as usize);
        Ok(requests)
    }

    async fn find_assigned_between(
        &self,
        employee_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<ServiceRequest>> {
        let mut requests = self.collect(|r| {
            r.assigned_employee_id.as_ref() == Some(employee_id)
                && !r.status.is_terminal()
                && in_range(r.scheduled_date, start, end)
        });
        soonest_first(&mut requests);
        Ok(requests)
    }

    async fn find_scheduled_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<ServiceRequest>> {
        let mut requests = self.collect(|r| {
            r.status == ServiceRequestStatus::Scheduled && in_range(r.scheduled_date, start, end)
        });
        soonest_first(&mut requests);
        Ok(requests)
    }

    async fn find_history_for_user(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<ServiceRequest>> {
        let mut requests = self.collect(|r| &r.user_id == user_id);
        latest_first(&mut requests);
        Ok(requests
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_in_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<ServiceRequest>> {
        // NULL scheduled dates fail any bound, as in SQL
        let mut requests = self.collect(|r| {
            let after = start.map_or(true, |s| r.scheduled_date.is_some_and(|d| d >= s));
            let before = end.map_or(true, |e| r.scheduled_date.is_some_and(|d| d <= e));
            after && before
        });
        latest_first(&mut requests);
        Ok(requests)
    }

    async fn count_completed_for_user_between(
        &self,
        user_id: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        Ok(self
            .collect(|r| {
                &r.user_id == user_id
                    && r.status == ServiceRequestStatus::Completed
                    && in_range(r.completed_date, start, end)
            })
            .len() as i64)
    }

    async fn count_scheduled_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        Ok(self.collect(|r| in_range(r.scheduled_date, start, end)).len() as i64)
    }

    async fn count_completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<i64> {
        Ok(self.collect(|r| in_range(r.completed_date, start, end)).len() as i64)
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// In-memory customer profile repository, keyed by user
#[derive(Default, Clone)]
pub struct MockProfileRepository {
    profiles: Arc<DashMap<UserId, CustomerProfile>>,
    seq: Arc<AtomicI64>,
}

#[async_trait]
impl CustomerProfileRepository for MockProfileRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> DbResult<Option<CustomerProfile>> {
        Ok(self.profiles.get(user_id).map(|p| p.value().clone()))
    }

    async fn upsert(&self, user_id: &UserId, details: ProfileDetails) -> DbResult<CustomerProfile> {
        let now = Utc::now();
        let profile = self
            .profiles
            .entry(user_id.clone())
            .and_modify(|p| {
                p.details = details.clone();
                p.updated_at = now;
            })
            .or_insert_with(|| CustomerProfile {
                id: ProfileId(next_id(&self.seq)),
                user_id: user_id.clone(),
                details: details.clone(),
                created_at: now,
                updated_at: now,
            })
            .clone();
        Ok(profile)
    }
}

// ============================================================================
// Bundle
// ============================================================================

/// Typed handles to every mock, plus the trait-object bundle for the engine
#[derive(Clone)]
pub struct MockStores {
    pub plans: MockPlanRepository,
    pub areas: MockServiceAreaRepository,
    pub subscriptions: MockSubscriptionRepository,
    pub payments: MockPaymentRepository,
    pub service_requests: MockServiceRequestRepository,
    pub profiles: MockProfileRepository,
}

impl MockStores {
    pub fn new() -> Self {
        let subscriptions = MockSubscriptionRepository::default();
        Self {
            plans: MockPlanRepository::default(),
            areas: MockServiceAreaRepository::default(),
            payments: MockPaymentRepository::new(subscriptions.clone()),
            subscriptions,
            service_requests: MockServiceRequestRepository::default(),
            profiles: MockProfileRepository::default(),
        }
    }

    pub fn stores(&self) -> Stores {
        Stores {
            plans: Arc::new(self.plans.clone()),
            areas: Arc::new(self.areas.clone()),
            subscriptions: Arc::new(self.subscriptions.clone()),
            payments: Arc::new(self.payments.clone()),
            service_requests: Arc::new(self.service_requests.clone()),
            profiles: Arc::new(self.profiles.clone()),
        }
    }
}
