//! PostgreSQL repository implementations

mod payment;
mod plan;
mod profile;
mod service_area;
mod service_request;
mod subscription;

pub use payment::PgPaymentRepository;
pub use plan::PgPlanRepository;
pub use profile::PgCustomerProfileRepository;
pub use service_area::PgServiceAreaRepository;
pub use service_request::PgServiceRequestRepository;
pub use subscription::PgSubscriptionRepository;

use std::sync::Arc;

use crate::{DbPool, Stores};

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub plans: PgPlanRepository,
    pub areas: PgServiceAreaRepository,
    pub subscriptions: PgSubscriptionRepository,
    pub payments: PgPaymentRepository,
    pub service_requests: PgServiceRequestRepository,
    pub profiles: PgCustomerProfileRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            plans: PgPlanRepository::new(pool.clone()),
            areas: PgServiceAreaRepository::new(pool.clone()),
            subscriptions: PgSubscriptionRepository::new(pool.clone()),
            payments: PgPaymentRepository::new(pool.clone()),
            service_requests: PgServiceRequestRepository::new(pool.clone()),
            profiles: PgCustomerProfileRepository::new(pool),
        }
    }

    /// Erase the concrete types for the engine
    pub fn into_stores(self) -> Stores {
        Stores {
            plans: Arc::new(self.plans),
            areas: Arc::new(self.areas),
            subscriptions: Arc::new(self.subscriptions),
            payments: Arc::new(self.payments),
            service_requests: Arc::new(self.service_requests),
            profiles: Arc::new(self.profiles),
        }
    }
}

