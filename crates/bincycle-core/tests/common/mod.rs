//! Common test utilities for bincycle-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::{
    MockPaymentRepository, MockPlanRepository, MockProfileRepository, MockServiceAreaRepository,
    MockServiceRequestRepository, MockStores, MockSubscriptionRepository,
};

use bincycle_core::{Engine, EngineConfig};
use bincycle_db::{CreatePlan, CreateServiceArea};
use bincycle_types::{PlanId, UserId};
use rust_decimal::Decimal;

/// Engine over fresh in-memory stores
#[allow(dead_code)]
pub fn test_engine() -> (Engine, MockStores) {
    let mocks = MockStores::new();
    let engine = Engine::new(mocks.stores(), EngineConfig::default()).expect("default config");
    (engine, mocks)
}

/// Seed the "Basic" plan ($29 monthly, $299 yearly)
#[allow(dead_code)]
pub async fn seed_basic_plan(mocks: &MockStores) -> PlanId {
    use bincycle_db::PlanRepository;

    mocks
        .plans
        .create(CreatePlan::new("Basic", Decimal::new(29, 0), Decimal::new(299, 0)))
        .await
        .expect("create plan")
        .id
}

/// Seed an area for `zip_code` with the given multiplier
#[allow(dead_code)]
pub async fn seed_area(mocks: &MockStores, zip_code: &str, multiplier: Decimal) {
    use bincycle_db::ServiceAreaRepository;

    mocks
        .areas
        .create(CreateServiceArea {
            name: format!("Area {zip_code}"),
            city: "Dallas".to_string(),
            state: "TX".to_string(),
            zip_code: zip_code.to_string(),
            service_multiplier: multiplier,
        })
        .await
        .expect("create area");
}

#[allow(dead_code)]
pub fn user(id: &str) -> UserId {
    UserId::new(id)
}
