//! Bincycle Core - Subscription and service-request lifecycle engine
//!
//! Owns the state machines of a subscription's billing status and a service
//! request's fulfillment status, the area-adjusted pricing rule, and the
//! read-only dashboards built on top of them. All state lives behind the
//! repository traits of `bincycle-db`.
//!
//! # Example
//!
//! ```rust,ignore
//! use bincycle_core::{Engine, EngineConfig};
//! use bincycle_db::{create_pool, Repositories};
//!
//! let pool = create_pool("postgres://localhost/bincycle").await?;
//! let engine = Engine::new(Repositories::new(pool).into_stores(), EngineConfig::from_env()?)?;
//!
//! // Quote and subscribe
//! let price = engine.pricing.compute_price(plan_id, BillingCycle::Monthly, "75201").await?;
//! let sub = engine.subscriptions.create(&user_id, plan_id, BillingCycle::Monthly).await?;
//!
//! // Schedule and fulfil a pickup
//! let request = engine.requests.create_request(&user_id, "pickup", tomorrow).await?;
//! engine.requests.assign(request.id, &employee_id).await?;
//! engine.requests.complete(request.id, "done").await?;
//! ```

pub mod calendar;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod page;
pub mod pricing;
pub mod profile;
pub mod service_request;
pub mod subscription;

pub use catalog::PlanCatalog;
pub use config::{ConfigError, EngineConfig, MAX_TRIAL_DAYS};
pub use dashboard::{completion_rate, CustomerDashboard, DashboardAggregator, ManagerDashboard};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use page::Page;
pub use pricing::{PriceQuote, PricingCalculator};
pub use profile::CustomerProfiles;
pub use service_request::ServiceRequestWorkflow;
pub use subscription::SubscriptionManager;

// Re-export storage bundle for convenience
pub use bincycle_db::Stores;
