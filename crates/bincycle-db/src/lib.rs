//! Bincycle DB - Storage layer
//!
//! SQLx-based persistence for plans, service areas, subscriptions, payments,
//! service requests and customer profiles. The engine only talks to the
//! repository traits in [`repo`]; [`pg`] holds the PostgreSQL implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use bincycle_db::{create_pool, run_migrations, Repositories};
//!
//! let pool = create_pool("postgres://localhost/bincycle").await?;
//! run_migrations(&pool).await?;
//! let stores = Repositories::new(pool).into_stores();
//!
//! let plans = stores.plans.find_active().await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{close_pool, create_pool, create_pool_with_options, run_migrations, DbPool, PoolOptions};
pub use repo::*;
