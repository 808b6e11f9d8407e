//! Bincycle Types - Shared domain types
//!
//! This crate contains domain types used across the bincycle crates:
//! - Identifiers for users and stored records
//! - The plan catalog and service areas
//! - Subscriptions, payments and service requests
//! - Customer profiles

pub mod error;
pub mod id;
pub mod plan;
pub mod profile;
pub mod service_request;
pub mod subscription;

pub use error::*;
pub use id::*;
pub use plan::*;
pub use profile::*;
pub use service_request::*;
pub use subscription::*;
