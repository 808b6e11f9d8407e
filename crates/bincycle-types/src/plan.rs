//! Plan catalog types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ParseEnumError, PlanId, ServiceAreaId};

/// Which catalog price a subscription is billed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    /// Billed every month at the plan's monthly price
    #[default]
    Monthly,
    /// Billed once a year at the plan's yearly price
    Yearly,
}

impl BillingCycle {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BillingCycle {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(ParseEnumError::new("billing cycle", s)),
        }
    }
}

/// Support tier bundled with a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportLevel {
    #[default]
    Email,
    Priority,
    /// Round-the-clock support (displayed as "24/7")
    AllHours,
}

impl SupportLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Priority => "priority",
            Self::AllHours => "all_hours",
        }
    }
}

impl std::fmt::Display for SupportLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SupportLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "priority" => Ok(Self::Priority),
            "all_hours" | "24/7" => Ok(Self::AllHours),
            _ => Err(ParseEnumError::new("support level", s)),
        }
    }
}

/// Feature flags advertised for a plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFeatures {
    pub holiday_adjustment: bool,
    pub gps_tracking: bool,
    pub sms_notifications: bool,
    pub email_notifications: bool,
    pub mobile_app: bool,
    pub priority_support: bool,
    pub account_manager: bool,
    pub service_reports: bool,
    pub support_level: SupportLevel,
}

/// Catalog entry a subscription is priced from.
///
/// Plans are never deleted; retiring a plan clears `is_active` so that
/// historical subscriptions keep a valid reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: PlanId,
    pub name: String,
    pub description: String,
    pub monthly_price: Decimal,
    pub yearly_price: Decimal,
    pub setup_fee: Decimal,
    pub bins_included: i32,
    pub pickups_per_week: i32,
    pub features: PlanFeatures,
    pub is_active: bool,
    pub is_popular: bool,
    pub is_enterprise: bool,
    /// Display color for the plan badge (e.g. "#007bff")
    pub badge_color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionPlan {
    /// Catalog price for the given billing cycle, before any area multiplier
    pub fn base_price(&self, cycle: BillingCycle) -> Decimal {
        match cycle {
            BillingCycle::Monthly => self.monthly_price,
            BillingCycle::Yearly => self.yearly_price,
        }
    }
}

/// Postal-code keyed pricing zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceArea {
    pub id: ServiceAreaId,
    pub name: String,
    pub city: String,
    pub state: String,
    /// Lookup key, matched by exact string equality
    pub zip_code: String,
    pub is_active: bool,
    /// Factor applied to the base plan price (typically 0.9 - 1.3)
    pub service_multiplier: Decimal,
    pub created_at: DateTime<Utc>,
}
