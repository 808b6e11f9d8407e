//! Subscription and payment types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BillingCycle, ParseEnumError, PaymentId, SubscriptionId, UserId};

/// Subscription billing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Grace period before the first charge
    Trial,
    /// Paying and in good standing
    Active,
    /// Temporarily suspended by the customer
    Paused,
    /// Terminated; no transition leaves this state
    Cancelled,
    /// Payment failed and is being retried
    PastDue,
}

impl SubscriptionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
            Self::PastDue => "past_due",
        }
    }

    /// Whether the subscription can no longer change status
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(Self::Trial),
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "cancelled" => Ok(Self::Cancelled),
            "past_due" => Ok(Self::PastDue),
            _ => Err(ParseEnumError::new("subscription status", s)),
        }
    }
}

/// One customer's billing relationship.
///
/// Plan name, price, bins and pickups are snapshots taken from the catalog
/// when the subscription was created or last changed plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_name: String,
    /// Monthly amount, 2 fractional digits
    pub monthly_price: Decimal,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub next_billing_date: DateTime<Utc>,
    /// Payment processor subscription id (opaque)
    pub processor_subscription_id: Option<String>,
    /// Payment processor customer id (opaque)
    pub processor_customer_id: Option<String>,
    pub billing_cycle: BillingCycle,
    pub bins_included: i32,
    pub pickups_per_week: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payment status as reported by the payment processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(ParseEnumError::new("payment status", s)),
        }
    }
}

/// A billed transaction against a subscription (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub subscription_id: SubscriptionId,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_intent_id: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
