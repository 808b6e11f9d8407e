//! Service request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ParseEnumError, ServiceRequestId, SubscriptionId, UserId};

/// Fulfillment status of a service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRequestStatus {
    /// Entity default; not yet placed on the schedule
    #[default]
    Pending,
    Scheduled,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl ServiceRequestStatus {
    /// Every status, in workflow order
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Scheduled,
        Self::Assigned,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// `Completed` and `Cancelled` are final
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether a request may be handed to an employee for the first time
    pub const fn is_assignable(&self) -> bool {
        matches!(self, Self::Pending | Self::Scheduled)
    }

    /// Whether the request is currently in an employee's hands
    pub const fn is_in_hand(&self) -> bool {
        matches!(self, Self::Assigned | Self::InProgress)
    }
}

impl std::fmt::Display for ServiceRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceRequestStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "scheduled" => Ok(Self::Scheduled),
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseEnumError::new("service request status", s)),
        }
    }
}

/// One pickup, delivery or maintenance visit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: ServiceRequestId,
    pub user_id: UserId,
    /// Ad-hoc requests are not tied to a subscription
    pub subscription_id: Option<SubscriptionId>,
    /// Free-text category such as "pickup", "delivery" or "maintenance"
    pub service_type: String,
    pub status: ServiceRequestStatus,
    pub requested_date: DateTime<Utc>,
    pub scheduled_date: Option<DateTime<Utc>>,
    /// Set if and only if `status` is `Completed`
    pub completed_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub assigned_employee_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(ServiceRequestStatus::default(), ServiceRequestStatus::Pending);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ServiceRequestStatus::Completed.is_terminal());
        assert!(ServiceRequestStatus::Cancelled.is_terminal());
        assert!(!ServiceRequestStatus::InProgress.is_terminal());
        assert!(!ServiceRequestStatus::Pending.is_terminal());
    }

    #[test]
    fn test_assignable_only_before_assignment() {
        assert!(ServiceRequestStatus::Pending.is_assignable());
        assert!(ServiceRequestStatus::Scheduled.is_assignable());
        assert!(!ServiceRequestStatus::Assigned.is_assignable());
        assert!(!ServiceRequestStatus::Completed.is_assignable());
    }

    #[test]
    fn test_all_statuses_round_trip() {
        for status in ServiceRequestStatus::ALL {
            assert_eq!(status.as_str().parse::<ServiceRequestStatus>().unwrap(), status);
        }
        let assignable: Vec<_> = ServiceRequestStatus::ALL
            .into_iter()
            .filter(ServiceRequestStatus::is_assignable)
            .collect();
        assert_eq!(
            assignable,
            [ServiceRequestStatus::Pending, ServiceRequestStatus::Scheduled]
        );
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = "done".parse::<ServiceRequestStatus>().unwrap_err();
        assert_eq!(err.value, "done");
    }
}
