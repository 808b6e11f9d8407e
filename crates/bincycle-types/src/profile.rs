//! Customer profile types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ParseEnumError, ProfileId, UserId};

/// Channel the customer wants service notifications on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPreference {
    Sms,
    Email,
    #[default]
    Both,
}

impl NotificationPreference {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Email => "email",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for NotificationPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NotificationPreference {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sms" => Ok(Self::Sms),
            "email" => Ok(Self::Email),
            "both" => Ok(Self::Both),
            _ => Err(ParseEnumError::new("notification preference", s)),
        }
    }
}

/// Customer-editable profile fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub service_address: Option<String>,
    pub service_city: Option<String>,
    pub service_state: Option<String>,
    pub service_zip_code: Option<String>,
    /// e.g. "Monday"
    pub preferred_service_day: Option<String>,
    /// e.g. "Morning"
    pub preferred_service_time: Option<String>,
    pub special_instructions: Option<String>,
    pub allow_weekend_service: bool,
    pub allow_holiday_service: bool,
    pub notification_preference: NotificationPreference,
}

impl Default for ProfileDetails {
    fn default() -> Self {
        Self {
            service_address: None,
            service_city: None,
            service_state: None,
            service_zip_code: None,
            preferred_service_day: None,
            preferred_service_time: None,
            special_instructions: None,
            allow_weekend_service: false,
            allow_holiday_service: true,
            notification_preference: NotificationPreference::Both,
        }
    }
}

/// Service preferences, one per user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub details: ProfileDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
