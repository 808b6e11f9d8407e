//! Engine configuration

use std::str::FromStr;

/// Longest accepted free trial (ten years)
pub const MAX_TRIAL_DAYS: i64 = 3650;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Length of the free trial a new subscription starts with
    pub trial_days: i64,
    /// Maximum number of upcoming services returned to a customer
    pub upcoming_limit: i64,
    /// Default page size for service history
    pub history_page_size: i64,
    /// Default page size for the manager subscription listing
    pub subscription_page_size: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// Create a config with the standard defaults
    pub fn new() -> Self {
        Self {
            trial_days: 30,
            upcoming_limit: 10,
            history_page_size: 10,
            subscription_page_size: 50,
        }
    }

    /// Load configuration from environment variables (and `.env`)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::new();
        let config = Self {
            trial_days: env_or("BINCYCLE_TRIAL_DAYS", defaults.trial_days)?,
            upcoming_limit: env_or("BINCYCLE_UPCOMING_LIMIT", defaults.upcoming_limit)?,
            history_page_size: env_or("BINCYCLE_HISTORY_PAGE_SIZE", defaults.history_page_size)?,
            subscription_page_size: env_or(
                "BINCYCLE_SUBSCRIPTION_PAGE_SIZE",
                defaults.subscription_page_size,
            )?,
        };
        config.validate()?;

        tracing::debug!(?config, "Engine configuration loaded");
        Ok(config)
    }

    /// Set trial length in days
    pub fn with_trial_days(mut self, days: i64) -> Self {
        self.trial_days = days;
        self
    }

    /// Set the upcoming services cap
    pub fn with_upcoming_limit(mut self, limit: i64) -> Self {
        self.upcoming_limit = limit;
        self
    }

    /// Set default page sizes
    pub fn with_page_sizes(mut self, history: i64, subscriptions: i64) -> Self {
        self.history_page_size = history;
        self.subscription_page_size = subscriptions;
        self
    }

    /// Check every value is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=MAX_TRIAL_DAYS).contains(&self.trial_days) {
            return Err(ConfigError::Invalid("BINCYCLE_TRIAL_DAYS"));
        }
        if self.upcoming_limit < 1 {
            return Err(ConfigError::Invalid("BINCYCLE_UPCOMING_LIMIT"));
        }
        if self.history_page_size < 1 {
            return Err(ConfigError::Invalid("BINCYCLE_HISTORY_PAGE_SIZE"));
        }
        if self.subscription_page_size < 1 {
            return Err(ConfigError::Invalid("BINCYCLE_SUBSCRIPTION_PAGE_SIZE"));
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.trial_days, 30);
        assert_eq!(config.upcoming_limit, 10);
        assert_eq!(config.history_page_size, 10);
        assert_eq!(config.subscription_page_size, 50);
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::new()
            .with_trial_days(14)
            .with_upcoming_limit(5)
            .with_page_sizes(20, 100);
        assert_eq!(config.trial_days, 14);
        assert_eq!(config.upcoming_limit, 5);
        assert_eq!(config.history_page_size, 20);
        assert_eq!(config.subscription_page_size, 100);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = EngineConfig::new().with_upcoming_limit(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid("BINCYCLE_UPCOMING_LIMIT"))
        ));
    }

    #[test]
    fn test_validate_bounds_trial_days() {
        assert!(EngineConfig::new().with_trial_days(0).validate().is_ok());
        assert!(EngineConfig::new()
            .with_trial_days(MAX_TRIAL_DAYS)
            .validate()
            .is_ok());
        for days in [-1, MAX_TRIAL_DAYS + 1, 1_000_000_000, i64::MAX] {
            assert!(matches!(
                EngineConfig::new().with_trial_days(days).validate(),
                Err(ConfigError::Invalid("BINCYCLE_TRIAL_DAYS"))
            ));
        }
    }

    #[test]
    fn test_env_or_uses_default_when_unset() {
        let value: i64 = env_or("BINCYCLE_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
