//! Engine errors

use bincycle_db::DbError;
use bincycle_types::{ParseEnumError, PlanId};
use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record (e.g. "subscription")
        entity: &'static str,
        /// The id that did not resolve
        id: String,
    },

    /// Plan id does not resolve to an active plan
    #[error("plan {0} not found")]
    PlanNotFound(PlanId),

    /// No active service area for a zip code
    #[error("no service area for zip code {0}")]
    AreaNotFound(String),

    /// Concurrent or out-of-order state change was rejected
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed input
    #[error("validation error: {0}")]
    Validation(String),

    /// Storage failure, not retried
    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

impl EngineError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Check if this is a not found error (including catalog misses)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::PlanNotFound(_) | Self::AreaNotFound(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ParseEnumError> for EngineError {
    fn from(err: ParseEnumError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bincycle_types::BillingCycle;

    #[test]
    fn test_catalog_misses_count_as_not_found() {
        assert!(EngineError::PlanNotFound(PlanId(1)).is_not_found());
        assert!(EngineError::AreaNotFound("00000".into()).is_not_found());
        assert!(EngineError::not_found("subscription", 4).is_not_found());
        assert!(!EngineError::Conflict("x".into()).is_not_found());
    }

    #[test]
    fn test_unsupported_billing_cycle_is_validation_error() {
        let err: EngineError = "weekly".parse::<BillingCycle>().unwrap_err().into();
        assert!(err.is_validation());
    }

    #[test]
    fn test_not_found_message_names_entity() {
        let err = EngineError::not_found("service request", 12);
        assert_eq!(err.to_string(), "service request 12 not found");
    }
}
