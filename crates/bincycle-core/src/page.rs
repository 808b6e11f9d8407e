//! Offset pagination

use crate::{EngineError, EngineResult};

/// A validated page request (1-based page number)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    size: i64,
    number: i64,
}

impl Page {
    /// Validate a page size and a 1-based page number
    pub fn new(size: i64, number: i64) -> EngineResult<Self> {
        if size < 1 {
            return Err(EngineError::Validation(format!(
                "page size must be at least 1, got {size}"
            )));
        }
        if number < 1 {
            return Err(EngineError::Validation(format!(
                "page number must be at least 1, got {number}"
            )));
        }
        Ok(Self { size, number })
    }

    /// Rows to return
    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Rows to skip: `(page - 1) * size`
    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(Page::new(10, 1).unwrap().offset(), 0);
        assert_eq!(Page::new(10, 3).unwrap().offset(), 20);
        assert_eq!(Page::new(50, 2).unwrap().limit(), 50);
    }

    #[test]
    fn test_rejects_non_positive_values() {
        assert!(Page::new(10, 0).unwrap_err().is_validation());
        assert!(Page::new(10, -1).unwrap_err().is_validation());
        assert!(Page::new(0, 1).unwrap_err().is_validation());
    }
}
