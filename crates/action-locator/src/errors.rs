//! Error types for locator system

use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// Element not found with any strategy
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Multiple elements match (ambiguous)
    #[error("Multiple elements match: {0}")]
    AmbiguousMatch(String),

    /// Selector text the engine rejects
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Strategy execution failed
    #[error("Strategy '{strategy}' failed: {reason}")]
    StrategyFailed { strategy: String, reason: String },

    /// Every strategy was tried without a match
    #[error("All strategies exhausted: {0}")]
    Exhausted(String),
}

impl LocatorError {
    /// A later attempt may succeed once the page settles.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LocatorError::ElementNotFound(_) | LocatorError::Exhausted(_)
        )
    }

    /// Get error severity (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            LocatorError::InvalidSelector(_) => 2,
            LocatorError::ElementNotFound(_)
            | LocatorError::Exhausted(_)
            | LocatorError::StrategyFailed { .. } => 1,
            LocatorError::AmbiguousMatch(_) => 0,
        }
    }
}
