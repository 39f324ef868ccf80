//! Error types for action execution

use pagepilot_core_types::ErrorCode;
use pagepilot_dom_adapter::DomError;
use thiserror::Error;

/// Every way a single action can fail. Each variant maps onto exactly one
/// wire [`ErrorCode`].
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// A required parameter was absent
    #[error("Missing parameter: {param}")]
    MissingParam { param: &'static str, code: ErrorCode },

    /// Target could not be resolved by id, selector or description
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Target resolved to an element of the wrong kind
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// Text selection spans element boundaries that cannot be wrapped
    #[error("Selection crosses element boundaries: {0}")]
    CrossElement(String),

    /// Text to select or copy is not on the page
    #[error("Text not found: {0}")]
    TextNotFound(String),

    /// Dropdown option was not found
    #[error("Option not found in dropdown: {0}")]
    OptionNotFound(String),

    /// Nothing to act on: no target and no selection
    #[error("No target: {0}")]
    NoTarget(String),

    /// Wait operation timed out
    #[error("Wait timeout: {0}")]
    WaitTimeout(String),

    /// Drag source could not be resolved
    #[error("Drag source not found: {0}")]
    SourceNotFound(String),

    /// Drag destination selector matched nothing
    #[error("Drag destination not found: {0}")]
    DestinationNotFound(String),

    /// Clipboard port failed
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// File payload could not be decoded or assigned
    #[error("Upload error: {0}")]
    Upload(String),

    /// Script port rejected or failed the script
    #[error("Script error: {0}")]
    Script(String),

    /// Action name outside the known vocabulary
    #[error("Unsupported action: {0}")]
    Unsupported(String),

    /// Document mutation failed
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    pub fn missing(param: &'static str, code: ErrorCode) -> Self {
        ActionError::MissingParam { param, code }
    }

    /// Wire code reported in `ActionResult.error`.
    pub fn code(&self) -> ErrorCode {
        match self {
            ActionError::MissingParam { code, .. } => *code,
            ActionError::ElementNotFound(_) => ErrorCode::ElementNotFound,
            ActionError::InvalidElement(_) => ErrorCode::InvalidElement,
            ActionError::CrossElement(_) => ErrorCode::CrossElement,
            ActionError::TextNotFound(_) => ErrorCode::NoText,
            ActionError::OptionNotFound(_) => ErrorCode::OptionNotFound,
            ActionError::NoTarget(_) => ErrorCode::NoTarget,
            ActionError::WaitTimeout(_) => ErrorCode::Timeout,
            ActionError::SourceNotFound(_) => ErrorCode::SourceNotFound,
            ActionError::DestinationNotFound(_) => ErrorCode::DestinationNotFound,
            ActionError::Clipboard(_) => ErrorCode::ClipboardError,
            ActionError::Upload(_) => ErrorCode::UploadError,
            ActionError::Script(_) => ErrorCode::ScriptError,
            ActionError::Unsupported(_) => ErrorCode::UnsupportedAction,
            ActionError::Dom(_) | ActionError::Internal(_) => ErrorCode::ExecutionError,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ActionError::WaitTimeout(_) | ActionError::ElementNotFound(_) | ActionError::Clipboard(_)
        )
    }

    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            ActionError::Internal(_) => 3,
            ActionError::Dom(_) | ActionError::Script(_) | ActionError::Upload(_) => 2,
            ActionError::WaitTimeout(_)
            | ActionError::ElementNotFound(_)
            | ActionError::SourceNotFound(_)
            | ActionError::DestinationNotFound(_)
            | ActionError::CrossElement(_)
            | ActionError::Clipboard(_) => 1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_maps_to_a_wire_code() {
        assert_eq!(
            ActionError::missing("value", ErrorCode::NoValue).code(),
            ErrorCode::NoValue
        );
        assert_eq!(ActionError::WaitTimeout("x".into()).code(), ErrorCode::Timeout);
        assert_eq!(
            ActionError::Dom(DomError::InvalidSelector("[[".into())).code(),
            ErrorCode::ExecutionError
        );
        assert_eq!(
            ActionError::Unsupported("teleport".into()).code().as_str(),
            "UNSUPPORTED_ACTION"
        );
    }

    #[test]
    fn severity_and_retry_classification() {
        assert!(ActionError::WaitTimeout("late".into()).is_retryable());
        assert!(!ActionError::OptionNotFound("zz".into()).is_retryable());
        assert_eq!(ActionError::Internal("boom".into()).severity(), 3);
        assert_eq!(ActionError::NoTarget("none".into()).severity(), 0);
    }
}
