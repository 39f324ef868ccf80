//! Structured outcomes returned for every action.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Machine-readable failure codes surfaced in [`ActionResult::error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoValue,
    ElementNotFound,
    InvalidElement,
    CrossElement,
    OptionNotFound,
    NoTarget,
    Timeout,
    SourceNotFound,
    DestinationNotFound,
    NoDestination,
    NoText,
    NoKey,
    NoAttribute,
    NoProperty,
    NoScript,
    NoContent,
    NoHtml,
    NoFiles,
    NoUrl,
    ClipboardError,
    UploadError,
    ScriptError,
    ExecutionError,
    UnsupportedAction,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NoValue => "NO_VALUE",
            ErrorCode::ElementNotFound => "ELEMENT_NOT_FOUND",
            ErrorCode::InvalidElement => "INVALID_ELEMENT",
            ErrorCode::CrossElement => "CROSS_ELEMENT",
            ErrorCode::OptionNotFound => "OPTION_NOT_FOUND",
            ErrorCode::NoTarget => "NO_TARGET",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::SourceNotFound => "SOURCE_NOT_FOUND",
            ErrorCode::DestinationNotFound => "DESTINATION_NOT_FOUND",
            ErrorCode::NoDestination => "NO_DESTINATION",
            ErrorCode::NoText => "NO_TEXT",
            ErrorCode::NoKey => "NO_KEY",
            ErrorCode::NoAttribute => "NO_ATTRIBUTE",
            ErrorCode::NoProperty => "NO_PROPERTY",
            ErrorCode::NoScript => "NO_SCRIPT",
            ErrorCode::NoContent => "NO_CONTENT",
            ErrorCode::NoHtml => "NO_HTML",
            ErrorCode::NoFiles => "NO_FILES",
            ErrorCode::NoUrl => "NO_URL",
            ErrorCode::ClipboardError => "CLIPBOARD_ERROR",
            ErrorCode::UploadError => "UPLOAD_ERROR",
            ErrorCode::ScriptError => "SCRIPT_ERROR",
            ErrorCode::ExecutionError => "EXECUTION_ERROR",
            ErrorCode::UnsupportedAction => "UNSUPPORTED_ACTION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one action. A failed result always carries an error code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    pub fn ok_with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error: Some(code),
        }
    }

    /// Data as a string, for read-type actions.
    pub fn data_str(&self) -> Option<&str> {
        self.data.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchActionResult {
    pub success: bool,
    pub results: Vec<ActionResult>,
    pub summary: String,
}

impl BatchActionResult {
    pub fn from_results(results: Vec<ActionResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        let failed = results.len() - succeeded;
        Self {
            success: failed == 0,
            summary: format!(
                "executed {} actions: {} succeeded, {} failed",
                results.len(),
                succeeded,
                failed
            ),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_as_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::DestinationNotFound).unwrap(),
            "\"DESTINATION_NOT_FOUND\""
        );
        assert_eq!(serde_json::to_string(&ErrorCode::NoHtml).unwrap(), "\"NO_HTML\"");
        assert_eq!(ErrorCode::NoUrl.as_str(), "NO_URL");
    }

    #[test]
    fn failure_always_carries_code() {
        let result = ActionResult::failure(ErrorCode::NoValue, "missing value");
        assert!(!result.success);
        assert_eq!(result.error, Some(ErrorCode::NoValue));
    }

    #[test]
    fn batch_summary_counts_failures() {
        let batch = BatchActionResult::from_results(vec![
            ActionResult::ok("done"),
            ActionResult::failure(ErrorCode::Timeout, "late"),
        ]);
        assert!(!batch.success);
        assert_eq!(batch.results.len(), 2);
        assert_eq!(batch.summary, "executed 2 actions: 1 succeeded, 1 failed");
    }

    #[test]
    fn empty_batch_is_successful() {
        assert!(BatchActionResult::from_results(Vec::new()).success);
    }
}
