//! Error handling module

use pagepilot_dom_adapter::DomError;
use pagepilot_policy_center::PolicyError;
use thiserror::Error;

/// Failures while setting up or driving a page session
#[derive(Debug, Error)]
pub enum SessionError {
    /// The page could not be parsed or its window configured
    #[error("page error: {0}")]
    Page(#[from] DomError),

    /// Policy files or overrides were rejected
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Session settings are malformed
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SessionError {
    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            SessionError::Page(err) => err.severity(),
            SessionError::Policy(err) => err.severity(),
            SessionError::Config(_) => 1,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
