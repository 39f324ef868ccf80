use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid policy: {0}")]
    Invalid(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("unsupported policy path: {0}")]
    UnsupportedPath(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl PolicyError {
    /// Get error severity level (0=low, 1=medium, 2=high, 3=critical)
    pub fn severity(&self) -> u8 {
        match self {
            PolicyError::Io(_) => 2,
            PolicyError::Invalid(_) => 2,
            PolicyError::UnsupportedPath(_) | PolicyError::InvalidValue(_) => 1,
        }
    }
}
