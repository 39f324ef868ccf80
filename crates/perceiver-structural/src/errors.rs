use thiserror::Error;

use pagepilot_dom_adapter::DomError;

/// Lookup failures for ids handed out by a collection pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("element id not registered in the current pass: {0}")]
    NotFound(String),
    #[error("element {0} was removed from the document after collection")]
    Detached(String),
}

impl RegistryError {
    pub fn id(&self) -> &str {
        match self {
            Self::NotFound(id) | Self::Detached(id) => id,
        }
    }
}

#[derive(Debug, Error)]
pub enum PerceiverError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("document error: {0}")]
    Dom(#[from] DomError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl PerceiverError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A fresh collection pass may succeed where a stale id failed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Registry(_))
    }

    pub fn severity(&self) -> u8 {
        match self {
            Self::Registry(_) => 1,
            Self::Dom(_) => 2,
            Self::Internal(_) => 3,
        }
    }
}

pub type PerceiverResult<T> = Result<T, PerceiverError>;
