//! Shared primitives for the pagepilot page-automation core.
//!
//! Everything in this crate crosses the agent boundary: the element snapshots
//! and compact projections sent to the planner, the action commands it sends
//! back, and the structured results returned for each command.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod action;
pub mod element;
pub mod result;

pub use action::*;
pub use element::*;
pub use result::*;

/// Shared error type for parsing wire values outside of serde.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

/// Ephemeral identity handed to the agent for one collection pass.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Correlation id for one executed action.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub String);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a plain wire token (e.g. `"header"`) through the serde representation
/// of a unit-variant enum.
pub(crate) fn parse_wire_token<T>(kind: &'static str, raw: &str) -> Result<T, WireError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string())).map_err(|_| {
        WireError::UnknownVariant {
            kind,
            value: raw.to_string(),
        }
    })
}
