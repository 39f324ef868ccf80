//! PagePilot: the page-side core of an agentic browser assistant.
//!
//! A [`PageSession`] owns one loaded document and ties together structural
//! perception, element location and action execution under one agent policy.

pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod session;

pub use config::{load_agent_policy, SessionConfig, Viewport};
pub use errors::{SessionError, SessionResult};
pub use session::{ExtractKind, PageSession};
