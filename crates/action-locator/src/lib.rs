//! Stable locators and smart re-location
//!
//! Registry ids die with their collection pass. This crate re-finds an element
//! afterwards from what was last known about it:
//! - identity-independent strategies (role, label, text, placeholder,
//!   aria-label, name, attribute selector) in priority order
//! - keyword search over a free-text description
//! - an advisory validation score against the old snapshot

pub mod errors;
pub mod generator;
pub mod resolver;
pub mod strategies;
pub mod types;
pub mod validation;

pub use errors::*;
pub use generator::*;
pub use resolver::*;
pub use strategies::*;
pub use types::*;
pub use validation::*;
