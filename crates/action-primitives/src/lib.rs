//! Action Primitives - agent commands executed against the live page
//!
//! This crate turns `PageAction`s into DOM effects:
//! - Target resolution by element id, stable locators, selector or description
//! - One primitive per action kind, firing the events a page framework expects
//! - Paced multi-step actions (typing, dragging, waiting, batches)
//! - Clipboard and script capabilities behind ports
//! - Failures reported as structured results, never as panics

pub mod errors;
pub mod executor;
pub mod locator;
pub mod ports;
mod primitives;
pub mod types;
mod waiting;

pub use errors::*;
pub use executor::{ActionExecutor, DefaultActionExecutor};
pub use locator::*;
pub use ports::*;
pub use primitives::{
    clear_marks, match_option, property_value, readable_text, HIGHLIGHT_CLASS, MARK_ATTR,
    UNDERLINE_CLASS,
};
pub use types::*;
pub use waiting::*;
