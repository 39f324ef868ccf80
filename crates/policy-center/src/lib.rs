//! Agent policy: layered configuration for collection, ranking, execution and
//! locator validation.

pub mod apply;
pub mod defaults;
pub mod errors;
pub mod loader;
pub mod model;

pub use apply::apply_override;
pub use defaults::{default_policy, DEFAULT_STOP_WORDS};
pub use errors::PolicyError;
pub use loader::{load_policy, load_policy_with_options, LoadOptions};
pub use model::*;

#[cfg(test)]
mod tests;
