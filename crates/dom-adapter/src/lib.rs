//! Document & window model
//!
//! The page the core observes and mutates:
//! - Arena document tree with a tolerant HTML parser and serializer
//! - CSS selector engine (compound, attribute, combinator and pseudo-class)
//! - Inline style and a simple absolute layout model
//! - Form-control state and a synthetic event log
//! - Window state: viewport, scroll, history, storage, cookies, selection

pub mod document;
pub mod errors;
pub mod events;
pub mod html;
pub mod node;
pub mod selector;
pub mod style;
pub mod window;

pub use document::Document;
pub use errors::*;
pub use events::{DomEvent, EventDetail, EventLog};
pub use html::decode_entities;
pub use node::{AttachedFile, ElementData, Node, NodeId, NodeKind};
pub use selector::{escape_ident, quote_attr_value, SelectorList};
pub use style::{parse_px, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use window::{Cookie, DialogPolicy, TextSelection, Window};
