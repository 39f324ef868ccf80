//! Action primitives implementation
//!
//! One module per family of actions:
//! - click / drag - pointer sequences
//! - type_text / select / focus - form controls
//! - annotate - highlight, underline, text selection
//! - read / scroll / wait / navigate
//! - storage / clipboard / upload / script
//! - list / content - page content edits

mod annotate;
mod click;
mod clipboard;
mod content;
mod drag;
mod focus;
mod list;
mod navigate;
mod read;
mod script;
mod scroll;
mod select;
mod storage;
mod type_text;
mod upload;
mod wait;

pub use annotate::*;
pub use click::*;
pub use clipboard::*;
pub use content::*;
pub use drag::*;
pub use focus::*;
pub use list::*;
pub use navigate::*;
pub use read::*;
pub use script::*;
pub use scroll::*;
pub use select::*;
pub use storage::*;
pub use type_text::*;
pub use upload::*;
pub use wait::*;

use pagepilot_core_types::{ActionTarget, ErrorCode};
use pagepilot_dom_adapter::{Document, NodeId};

use crate::errors::ActionError;

/// Longest element text echoed back in a result message.
const MESSAGE_TEXT_LEN: usize = 40;

/// A required, non-empty string parameter.
pub(crate) fn require<'a>(
    value: &'a Option<String>,
    param: &'static str,
    code: ErrorCode,
) -> Result<&'a str, ActionError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ActionError::missing(param, code))
}

/// Short name for an element in result messages.
pub(crate) fn label_for(doc: &Document, node: NodeId, target: &ActionTarget) -> String {
    if let Some(description) = target.description.as_deref().filter(|d| !d.is_empty()) {
        return description.to_string();
    }
    let text = doc.normalized_text(node);
    if !text.is_empty() {
        let mut short: String = text.chars().take(MESSAGE_TEXT_LEN).collect();
        if text.chars().count() > MESSAGE_TEXT_LEN {
            short.push_str("...");
        }
        return short;
    }
    doc.tag(node).unwrap_or("element").to_string()
}

/// Viewport coordinates of an element's center.
pub(crate) fn center_of(doc: &Document, node: NodeId) -> (f64, f64) {
    doc.bounding_rect(node).center()
}

/// Text inputs, textareas and content-editable hosts.
pub(crate) fn is_editable(doc: &Document, node: NodeId) -> bool {
    doc.is_text_control(node) || doc.is_content_editable(node)
}

/// Current editable text: the value of a control or the text of an editing host.
pub(crate) fn editable_text(doc: &Document, node: NodeId) -> String {
    if doc.is_text_control(node) {
        doc.value(node)
    } else {
        doc.text_content(node)
    }
}

/// Replace editable text and fire the events a framework listens for.
pub(crate) fn write_editable(doc: &mut Document, node: NodeId, text: &str) -> Result<(), ActionError> {
    if doc.is_text_control(node) {
        doc.set_value(node, text)?;
        doc.dispatch(node, "input");
        doc.dispatch(node, "change");
    } else {
        doc.set_text_content(node, text)?;
        doc.dispatch(node, "input");
    }
    Ok(())
}

pub(crate) fn require_editable(doc: &Document, node: NodeId) -> Result<(), ActionError> {
    if is_editable(doc, node) {
        Ok(())
    } else {
        Err(ActionError::InvalidElement(format!(
            "<{}> does not accept text input",
            doc.tag(node).unwrap_or("?")
        )))
    }
}
