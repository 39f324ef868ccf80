//! Single-strategy element lookup.
//!
//! Each strategy fails closed: when it cannot tell candidates apart it reports
//! an error rather than guessing. Text matching is the one exception and
//! accepts the first substring match.

use pagepilot_dom_adapter::{quote_attr_value, Document, NodeId};
use tracing::debug;

use crate::errors::LocatorError;
use crate::types::{LocatorKind, LocatorStrategy};

const TEXT_TARGETS: &str = r#"button, a, [role="button"], [role="link"]"#;
const PLACEHOLDER_TARGETS: &[&str] = &["input", "textarea"];
const LABELLED_CONTROLS: &str = "input, select, textarea";

fn query_all(doc: &Document, selector: &str) -> Result<Vec<NodeId>, LocatorError> {
    doc.query_selector_all(selector)
        .map_err(|err| LocatorError::InvalidSelector(err.to_string()))
}

fn unique(
    doc: &Document,
    kind: LocatorKind,
    selector: &str,
) -> Result<NodeId, LocatorError> {
    let matches = query_all(doc, selector)?;
    match matches.as_slice() {
        [only] => Ok(*only),
        [] => Err(LocatorError::ElementNotFound(format!("{} {}", kind.name(), selector))),
        many => Err(LocatorError::AmbiguousMatch(format!(
            "{} {} matched {} elements",
            kind.name(),
            selector,
            many.len()
        ))),
    }
}

fn by_label(doc: &Document, text: &str) -> Result<NodeId, LocatorError> {
    let wanted = text.trim();
    for label in query_all(doc, "label")? {
        if doc.normalized_text(label) != wanted {
            continue;
        }
        if let Some(target) = doc.attr_non_empty(label, "for") {
            if let Some(node) = doc.get_element_by_id(&target) {
                return Ok(node);
            }
        }
        if let Ok(Some(nested)) = doc.query_selector_from(label, LABELLED_CONTROLS) {
            return Ok(nested);
        }
    }
    Err(LocatorError::ElementNotFound(format!("label {:?}", text)))
}

fn by_text(doc: &Document, text: &str) -> Result<NodeId, LocatorError> {
    let wanted = text.trim();
    if wanted.is_empty() {
        return Err(LocatorError::ElementNotFound("empty text".into()));
    }
    let candidates = query_all(doc, TEXT_TARGETS)?;
    let texts: Vec<(NodeId, String)> = candidates
        .into_iter()
        .map(|node| (node, doc.normalized_text(node)))
        .collect();
    texts
        .iter()
        .find(|(_, t)| t == wanted)
        .or_else(|| texts.iter().find(|(_, t)| t.contains(wanted)))
        .map(|(node, _)| *node)
        .ok_or_else(|| LocatorError::ElementNotFound(format!("text {:?}", text)))
}

fn by_placeholder(doc: &Document, placeholder: &str) -> Result<NodeId, LocatorError> {
    let selector = PLACEHOLDER_TARGETS
        .iter()
        .map(|tag| format!("{}[placeholder={}]", tag, quote_attr_value(placeholder)))
        .collect::<Vec<_>>()
        .join(", ");
    query_all(doc, &selector)?
        .into_iter()
        .next()
        .ok_or_else(|| LocatorError::ElementNotFound(format!("placeholder {:?}", placeholder)))
}

/// Apply exactly one strategy.
pub fn locate_by_strategy(
    doc: &Document,
    strategy: &LocatorStrategy,
) -> Result<NodeId, LocatorError> {
    let value = strategy.value.as_str();
    debug!(strategy = strategy.kind.name(), value, "applying locator");
    match strategy.kind {
        LocatorKind::Role => unique(doc, strategy.kind, &format!("[role={}]", quote_attr_value(value))),
        LocatorKind::Label => by_label(doc, value),
        LocatorKind::Text => by_text(doc, value),
        LocatorKind::Placeholder => by_placeholder(doc, value),
        LocatorKind::AriaLabel => unique(
            doc,
            strategy.kind,
            &format!("[aria-label={}]", quote_attr_value(value)),
        ),
        LocatorKind::Name => unique(doc, strategy.kind, &format!("[name={}]", quote_attr_value(value))),
        LocatorKind::Selector => query_all(doc, value)?
            .into_iter()
            .next()
            .ok_or_else(|| LocatorError::ElementNotFound(format!("selector {}", value))),
    }
}
