//! Stable locator generation from a last-known-good element.

use pagepilot_core_types::PageElement;
use pagepilot_dom_adapter::{escape_ident, quote_attr_value, Document, NodeId};

use crate::types::{LocatorKind, LocatorStrategy};

/// Text longer than this is too volatile to re-find an element by.
pub const MAX_TEXT_LOCATOR_LEN: usize = 100;

const VOLATILE_ID_PREFIXES: &[&str] = &["id", "uid", "uuid", "random", "temp", "tmp"];
const IDENTITY_ATTRS: &[&str] = &["data-testid", "data-id"];
const QUALIFYING_ATTRS: &[&str] = &["name", "type", "role", "aria-label"];

const CONTAINERS: &[&str] = &["form", "fieldset"];

/// Ids that look machine-generated (`uid-42`, `tmp_x`, ...) change between renders.
pub fn is_volatile_id(id: &str) -> bool {
    let lower = id.to_ascii_lowercase();
    VOLATILE_ID_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

fn stable_id(doc: &Document, node: NodeId) -> Option<String> {
    doc.attr_non_empty(node, "id").filter(|id| !is_volatile_id(id))
}

/// Attribute-based selector that avoids classes and volatile ids.
pub fn stable_selector(doc: &Document, node: NodeId) -> Option<String> {
    let tag = doc.tag(node)?;
    if let Some(id) = stable_id(doc, node) {
        return Some(format!("#{}", escape_ident(&id)));
    }
    for attr in IDENTITY_ATTRS {
        if let Some(value) = doc.attr_non_empty(node, attr) {
            return Some(format!("[{}={}]", attr, quote_attr_value(&value)));
        }
    }

    let qualifiers: String = QUALIFYING_ATTRS
        .iter()
        .filter_map(|attr| {
            doc.attr_non_empty(node, attr)
                .map(|value| format!("[{}={}]", attr, quote_attr_value(&value)))
        })
        .collect();
    if !qualifiers.is_empty() {
        return Some(format!("{}{}", tag, qualifiers));
    }

    CONTAINERS.iter().find_map(|container| {
        let scope = doc.closest(node, container).ok().flatten()?;
        let id = stable_id(doc, scope)?;
        Some(format!("{}#{} {}", container, escape_ident(&id), tag))
    })
}

/// Every applicable strategy, highest priority first.
pub fn generate_stable_locators(
    doc: &Document,
    element: &PageElement,
    node: Option<NodeId>,
) -> Vec<LocatorStrategy> {
    let mut strategies = Vec::new();
    if let Some(role) = node.and_then(|n| doc.attr_non_empty(n, "role")) {
        strategies.push(LocatorStrategy::new(LocatorKind::Role, role));
    }
    if let Some(label) = &element.label {
        strategies.push(LocatorStrategy::new(LocatorKind::Label, label.clone()));
    }
    if let Some(text) = element
        .text
        .as_ref()
        .filter(|t| t.chars().count() < MAX_TEXT_LOCATOR_LEN)
    {
        strategies.push(LocatorStrategy::new(LocatorKind::Text, text.clone()));
    }
    if let Some(placeholder) = &element.placeholder {
        strategies.push(LocatorStrategy::new(LocatorKind::Placeholder, placeholder.clone()));
    }
    if let Some(aria) = &element.aria_label {
        strategies.push(LocatorStrategy::new(LocatorKind::AriaLabel, aria.clone()));
    }
    if let Some(name) = &element.name {
        strategies.push(LocatorStrategy::new(LocatorKind::Name, name.clone()));
    }
    if let Some(selector) = node.and_then(|n| stable_selector(doc, n)) {
        strategies.push(LocatorStrategy::new(LocatorKind::Selector, selector));
    }
    strategies.sort_by(|a, b| b.priority.cmp(&a.priority));
    strategies
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagepilot_core_types::{ElementId, Rect};

    fn first(doc: &Document, selector: &str) -> NodeId {
        doc.query_selector(selector).unwrap().unwrap()
    }

    #[test]
    fn volatile_ids_are_rejected() {
        assert!(is_volatile_id("uid-1234"));
        assert!(is_volatile_id("TMP_field"));
        assert!(!is_volatile_id("checkout-email"));
    }

    #[test]
    fn selector_preference_order() {
        let doc = Document::parse(
            r#"<form id="signup">
                 <input id="email">
                 <input id="uuid-9" data-testid="pw">
                 <input id="tmp1" name="age" type="number">
                 <textarea></textarea>
               </form>"#,
        )
        .unwrap();
        assert_eq!(stable_selector(&doc, first(&doc, "#email")).as_deref(), Some("#email"));
        assert_eq!(
            stable_selector(&doc, first(&doc, "[data-testid]")).as_deref(),
            Some(r#"[data-testid="pw"]"#)
        );
        assert_eq!(
            stable_selector(&doc, first(&doc, "[name=age]")).as_deref(),
            Some(r#"input[name="age"][type="number"]"#)
        );
        assert_eq!(
            stable_selector(&doc, first(&doc, "textarea")).as_deref(),
            Some("form#signup textarea")
        );
    }

    #[test]
    fn role_outranks_placeholder() {
        let doc = Document::parse(r#"<input role="button" placeholder="Search">"#).unwrap();
        let node = first(&doc, "input");
        let mut element = PageElement::new(ElementId::new("e_1"), "input", Rect::default());
        element.placeholder = Some("Search".into());
        let strategies = generate_stable_locators(&doc, &element, Some(node));
        let role = strategies.iter().position(|s| s.kind == LocatorKind::Role).unwrap();
        let placeholder = strategies
            .iter()
            .position(|s| s.kind == LocatorKind::Placeholder)
            .unwrap();
        assert!(role < placeholder);
        assert_eq!(strategies[0].value, "button");
    }

    #[test]
    fn only_present_attributes_emit_strategies() {
        let doc = Document::parse("<div></div>").unwrap();
        let mut element = PageElement::new(ElementId::new("e_2"), "button", Rect::default());
        element.text = Some("x".repeat(150));
        assert!(generate_stable_locators(&doc, &element, None).is_empty());
        element.name = Some("go".into());
        let strategies = generate_stable_locators(&doc, &element, None);
        assert_eq!(strategies, vec![LocatorStrategy::new(LocatorKind::Name, "go")]);
    }
}
