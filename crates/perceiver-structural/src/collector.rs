//! Candidate discovery and the visibility gate.

use once_cell::sync::Lazy;
use pagepilot_dom_adapter::{Document, NodeId, SelectorList};
use tracing::warn;

/// Everything a user could plausibly interact with.
pub const INTERACTIVE_SELECTORS: &[&str] = &[
    r#"input:not([type="hidden"])"#,
    "textarea",
    "select",
    "button",
    "a[href]",
    r#"[role="button"]"#,
    r#"[role="link"]"#,
    r#"[role="checkbox"]"#,
    r#"[role="radio"]"#,
    r#"[role="switch"]"#,
    r#"[role="tab"]"#,
    r#"[role="tabpanel"]"#,
    r#"[role="listitem"]"#,
    r#"[role="option"]"#,
    r#"[role="menuitem"]"#,
    r#"[role="treeitem"]"#,
    r#"[role="gridcell"]"#,
    r#"[role="cell"]"#,
    r#"[class*="tab"]"#,
    r#"[class*="Tab"]"#,
    "[data-tab]",
    r#"[data-role="tab"]"#,
    ".nav-tabs > li",
    ".tab-list > *",
    ".tab-item",
    r#"[role="presentation"]"#,
    "li[onclick]",
    "li[data-clickable]",
    "li.clickable",
    "ul[data-list] > li",
    "ol[data-list] > li",
    ".list-group-item",
    ".menu-item",
    ".dropdown-item",
    r#"[contenteditable="true"]"#,
    "[onclick]",
    r#"[tabindex]:not([tabindex="-1"])"#,
    "details",
    "summary",
    "label[for]",
];

static INTERACTIVE: Lazy<Option<SelectorList>> = Lazy::new(|| {
    match SelectorList::parse(&INTERACTIVE_SELECTORS.join(", ")) {
        Ok(list) => Some(list),
        Err(err) => {
            warn!("interactive selector list rejected: {}", err);
            None
        }
    }
});

/// Interactive candidates in document order, before the visibility gate.
pub fn interactive_candidates(doc: &Document) -> Vec<NodeId> {
    match INTERACTIVE.as_ref() {
        Some(list) => doc.select_all(doc.root(), list),
        None => Vec::new(),
    }
}

/// Rendered, not `visibility:hidden`, non-zero opacity, positive size.
pub fn is_element_visible(doc: &Document, node: NodeId) -> bool {
    if !doc.is_rendered(node) {
        return false;
    }
    if matches!(doc.computed_visibility(node).as_str(), "hidden" | "collapse") {
        return false;
    }
    if doc.computed_opacity(node) <= 0.0 {
        return false;
    }
    let rect = doc.bounding_rect(node);
    rect.width > 0.0 && rect.height > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_table_parses() {
        assert!(INTERACTIVE.is_some());
    }

    #[test]
    fn candidates_are_unique_and_ordered() {
        let doc = Document::parse(
            r#"<button class="tab" onclick="x()">A</button><a href="/b">B</a><p>plain</p>"#,
        )
        .unwrap();
        let found = interactive_candidates(&doc);
        assert_eq!(found.len(), 2);
        assert!(doc.is_tag(found[0], "button"));
        assert!(doc.is_tag(found[1], "a"));
    }

    #[test]
    fn hidden_inputs_are_not_candidates() {
        let doc = Document::parse(r#"<input type="hidden" name="csrf"><input name="q">"#).unwrap();
        assert_eq!(interactive_candidates(&doc).len(), 1);
    }

    #[test]
    fn visibility_gate() {
        let doc = Document::parse(
            r#"<button id="a">a</button>
               <button id="b" style="visibility:hidden">b</button>
               <button id="c" style="opacity:0">c</button>
               <button id="d" style="width:0">d</button>
               <div style="display:none"><button id="e">e</button></div>"#,
        )
        .unwrap();
        let visible = |id: &str| is_element_visible(&doc, doc.get_element_by_id(id).unwrap());
        assert!(visible("a"));
        assert!(!visible("b"));
        assert!(!visible("c"));
        assert!(!visible("d"));
        assert!(!visible("e"));
    }
}
