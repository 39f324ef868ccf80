//! Element snapshots and the agent-facing description string.

use pagepilot_core_types::{
    CompactContext, CompactElement, ElementContext, ElementId, PageElement, Rect,
};
use pagepilot_dom_adapter::{quote_attr_value, Document, NodeId};
use pagepilot_policy_center::CollectionPolicy;

use crate::rules::{self, TAB_LABEL};

const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";
const CONTROLS: &[&str] = &["input", "select", "textarea"];
const TEXT_ROLES: &[&str] = &[
    "button", "link", "tab", "menuitem", "option", "listitem", "treeitem", "switch", "checkbox",
    "radio", "gridcell", "cell",
];
const NEAR_TEXT_MAX: usize = 50;
const ROW_TEXT_MAX: usize = 30;
const SECTION_TEXT_MAX: usize = 100;

/// Build the snapshot for one collected node.
pub fn snapshot(doc: &Document, node: NodeId, id: ElementId, policy: &CollectionPolicy) -> PageElement {
    let rect = doc.bounding_rect(node);
    let tag = doc.tag(node).unwrap_or_default().to_string();
    let mut element = PageElement::new(id, tag.clone(), rect);
    element.visible = in_viewport(doc, &rect);
    element.disabled = is_disabled(doc, node);

    match tag.as_str() {
        "input" => {
            let ty = doc.input_type(node).unwrap_or_else(|| "text".into());
            element.name = doc.attr_non_empty(node, "name");
            element.placeholder = doc.attr_non_empty(node, "placeholder");
            if ty != "password" {
                element.value = non_empty(doc.value(node));
            }
            element.input_type = Some(ty);
        }
        "textarea" => {
            element.name = doc.attr_non_empty(node, "name");
            element.placeholder = doc.attr_non_empty(node, "placeholder");
            element.value = non_empty(doc.value(node));
        }
        "select" => {
            element.name = doc.attr_non_empty(node, "name");
            element.value = non_empty(doc.value(node));
        }
        _ => {}
    }

    element.text = element_text(doc, node);
    element.label = associated_label(doc, node);
    element.aria_label = doc.attr_non_empty(node, "aria-label");

    let context = ElementContext {
        section_title: section_title(doc, node),
        form_title: form_title(doc, node),
        near_elements: near_elements(doc, node, policy.max_near_elements),
        parent_chain: parent_chain(doc, node, policy.max_parent_chain),
        row_label: row_label(doc, node),
    };
    if !context.is_empty() {
        element.context = Some(context);
    }
    element
}

fn non_empty(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}

/// Fully inside the viewport.
pub fn in_viewport(doc: &Document, rect: &Rect) -> bool {
    let window = doc.window();
    rect.y >= 0.0
        && rect.x >= 0.0
        && rect.bottom() <= window.viewport_height
        && rect.right() <= window.viewport_width
}

fn is_disabled(doc: &Document, node: NodeId) -> bool {
    let form_like = matches!(
        doc.tag(node),
        Some("input" | "button" | "select" | "textarea" | "option" | "fieldset")
    );
    (form_like && doc.is_disabled(node)) || doc.attr(node, "aria-disabled") == Some("true")
}

/// Visible text of buttons, links and role-bearing widgets.
pub fn element_text(doc: &Document, node: NodeId) -> Option<String> {
    let tag = doc.tag(node)?;
    if tag == "input" {
        return match doc.input_type(node).as_deref() {
            Some("submit" | "button" | "reset") => non_empty(doc.value(node)),
            _ => None,
        };
    }
    let has_text = matches!(tag, "button" | "a" | "summary" | "li" | "label" | "option")
        || doc
            .attr(node, "role")
            .is_some_and(|role| TEXT_ROLES.contains(&role))
        || rules::is_tab_element(doc, node);
    if has_text {
        non_empty(doc.normalized_text(node))
    } else {
        None
    }
}

/// `label[for=id]`, else the enclosing label minus its own controls.
pub fn associated_label(doc: &Document, node: NodeId) -> Option<String> {
    if let Some(id) = doc.attr_non_empty(node, "id") {
        let selector = format!("label[for={}]", quote_attr_value(&id));
        if let Ok(Some(label)) = doc.query_selector(&selector) {
            return non_empty(doc.normalized_text(label));
        }
    }
    let label = doc.closest(node, "label").ok().flatten()?;
    non_empty(collapse(&text_without_controls(doc, label)))
}

fn text_without_controls(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    push_text_skipping(doc, node, &mut out);
    out
}

fn push_text_skipping(doc: &Document, node: NodeId, out: &mut String) {
    for child in doc.children(node) {
        if doc.is_text(*child) {
            out.push_str(&doc.text_content(*child));
        } else if doc.tag(*child).is_some_and(|tag| !CONTROLS.contains(&tag)) {
            push_text_skipping(doc, *child, out);
        }
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_heading_text(doc: &Document, scope: NodeId) -> Option<String> {
    doc.query_selector_from(scope, HEADINGS)
        .ok()
        .flatten()
        .and_then(|h| non_empty(doc.normalized_text(h)))
}

fn is_heading(doc: &Document, node: NodeId) -> bool {
    matches!(doc.tag(node), Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6"))
}

fn is_body_or_root(doc: &Document, node: NodeId) -> bool {
    doc.is_tag(node, "body") || doc.is_tag(node, "html")
}

pub fn section_title(doc: &Document, node: NodeId) -> Option<String> {
    if let Ok(Some(fieldset)) = doc.closest(node, "fieldset") {
        if let Ok(Some(legend)) = doc.query_selector_from(fieldset, "legend") {
            if let Some(text) = non_empty(doc.normalized_text(legend)) {
                return Some(text);
            }
        }
    }

    if let Ok(Some(section)) = doc.closest(node, r#"section, article, aside, [role="region"]"#) {
        if let Some(text) = first_heading_text(doc, section) {
            return Some(text);
        }
    }

    let mut sibling = doc.previous_element_sibling(node);
    while let Some(current) = sibling {
        if is_heading(doc, current) {
            if let Some(text) = non_empty(doc.normalized_text(current)) {
                return Some(text);
            }
        }
        sibling = doc.previous_element_sibling(current);
    }

    let mut cursor = doc.parent_element(node);
    while let Some(current) = cursor {
        if is_body_or_root(doc, current) {
            break;
        }
        if let Some(label) = doc.attr_non_empty(current, "aria-label") {
            return Some(label);
        }
        if let Some(title) = doc.attr_non_empty(current, "title") {
            return Some(title);
        }
        let class = doc.class_name(current);
        if class.contains("header") || class.contains("title") || class.contains("heading") {
            let text = doc.normalized_text(current);
            if !text.is_empty() && text.chars().count() < SECTION_TEXT_MAX {
                return Some(text);
            }
        }
        cursor = doc.parent_element(current);
    }
    None
}

pub fn form_title(doc: &Document, node: NodeId) -> Option<String> {
    let form = doc.closest(node, "form").ok().flatten()?;
    if let Some(text) = first_heading_text(doc, form) {
        return Some(text);
    }
    let mut sibling = doc.previous_element_sibling(form);
    while let Some(current) = sibling {
        if is_heading(doc, current) {
            return non_empty(doc.normalized_text(current));
        }
        sibling = doc.previous_element_sibling(current);
    }
    doc.attr_non_empty(form, "aria-label")
}

/// Short sibling texts just before and after the element.
pub fn near_elements(doc: &Document, node: NodeId, per_side: usize) -> Vec<String> {
    let Some(parent) = doc.parent_element(node) else {
        return Vec::new();
    };
    let siblings = doc.element_children(parent);
    let Some(index) = siblings.iter().position(|s| *s == node) else {
        return Vec::new();
    };
    let short_text = |sibling: &NodeId| {
        let text = doc.normalized_text(*sibling);
        (!text.is_empty() && text.chars().count() < NEAR_TEXT_MAX).then_some(text)
    };

    let mut before: Vec<String> = siblings[..index]
        .iter()
        .rev()
        .take(per_side)
        .filter_map(short_text)
        .collect();
    before.reverse();
    let after = siblings[index + 1..]
        .iter()
        .take(per_side)
        .filter_map(short_text);
    before.extend(after);
    before
}

/// Up to `limit` semantically named containers, outermost first.
pub fn parent_chain(doc: &Document, node: NodeId, limit: usize) -> Vec<String> {
    let mut chain: Vec<String> = Vec::new();
    let mut cursor = doc.parent_element(node);
    while let Some(current) = cursor {
        if is_body_or_root(doc, current) || chain.len() >= limit {
            break;
        }
        if let Some(label) = container_label(doc, current) {
            if !chain.contains(&label) {
                chain.insert(0, label);
            }
        }
        cursor = doc.parent_element(current);
    }
    chain
}

fn container_label(doc: &Document, node: NodeId) -> Option<String> {
    let tag = doc.tag(node)?;
    match tag {
        "form" => {
            let title = first_heading_text(doc, node)
                .or_else(|| doc.attr_non_empty(node, "aria-label"))
                .or_else(|| doc.attr_non_empty(node, "name"))
                .or_else(|| doc.attr_non_empty(node, "id"));
            Some(title.map_or_else(|| "form".to_string(), |t| format!("form:{}", t)))
        }
        "fieldset" => {
            let legend = doc
                .query_selector_from(node, "legend")
                .ok()
                .flatten()
                .and_then(|l| non_empty(doc.normalized_text(l)));
            Some(legend.map_or_else(|| "fieldset".to_string(), |l| format!("fieldset:{}", l)))
        }
        _ if tag == "section" || doc.attr(node, "role") == Some("region") => {
            let heading = first_heading_text(doc, node);
            Some(heading.map_or_else(|| "section".to_string(), |h| format!("section:{}", h)))
        }
        "tr" => {
            let cell = doc.query_selector_from(node, "td, th").ok().flatten()?;
            let text = doc.normalized_text(cell);
            (!text.is_empty() && text.chars().count() < ROW_TEXT_MAX).then(|| format!("row:{}", text))
        }
        "td" | "th" => {
            let table = doc.closest(node, "table").ok().flatten()?;
            let row = doc.parent_element(node)?;
            let index = doc.element_children(row).iter().position(|c| *c == node)?;
            let header_row = doc
                .query_selector_from(table, "thead tr")
                .ok()
                .flatten()
                .or_else(|| doc.query_selector_from(table, "tr").ok().flatten())?;
            let headers: Vec<NodeId> = doc
                .element_children(header_row)
                .into_iter()
                .filter(|c| doc.is_tag(*c, "th"))
                .collect();
            let header = headers.get(index)?;
            Some(format!("column:{}", doc.normalized_text(*header)))
        }
        _ => None,
    }
}

/// Same-row label for table and label/value layouts.
pub fn row_label(doc: &Document, node: NodeId) -> Option<String> {
    let parent = doc.parent_element(node)?;
    if matches!(doc.tag(parent), Some("td" | "th")) {
        if let Some(row) = doc.closest(parent, "tr").ok().flatten() {
            let first_cell = doc.query_selector_from(row, "td, th").ok().flatten();
            if let Some(cell) = first_cell.filter(|c| *c != parent) {
                let text = doc.normalized_text(cell);
                if !text.is_empty() && text.chars().count() < ROW_TEXT_MAX {
                    return Some(text);
                }
            }
        }
    }

    let mut sibling = doc.previous_element_sibling(node);
    while let Some(current) = sibling {
        let text = doc.normalized_text(current);
        let holds_control = doc
            .query_selector_from(current, "input, select, textarea")
            .ok()
            .flatten()
            .is_some();
        if !text.is_empty() && text.chars().count() < ROW_TEXT_MAX && !holds_control {
            return Some(text);
        }
        sibling = doc.previous_element_sibling(current);
    }
    None
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// `type:identifier(extra,extra)` description for the agent.
pub fn describe(doc: &Document, node: NodeId, element: &PageElement, policy: &CollectionPolicy) -> String {
    let type_name = rules::type_name(doc, node);
    let is_tab = type_name == TAB_LABEL;

    let mut identifier = element
        .label
        .clone()
        .or_else(|| element.text.clone())
        .or_else(|| element.placeholder.clone())
        .or_else(|| element.aria_label.clone())
        .or_else(|| element.name.clone())
        .or_else(|| doc.attr_non_empty(node, "title"));
    if identifier.is_none() && is_tab {
        let text = doc.normalized_text(node);
        if !text.is_empty() && text.chars().count() < policy.max_identifier_len {
            identifier = Some(text);
        }
    }
    let identifier = identifier.map(|id| truncate_chars(&id, policy.max_identifier_len));

    let mut extras: Vec<String> = Vec::new();
    if let Some(placeholder) = &element.placeholder {
        if identifier.as_deref() != Some(placeholder.as_str()) {
            extras.push(format!("placeholder:{}", placeholder));
        }
    }
    if let Some(ty) = &element.input_type {
        if !matches!(ty.as_str(), "text" | "submit" | "button") {
            extras.push(format!("type:{}", ty));
        }
    }
    if element.disabled {
        extras.push("disabled".into());
    }
    if is_tab && (doc.has_class(node, "active") || doc.attr(node, "aria-selected") == Some("true")) {
        extras.push("active".into());
    }
    let checkable = matches!(element.input_type.as_deref(), Some("radio" | "checkbox"));
    if (checkable && doc.is_checked(node)) || doc.attr(node, "aria-checked") == Some("true") {
        extras.push("checked".into());
    }

    let mut desc = match identifier {
        Some(id) => format!("{}:{}", type_name, id),
        None => type_name,
    };
    if !extras.is_empty() {
        desc.push('(');
        desc.push_str(&extras.join(","));
        desc.push(')');
    }
    desc
}

/// Agent-facing projection; the id is carried through unchanged.
pub fn to_compact(element: &PageElement, desc: String) -> CompactElement {
    let ctx = element.context.as_ref().map(|context| {
        let mut nearby = (!context.near_elements.is_empty()).then(|| {
            context
                .near_elements
                .iter()
                .take(2)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        });
        if let Some(row) = &context.row_label {
            nearby = Some(match nearby {
                Some(near) => format!("{} | {}", row, near),
                None => row.clone(),
            });
        }
        CompactContext {
            section: context
                .section_title
                .clone()
                .or_else(|| context.form_title.clone()),
            nearby,
            path: (!context.parent_chain.is_empty()).then(|| context.parent_chain.join(" > ")),
        }
    });
    CompactElement {
        id: element.id.clone(),
        desc,
        ctx: ctx.filter(|c| !c.is_empty()),
    }
}
