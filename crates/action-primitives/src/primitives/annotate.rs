//! Annotation - highlight, underline and programmatic text selection

use pagepilot_core_types::{ActionResult, PageAction};
use pagepilot_dom_adapter::{Document, NodeId, TextSelection};
use serde_json::json;
use tracing::debug;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::types::ExecCtx;

pub const HIGHLIGHT_CLASS: &str = "ai-highlight";
pub const UNDERLINE_CLASS: &str = "ai-underline";
/// Set on spans created around a selection; they are unwrapped on clear.
pub const MARK_ATTR: &str = "data-pagepilot-mark";

const HIGHLIGHT_PROPS: &[&str] = &["background-color", "padding", "border-radius"];
const UNDERLINE_PROPS: &[&str] = &[
    "text-decoration",
    "text-decoration-color",
    "text-decoration-thickness",
];

#[derive(Debug, Clone, Copy)]
enum Mark {
    Highlight,
    Underline,
}

impl Mark {
    fn class(self) -> &'static str {
        match self {
            Mark::Highlight => HIGHLIGHT_CLASS,
            Mark::Underline => UNDERLINE_CLASS,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Mark::Highlight => "highlight",
            Mark::Underline => "underline",
        }
    }

    fn style(self, color: &str) -> Vec<(&'static str, String)> {
        match self {
            Mark::Highlight => vec![
                ("background-color", color.to_string()),
                ("padding", "2px 0".to_string()),
                ("border-radius", "2px".to_string()),
            ],
            Mark::Underline => vec![
                ("text-decoration", "underline".to_string()),
                ("text-decoration-color", color.to_string()),
                ("text-decoration-thickness", "2px".to_string()),
            ],
        }
    }
}

/// Wrap the selected range in a span. The range must start and end in text
/// nodes that share a parent; anything in between is moved into the span.
fn wrap_selection(
    doc: &mut Document,
    selection: TextSelection,
    mark: Mark,
    color: &str,
) -> Result<NodeId, ActionError> {
    let parent = doc
        .parent(selection.anchor)
        .filter(|p| doc.parent(selection.focus) == Some(*p))
        .ok_or_else(|| {
            ActionError::CrossElement(format!("cannot {} across elements", mark.name()))
        })?;

    let (first, last) = if selection.anchor == selection.focus {
        let middle = doc.split_text(selection.anchor, selection.anchor_offset)?;
        doc.split_text(
            middle,
            selection.focus_offset.saturating_sub(selection.anchor_offset),
        )?;
        (middle, middle)
    } else {
        doc.split_text(selection.focus, selection.focus_offset)?;
        let tail = doc.split_text(selection.anchor, selection.anchor_offset)?;
        (tail, selection.focus)
    };

    let siblings = doc.children(parent).to_vec();
    let (Some(start), Some(end)) = (
        siblings.iter().position(|n| *n == first),
        siblings.iter().position(|n| *n == last),
    ) else {
        return Err(ActionError::Internal("selection endpoints moved".into()));
    };

    let span = doc.create_element("span");
    doc.set_attribute(span, "class", mark.class())?;
    doc.set_attribute(span, MARK_ATTR, mark.name())?;
    for (property, value) in mark.style(color) {
        doc.set_style_property(span, property, &value)?;
    }
    doc.insert_before(parent, span, Some(first))?;
    for node in &siblings[start..=end] {
        doc.append_child(span, *node)?;
    }
    doc.clear_selection();
    Ok(span)
}

fn annotate(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
    mark: Mark,
    default_color: &str,
) -> Result<ActionResult, ActionError> {
    let color = action
        .params
        .color
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(default_color);
    let mut doc = exec.document().lock();

    if let Some(selection) = doc.active_selection() {
        let text = doc.selected_text().unwrap_or_default();
        wrap_selection(&mut doc, selection, mark, color)?;
        debug!(action_id = %ctx.action_id, mark = mark.name(), "selection wrapped");
        return Ok(ActionResult::ok_with_data(
            format!("applied {} to selected text", mark.name()),
            json!(text),
        ));
    }

    if action.target.is_empty() {
        return Err(ActionError::NoTarget(format!(
            "no selection or element to {}",
            mark.name()
        )));
    }
    let node = exec.resolve(&doc, ctx, &action.target)?;
    for (property, value) in mark.style(color) {
        if property == "background-color" || property.starts_with("text-decoration") {
            doc.set_style_property(node, property, &value)?;
        }
    }
    doc.add_class(node, mark.class())?;
    Ok(ActionResult::ok(format!("applied {} to element", mark.name())))
}

/// Execute highlight primitive
pub fn execute_highlight(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let color = exec.policy().highlight_color.clone();
    annotate(exec, ctx, action, Mark::Highlight, &color)
}

/// Execute underline primitive
pub fn execute_underline(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let color = exec.policy().underline_color.clone();
    annotate(exec, ctx, action, Mark::Underline, &color)
}

/// Execute selectText primitive
///
/// Selects `searchText` inside the target, or the `startOffset..endOffset`
/// character range, or all of its text. Without a target the body is used.
pub fn execute_select_text(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let node = if action.target.is_empty() {
        doc.body()
            .ok_or_else(|| ActionError::NoTarget("document has no body".into()))?
    } else {
        exec.resolve(&doc, ctx, &action.target)?
    };
    let params = &action.params;

    if let Some(needle) = params.search_text.as_deref().filter(|s| !s.is_empty()) {
        if !doc.select_matching_text(node, needle)? {
            return Err(ActionError::TextNotFound(needle.to_string()));
        }
    } else {
        let length = doc.text_content(node).chars().count();
        if length == 0 {
            return Err(ActionError::TextNotFound("target has no text".into()));
        }
        let start = params.start_offset.unwrap_or(0).min(length);
        let end = params.end_offset.unwrap_or(length).min(length);
        doc.select_text_range(node, start, end)?;
    }

    let selected = doc.selected_text().unwrap_or_default();
    Ok(ActionResult::ok_with_data(
        format!("selected {} characters", selected.chars().count()),
        json!(selected),
    ))
}

/// Unwrap every annotation span and strip element-level marks.
pub fn clear_marks(doc: &mut Document) -> Result<usize, ActionError> {
    let mut removed = 0;
    for node in doc.all_elements() {
        if doc.has_attr(node, MARK_ATTR) {
            if doc.is_connected(node) {
                doc.unwrap_element(node)?;
                removed += 1;
            }
            continue;
        }
        for (class, properties) in [
            (HIGHLIGHT_CLASS, HIGHLIGHT_PROPS),
            (UNDERLINE_CLASS, UNDERLINE_PROPS),
        ] {
            if doc.has_class(node, class) {
                doc.remove_class(node, class)?;
                for property in properties {
                    doc.remove_style_property(node, property)?;
                }
                removed += 1;
            }
        }
    }
    Ok(removed)
}
