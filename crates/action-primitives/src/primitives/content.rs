//! Content primitives - replace, extend or inject element content

use pagepilot_core_types::{ActionResult, ErrorCode, PageAction};
use pagepilot_dom_adapter::{Document, NodeId};
use serde_json::json;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::primitives::{label_for, require};
use crate::types::ExecCtx;

#[derive(Debug, Clone, Copy)]
enum Edit {
    Set,
    Append,
    Prepend,
}

/// Form controls get their value edited, everything else its text.
fn edit_content(doc: &mut Document, node: NodeId, content: &str, edit: Edit) -> Result<(), ActionError> {
    let control = doc.is_text_control(node);
    let current = if control {
        doc.value(node)
    } else {
        doc.text_content(node)
    };
    let next = match edit {
        Edit::Set => content.to_string(),
        Edit::Append => format!("{}{}", current, content),
        Edit::Prepend => format!("{}{}", content, current),
    };
    if control {
        doc.set_value(node, &next)?;
        doc.dispatch(node, "input");
        doc.dispatch(node, "change");
    } else {
        doc.set_text_content(node, &next)?;
    }
    Ok(())
}

fn run_edit(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
    edit: Edit,
) -> Result<ActionResult, ActionError> {
    // An empty string is valid content: it clears the element.
    let content = action
        .params
        .content
        .as_deref()
        .ok_or_else(|| ActionError::missing("content", ErrorCode::NoContent))?;
    let mut doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    edit_content(&mut doc, node, content, edit)?;

    let verb = match edit {
        Edit::Set => "set content of",
        Edit::Append => "appended content to",
        Edit::Prepend => "prepended content to",
    };
    Ok(ActionResult::ok(format!(
        "{} {}",
        verb,
        label_for(&doc, node, &action.target)
    )))
}

pub fn execute_set_content(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    run_edit(exec, ctx, action, Edit::Set)
}

pub fn execute_append_content(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    run_edit(exec, ctx, action, Edit::Append)
}

pub fn execute_prepend_content(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    run_edit(exec, ctx, action, Edit::Prepend)
}

/// Execute insertHTML primitive
///
/// Parses `html` and inserts it at `insertPosition` (default `beforeend`).
pub fn execute_insert_html(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let html = require(&action.params.html, "html", ErrorCode::NoHtml)?;
    let position = action.params.insert_position.unwrap_or_default();
    let mut doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    let inserted = doc.insert_adjacent_html(node, position, html)?;
    Ok(ActionResult::ok_with_data(
        format!("inserted {} node(s) {}", inserted.len(), position.as_str()),
        json!(inserted.len()),
    ))
}
