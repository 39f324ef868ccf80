//! Text entry - fill, type, press and clear

use std::time::Duration;

use pagepilot_core_types::{ActionResult, ErrorCode, PageAction};
use pagepilot_dom_adapter::{Document, NodeId};
use tracing::debug;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::primitives::{editable_text, label_for, require, require_editable, write_editable};
use crate::types::ExecCtx;
use crate::waiting::pause;

fn focus(doc: &mut Document, node: NodeId) {
    if doc.focused() != Some(node) {
        doc.set_focus(Some(node));
        doc.dispatch(node, "focus");
    }
}

fn is_password(doc: &Document, node: NodeId) -> bool {
    doc.input_type(node).as_deref() == Some("password")
}

/// Execute fill primitive
///
/// Focus, clear, set the whole value at once, then `input` and `change`.
pub fn execute_fill(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let value = require(&action.params.value, "value", ErrorCode::NoValue)?;
    let mut doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    require_editable(&doc, node)?;

    focus(&mut doc, node);
    if doc.is_text_control(node) {
        doc.set_value(node, "")?;
    }
    write_editable(&mut doc, node, value)?;

    let message = if is_password(&doc, node) {
        "filled password field".to_string()
    } else {
        format!("filled: {}", value)
    };
    Ok(ActionResult::ok(message))
}

/// Execute type primitive
///
/// One keydown/input/keyup round per character, appended to the current
/// text, with `delay` (or the configured default) between characters.
pub async fn execute_type(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let text = action
        .params
        .text
        .as_deref()
        .or(action.params.value.as_deref())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ActionError::missing("text", ErrorCode::NoText))?;
    let delay = action
        .params
        .delay
        .map(Duration::from_millis)
        .unwrap_or(exec.pacing().type_delay);

    let node = {
        let mut doc = exec.document().lock();
        let node = exec.resolve(&doc, ctx, &action.target)?;
        require_editable(&doc, node)?;
        focus(&mut doc, node);
        node
    };

    let chars: Vec<char> = text.chars().collect();
    debug!(action_id = %ctx.action_id, count = chars.len(), ?delay, "typing");
    for (index, ch) in chars.iter().enumerate() {
        if index > 0 {
            pause(delay).await;
        }
        let mut doc = exec.document().lock();
        let key = ch.to_string();
        doc.dispatch_key(node, "keydown", &key);
        doc.dispatch_key(node, "keypress", &key);
        let mut current = editable_text(&doc, node);
        current.push(*ch);
        if doc.is_text_control(node) {
            doc.set_value(node, &current)?;
        } else {
            doc.set_text_content(node, &current)?;
        }
        doc.dispatch(node, "input");
        doc.dispatch_key(node, "keyup", &key);
    }

    let mut doc = exec.document().lock();
    if doc.is_text_control(node) {
        doc.dispatch(node, "change");
    }
    Ok(ActionResult::ok(format!("typed {} characters", chars.len())))
}

/// Default action for keys a page usually does not handle itself.
fn apply_key(doc: &mut Document, node: NodeId, key: &str) -> Result<(), ActionError> {
    match key {
        "Enter" => {
            if doc.is_tag(node, "input") {
                if let Some(form) = doc.closest(node, "form")? {
                    doc.dispatch(form, "submit");
                }
            }
        }
        "Tab" => {
            let focusable = doc.focusable_elements();
            let next = match focusable.iter().position(|n| *n == node) {
                Some(index) => focusable.get(index + 1).copied(),
                None => focusable.first().copied(),
            };
            if let Some(next) = next {
                doc.dispatch(node, "blur");
                doc.set_focus(Some(next));
                doc.dispatch(next, "focus");
            }
        }
        "Backspace" if doc.is_text_control(node) => {
            let mut value = doc.value(node);
            value.pop();
            doc.set_value(node, &value)?;
            doc.dispatch(node, "input");
        }
        _ => {}
    }
    Ok(())
}

/// Execute press primitive
///
/// Key events go to the target, else the focused element, else `<body>`.
pub fn execute_press(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let key = require(&action.params.key, "key", ErrorCode::NoKey)?;
    let mut doc = exec.document().lock();
    let node = if action.target.is_empty() {
        doc.focused()
            .or_else(|| doc.body())
            .ok_or_else(|| ActionError::NoTarget("nothing focused".into()))?
    } else {
        exec.resolve(&doc, ctx, &action.target)?
    };

    doc.dispatch_key(node, "keydown", key);
    if key.chars().count() == 1 {
        doc.dispatch_key(node, "keypress", key);
    }
    apply_key(&mut doc, node, key)?;
    doc.dispatch_key(node, "keyup", key);

    Ok(ActionResult::ok(format!("pressed {}", key)))
}

pub fn execute_clear(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    require_editable(&doc, node)?;
    focus(&mut doc, node);
    write_editable(&mut doc, node, "")?;
    Ok(ActionResult::ok(format!(
        "cleared: {}",
        label_for(&doc, node, &action.target)
    )))
}
