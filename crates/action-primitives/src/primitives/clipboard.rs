//! Clipboard primitives - copy page text out, paste clipboard text in

use pagepilot_core_types::{ActionResult, ErrorCode, PageAction};
use serde_json::json;
use tracing::debug;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::primitives::{editable_text, readable_text, require_editable};
use crate::types::ExecCtx;

/// Execute copyToClipboard primitive
///
/// Copies `text` (or `value`) when given, else the target's text, else the
/// current selection.
pub async fn execute_copy_to_clipboard(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let explicit = action
        .params
        .text
        .as_deref()
        .or(action.params.value.as_deref())
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let text = match explicit {
        Some(text) => text,
        None => {
            let doc = exec.document().lock();
            let from_target = if action.target.is_empty() {
                None
            } else {
                let node = exec.resolve(&doc, ctx, &action.target)?;
                Some(readable_text(&doc, node))
            };
            from_target
                .or_else(|| doc.selected_text())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| ActionError::missing("text", ErrorCode::NoText))?
        }
    };

    exec.clipboard()
        .write_text(&text)
        .await
        .map_err(|e| ActionError::Clipboard(e.to_string()))?;
    debug!(action_id = %ctx.action_id, chars = text.chars().count(), "copied to clipboard");
    Ok(ActionResult::ok_with_data(
        format!("copied {} characters", text.chars().count()),
        json!(text),
    ))
}

/// Execute pasteFromClipboard primitive
///
/// Appends the clipboard text to the target, or to the focused element.
pub async fn execute_paste_from_clipboard(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let text = exec
        .clipboard()
        .read_text()
        .await
        .map_err(|e| ActionError::Clipboard(e.to_string()))?;

    let mut doc = exec.document().lock();
    let node = if action.target.is_empty() {
        doc.focused()
            .ok_or_else(|| ActionError::NoTarget("nothing focused to paste into".into()))?
    } else {
        exec.resolve(&doc, ctx, &action.target)?
    };
    require_editable(&doc, node)?;

    doc.dispatch(node, "paste");
    let combined = format!("{}{}", editable_text(&doc, node), text);
    if doc.is_text_control(node) {
        doc.set_value(node, &combined)?;
    } else {
        doc.set_text_content(node, &combined)?;
    }
    doc.dispatch(node, "input");
    if doc.is_text_control(node) {
        doc.dispatch(node, "change");
    }
    Ok(ActionResult::ok_with_data(
        format!("pasted {} characters", text.chars().count()),
        json!(text),
    ))
}
