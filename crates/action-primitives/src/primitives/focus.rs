use pagepilot_core_types::{ActionResult, PageAction};

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::primitives::label_for;
use crate::types::ExecCtx;

pub fn execute_focus(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    if let Some(previous) = doc.focused().filter(|f| *f != node) {
        doc.dispatch(previous, "blur");
        doc.dispatch(previous, "focusout");
    }
    doc.set_focus(Some(node));
    doc.dispatch(node, "focus");
    doc.dispatch(node, "focusin");
    Ok(ActionResult::ok(format!(
        "focused: {}",
        label_for(&doc, node, &action.target)
    )))
}

/// Blur the target, or whatever holds focus when no target is given.
pub fn execute_blur(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let node = if action.target.is_empty() {
        doc.focused()
            .ok_or_else(|| ActionError::NoTarget("nothing is focused".into()))?
    } else {
        exec.resolve(&doc, ctx, &action.target)?
    };
    if doc.focused() == Some(node) {
        doc.set_focus(None);
    }
    doc.dispatch(node, "blur");
    doc.dispatch(node, "focusout");
    Ok(ActionResult::ok(format!(
        "blurred: {}",
        label_for(&doc, node, &action.target)
    )))
}
