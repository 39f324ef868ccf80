//! Navigation primitives - history, frames and dialogs

use pagepilot_core_types::{ActionResult, DialogAction, ErrorCode, NavigateAction, PageAction};
use pagepilot_dom_adapter::{DialogPolicy, EventDetail};
use serde_json::json;
use tracing::debug;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::primitives::require;
use crate::types::ExecCtx;

/// Execute navigate primitive
///
/// Only the window location and history change; loading the new page is
/// the host's job.
pub fn execute_navigate(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let kind = action.params.navigate_action.unwrap_or_default();
    let mut doc = exec.document().lock();
    let window = doc.window_mut();

    let (message, url) = match kind {
        NavigateAction::Goto => {
            let url = require(&action.params.url, "url", ErrorCode::NoUrl)?;
            let location = window.navigate(url)?.to_string();
            (format!("navigated to {}", location), location)
        }
        NavigateAction::Back => match window.back().map(|u| u.to_string()) {
            Some(url) => ("navigated back".to_string(), url),
            None => ("no previous page".to_string(), window.location().to_string()),
        },
        NavigateAction::Forward => match window.forward().map(|u| u.to_string()) {
            Some(url) => ("navigated forward".to_string(), url),
            None => ("no next page".to_string(), window.location().to_string()),
        },
        NavigateAction::Reload => ("reloaded".to_string(), window.location().to_string()),
    };
    debug!(action_id = %ctx.action_id, url = %url, "location updated");
    Ok(ActionResult::ok_with_data(message, json!({ "url": url })))
}

/// Execute switchFrame primitive
///
/// Records which frame later actions address. No selector switches back to
/// the main document.
pub fn execute_switch_frame(
    exec: &DefaultActionExecutor,
    _ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let selector = action
        .params
        .frame_selector
        .as_deref()
        .or(action.target.selector.as_deref())
        .filter(|s| !s.is_empty());
    let mut doc = exec.document().lock();

    let Some(selector) = selector else {
        doc.window_mut().set_active_frame(None);
        return Ok(ActionResult::ok("switched to main document"));
    };

    let frame = doc
        .query_selector(selector)?
        .ok_or_else(|| ActionError::ElementNotFound(selector.to_string()))?;
    if !(doc.is_tag(frame, "iframe") || doc.is_tag(frame, "frame")) {
        return Err(ActionError::InvalidElement(format!(
            "{} is not a frame",
            selector
        )));
    }
    doc.window_mut().set_active_frame(Some(selector.to_string()));
    Ok(ActionResult::ok(format!("switched to frame {}", selector)))
}

/// Execute handleDialog primitive
///
/// Sets how the next alert, confirm or prompt is answered.
pub fn execute_handle_dialog(
    exec: &DefaultActionExecutor,
    _ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let dialog_action = action.params.dialog_action.unwrap_or_default();
    let accept = dialog_action == DialogAction::Accept;
    let prompt_text = action.params.prompt_text.clone();
    let name = if accept { "accept" } else { "dismiss" };

    let mut doc = exec.document().lock();
    doc.window_mut().set_dialog_policy(DialogPolicy {
        accept,
        prompt_text: prompt_text.clone(),
    });
    doc.dispatch_with(
        None,
        "dialogpolicy",
        EventDetail::Dialog {
            action: name.to_string(),
            prompt_text,
        },
    );
    Ok(ActionResult::ok(format!("next dialog will be {}ed", name)))
}
