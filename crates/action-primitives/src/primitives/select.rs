//! Select primitive - dropdown options and checkable inputs

use pagepilot_core_types::{ActionResult, ErrorCode, PageAction};
use pagepilot_dom_adapter::{Document, NodeId};
use serde_json::json;
use tracing::debug;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::primitives::require;
use crate::types::ExecCtx;

/// Exact option value first, then a case-insensitive substring of the
/// option's label.
pub fn match_option(doc: &Document, select: NodeId, wanted: &str) -> Option<NodeId> {
    let options = doc.select_options(select);
    if let Some(exact) = options.iter().find(|o| doc.option_value(**o) == wanted) {
        return Some(*exact);
    }
    let needle = wanted.to_lowercase();
    options
        .into_iter()
        .find(|o| doc.normalized_text(*o).to_lowercase().contains(&needle))
}

/// Execute select primitive
pub fn execute_select(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let wanted = require(&action.params.value, "value", ErrorCode::NoValue)?;
    let mut doc = exec.document().lock();
    let select = exec.resolve(&doc, ctx, &action.target)?;
    if !doc.is_tag(select, "select") {
        return Err(ActionError::InvalidElement(format!(
            "<{}> is not a dropdown",
            doc.tag(select).unwrap_or("?")
        )));
    }

    let option = match_option(&doc, select, wanted)
        .ok_or_else(|| ActionError::OptionNotFound(wanted.to_string()))?;
    doc.set_selected_option(select, option)?;
    doc.dispatch(select, "input");
    doc.dispatch(select, "change");

    let label = doc.normalized_text(option);
    let value = doc.option_value(option);
    debug!(action_id = %ctx.action_id, value = %value, "option selected");
    Ok(ActionResult::ok_with_data(
        format!("selected: {}", label),
        json!({ "value": value, "text": label }),
    ))
}

/// Execute check primitive
///
/// Toggles a checkbox, or sets it when `value` is "true"/"false". Radios can
/// only be turned on.
pub fn execute_check(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    let kind = doc.input_type(node);
    let desired = match kind.as_deref() {
        Some("checkbox") => match action.params.value.as_deref() {
            Some("true") => true,
            Some("false") => false,
            _ => !doc.is_checked(node),
        },
        Some("radio") => true,
        _ => {
            return Err(ActionError::InvalidElement(format!(
                "<{}> is not a checkbox or radio",
                doc.tag(node).unwrap_or("?")
            )))
        }
    };

    if doc.is_checked(node) != desired {
        doc.set_checked(node, desired)?;
        doc.dispatch(node, "input");
        doc.dispatch(node, "change");
    }
    let message = if desired { "checked" } else { "unchecked" };
    Ok(ActionResult::ok_with_data(message, json!(desired)))
}
