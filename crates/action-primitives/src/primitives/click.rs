//! Click family - click, double click, right click and hover

use pagepilot_core_types::{ActionResult, PageAction};
use pagepilot_dom_adapter::{Document, NodeId};
use tracing::debug;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::primitives::{center_of, label_for};
use crate::types::ExecCtx;

const PRIMARY_BUTTON: u8 = 0;
const SECONDARY_BUTTON: u8 = 2;

fn press_and_release(doc: &mut Document, node: NodeId, x: f64, y: f64, button: u8) {
    doc.dispatch_pointer(node, "mousedown", x, y, button);
    if button == PRIMARY_BUTTON && doc.focusable_elements().contains(&node) {
        doc.set_focus(Some(node));
        doc.dispatch(node, "focus");
    }
    doc.dispatch_pointer(node, "mouseup", x, y, button);
}

/// What the browser does after an unprevented click.
fn activate(doc: &mut Document, node: NodeId) -> Result<(), ActionError> {
    if doc.is_disabled(node) {
        debug!("disabled control, no default action");
        return Ok(());
    }
    match doc.input_type(node).as_deref() {
        Some("checkbox") => {
            let checked = !doc.is_checked(node);
            doc.set_checked(node, checked)?;
            doc.dispatch(node, "input");
            doc.dispatch(node, "change");
            return Ok(());
        }
        Some("radio") => {
            if !doc.is_checked(node) {
                doc.set_checked(node, true)?;
                doc.dispatch(node, "input");
                doc.dispatch(node, "change");
            }
            return Ok(());
        }
        _ => {}
    }

    if let Some(href) = doc
        .attr_non_empty(node, "href")
        .filter(|_| doc.is_tag(node, "a"))
        .filter(|h| !h.starts_with('#') && !h.to_ascii_lowercase().starts_with("javascript:"))
    {
        match doc.window_mut().navigate(&href) {
            Ok(url) => debug!(url = %url, "link followed"),
            Err(err) => debug!(error = %err, "link target not navigable"),
        }
        return Ok(());
    }

    let submits = match doc.tag(node) {
        Some("button") => doc
            .attr(node, "type")
            .map_or(true, |t| t.eq_ignore_ascii_case("submit")),
        Some("input") => doc.input_type(node).as_deref() == Some("submit"),
        _ => false,
    };
    if submits {
        if let Some(form) = doc.closest(node, "form")? {
            doc.dispatch(form, "submit");
        }
    }
    Ok(())
}

/// Execute click primitive
///
/// mousedown, mouseup and click at the element's center, then the default
/// action: toggle a checkbox, follow a link, submit the owning form.
pub fn execute_click(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    let (x, y) = center_of(&doc, node);
    debug!(action_id = %ctx.action_id, x, y, "dispatching click sequence");

    press_and_release(&mut doc, node, x, y, PRIMARY_BUTTON);
    doc.dispatch_pointer(node, "click", x, y, PRIMARY_BUTTON);
    activate(&mut doc, node)?;

    Ok(ActionResult::ok(format!(
        "clicked: {}",
        label_for(&doc, node, &action.target)
    )))
}

/// Two full clicks followed by `dblclick`.
pub fn execute_double_click(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    let (x, y) = center_of(&doc, node);

    for _ in 0..2 {
        press_and_release(&mut doc, node, x, y, PRIMARY_BUTTON);
        doc.dispatch_pointer(node, "click", x, y, PRIMARY_BUTTON);
    }
    doc.dispatch_pointer(node, "dblclick", x, y, PRIMARY_BUTTON);

    Ok(ActionResult::ok(format!(
        "double-clicked: {}",
        label_for(&doc, node, &action.target)
    )))
}

/// Secondary-button press followed by `contextmenu`.
pub fn execute_right_click(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    let (x, y) = center_of(&doc, node);

    press_and_release(&mut doc, node, x, y, SECONDARY_BUTTON);
    doc.dispatch_pointer(node, "contextmenu", x, y, SECONDARY_BUTTON);

    Ok(ActionResult::ok(format!(
        "right-clicked: {}",
        label_for(&doc, node, &action.target)
    )))
}

pub fn execute_hover(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    let (x, y) = center_of(&doc, node);

    for kind in ["mouseover", "mouseenter", "mousemove"] {
        doc.dispatch_pointer(node, kind, x, y, PRIMARY_BUTTON);
    }

    Ok(ActionResult::ok(format!(
        "hovering: {}",
        label_for(&doc, node, &action.target)
    )))
}
