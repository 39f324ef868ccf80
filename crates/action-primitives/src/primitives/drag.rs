//! Drag primitive - pointer drag with interpolated moves

use pagepilot_core_types::{ActionResult, ErrorCode, PageAction};
use pagepilot_dom_adapter::NodeId;
use serde_json::json;
use tracing::debug;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::locator::describe_target;
use crate::primitives::{center_of, label_for};
use crate::types::ExecCtx;
use crate::waiting::pause;

const PRIMARY_BUTTON: u8 = 0;

/// Execute drag primitive
///
/// Steps:
/// 1. Resolve source and destination (selector center or explicit point)
/// 2. mousedown at the source center
/// 3. `drag_steps` interpolated mousemoves, paced by `drag_step_delay_ms`
/// 4. mouseup at the destination, plus `drop` on a destination element
///
/// The document lock is released between steps.
pub async fn execute_drag(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let destination = action
        .params
        .destination
        .as_ref()
        .ok_or_else(|| ActionError::missing("destination", ErrorCode::NoDestination))?;

    let (source, start, drop_target, end, label) = {
        let doc = exec.document().lock();
        let source = exec
            .resolve(&doc, ctx, &action.target)
            .map_err(|_| ActionError::SourceNotFound(describe_target(&action.target)))?;
        let (drop_target, end): (Option<NodeId>, (f64, f64)) = match &destination.selector {
            Some(selector) => {
                let node = doc
                    .query_selector(selector)
                    .ok()
                    .flatten()
                    .ok_or_else(|| ActionError::DestinationNotFound(selector.clone()))?;
                (Some(node), center_of(&doc, node))
            }
            None => match (destination.x, destination.y) {
                (Some(x), Some(y)) => (None, (x, y)),
                _ => return Err(ActionError::missing("destination", ErrorCode::NoDestination)),
            },
        };
        let label = label_for(&doc, source, &action.target);
        (source, center_of(&doc, source), drop_target, end, label)
    };

    let steps = exec.policy().drag_steps.max(1);
    let step_delay = exec.pacing().drag_step_delay;
    debug!(action_id = %ctx.action_id, steps, ?start, ?end, "dragging");

    exec.document()
        .lock()
        .dispatch_pointer(source, "mousedown", start.0, start.1, PRIMARY_BUTTON);

    for step in 1..=steps {
        let t = f64::from(step) / f64::from(steps);
        let x = start.0 + (end.0 - start.0) * t;
        let y = start.1 + (end.1 - start.1) * t;
        exec.document()
            .lock()
            .dispatch_pointer(source, "mousemove", x, y, PRIMARY_BUTTON);
        pause(step_delay).await;
    }

    {
        let mut doc = exec.document().lock();
        let release_on = drop_target.unwrap_or(source);
        doc.dispatch_pointer(release_on, "mouseup", end.0, end.1, PRIMARY_BUTTON);
        if let Some(target) = drop_target {
            doc.dispatch_pointer(target, "drop", end.0, end.1, PRIMARY_BUTTON);
        }
    }

    Ok(ActionResult::ok_with_data(
        format!("dragged {} to ({:.0}, {:.0})", label, end.0, end.1),
        json!({ "x": end.0, "y": end.1 }),
    ))
}
