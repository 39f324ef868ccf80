//! Wait primitive - fixed delays and element conditions

use std::time::Duration;

use pagepilot_core_types::{ActionResult, PageAction, WaitCondition};
use pagepilot_perceiver_structural::collector::is_element_visible;
use tracing::debug;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::locator::describe_target;
use crate::types::{ExecCtx, TargetLookup};
use crate::waiting::{pause, poll_until};

fn condition_name(condition: WaitCondition) -> &'static str {
    match condition {
        WaitCondition::Visible => "visible",
        WaitCondition::Hidden => "hidden",
        WaitCondition::Exists => "present",
    }
}

/// Execute wait primitive
///
/// Without a target this is a plain delay of `timeout` (or `delay`)
/// milliseconds. With a target the condition is polled every
/// `wait_poll_ms` until it holds or the timeout expires. Polling resolves by
/// id and selector only, so a description never matches a look-alike.
pub async fn execute_wait(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let pacing = exec.pacing();
    let params = &action.params;

    if action.target.is_empty() {
        let millis = params.timeout.or(params.delay).unwrap_or(0);
        pause(Duration::from_millis(millis)).await;
        return Ok(ActionResult::ok(format!("waited {}ms", millis)));
    }

    let condition = params.condition.unwrap_or_default();
    let limit = params
        .timeout
        .map(Duration::from_millis)
        .unwrap_or(pacing.wait_timeout);

    let met = poll_until(pacing.wait_poll, limit, || {
        let doc = exec.document().lock();
        let node = exec
            .resolve_with(&doc, &action.target, TargetLookup::DIRECT)
            .ok()
            .map(|r| r.node);
        match condition {
            WaitCondition::Exists => node.is_some(),
            WaitCondition::Visible => node.is_some_and(|n| is_element_visible(&doc, n)),
            WaitCondition::Hidden => node.map_or(true, |n| !is_element_visible(&doc, n)),
        }
    })
    .await;

    let label = describe_target(&action.target);
    if met {
        debug!(action_id = %ctx.action_id, condition = condition_name(condition), "wait satisfied");
        Ok(ActionResult::ok(format!(
            "{} is {}",
            label,
            condition_name(condition)
        )))
    } else {
        Err(ActionError::WaitTimeout(format!(
            "{} not {} after {}ms",
            label,
            condition_name(condition),
            limit.as_millis()
        )))
    }
}
