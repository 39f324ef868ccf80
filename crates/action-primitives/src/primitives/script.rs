use pagepilot_core_types::{ActionResult, ErrorCode, PageAction};
use tracing::warn;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::primitives::require;
use crate::types::ExecCtx;

/// Execute evaluate primitive through the configured script port.
pub fn execute_evaluate(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    if !exec.policy().allow_evaluate {
        return Err(ActionError::Script("evaluate is disabled by policy".into()));
    }
    let script = require(&action.params.script, "script", ErrorCode::NoScript)?;

    let mut doc = exec.document().lock();
    let value = exec.script_port().evaluate(&mut doc, script).map_err(|e| {
        warn!(action_id = %ctx.action_id, error = %e, "script rejected");
        ActionError::Script(e.to_string())
    })?;
    Ok(ActionResult::ok_with_data("script evaluated", value))
}
