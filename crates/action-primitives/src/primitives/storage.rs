//! Storage primitives - localStorage and cookies

use pagepilot_core_types::{ActionResult, ErrorCode, PageAction};
use serde_json::json;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::primitives::require;
use crate::types::ExecCtx;

pub fn execute_set_local_storage(
    exec: &DefaultActionExecutor,
    _ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let key = require(&action.params.key, "key", ErrorCode::NoKey)?;
    let value = action
        .params
        .value
        .as_deref()
        .ok_or_else(|| ActionError::missing("value", ErrorCode::NoValue))?;
    let mut doc = exec.document().lock();
    doc.window_mut().storage_set(key, value);
    Ok(ActionResult::ok(format!("stored {}", key)))
}

/// One key's value (null when unset), or every entry when no key is given.
pub fn execute_get_local_storage(
    exec: &DefaultActionExecutor,
    _ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let doc = exec.document().lock();
    let window = doc.window();
    match action.params.key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => Ok(ActionResult::ok_with_data(
            format!("read {}", key),
            json!(window.storage_get(key)),
        )),
        None => {
            let entries = window.storage_entries();
            Ok(ActionResult::ok_with_data(
                format!("read {} entries", entries.len()),
                json!(entries),
            ))
        }
    }
}

/// Remove one key, or empty the store when no key is given.
pub fn execute_clear_local_storage(
    exec: &DefaultActionExecutor,
    _ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let window = doc.window_mut();
    match action.params.key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => {
            let removed = window.storage_remove(key).is_some();
            Ok(ActionResult::ok_with_data(format!("removed {}", key), json!(removed)))
        }
        None => {
            window.storage_clear();
            Ok(ActionResult::ok("local storage cleared"))
        }
    }
}

fn cookie_name(action: &PageAction) -> Option<&str> {
    action
        .params
        .name
        .as_deref()
        .or(action.params.key.as_deref())
        .filter(|n| !n.is_empty())
}

pub fn execute_set_cookie(
    exec: &DefaultActionExecutor,
    _ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let name = cookie_name(action).ok_or_else(|| ActionError::missing("name", ErrorCode::NoKey))?;
    let value = action
        .params
        .value
        .as_deref()
        .ok_or_else(|| ActionError::missing("value", ErrorCode::NoValue))?;
    let options = action.params.cookie_options.clone().unwrap_or_default();

    let mut doc = exec.document().lock();
    doc.window_mut().set_cookie(
        name,
        value,
        options.expires,
        options.path.as_deref(),
        options.domain.as_deref(),
        options.secure.unwrap_or(false),
    );
    Ok(ActionResult::ok(format!("cookie {} set", name)))
}

/// One cookie's value, or the whole `document.cookie` string.
pub fn execute_get_cookie(
    exec: &DefaultActionExecutor,
    _ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let doc = exec.document().lock();
    let window = doc.window();
    match cookie_name(action) {
        Some(name) => {
            let value = window.get_cookie(name).map(|c| c.value.clone());
            Ok(ActionResult::ok_with_data(format!("read cookie {}", name), json!(value)))
        }
        None => Ok(ActionResult::ok_with_data(
            "read all cookies",
            json!(window.cookie_string()),
        )),
    }
}

pub fn execute_clear_cookies(
    exec: &DefaultActionExecutor,
    _ctx: &ExecCtx,
    _action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let removed = doc.window_mut().clear_cookies();
    Ok(ActionResult::ok_with_data(
        format!("cleared {} cookies", removed),
        json!(removed),
    ))
}
