//! Read primitives - element text, attributes and DOM properties

use pagepilot_core_types::{ActionResult, ErrorCode, PageAction};
use pagepilot_dom_adapter::{Document, NodeId};
use serde_json::{json, Value};

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::primitives::require;
use crate::types::ExecCtx;

/// What `read` reports for a node: the live value of form controls, the
/// trimmed text of anything else.
pub fn readable_text(doc: &Document, node: NodeId) -> String {
    if doc.is_text_control(node) || doc.is_tag(node, "select") {
        doc.value(node)
    } else {
        doc.text_content(node).trim().to_string()
    }
}

/// Execute read primitive
///
/// Without a resolvable target the current text selection is returned.
pub fn execute_read(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let doc = exec.document().lock();
    let resolved = if action.target.is_empty() {
        None
    } else {
        match exec.resolve(&doc, ctx, &action.target) {
            Ok(node) => Some(node),
            Err(err) => match doc.selected_text() {
                Some(_) => None,
                None => return Err(err),
            },
        }
    };

    if let Some(node) = resolved {
        let text = readable_text(&doc, node);
        return Ok(ActionResult::ok_with_data("read element content", json!(text)));
    }
    match doc.selected_text() {
        Some(selected) => Ok(ActionResult::ok_with_data("read selected text", json!(selected))),
        None => Err(ActionError::NoTarget("no element or selection to read".into())),
    }
}

pub fn execute_get_attribute(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let name = require(&action.params.attribute, "attribute", ErrorCode::NoAttribute)?;
    let doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    let value = doc.attr(node, name).map(str::to_string);
    let message = match &value {
        Some(_) => format!("read attribute {}", name),
        None => format!("attribute {} is not set", name),
    };
    Ok(ActionResult::ok_with_data(message, json!(value)))
}

/// DOM property as a script would read it. Unknown names fall back to the
/// attribute of the same name, then null.
pub fn property_value(doc: &Document, node: NodeId, property: &str) -> Value {
    match property {
        "value" => json!(doc.value(node)),
        "checked" => json!(doc.is_checked(node)),
        "disabled" => json!(doc.is_disabled(node)),
        "selected" => json!(doc
            .parent_element(node)
            .and_then(|p| doc.closest(p, "select").ok().flatten())
            .and_then(|select| doc.selected_option(select))
            == Some(node)),
        "selectedIndex" => {
            let options = doc.select_options(node);
            let index = doc
                .selected_option(node)
                .and_then(|o| options.iter().position(|x| *x == o))
                .map_or(-1, |i| i as i64);
            json!(index)
        }
        "textContent" => json!(doc.text_content(node)),
        "innerText" => json!(doc.normalized_text(node)),
        "innerHTML" => json!(doc.inner_html(node)),
        "outerHTML" => json!(doc.outer_html(node)),
        "tagName" => json!(doc.tag(node).map(str::to_ascii_uppercase)),
        "className" => json!(doc.class_name(node)),
        "id" => json!(doc.attr(node, "id").unwrap_or_default()),
        "type" => json!(doc.input_type(node).or_else(|| doc.attr(node, "type").map(str::to_string))),
        "files" => json!(doc.files(node).iter().map(|f| f.name.clone()).collect::<Vec<_>>()),
        "href" => {
            let href = doc.attr(node, "href").unwrap_or_default();
            let resolved = doc
                .window()
                .location()
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string());
            json!(resolved)
        }
        other => doc.attr(node, other).map_or(Value::Null, |v| json!(v)),
    }
}

pub fn execute_get_property(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let property = require(&action.params.property, "property", ErrorCode::NoProperty)?;
    let doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    let value = property_value(&doc, node, property);
    Ok(ActionResult::ok_with_data(format!("read property {}", property), value))
}
