//! List primitives - add, remove and edit items of a list container

use pagepilot_core_types::{ActionResult, ErrorCode, ListPosition, PageAction};
use pagepilot_dom_adapter::{Document, NodeId};
use serde_json::json;
use tracing::debug;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::types::ExecCtx;

const ITEM_TAGS: &[&str] = &["li", "dt", "dd"];

/// The list container and, when the target was an item, that item.
fn resolve_list(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    doc: &Document,
    action: &PageAction,
) -> Result<(NodeId, Option<NodeId>), ActionError> {
    if let Some(selector) = action.params.list_selector.as_deref().filter(|s| !s.is_empty()) {
        let list = doc
            .query_selector(selector)?
            .ok_or_else(|| ActionError::ElementNotFound(selector.to_string()))?;
        return Ok((list, None));
    }
    if action.target.is_empty() {
        return Err(ActionError::NoTarget("no list selector or target given".into()));
    }
    let node = exec.resolve(doc, ctx, &action.target)?;
    if ITEM_TAGS.iter().any(|t| doc.is_tag(node, t)) {
        if let Some(parent) = doc.parent_element(node) {
            return Ok((parent, Some(node)));
        }
    }
    Ok((node, None))
}

fn item_content<'a>(action: &'a PageAction) -> Result<&'a str, ActionError> {
    action
        .params
        .item_content
        .as_deref()
        .or(action.params.content.as_deref())
        .ok_or_else(|| ActionError::missing("itemContent", ErrorCode::NoContent))
}

/// Tag for a new item: `li` in `ul`/`ol`, otherwise whatever the existing
/// items use.
fn item_tag(doc: &Document, list: NodeId, items: &[NodeId]) -> String {
    if doc.is_tag(list, "ul") || doc.is_tag(list, "ol") {
        return "li".to_string();
    }
    items
        .first()
        .and_then(|first| doc.tag(*first))
        .unwrap_or("div")
        .to_string()
}

/// The item addressed by `itemIndex`, or the targeted item.
fn pick_item(
    items: &[NodeId],
    index: Option<usize>,
    targeted: Option<NodeId>,
) -> Result<NodeId, ActionError> {
    match (index, targeted) {
        (Some(index), _) => items.get(index).copied().ok_or_else(|| {
            ActionError::ElementNotFound(format!(
                "list item {} (list has {} items)",
                index,
                items.len()
            ))
        }),
        (None, Some(item)) => Ok(item),
        (None, None) => Err(ActionError::NoTarget(
            "no item index or list item target given".into(),
        )),
    }
}

/// Execute addListItem primitive
///
/// `first`/`last` place the item at the ends of the list; `before`/`after`
/// place it relative to the item at `itemIndex` (or the targeted item).
pub fn execute_add_list_item(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let content = item_content(action)?;
    let mut doc = exec.document().lock();
    let (list, targeted) = resolve_list(exec, ctx, &doc, action)?;
    let items = doc.element_children(list);
    let position = action.params.position.unwrap_or_default();

    let tag = item_tag(&doc, list, &items);
    let item = doc.create_element(&tag);
    doc.set_text_content(item, content)?;

    match position {
        ListPosition::Last => doc.append_child(list, item)?,
        ListPosition::First => doc.insert_before(list, item, items.first().copied())?,
        ListPosition::Before | ListPosition::After => {
            let anchor = match (action.params.item_index, targeted) {
                (None, None) if items.is_empty() => None,
                (index, targeted) => Some(pick_item(&items, index, targeted)?),
            };
            match (position, anchor) {
                (ListPosition::Before, Some(anchor)) => doc.insert_before(list, item, Some(anchor))?,
                (_, Some(anchor)) => doc.insert_after(list, item, anchor)?,
                (_, None) => doc.append_child(list, item)?,
            }
        }
    }

    let index = doc
        .element_children(list)
        .iter()
        .position(|n| *n == item)
        .unwrap_or_default();
    debug!(action_id = %ctx.action_id, index, "list item added");
    Ok(ActionResult::ok_with_data(
        format!("added list item at index {}", index),
        json!(index),
    ))
}

pub fn execute_remove_list_item(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let (list, targeted) = resolve_list(exec, ctx, &doc, action)?;
    let items = doc.element_children(list);
    let item = pick_item(&items, action.params.item_index, targeted)?;
    let text = doc.normalized_text(item);
    doc.remove(item)?;
    Ok(ActionResult::ok_with_data(
        format!("removed list item ({} left)", items.len().saturating_sub(1)),
        json!(text),
    ))
}

pub fn execute_edit_list_item(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let content = item_content(action)?;
    let mut doc = exec.document().lock();
    let (list, targeted) = resolve_list(exec, ctx, &doc, action)?;
    let items = doc.element_children(list);
    let item = pick_item(&items, action.params.item_index, targeted)?;
    let previous = doc.normalized_text(item);
    doc.set_text_content(item, content)?;
    Ok(ActionResult::ok_with_data(
        "edited list item",
        json!({ "previous": previous, "current": content }),
    ))
}
