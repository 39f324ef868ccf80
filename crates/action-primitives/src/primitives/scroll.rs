//! Scroll primitives - page scrolling and bringing elements into view

use pagepilot_core_types::{ActionResult, PageAction, ScrollBlock, ScrollDirection};
use pagepilot_dom_adapter::{Document, EventDetail, NodeId};
use serde_json::json;

use crate::errors::ActionError;
use crate::executor::DefaultActionExecutor;
use crate::primitives::label_for;
use crate::types::ExecCtx;

/// Largest vertical offset the page can scroll to.
fn max_scroll_y(doc: &Document) -> f64 {
    (doc.document_height() - doc.window().viewport_height).max(0.0)
}

/// Move the window to `y`, clamped to the scrollable range, and fire `scroll`.
fn scroll_window_to(doc: &mut Document, y: f64) -> (f64, f64) {
    let clamped = y.clamp(0.0, max_scroll_y(doc));
    let x = doc.window().scroll_x;
    doc.window_mut().scroll_y = clamped;
    doc.dispatch_with(None, "scroll", EventDetail::Scroll { x, y: clamped });
    (x, clamped)
}

/// Execute scroll primitive
///
/// Up and down move by a fraction of the viewport height; top and bottom
/// jump to the ends of the document.
pub fn execute_scroll(
    exec: &DefaultActionExecutor,
    _ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let direction = action.params.direction.unwrap_or_default();
    let mut doc = exec.document().lock();
    let step = doc.window().viewport_height * exec.policy().scroll_fraction;
    let current = doc.window().scroll_y;
    let wanted = match direction {
        ScrollDirection::Down => current + step,
        ScrollDirection::Up => current - step,
        ScrollDirection::Top => 0.0,
        ScrollDirection::Bottom => max_scroll_y(&doc),
    };
    let (x, y) = scroll_window_to(&mut doc, wanted);
    let name = match direction {
        ScrollDirection::Up => "up",
        ScrollDirection::Down => "down",
        ScrollDirection::Top => "to top",
        ScrollDirection::Bottom => "to bottom",
    };
    Ok(ActionResult::ok_with_data(
        format!("scrolled {}", name),
        json!({ "x": x, "y": y }),
    ))
}

/// Scroll offset that places `node` according to `block`.
fn block_offset(doc: &Document, node: NodeId, block: ScrollBlock) -> f64 {
    let rect = doc.page_rect(node);
    let viewport = doc.window().viewport_height;
    let current = doc.window().scroll_y;
    match block {
        ScrollBlock::Start => rect.y,
        ScrollBlock::Center => rect.y + rect.height / 2.0 - viewport / 2.0,
        ScrollBlock::End => rect.bottom() - viewport,
        ScrollBlock::Nearest => {
            if rect.y < current {
                rect.y
            } else if rect.bottom() > current + viewport {
                rect.bottom() - viewport
            } else {
                current
            }
        }
    }
}

pub fn execute_scroll_into_view(
    exec: &DefaultActionExecutor,
    ctx: &ExecCtx,
    action: &PageAction,
) -> Result<ActionResult, ActionError> {
    let mut doc = exec.document().lock();
    let node = exec.resolve(&doc, ctx, &action.target)?;
    let wanted = block_offset(&doc, node, action.params.block.unwrap_or_default());
    let (x, y) = scroll_window_to(&mut doc, wanted);
    Ok(ActionResult::ok_with_data(
        format!("scrolled into view: {}", label_for(&doc, node, &action.target)),
        json!({ "x": x, "y": y }),
    ))
}
