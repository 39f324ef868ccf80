//! Synthetic event log.
//!
//! There are no listeners; every dispatched event is appended here so callers
//! can observe what a page script would have seen.

use serde::Serialize;

use crate::document::Document;
use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventDetail {
    None,
    Pointer { x: f64, y: f64, button: u8 },
    Key { key: String },
    Files { names: Vec<String> },
    Scroll { x: f64, y: f64 },
    Dialog { action: String, prompt_text: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomEvent {
    pub kind: String,
    /// `None` for window-level events.
    #[serde(skip)]
    pub target: Option<NodeId>,
    pub detail: EventDetail,
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<DomEvent>,
}

impl EventLog {
    pub fn push(&mut self, event: DomEvent) {
        self.entries.push(event);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomEvent> {
        self.entries.iter()
    }
}

impl Document {
    pub fn dispatch(&mut self, target: NodeId, kind: &str) {
        self.dispatch_with(Some(target), kind, EventDetail::None);
    }

    pub fn dispatch_with(&mut self, target: Option<NodeId>, kind: &str, detail: EventDetail) {
        self.events.push(DomEvent {
            kind: kind.to_string(),
            target,
            detail,
        });
    }

    /// Pointer event at viewport coordinates.
    pub fn dispatch_pointer(&mut self, target: NodeId, kind: &str, x: f64, y: f64, button: u8) {
        self.dispatch_with(Some(target), kind, EventDetail::Pointer { x, y, button });
    }

    pub fn dispatch_key(&mut self, target: NodeId, kind: &str, key: &str) {
        self.dispatch_with(
            Some(target),
            kind,
            EventDetail::Key {
                key: key.to_string(),
            },
        );
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drain the log, returning everything recorded so far.
    pub fn take_events(&mut self) -> Vec<DomEvent> {
        std::mem::take(&mut self.events.entries)
    }

    /// Event kinds recorded for one target, in dispatch order.
    pub fn event_kinds_for(&self, target: NodeId) -> Vec<String> {
        self.events
            .iter()
            .filter(|e| e.target == Some(target))
            .map(|e| e.kind.clone())
            .collect()
    }
}
