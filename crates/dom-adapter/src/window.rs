//! Window state around a document: viewport, scroll, location, storage,
//! cookies, selection, frames and dialogs.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::document::Document;
use crate::errors::{DomError, DomResult};
use crate::node::NodeId;

pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;
pub const BLANK_URL: &str = "about:blank";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }
}

/// What to do with the next `alert`/`confirm`/`prompt`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DialogPolicy {
    pub accept: bool,
    pub prompt_text: Option<String>,
}

/// A text range between two text nodes, in document order once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSelection {
    pub anchor: NodeId,
    pub anchor_offset: usize,
    pub focus: NodeId,
    pub focus_offset: usize,
}

impl TextSelection {
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus && self.anchor_offset == self.focus_offset
    }
}

#[derive(Debug, Clone)]
pub struct Window {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    history: Vec<Url>,
    history_index: usize,
    local_storage: BTreeMap<String, String>,
    cookies: Vec<Cookie>,
    selection: Option<TextSelection>,
    active_frame: Option<String>,
    dialog_policy: Option<DialogPolicy>,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll_x: 0.0,
            scroll_y: 0.0,
            history: vec![Url::parse(BLANK_URL).expect("static url")],
            history_index: 0,
            local_storage: BTreeMap::new(),
            cookies: Vec::new(),
            selection: None,
            active_frame: None,
            dialog_policy: None,
        }
    }
}

impl Window {
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width.max(0.0);
        self.viewport_height = height.max(0.0);
    }

    // ---- location & history ---------------------------------------------

    pub fn location(&self) -> &Url {
        &self.history[self.history_index]
    }

    /// Replace the current entry without touching history length.
    pub fn set_location(&mut self, url: &str) -> DomResult<()> {
        let parsed = self.resolve_url(url)?;
        self.history[self.history_index] = parsed;
        Ok(())
    }

    /// Push a new entry, dropping any forward entries.
    pub fn navigate(&mut self, url: &str) -> DomResult<&Url> {
        let parsed = self.resolve_url(url)?;
        debug!(url = %parsed, "navigate");
        self.history.truncate(self.history_index + 1);
        self.history.push(parsed);
        self.history_index = self.history.len() - 1;
        self.scroll_x = 0.0;
        self.scroll_y = 0.0;
        Ok(self.location())
    }

    pub fn back(&mut self) -> Option<&Url> {
        if self.history_index == 0 {
            return None;
        }
        self.history_index -= 1;
        Some(self.location())
    }

    pub fn forward(&mut self) -> Option<&Url> {
        if self.history_index + 1 >= self.history.len() {
            return None;
        }
        self.history_index += 1;
        Some(self.location())
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn resolve_url(&self, raw: &str) -> DomResult<Url> {
        Url::parse(raw)
            .or_else(|_| self.location().join(raw))
            .map_err(|e| DomError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    // ---- localStorage ----------------------------------------------------

    pub fn storage_get(&self, key: &str) -> Option<&str> {
        self.local_storage.get(key).map(String::as_str)
    }

    pub fn storage_set(&mut self, key: &str, value: &str) {
        self.local_storage.insert(key.to_string(), value.to_string());
    }

    pub fn storage_remove(&mut self, key: &str) -> Option<String> {
        self.local_storage.remove(key)
    }

    pub fn storage_clear(&mut self) {
        self.local_storage.clear();
    }

    pub fn storage_entries(&self) -> &BTreeMap<String, String> {
        &self.local_storage
    }

    // ---- cookies ---------------------------------------------------------

    /// Set or replace a cookie. `max_age` of zero or less expires it at once.
    pub fn set_cookie(
        &mut self,
        name: &str,
        value: &str,
        max_age: Option<i64>,
        path: Option<&str>,
        domain: Option<&str>,
        secure: bool,
    ) {
        let path = path.unwrap_or("/").to_string();
        self.cookies
            .retain(|c| !(c.name == name && c.path == path && c.domain.as_deref() == domain));
        if max_age.is_some_and(|secs| secs <= 0) {
            return;
        }
        self.cookies.push(Cookie {
            name: name.to_string(),
            value: value.to_string(),
            path,
            domain: domain.map(str::to_string),
            secure,
            expires: max_age.map(|secs| Utc::now() + Duration::seconds(secs)),
        });
    }

    pub fn get_cookie(&self, name: &str) -> Option<&Cookie> {
        let now = Utc::now();
        self.cookies
            .iter()
            .find(|c| c.name == name && !c.is_expired(now))
    }

    pub fn cookies(&self) -> Vec<&Cookie> {
        let now = Utc::now();
        self.cookies.iter().filter(|c| !c.is_expired(now)).collect()
    }

    /// `document.cookie` rendering.
    pub fn cookie_string(&self) -> String {
        self.cookies()
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn clear_cookies(&mut self) -> usize {
        let count = self.cookies.len();
        self.cookies.clear();
        count
    }

    // ---- frames & dialogs ------------------------------------------------

    pub fn active_frame(&self) -> Option<&str> {
        self.active_frame.as_deref()
    }

    pub fn set_active_frame(&mut self, selector: Option<String>) {
        self.active_frame = selector;
    }

    pub fn dialog_policy(&self) -> Option<&DialogPolicy> {
        self.dialog_policy.as_ref()
    }

    pub fn set_dialog_policy(&mut self, policy: DialogPolicy) {
        self.dialog_policy = Some(policy);
    }

    /// Consume the pending dialog policy; dialogs without one are dismissed.
    pub fn take_dialog_policy(&mut self) -> DialogPolicy {
        self.dialog_policy.take().unwrap_or_default()
    }

    pub fn selection(&self) -> Option<TextSelection> {
        self.selection
    }
}

impl Document {
    // ---- selection -------------------------------------------------------

    /// Select a range between two text nodes. Offsets are in characters.
    pub fn set_selection(&mut self, selection: TextSelection) -> DomResult<()> {
        for (node, offset) in [
            (selection.anchor, selection.anchor_offset),
            (selection.focus, selection.focus_offset),
        ] {
            let text = self
                .node(node)
                .ok_or(DomError::UnknownNode(node))?
                .as_text()
                .ok_or(DomError::NotAnElement(node))?;
            if offset > text.chars().count() {
                return Err(DomError::OffsetOutOfRange(format!(
                    "{} is past the end of {}",
                    offset, node
                )));
            }
        }
        self.window.selection = Some(self.ordered(selection));
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.window.selection = None;
    }

    /// The current selection if it is non-collapsed and still attached.
    pub fn active_selection(&self) -> Option<TextSelection> {
        self.window
            .selection
            .filter(|s| !s.is_collapsed())
            .filter(|s| self.is_connected(s.anchor) && self.is_connected(s.focus))
    }

    /// `window.getSelection().toString()`.
    pub fn selected_text(&self) -> Option<String> {
        let selection = self.active_selection()?;
        let nodes = self.text_nodes(self.root());
        let start = nodes.iter().position(|n| *n == selection.anchor)?;
        let end = nodes.iter().position(|n| *n == selection.focus)?;
        let mut out = String::new();
        for (i, node) in nodes[start..=end].iter().enumerate() {
            let text = self.text_content(*node);
            let from = if i == 0 { selection.anchor_offset } else { 0 };
            let to = if start + i == end {
                selection.focus_offset
            } else {
                text.chars().count()
            };
            out.extend(text.chars().skip(from).take(to.saturating_sub(from)));
        }
        Some(out).filter(|s| !s.is_empty())
    }

    /// Select characters `[start, end)` of an element's text content.
    pub fn select_text_range(&mut self, element: NodeId, start: usize, end: usize) -> DomResult<()> {
        if end < start {
            return Err(DomError::OffsetOutOfRange(format!("{}..{}", start, end)));
        }
        let anchor = self.text_position(element, start, false)?;
        let focus = self.text_position(element, end, true)?;
        self.set_selection(TextSelection {
            anchor: anchor.0,
            anchor_offset: anchor.1,
            focus: focus.0,
            focus_offset: focus.1,
        })
    }

    /// Select the first case-sensitive occurrence of `needle` inside an
    /// element. Returns false when it does not occur.
    pub fn select_matching_text(&mut self, element: NodeId, needle: &str) -> DomResult<bool> {
        if needle.is_empty() {
            return Ok(false);
        }
        let text = self.text_content(element);
        let Some(byte_start) = text.find(needle) else {
            return Ok(false);
        };
        let start = text[..byte_start].chars().count();
        let end = start + needle.chars().count();
        self.select_text_range(element, start, end)?;
        Ok(true)
    }

    /// Map a character offset within an element to (text node, offset).
    /// With `prefer_end`, a boundary offset lands at the end of the earlier
    /// node instead of the start of the next one.
    fn text_position(
        &self,
        element: NodeId,
        offset: usize,
        prefer_end: bool,
    ) -> DomResult<(NodeId, usize)> {
        let nodes = self.text_nodes(element);
        let mut consumed = 0;
        for node in &nodes {
            let len = self.text_content(*node).chars().count();
            let fits = if prefer_end {
                offset <= consumed + len
            } else {
                offset < consumed + len
            };
            if fits {
                return Ok((*node, offset - consumed));
            }
            consumed += len;
        }
        match nodes.last() {
            Some(last) if offset == consumed => {
                Ok((*last, self.text_content(*last).chars().count()))
            }
            _ => Err(DomError::OffsetOutOfRange(format!(
                "{} exceeds text length {} of {}",
                offset, consumed, element
            ))),
        }
    }

    fn ordered(&self, selection: TextSelection) -> TextSelection {
        if selection.anchor == selection.focus {
            if selection.anchor_offset <= selection.focus_offset {
                return selection;
            }
        } else {
            let nodes = self.text_nodes(self.root());
            let a = nodes.iter().position(|n| *n == selection.anchor);
            let f = nodes.iter().position(|n| *n == selection.focus);
            if a <= f {
                return selection;
            }
        }
        TextSelection {
            anchor: selection.focus,
            anchor_offset: selection.focus_offset,
            focus: selection.anchor,
            focus_offset: selection.anchor_offset,
        }
    }
}
