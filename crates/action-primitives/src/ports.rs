//! Ports to capabilities the page does not own: the system clipboard and a
//! script engine.

use async_trait::async_trait;
use pagepilot_dom_adapter::Document;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("script rejected: {0}")]
    Script(String),
}

/// System clipboard, async like the platform API it stands in for.
#[async_trait]
pub trait ClipboardPort: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), PortError>;
    async fn read_text(&self) -> Result<String, PortError>;
}

/// Process-local clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(text.into())),
        }
    }
}

#[async_trait]
impl ClipboardPort for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), PortError> {
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }

    async fn read_text(&self) -> Result<String, PortError> {
        self.contents
            .lock()
            .clone()
            .ok_or_else(|| PortError::Clipboard("clipboard is empty".into()))
    }
}

/// Evaluates agent-supplied script text against the page.
///
/// Whatever a port accepts runs with the page's full authority; there is no
/// sandbox at this layer.
pub trait ScriptPort: Send + Sync {
    fn evaluate(&self, doc: &mut Document, script: &str) -> Result<Value, PortError>;
}

/// Accepts a fixed set of read-mostly statements and rejects everything else:
///
/// - `return document.title`
/// - `return location.href` (also `window.location.href`, `document.URL`)
/// - `return document.querySelector(<sel>).textContent` / `.value`
/// - `document.querySelector(<sel>).click()`
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowlistScriptPort;

const QUERY_PREFIX: &str = "document.querySelector(";

impl AllowlistScriptPort {
    /// Split `document.querySelector('sel').rest` into (`sel`, `rest`).
    fn query_call(expr: &str) -> Result<(String, &str), PortError> {
        let inner = expr
            .strip_prefix(QUERY_PREFIX)
            .ok_or_else(|| PortError::Script(format!("not allowed: {}", expr)))?;
        let quote = inner
            .chars()
            .next()
            .filter(|c| matches!(c, '\'' | '"' | '`'))
            .ok_or_else(|| PortError::Script("selector must be a string literal".into()))?;
        let body = &inner[1..];
        let end = body
            .find(quote)
            .ok_or_else(|| PortError::Script("unterminated selector literal".into()))?;
        let selector = body[..end].to_string();
        let rest = body[end + 1..]
            .strip_prefix(')')
            .ok_or_else(|| PortError::Script("expected ')' after selector".into()))?;
        Ok((selector, rest))
    }

    fn query(doc: &Document, selector: &str) -> Result<Option<pagepilot_dom_adapter::NodeId>, PortError> {
        doc.query_selector(selector)
            .map_err(|err| PortError::Script(err.to_string()))
    }
}

impl ScriptPort for AllowlistScriptPort {
    fn evaluate(&self, doc: &mut Document, script: &str) -> Result<Value, PortError> {
        let statement = script.trim().trim_end_matches(';').trim();
        debug!(statement, "evaluating allowlisted script");

        if let Some(expr) = statement.strip_prefix("return ").map(str::trim) {
            return match expr {
                "document.title" => Ok(Value::String(doc.title())),
                "location.href" | "window.location.href" | "document.URL" => {
                    Ok(Value::String(doc.window().location().to_string()))
                }
                _ => {
                    let (selector, property) = Self::query_call(expr)?;
                    let Some(node) = Self::query(doc, &selector)? else {
                        return Ok(Value::Null);
                    };
                    match property {
                        ".textContent" => Ok(Value::String(doc.text_content(node))),
                        ".value" => Ok(Value::String(doc.value(node))),
                        other => Err(PortError::Script(format!("property not allowed: {}", other))),
                    }
                }
            };
        }

        let (selector, call) = Self::query_call(statement)?;
        if call != ".click()" {
            return Err(PortError::Script(format!("call not allowed: {}", call)));
        }
        let node = Self::query(doc, &selector)?
            .ok_or_else(|| PortError::Script(format!("{} matched nothing", selector)))?;
        doc.dispatch(node, "click");
        Ok(Value::Null)
    }
}
