//! Page session facade
//!
//! One live document, the element registry shared by perception and
//! execution, and the policy both read. This is the surface an agent
//! runtime talks to each turn:
//! - `get_page_context` - ranked elements for the user's message
//! - `request_more_elements` - region/type/keyword follow-ups
//! - `execute_action` / `execute_batch` - commands against the page
//!
//! Every perception call re-collects the page, so element ids from an
//! earlier call must not be reused after a later one.

use std::sync::Arc;

use pagepilot_action_primitives::{ActionExecutor, DefaultActionExecutor};
use pagepilot_core_types::{
    ActionResult, BatchActionResult, BatchEntry, CompactElement, MoreElementsRequest, PageAction,
    PageContext,
};
use pagepilot_dom_adapter::Document;
use pagepilot_perceiver_structural::{
    extract_cards, extract_forms, extract_lists, extract_tables, page_metadata, page_summary,
    ContextAssembler, ElementRegistry, StructuralPerceiver,
};
use pagepilot_policy_center::AgentPolicy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::config::SessionConfig;
use crate::errors::SessionResult;

/// Read-only extraction views over the page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractKind {
    Tables,
    Lists,
    Cards,
    Forms,
    Metadata,
    Summary,
}

pub struct PageSession {
    document: Arc<Mutex<Document>>,
    perceiver: ContextAssembler,
    executor: DefaultActionExecutor,
    policy: AgentPolicy,
}

impl PageSession {
    /// Session over an already-built document.
    pub fn new(document: Document, policy: AgentPolicy) -> Self {
        let document = Arc::new(Mutex::new(document));
        let registry = Arc::new(ElementRegistry::new());
        let executor =
            DefaultActionExecutor::new(Arc::clone(&document), Arc::clone(&registry), &policy);
        Self {
            document,
            perceiver: ContextAssembler::new(registry),
            executor,
            policy,
        }
    }

    /// Parse `html` and set up the window from `config`.
    pub fn from_html(html: &str, policy: AgentPolicy, config: &SessionConfig) -> SessionResult<Self> {
        let mut document = Document::parse(html)?;
        let window = document.window_mut();
        window.set_viewport(config.viewport.width, config.viewport.height);
        if let Some(url) = &config.url {
            window.set_location(url)?;
        }
        info!(
            url = %window.location(),
            width = config.viewport.width,
            height = config.viewport.height,
            "page session opened"
        );
        Ok(Self::new(document, policy))
    }

    /// Swap in a custom executor, e.g. one with a host clipboard.
    pub fn with_executor(mut self, executor: DefaultActionExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn document(&self) -> &Arc<Mutex<Document>> {
        &self.document
    }

    pub fn registry(&self) -> &Arc<ElementRegistry> {
        self.perceiver.registry()
    }

    pub fn policy(&self) -> &AgentPolicy {
        &self.policy
    }

    pub fn executor(&self) -> &DefaultActionExecutor {
        &self.executor
    }

    /// Ranked, described elements relevant to `message`.
    #[instrument(skip_all)]
    pub fn get_page_context(&self, message: &str) -> PageContext {
        let doc = self.document.lock();
        let context = self.perceiver.page_context(&doc, message, &self.policy);
        info!(
            returned = context.elements.len(),
            total = context.total_elements,
            "page context ready"
        );
        context
    }

    /// Elements matching every filter set in `request`, unranked.
    #[instrument(skip_all)]
    pub fn request_more_elements(&self, request: &MoreElementsRequest) -> Vec<CompactElement> {
        let doc = self.document.lock();
        self.perceiver.more_elements(&doc, request, &self.policy)
    }

    #[instrument(skip_all, fields(action = %action.action))]
    pub async fn execute_action(&self, action: &PageAction) -> ActionResult {
        self.executor.execute_action(action).await
    }

    #[instrument(skip_all, fields(count = actions.len()))]
    pub async fn execute_batch(&self, actions: &[PageAction]) -> BatchActionResult {
        self.executor.execute_batch(actions).await
    }

    /// Batch of individually decoded entries; malformed ones fail in place.
    #[instrument(skip_all, fields(count = entries.len()))]
    pub async fn execute_entries(&self, entries: &[BatchEntry]) -> BatchActionResult {
        self.executor.execute_entries(entries).await
    }

    pub fn clear_all_styles(&self) -> usize {
        self.executor.clear_all_styles()
    }

    /// One extraction view as JSON.
    pub fn extract(&self, kind: ExtractKind) -> serde_json::Result<Value> {
        let doc = self.document.lock();
        match kind {
            ExtractKind::Tables => serde_json::to_value(extract_tables(&doc)),
            ExtractKind::Lists => serde_json::to_value(extract_lists(&doc)),
            ExtractKind::Cards => serde_json::to_value(extract_cards(&doc)),
            ExtractKind::Forms => serde_json::to_value(extract_forms(&doc)),
            ExtractKind::Metadata => serde_json::to_value(page_metadata(&doc)),
            ExtractKind::Summary => serde_json::to_value(page_summary(&doc)),
        }
    }

    /// Current markup, including every change made by executed actions.
    pub fn to_html(&self) -> String {
        self.document.lock().to_html()
    }
}
