//! Action executor: one entry point per agent command.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use pagepilot_action_locator::{DefaultElementResolver, ElementResolver};
use pagepilot_core_types::{
    ActionKind, ActionResult, ActionTarget, BatchActionResult, BatchEntry, ErrorCode, PageAction,
};
use pagepilot_dom_adapter::{Document, NodeId};
use pagepilot_perceiver_structural::ElementRegistry;
use pagepilot_policy_center::{AgentPolicy, ExecutorPolicy};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::errors::ActionError;
use crate::locator::{DefaultTargetResolver, ResolvedTarget, TargetResolver};
use crate::ports::{AllowlistScriptPort, ClipboardPort, MemoryClipboard, ScriptPort};
use crate::primitives::*;
use crate::types::{ExecCtx, TargetLookup};
use crate::waiting::{pause, Pacing};

/// Action executor trait
///
/// `execute_action` never fails: every outcome, including a panic inside the
/// action, comes back as an [`ActionResult`].
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Resolve the target and perform one action.
    async fn execute_action(&self, action: &PageAction) -> ActionResult;

    /// Run actions strictly in order with a pause between them. Never stops
    /// early; there is one result per input action.
    async fn execute_batch(&self, actions: &[PageAction]) -> BatchActionResult;

    /// Like `execute_batch`, for entries decoded one by one. A malformed entry
    /// fails with `EXECUTION_ERROR` at its own index; the rest still run.
    async fn execute_entries(&self, entries: &[BatchEntry]) -> BatchActionResult;

    /// Remove every highlight and underline this executor applied.
    fn clear_all_styles(&self) -> usize;
}

/// Default implementation of the action executor
pub struct DefaultActionExecutor {
    /// Live page shared with the perceiver
    document: Arc<Mutex<Document>>,

    /// Resolves action targets to nodes
    resolver: Arc<dyn TargetResolver>,

    policy: ExecutorPolicy,

    pacing: Pacing,

    clipboard: Arc<dyn ClipboardPort>,

    script: Arc<dyn ScriptPort>,
}

impl DefaultActionExecutor {
    /// Executor over `document`, resolving ids through `registry`.
    pub fn new(
        document: Arc<Mutex<Document>>,
        registry: Arc<ElementRegistry>,
        policy: &AgentPolicy,
    ) -> Self {
        let locator: Arc<dyn ElementResolver> = Arc::new(DefaultElementResolver::new(policy.clone()));
        Self {
            document,
            resolver: Arc::new(DefaultTargetResolver::new(registry, locator)),
            policy: policy.executor.clone(),
            pacing: Pacing::from(&policy.executor),
            clipboard: Arc::new(MemoryClipboard::new()),
            script: Arc::new(AllowlistScriptPort),
        }
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardPort>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_script_port(mut self, script: Arc<dyn ScriptPort>) -> Self {
        self.script = script;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn TargetResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn document(&self) -> &Arc<Mutex<Document>> {
        &self.document
    }

    pub fn policy(&self) -> &ExecutorPolicy {
        &self.policy
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn clipboard(&self) -> &Arc<dyn ClipboardPort> {
        &self.clipboard
    }

    pub fn script_port(&self) -> &Arc<dyn ScriptPort> {
        &self.script
    }

    /// Resolve a target with an explicit lookup depth.
    pub fn resolve_with(
        &self,
        doc: &Document,
        target: &ActionTarget,
        lookup: TargetLookup,
    ) -> Result<ResolvedTarget, ActionError> {
        let resolved = self.resolver.resolve(doc, target, lookup)?;
        debug!(via = ?resolved.via, confidence = ?resolved.confidence, "target resolved");
        Ok(resolved)
    }

    /// Resolve the target of the action in `ctx` at that action's lookup depth.
    pub fn resolve(
        &self,
        doc: &Document,
        ctx: &ExecCtx,
        target: &ActionTarget,
    ) -> Result<NodeId, ActionError> {
        self.resolve_with(doc, target, TargetLookup::for_action(&ctx.action))
            .map(|r| r.node)
    }

    async fn dispatch(&self, ctx: &ExecCtx, action: &PageAction) -> Result<ActionResult, ActionError> {
        match &action.action {
            ActionKind::Fill => execute_fill(self, ctx, action),
            ActionKind::Click => execute_click(self, ctx, action),
            ActionKind::DoubleClick => execute_double_click(self, ctx, action),
            ActionKind::RightClick => execute_right_click(self, ctx, action),
            ActionKind::Highlight => execute_highlight(self, ctx, action),
            ActionKind::Underline => execute_underline(self, ctx, action),
            ActionKind::Select => execute_select(self, ctx, action),
            ActionKind::SelectText => execute_select_text(self, ctx, action),
            ActionKind::Check => execute_check(self, ctx, action),
            ActionKind::Scroll => execute_scroll(self, ctx, action),
            ActionKind::Read => execute_read(self, ctx, action),
            ActionKind::Hover => execute_hover(self, ctx, action),
            ActionKind::Type => execute_type(self, ctx, action).await,
            ActionKind::Press => execute_press(self, ctx, action),
            ActionKind::Drag => execute_drag(self, ctx, action).await,
            ActionKind::Wait => execute_wait(self, ctx, action).await,
            ActionKind::Focus => execute_focus(self, ctx, action),
            ActionKind::Blur => execute_blur(self, ctx, action),
            ActionKind::Clear => execute_clear(self, ctx, action),
            ActionKind::GetAttribute => execute_get_attribute(self, ctx, action),
            ActionKind::GetProperty => execute_get_property(self, ctx, action),
            ActionKind::Navigate => execute_navigate(self, ctx, action),
            ActionKind::ScrollIntoView => execute_scroll_into_view(self, ctx, action),
            ActionKind::SwitchFrame => execute_switch_frame(self, ctx, action),
            ActionKind::HandleDialog => execute_handle_dialog(self, ctx, action),
            ActionKind::SetLocalStorage => execute_set_local_storage(self, ctx, action),
            ActionKind::GetLocalStorage => execute_get_local_storage(self, ctx, action),
            ActionKind::ClearLocalStorage => execute_clear_local_storage(self, ctx, action),
            ActionKind::SetCookie => execute_set_cookie(self, ctx, action),
            ActionKind::GetCookie => execute_get_cookie(self, ctx, action),
            ActionKind::ClearCookies => execute_clear_cookies(self, ctx, action),
            ActionKind::CopyToClipboard => execute_copy_to_clipboard(self, ctx, action).await,
            ActionKind::PasteFromClipboard => execute_paste_from_clipboard(self, ctx, action).await,
            ActionKind::Upload => execute_upload(self, ctx, action),
            ActionKind::Evaluate => execute_evaluate(self, ctx, action),
            ActionKind::AddListItem => execute_add_list_item(self, ctx, action),
            ActionKind::RemoveListItem => execute_remove_list_item(self, ctx, action),
            ActionKind::EditListItem => execute_edit_list_item(self, ctx, action),
            ActionKind::SetContent => execute_set_content(self, ctx, action),
            ActionKind::AppendContent => execute_append_content(self, ctx, action),
            ActionKind::PrependContent => execute_prepend_content(self, ctx, action),
            ActionKind::InsertHtml => execute_insert_html(self, ctx, action),
            ActionKind::Unknown(name) => Err(ActionError::Unsupported(name.clone())),
        }
    }

    /// Strictly ordered, paced, never stops early. `Err` entries are results
    /// decided before execution.
    async fn run_sequence<'a, I>(&self, entries: I) -> BatchActionResult
    where
        I: ExactSizeIterator<Item = Result<&'a PageAction, ActionResult>> + Send,
    {
        info!(count = entries.len(), "Executing action batch");
        let mut results = Vec::with_capacity(entries.len());
        for (index, entry) in entries.enumerate() {
            if index > 0 {
                pause(self.pacing.batch_delay).await;
            }
            let result = match entry {
                Ok(action) => self.execute_action(action).await,
                Err(rejected) => {
                    warn!(index, message = %rejected.message, "batch entry rejected");
                    rejected
                }
            };
            results.push(result);
        }
        let batch = BatchActionResult::from_results(results);
        info!(success = batch.success, summary = %batch.summary, "Batch completed");
        batch
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[async_trait]
impl ActionExecutor for DefaultActionExecutor {
    async fn execute_action(&self, action: &PageAction) -> ActionResult {
        let ctx = ExecCtx::new(action.action.clone());
        info!(
            action_id = %ctx.action_id,
            action = %action.action,
            "Executing action"
        );

        let outcome = AssertUnwindSafe(self.dispatch(&ctx, action))
            .catch_unwind()
            .await;
        let latency_ms = ctx.latency_ms();

        match outcome {
            Ok(Ok(result)) => {
                info!(
                    action_id = %ctx.action_id,
                    latency_ms = latency_ms,
                    "Action completed successfully"
                );
                result
            }
            Ok(Err(err)) => {
                warn!(
                    action_id = %ctx.action_id,
                    latency_ms = latency_ms,
                    code = %err.code(),
                    error = %err,
                    "Action failed"
                );
                ActionResult::failure(err.code(), err.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(
                    action_id = %ctx.action_id,
                    latency_ms = latency_ms,
                    panic = %message,
                    "Action panicked"
                );
                ActionResult::failure(
                    ErrorCode::ExecutionError,
                    format!("{} failed unexpectedly: {}", action.action, message),
                )
            }
        }
    }

    async fn execute_batch(&self, actions: &[PageAction]) -> BatchActionResult {
        self.run_sequence(actions.iter().map(Ok)).await
    }

    async fn execute_entries(&self, entries: &[BatchEntry]) -> BatchActionResult {
        self.run_sequence(entries.iter().map(|entry| match entry {
            BatchEntry::Action(action) => Ok(action),
            BatchEntry::Malformed { action, reason } => Err(ActionResult::failure(
                ErrorCode::ExecutionError,
                format!(
                    "invalid {} action: {}",
                    action.as_deref().unwrap_or("unnamed"),
                    reason
                ),
            )),
        }))
        .await
    }

    fn clear_all_styles(&self) -> usize {
        let mut doc = self.document.lock();
        match clear_marks(&mut doc) {
            Ok(removed) => {
                info!(removed, "cleared highlight and underline marks");
                removed
            }
            Err(err) => {
                warn!(error = %err, "clearing marks stopped early");
                0
            }
        }
    }
}
