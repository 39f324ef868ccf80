use pagepilot_core_types::{CompactElement, MoreElementsRequest, PageContext};
use pagepilot_dom_adapter::Document;
use pagepilot_policy_center::AgentPolicy;

/// Page-side perception entry points handed to the agent runtime.
///
/// Both calls run a fresh collection pass and so invalidate every element id
/// issued before them.
pub trait StructuralPerceiver: Send + Sync {
    fn page_context(&self, doc: &Document, message: &str, policy: &AgentPolicy) -> PageContext;

    fn more_elements(
        &self,
        doc: &Document,
        request: &MoreElementsRequest,
        policy: &AgentPolicy,
    ) -> Vec<CompactElement>;
}
