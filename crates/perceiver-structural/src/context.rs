use std::sync::Arc;

use tracing::debug;

use pagepilot_core_types::{CompactElement, MoreElementsRequest, PageContext, ViewportInfo};
use pagepilot_dom_adapter::Document;
use pagepilot_policy_center::AgentPolicy;

use crate::api::StructuralPerceiver;
use crate::describer::{describe, to_compact};
use crate::filter::{keyword_hits, rank, score_elements};
use crate::registry::{CollectedElement, ElementRegistry};
use crate::regions::{in_region, matches_type};

/// Registry + describer + filter, producing the agent payloads.
pub struct ContextAssembler {
    registry: Arc<ElementRegistry>,
}

impl ContextAssembler {
    pub fn new(registry: Arc<ElementRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ElementRegistry> {
        &self.registry
    }

    fn compact(
        doc: &Document,
        entry: &CollectedElement,
        policy: &AgentPolicy,
    ) -> CompactElement {
        let desc = describe(doc, entry.node, &entry.element, &policy.collection);
        to_compact(&entry.element, desc)
    }
}

impl StructuralPerceiver for ContextAssembler {
    fn page_context(&self, doc: &Document, message: &str, policy: &AgentPolicy) -> PageContext {
        let collected = self.registry.collect(doc, &policy.collection);
        let total_elements = collected.len();
        let ranked = rank(
            score_elements(doc, &collected, message, policy),
            policy.filter.max_elements,
        );
        let elements = ranked
            .iter()
            .map(|scored| {
                let desc = describe(doc, scored.node, &scored.element, &policy.collection);
                to_compact(&scored.element, desc)
            })
            .collect::<Vec<_>>();
        debug!(
            total = total_elements,
            returned = elements.len(),
            "page context assembled"
        );

        let window = doc.window();
        PageContext {
            url: window.location().to_string(),
            title: doc.title(),
            elements,
            selected_text: doc.selected_text().filter(|t| !t.trim().is_empty()),
            viewport: ViewportInfo {
                width: window.viewport_width,
                height: window.viewport_height,
                scroll_y: window.scroll_y,
            },
            total_elements,
        }
    }

    fn more_elements(
        &self,
        doc: &Document,
        request: &MoreElementsRequest,
        policy: &AgentPolicy,
    ) -> Vec<CompactElement> {
        let collected = self.registry.collect(doc, &policy.collection);
        let keyword = request
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| vec![k.to_lowercase()]);

        let selected: Vec<CompactElement> = collected
            .iter()
            .filter(|entry| {
                request
                    .region
                    .map_or(true, |region| in_region(doc, entry, region, &policy.regions))
            })
            .filter(|entry| {
                request
                    .element_type
                    .map_or(true, |filter| matches_type(doc, entry.node, filter))
            })
            .filter(|entry| {
                keyword
                    .as_ref()
                    .map_or(true, |k| keyword_hits(&entry.element, k) > 0)
            })
            .map(|entry| Self::compact(doc, entry, policy))
            .collect();
        debug!(
            collected = collected.len(),
            returned = selected.len(),
            region = ?request.region,
            element_type = ?request.element_type,
            "more elements served"
        );
        selected
    }
}
