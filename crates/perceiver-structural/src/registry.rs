//! Id → node mapping for one collection pass.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use pagepilot_core_types::{ElementId, PageElement};
use pagepilot_dom_adapter::{Document, NodeId};
use pagepilot_policy_center::CollectionPolicy;

use crate::collector::{interactive_candidates, is_element_visible};
use crate::describer::snapshot;
use crate::errors::RegistryError;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// How many superseded passes stay available for stable-locator fallback.
const RETIRED_PASSES: usize = 3;

fn next_element_id() -> ElementId {
    ElementId::new(format!("e_{}", NEXT_ID.fetch_add(1, Ordering::Relaxed)))
}

/// One registered element: the live node and its snapshot.
#[derive(Clone, Debug)]
pub struct CollectedElement {
    pub node: NodeId,
    pub element: PageElement,
}

#[derive(Default)]
struct RegistryState {
    pass: u64,
    current: HashMap<ElementId, CollectedElement>,
    retired: VecDeque<HashMap<ElementId, CollectedElement>>,
}

/// Injected registry; every `collect` supersedes the previous pass.
#[derive(Default)]
pub struct ElementRegistry {
    state: RwLock<RegistryState>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the document, register every visible candidate under a fresh id.
    pub fn collect(&self, doc: &Document, policy: &CollectionPolicy) -> Vec<CollectedElement> {
        let candidates = interactive_candidates(doc);
        let collected: Vec<CollectedElement> = candidates
            .iter()
            .copied()
            .filter(|node| is_element_visible(doc, *node))
            .map(|node| CollectedElement {
                node,
                element: snapshot(doc, node, next_element_id(), policy),
            })
            .collect();

        let mut state = self.state.write();
        let superseded = std::mem::take(&mut state.current);
        if !superseded.is_empty() {
            state.retired.push_front(superseded);
            state.retired.truncate(RETIRED_PASSES);
        }
        state.current = collected
            .iter()
            .map(|entry| (entry.element.id.clone(), entry.clone()))
            .collect();
        state.pass += 1;
        debug!(
            pass = state.pass,
            candidates = candidates.len(),
            registered = collected.len(),
            "collection pass complete"
        );
        collected
    }

    /// Pure lookup in the current pass.
    pub fn resolve(&self, doc: &Document, id: &ElementId) -> Result<NodeId, RegistryError> {
        let state = self.state.read();
        let entry = state
            .current
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        if doc.is_connected(entry.node) {
            Ok(entry.node)
        } else {
            Err(RegistryError::Detached(id.to_string()))
        }
    }

    /// Snapshot of an id from the current pass.
    pub fn snapshot(&self, id: &ElementId) -> Option<PageElement> {
        self.state.read().current.get(id).map(|e| e.element.clone())
    }

    /// Last known node and snapshot of an id: the current pass first, then
    /// the retained superseded passes, newest first. Unlike `resolve`, this
    /// does not check that the node is still attached.
    pub fn last_known(&self, id: &ElementId) -> Option<CollectedElement> {
        let state = self.state.read();
        state
            .current
            .get(id)
            .or_else(|| state.retired.iter().find_map(|pass| pass.get(id)))
            .cloned()
    }

    pub fn pass(&self) -> u64 {
        self.state.read().pass
    }

    pub fn len(&self) -> usize {
        self.state.read().current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.current.clear();
        state.retired.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagepilot_policy_center::default_policy;

    fn policy() -> CollectionPolicy {
        default_policy().collection
    }

    #[test]
    fn second_pass_invalidates_first() {
        let doc = Document::parse(r#"<button>One</button><a href="/two">Two</a>"#).unwrap();
        let registry = ElementRegistry::new();
        let first = registry.collect(&doc, &policy());
        let second = registry.collect(&doc, &policy());
        assert_eq!(first.len(), 2);
        for old in &first {
            assert_eq!(
                registry.resolve(&doc, &old.element.id),
                Err(RegistryError::NotFound(old.element.id.to_string()))
            );
            assert!(second.iter().all(|new| new.element.id != old.element.id));
            assert!(registry.last_known(&old.element.id).is_some());
        }
        assert_eq!(registry.resolve(&doc, &second[0].element.id), Ok(second[0].node));
    }

    #[test]
    fn removed_node_reports_detached() {
        let mut doc = Document::parse(r#"<button id="b">Go</button>"#).unwrap();
        let registry = ElementRegistry::new();
        let collected = registry.collect(&doc, &policy());
        let id = collected[0].element.id.clone();
        doc.remove(collected[0].node).unwrap();
        assert!(matches!(
            registry.resolve(&doc, &id),
            Err(RegistryError::Detached(_))
        ));
        let last_known = registry.last_known(&id).expect("current pass entry");
        assert_eq!(last_known.node, collected[0].node);
    }

    #[test]
    fn ids_are_unique_across_registries() {
        let doc = Document::parse("<button>x</button>").unwrap();
        let a = ElementRegistry::new().collect(&doc, &policy());
        let b = ElementRegistry::new().collect(&doc, &policy());
        assert_ne!(a[0].element.id, b[0].element.id);
        assert!(a[0].element.id.as_str().starts_with("e_"));
    }

    #[test]
    fn retired_history_is_bounded() {
        let doc = Document::parse("<button>x</button>").unwrap();
        let registry = ElementRegistry::new();
        let oldest = registry.collect(&doc, &policy())[0].element.id.clone();
        for _ in 0..RETIRED_PASSES + 1 {
            registry.collect(&doc, &policy());
        }
        assert!(registry.last_known(&oldest).is_none());
        assert_eq!(registry.pass(), RETIRED_PASSES as u64 + 2);
    }
}
