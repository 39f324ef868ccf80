//! Target resolution: registry id, re-location, selector, description.

use std::sync::Arc;

use pagepilot_action_locator::{ElementResolver, LocateRequest, ResolutionSource};
use pagepilot_core_types::ActionTarget;
use pagepilot_dom_adapter::{Document, NodeId};
use pagepilot_perceiver_structural::ElementRegistry;
use tracing::{debug, warn};

use crate::errors::ActionError;
use crate::types::TargetLookup;

/// Which step of the chain produced the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedVia {
    Registry,
    Relocated(ResolutionSource),
    Selector,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub node: NodeId,
    pub via: ResolvedVia,
    /// Validation confidence when the node was re-located.
    pub confidence: Option<u8>,
}

impl ResolvedTarget {
    fn new(node: NodeId, via: ResolvedVia) -> Self {
        Self {
            node,
            via,
            confidence: None,
        }
    }
}

/// Turns an [`ActionTarget`] into a live node.
pub trait TargetResolver: Send + Sync {
    fn resolve(
        &self,
        doc: &Document,
        target: &ActionTarget,
        lookup: TargetLookup,
    ) -> Result<ResolvedTarget, ActionError>;
}

/// Registry-backed resolver with stable-locator fallback for stale ids.
pub struct DefaultTargetResolver {
    registry: Arc<ElementRegistry>,
    locator: Arc<dyn ElementResolver>,
}

impl DefaultTargetResolver {
    pub fn new(registry: Arc<ElementRegistry>, locator: Arc<dyn ElementResolver>) -> Self {
        Self { registry, locator }
    }

    pub fn registry(&self) -> &Arc<ElementRegistry> {
        &self.registry
    }

    fn by_id(
        &self,
        doc: &Document,
        target: &ActionTarget,
        lookup: TargetLookup,
    ) -> Option<ResolvedTarget> {
        let id = target.element_id.as_ref()?;
        match self.registry.resolve(doc, id) {
            Ok(node) => return Some(ResolvedTarget::new(node, ResolvedVia::Registry)),
            Err(err) => debug!(id = %id, error = %err, "registry lookup missed"),
        }

        let last_known = self.registry.last_known(id)?;
        let description = target
            .description
            .as_deref()
            .filter(|_| lookup.by_description);
        let request = LocateRequest {
            snapshot: &last_known.element,
            previous: Some(last_known.node),
            description,
        };
        match self.locator.smart_locate(doc, &request) {
            Ok(result) => {
                let confidence = result.confidence();
                if let Some(report) = result.validation.as_ref().filter(|v| !v.valid) {
                    // A stale id must never stand in for a different element.
                    warn!(
                        id = %id,
                        confidence,
                        reason = %report.reason,
                        "re-located element failed validation, rejected"
                    );
                    return None;
                }
                Some(ResolvedTarget {
                    node: result.node,
                    via: ResolvedVia::Relocated(result.source),
                    confidence: Some(confidence),
                })
            }
            Err(err) => {
                debug!(id = %id, error = %err, "stale id could not be re-located");
                None
            }
        }
    }

    fn by_selector(&self, doc: &Document, selector: &str) -> Option<ResolvedTarget> {
        match doc.query_selector(selector) {
            Ok(found) => found.map(|node| ResolvedTarget::new(node, ResolvedVia::Selector)),
            Err(err) => {
                warn!(selector, error = %err, "target selector rejected");
                None
            }
        }
    }
}

impl TargetResolver for DefaultTargetResolver {
    fn resolve(
        &self,
        doc: &Document,
        target: &ActionTarget,
        lookup: TargetLookup,
    ) -> Result<ResolvedTarget, ActionError> {
        if let Some(resolved) = self.by_id(doc, target, lookup) {
            return Ok(resolved);
        }
        if let Some(resolved) = target
            .selector
            .as_deref()
            .and_then(|selector| self.by_selector(doc, selector))
        {
            return Ok(resolved);
        }
        if lookup.by_description {
            if let Some(node) = target
                .description
                .as_deref()
                .and_then(|d| self.locator.find_by_description(doc, d, lookup.tag_hint))
            {
                debug!("target resolved by description");
                return Ok(ResolvedTarget::new(node, ResolvedVia::Description));
            }
        }
        Err(ActionError::ElementNotFound(describe_target(target)))
    }
}

/// Human-readable summary of a target for messages.
pub fn describe_target(target: &ActionTarget) -> String {
    if let Some(id) = &target.element_id {
        return id.to_string();
    }
    if let Some(selector) = &target.selector {
        return selector.clone();
    }
    if let Some(description) = &target.description {
        return format!("{:?}", description);
    }
    "no target given".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagepilot_action_locator::DefaultElementResolver;
    use pagepilot_policy_center::default_policy;

    fn resolver() -> DefaultTargetResolver {
        DefaultTargetResolver::new(
            Arc::new(ElementRegistry::new()),
            Arc::new(DefaultElementResolver::new(default_policy())),
        )
    }

    #[test]
    fn registry_id_wins_over_selector() {
        let doc = Document::parse(r#"<input placeholder="Email"><button id="go">Go</button>"#).unwrap();
        let r = resolver();
        let collected = r.registry().collect(&doc, &default_policy().collection);
        let input = &collected[0];
        let target = ActionTarget {
            element_id: Some(input.element.id.clone()),
            selector: Some("#go".into()),
            description: None,
        };
        let resolved = r.resolve(&doc, &target, TargetLookup::DIRECT).unwrap();
        assert_eq!(resolved.node, input.node);
        assert_eq!(resolved.via, ResolvedVia::Registry);
    }

    #[test]
    fn stale_id_is_relocated_from_its_snapshot() {
        let mut doc =
            Document::parse(r#"<div id="app"><input placeholder="Email"></div>"#).unwrap();
        let r = resolver();
        let id = r.registry().collect(&doc, &default_policy().collection)[0]
            .element
            .id
            .clone();
        let app = doc.get_element_by_id("app").unwrap();
        doc.set_inner_html(app, r#"<input placeholder="Email">"#).unwrap();

        let resolved = r
            .resolve(&doc, &ActionTarget::element(id.as_str()), TargetLookup::DIRECT)
            .unwrap();
        assert!(matches!(resolved.via, ResolvedVia::Relocated(_)));
        assert!(doc.is_connected(resolved.node));
    }

    #[test]
    fn stale_id_never_lands_on_a_lookalike() {
        let mut doc = Document::parse(
            r#"<div id="app"><button>Save</button><button>Save draft</button></div>"#,
        )
        .unwrap();
        let r = resolver();
        let save = doc.query_selector("button").unwrap().unwrap();
        let id = r
            .registry()
            .collect(&doc, &default_policy().collection)
            .into_iter()
            .find(|c| c.node == save)
            .expect("save collected")
            .element
            .id;
        let app = doc.get_element_by_id("app").unwrap();
        doc.set_inner_html(app, "<button>Save draft</button>").unwrap();

        let err = r
            .resolve(&doc, &ActionTarget::element(id.as_str()), TargetLookup::DIRECT)
            .unwrap_err();
        assert_eq!(err.code(), pagepilot_core_types::ErrorCode::ElementNotFound);
    }

    #[test]
    fn description_only_when_allowed() {
        let doc = Document::parse("<button>Place order</button>").unwrap();
        let r = resolver();
        let target = ActionTarget {
            description: Some("place order button".into()),
            ..Default::default()
        };
        assert!(matches!(
            r.resolve(&doc, &target, TargetLookup::DIRECT),
            Err(ActionError::ElementNotFound(_))
        ));
        let resolved = r
            .resolve(&doc, &target, TargetLookup::described(Some("button")))
            .unwrap();
        assert_eq!(resolved.via, ResolvedVia::Description);
    }

    #[test]
    fn unknown_id_and_bad_selector_fail_as_not_found() {
        let doc = Document::parse("<p>x</p>").unwrap();
        let target = ActionTarget {
            element_id: Some("e_999999".into()),
            selector: Some("p[[".into()),
            description: None,
        };
        let err = resolver().resolve(&doc, &target, TargetLookup::DIRECT).unwrap_err();
        assert_eq!(err.code(), pagepilot_core_types::ErrorCode::ElementNotFound);
    }
}
