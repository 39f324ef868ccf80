//! Re-finding an element after its registry id went stale.

use once_cell::sync::Lazy;
use pagepilot_core_types::PageElement;
use pagepilot_dom_adapter::{Document, NodeId, SelectorList};
use pagepilot_perceiver_structural::collector::{interactive_candidates, is_element_visible};
use pagepilot_perceiver_structural::describer::{associated_label, element_text, in_viewport};
use pagepilot_perceiver_structural::extract_keywords;
use pagepilot_policy_center::AgentPolicy;
use tracing::{debug, info, warn};

use crate::errors::LocatorError;
use crate::generator::generate_stable_locators;
use crate::strategies::locate_by_strategy;
use crate::types::{ResolutionResult, ResolutionSource};
use crate::validation::validate_element;

/// Imperative verbs that say nothing about which element is meant.
const ACTION_WORDS: &[&str] = &["click", "type", "enter", "fill", "press", "select"];
const KEYWORD_SCORE: i32 = 10;
const IN_VIEWPORT_SCORE: i32 = 5;

static TEXT_INPUTS: Lazy<Option<SelectorList>> =
    Lazy::new(|| SelectorList::parse("input, textarea, [contenteditable]").ok());
static BUTTONS: Lazy<Option<SelectorList>> = Lazy::new(|| {
    SelectorList::parse(r#"button, [role="button"], input[type="submit"], input[type="button"]"#).ok()
});
static LINKS: Lazy<Option<SelectorList>> =
    Lazy::new(|| SelectorList::parse(r#"a, [role="link"]"#).ok());

/// What is known about the element being looked for.
#[derive(Debug, Clone, Copy)]
pub struct LocateRequest<'a> {
    /// Snapshot from the pass the id was issued in.
    pub snapshot: &'a PageElement,
    /// The node the id pointed at, possibly detached by now.
    pub previous: Option<NodeId>,
    /// Free-text description supplied by the agent.
    pub description: Option<&'a str>,
}

/// Element resolver trait
pub trait ElementResolver: Send + Sync {
    fn smart_locate(
        &self,
        doc: &Document,
        request: &LocateRequest<'_>,
    ) -> Result<ResolutionResult, LocatorError>;

    /// Keyword search over visible interactive elements, optionally restricted
    /// to the tag family of `tag_hint`.
    fn find_by_description(
        &self,
        doc: &Document,
        description: &str,
        tag_hint: Option<&str>,
    ) -> Option<NodeId>;
}

/// Default element resolver implementation
pub struct DefaultElementResolver {
    policy: AgentPolicy,
}

impl DefaultElementResolver {
    pub fn new(policy: AgentPolicy) -> Self {
        Self { policy }
    }

    fn keywords(&self, description: &str) -> Vec<String> {
        let mut stop_words = self.policy.filter.stop_words.clone();
        stop_words.extend(ACTION_WORDS.iter().map(|w| w.to_string()));
        extract_keywords(description, &stop_words)
            .into_iter()
            .filter(|k| k.chars().count() > 1)
            .collect()
    }

    fn matches_tag_family(doc: &Document, node: NodeId, tag_hint: Option<&str>) -> bool {
        let family = match tag_hint {
            None => return true,
            Some("input" | "textarea") => &TEXT_INPUTS,
            Some("button") => &BUTTONS,
            Some("a") => &LINKS,
            Some(tag) => return doc.is_tag(node, tag),
        };
        family
            .as_ref()
            .map_or(true, |list| doc.matches_list(node, list))
    }
}

/// Lowercased text a description keyword can match on a live node.
pub fn live_searchable_text(doc: &Document, node: NodeId) -> String {
    [
        element_text(doc, node).or_else(|| Some(doc.normalized_text(node))),
        doc.attr_non_empty(node, "placeholder"),
        associated_label(doc, node),
        doc.attr_non_empty(node, "aria-label"),
        doc.attr_non_empty(node, "name"),
        doc.attr_non_empty(node, "title"),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

impl ElementResolver for DefaultElementResolver {
    fn smart_locate(
        &self,
        doc: &Document,
        request: &LocateRequest<'_>,
    ) -> Result<ResolutionResult, LocatorError> {
        if let Some(previous) = request.previous.filter(|n| doc.is_connected(*n)) {
            debug!("held element still attached");
            return Ok(ResolutionResult::new(previous, ResolutionSource::Attached));
        }

        let expected = request.snapshot;
        if let Some(description) = request.description {
            if let Some(node) = self.find_by_description(doc, description, Some(&expected.tag)) {
                let report = validate_element(doc, node, expected, &self.policy.locator);
                info!(confidence = report.confidence, "located by description");
                return Ok(ResolutionResult::new(node, ResolutionSource::Description)
                    .with_validation(report));
            }
        }

        let strategies = generate_stable_locators(doc, expected, request.previous);
        for strategy in &strategies {
            match locate_by_strategy(doc, strategy) {
                Ok(node) => {
                    let report = validate_element(doc, node, expected, &self.policy.locator);
                    if report.valid {
                        info!(
                            strategy = strategy.kind.name(),
                            confidence = report.confidence,
                            "element re-located"
                        );
                    } else {
                        warn!(
                            strategy = strategy.kind.name(),
                            confidence = report.confidence,
                            reason = %report.reason,
                            "low-confidence locator match"
                        );
                    }
                    return Ok(ResolutionResult::new(
                        node,
                        ResolutionSource::Locator(strategy.kind),
                    )
                    .with_validation(report));
                }
                Err(err) => {
                    debug!(strategy = strategy.kind.name(), error = %err, "strategy failed");
                }
            }
        }

        warn!(
            id = %expected.id,
            tried = strategies.len(),
            "all locator strategies exhausted"
        );
        Err(LocatorError::Exhausted(format!(
            "{} ({} strategies)",
            expected.id,
            strategies.len()
        )))
    }

    fn find_by_description(
        &self,
        doc: &Document,
        description: &str,
        tag_hint: Option<&str>,
    ) -> Option<NodeId> {
        let keywords = self.keywords(description);
        if keywords.is_empty() {
            return None;
        }
        let mut best: Option<(NodeId, i32)> = None;
        for node in interactive_candidates(doc) {
            if !Self::matches_tag_family(doc, node, tag_hint) || !is_element_visible(doc, node) {
                continue;
            }
            let haystack = live_searchable_text(doc, node);
            let hits = keywords.iter().filter(|k| haystack.contains(k.as_str())).count() as i32;
            if hits == 0 {
                continue;
            }
            let mut score = hits * KEYWORD_SCORE;
            if in_viewport(doc, &doc.bounding_rect(node)) {
                score += IN_VIEWPORT_SCORE;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((node, score));
            }
        }
        if let Some((_, score)) = best {
            debug!(description, score, "description search matched");
        }
        best.map(|(node, _)| node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagepilot_core_types::{ElementId, Rect};
    use pagepilot_policy_center::default_policy;

    fn resolver() -> DefaultElementResolver {
        DefaultElementResolver::new(default_policy())
    }

    fn snapshot_of(tag: &str) -> PageElement {
        PageElement::new(ElementId::new("e_9"), tag, Rect::new(0.0, 0.0, 100.0, 20.0))
    }

    #[test]
    fn attached_node_short_circuits() {
        let doc = Document::parse("<button>Go</button>").unwrap();
        let node = doc.query_selector("button").unwrap().unwrap();
        let snapshot = snapshot_of("button");
        let result = resolver()
            .smart_locate(
                &doc,
                &LocateRequest {
                    snapshot: &snapshot,
                    previous: Some(node),
                    description: None,
                },
            )
            .unwrap();
        assert_eq!(result.node, node);
        assert_eq!(result.source, ResolutionSource::Attached);
        assert_eq!(result.confidence(), 100);
    }

    #[test]
    fn detached_node_is_refound_by_placeholder() {
        let mut doc = Document::parse(r#"<div id="app"><input placeholder="Email"></div>"#).unwrap();
        let old = doc.query_selector("input").unwrap().unwrap();
        let app = doc.get_element_by_id("app").unwrap();
        doc.set_inner_html(app, r#"<input placeholder="Email" name="mail">"#).unwrap();
        let mut snapshot = snapshot_of("input");
        snapshot.input_type = Some("text".into());
        snapshot.placeholder = Some("Email".into());

        let result = resolver()
            .smart_locate(
                &doc,
                &LocateRequest {
                    snapshot: &snapshot,
                    previous: Some(old),
                    description: None,
                },
            )
            .unwrap();
        assert_ne!(result.node, old);
        assert_eq!(doc.attr(result.node, "name"), Some("mail"));
        assert_eq!(result.source.name(), "placeholder");
        assert!(result.validation.unwrap().valid);
    }

    #[test]
    fn description_search_respects_tag_family() {
        let doc = Document::parse(
            r#"<a href="/search">Search help</a><button>Search</button><input placeholder="Search products">"#,
        )
        .unwrap();
        let r = resolver();
        let button = r.find_by_description(&doc, "click the search button", Some("button")).unwrap();
        assert!(doc.is_tag(button, "button"));
        let input = r.find_by_description(&doc, "type into search products", Some("input")).unwrap();
        assert!(doc.is_tag(input, "input"));
        assert!(r.find_by_description(&doc, "click", None).is_none());
    }

    #[test]
    fn exhausted_strategies_fail() {
        let doc = Document::parse("<p>nothing here</p>").unwrap();
        let mut snapshot = snapshot_of("input");
        snapshot.placeholder = Some("Email".into());
        let err = resolver()
            .smart_locate(
                &doc,
                &LocateRequest {
                    snapshot: &snapshot,
                    previous: None,
                    description: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, LocatorError::Exhausted(_)));
    }
}
