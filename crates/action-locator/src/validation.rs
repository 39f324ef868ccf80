//! Advisory check that a re-found element is the one previously seen.

use pagepilot_core_types::PageElement;
use pagepilot_dom_adapter::{Document, NodeId};
use pagepilot_perceiver_structural::describer::{associated_label, element_text};
use pagepilot_policy_center::LocatorPolicy;

use crate::types::ValidationReport;

const TAG_WEIGHT: u8 = 20;
const TYPE_WEIGHT: u8 = 15;
const TEXT_WEIGHT: u8 = 20;
const PLACEHOLDER_WEIGHT: u8 = 15;
const LABEL_WEIGHT: u8 = 15;
const ARIA_WEIGHT: u8 = 10;
const PROXIMITY_WEIGHT: u8 = 5;

/// Weighted checklist against the expected snapshot; `valid` at or above the
/// configured confidence.
pub fn validate_element(
    doc: &Document,
    candidate: NodeId,
    expected: &PageElement,
    policy: &LocatorPolicy,
) -> ValidationReport {
    let mut confidence: u8 = 0;
    let mut matched: Vec<&str> = Vec::new();
    let mut check = |hit: bool, weight: u8, what: &'static str| {
        if hit {
            confidence = confidence.saturating_add(weight);
            matched.push(what);
        }
    };

    check(doc.tag(candidate) == Some(expected.tag.as_str()), TAG_WEIGHT, "tag");
    if let Some(expected_type) = &expected.input_type {
        check(
            doc.input_type(candidate).as_deref() == Some(expected_type.as_str()),
            TYPE_WEIGHT,
            "type",
        );
    }
    if let Some(text) = expected.text.as_deref().filter(|t| !t.is_empty()) {
        let actual = element_text(doc, candidate).unwrap_or_else(|| doc.normalized_text(candidate));
        check(actual.contains(text), TEXT_WEIGHT, "text");
    }
    if let Some(placeholder) = &expected.placeholder {
        check(
            doc.attr(candidate, "placeholder").map(str::trim) == Some(placeholder.as_str()),
            PLACEHOLDER_WEIGHT,
            "placeholder",
        );
    }
    if let Some(label) = expected.label.as_deref().filter(|l| !l.is_empty()) {
        check(
            associated_label(doc, candidate).is_some_and(|actual| actual.contains(label)),
            LABEL_WEIGHT,
            "label",
        );
    }
    if let Some(aria) = &expected.aria_label {
        check(
            doc.attr(candidate, "aria-label").map(str::trim) == Some(aria.as_str()),
            ARIA_WEIGHT,
            "aria-label",
        );
    }
    let rect = doc.bounding_rect(candidate);
    let distance = (rect.x - expected.rect.x).hypot(rect.y - expected.rect.y);
    check(distance < policy.proximity_px, PROXIMITY_WEIGHT, "position");

    let confidence = confidence.min(100);
    let reason = if matched.is_empty() {
        "no attribute matched".to_string()
    } else {
        format!("matched {}", matched.join(", "))
    };
    ValidationReport {
        valid: confidence >= policy.valid_confidence,
        confidence,
        reason,
    }
}
