//! Core types for the locator system

use pagepilot_dom_adapter::NodeId;
use serde::{Deserialize, Serialize};

/// Kind of identity-independent locator, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorKind {
    Role,
    Label,
    Text,
    Placeholder,
    AriaLabel,
    Name,
    Selector,
}

impl LocatorKind {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            LocatorKind::Role => "role",
            LocatorKind::Label => "label",
            LocatorKind::Text => "text",
            LocatorKind::Placeholder => "placeholder",
            LocatorKind::AriaLabel => "aria-label",
            LocatorKind::Name => "name",
            LocatorKind::Selector => "selector",
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            LocatorKind::Role => 10,
            LocatorKind::Label => 9,
            LocatorKind::Text => 8,
            LocatorKind::Placeholder => 7,
            LocatorKind::AriaLabel => 6,
            LocatorKind::Name => 5,
            LocatorKind::Selector => 4,
        }
    }

    /// Whether the strategy refuses to pick among several matches.
    pub fn requires_unique(&self) -> bool {
        matches!(
            self,
            LocatorKind::Role | LocatorKind::AriaLabel | LocatorKind::Name
        )
    }
}

/// One way of re-finding an element, e.g. `{priority: 7, type: placeholder, value: "Email"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorStrategy {
    pub priority: u8,
    #[serde(rename = "type")]
    pub kind: LocatorKind,
    pub value: String,
}

impl LocatorStrategy {
    pub fn new(kind: LocatorKind, value: impl Into<String>) -> Self {
        Self {
            priority: kind.priority(),
            kind,
            value: value.into(),
        }
    }
}

/// Advisory comparison of a candidate against the last known snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// 0-100
    pub confidence: u8,
    pub reason: String,
}

/// How an element was found again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "via", content = "strategy")]
pub enum ResolutionSource {
    /// The previously held node is still attached.
    Attached,
    /// Keyword search over a free-text description.
    Description,
    Locator(LocatorKind),
}

impl ResolutionSource {
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionSource::Attached => "attached",
            ResolutionSource::Description => "description",
            ResolutionSource::Locator(kind) => kind.name(),
        }
    }
}

/// Element resolution result
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub node: NodeId,
    pub source: ResolutionSource,
    pub validation: Option<ValidationReport>,
}

impl ResolutionResult {
    pub fn new(node: NodeId, source: ResolutionSource) -> Self {
        Self {
            node,
            source,
            validation: None,
        }
    }

    pub fn with_validation(mut self, report: ValidationReport) -> Self {
        self.validation = Some(report);
        self
    }

    /// Confidence of the match; attached nodes are certain.
    pub fn confidence(&self) -> u8 {
        match (&self.source, &self.validation) {
            (ResolutionSource::Attached, _) => 100,
            (_, Some(report)) => report.confidence,
            (_, None) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_serializes_with_type_field() {
        let strategy = LocatorStrategy::new(LocatorKind::AriaLabel, "Close");
        let json = serde_json::to_value(&strategy).unwrap();
        assert_eq!(json["type"], "aria-label");
        assert_eq!(json["priority"], 6);
    }

    #[test]
    fn priorities_descend_in_declaration_order() {
        let kinds = [
            LocatorKind::Role,
            LocatorKind::Label,
            LocatorKind::Text,
            LocatorKind::Placeholder,
            LocatorKind::AriaLabel,
            LocatorKind::Name,
            LocatorKind::Selector,
        ];
        assert!(kinds.windows(2).all(|w| w[0].priority() > w[1].priority()));
    }
}
