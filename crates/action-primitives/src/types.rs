//! Core data types for action execution

use std::time::Instant;

use chrono::{DateTime, Utc};
use pagepilot_core_types::{ActionId, ActionKind};

/// Execution context for one action
///
/// Carries the correlation id used in every log line of the action and the
/// clock used to report latency.
#[derive(Debug, Clone)]
pub struct ExecCtx {
    /// Unique identifier for this action
    pub action_id: ActionId,

    /// Action being executed
    pub action: ActionKind,

    /// Wall-clock start, for reports
    pub started_at: DateTime<Utc>,

    start_instant: Instant,
}

impl ExecCtx {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action_id: ActionId::new(),
            action,
            started_at: Utc::now(),
            start_instant: Instant::now(),
        }
    }

    pub fn latency_ms(&self) -> u64 {
        self.start_instant.elapsed().as_millis() as u64
    }
}

/// How far target resolution may go for an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetLookup {
    /// Fall back to keyword search over `target.description`.
    pub by_description: bool,
    /// Restrict the description search to this tag family.
    pub tag_hint: Option<&'static str>,
}

impl TargetLookup {
    /// Registry id and selector only.
    pub const DIRECT: TargetLookup = TargetLookup {
        by_description: false,
        tag_hint: None,
    };

    pub const fn described(tag_hint: Option<&'static str>) -> Self {
        Self {
            by_description: true,
            tag_hint,
        }
    }

    /// Resolution depth per action. Actions a planner usually aims at a
    /// visible control may fall back to the description.
    pub fn for_action(kind: &ActionKind) -> Self {
        match kind {
            ActionKind::Fill | ActionKind::Type => Self::described(Some("input")),
            ActionKind::Select => Self::described(Some("select")),
            ActionKind::Check => Self::described(Some("input")),
            ActionKind::Click
            | ActionKind::DoubleClick
            | ActionKind::RightClick
            | ActionKind::Hover
            | ActionKind::Focus
            | ActionKind::Read
            | ActionKind::ScrollIntoView => Self::described(None),
            _ => Self::DIRECT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_fallback_is_limited_to_pointer_and_form_actions() {
        assert_eq!(
            TargetLookup::for_action(&ActionKind::Fill),
            TargetLookup::described(Some("input"))
        );
        assert!(TargetLookup::for_action(&ActionKind::Hover).by_description);
        assert_eq!(TargetLookup::for_action(&ActionKind::SetContent), TargetLookup::DIRECT);
        assert_eq!(
            TargetLookup::for_action(&ActionKind::Unknown("x".into())),
            TargetLookup::DIRECT
        );
    }

    #[test]
    fn action_ids_are_unique() {
        let a = ExecCtx::new(ActionKind::Click);
        let b = ExecCtx::new(ActionKind::Click);
        assert_ne!(a.action_id, b.action_id);
    }
}
