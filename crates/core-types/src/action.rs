//! Agent-issued action commands.
//!
//! The action names and parameter keys are the contract with existing
//! planners, so every wire name here is fixed.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ElementId;

macro_rules! action_kinds {
    ($($variant:ident => $wire:literal),+ $(,)?) => {
        /// Closed action vocabulary. Unrecognised names are kept verbatim in
        /// [`ActionKind::Unknown`] so the executor can reject them as a result
        /// instead of failing deserialization of the whole batch.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum ActionKind {
            $($variant,)+
            Unknown(String),
        }

        impl ActionKind {
            pub const KNOWN: &'static [ActionKind] = &[$(ActionKind::$variant),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $(ActionKind::$variant => $wire,)+
                    ActionKind::Unknown(name) => name.as_str(),
                }
            }
        }

        impl From<String> for ActionKind {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($wire => ActionKind::$variant,)+
                    _ => ActionKind::Unknown(value),
                }
            }
        }
    };
}

action_kinds! {
    Fill => "fill",
    Click => "click",
    DoubleClick => "doubleClick",
    RightClick => "rightClick",
    Highlight => "highlight",
    Underline => "underline",
    Select => "select",
    SelectText => "selectText",
    Check => "check",
    Scroll => "scroll",
    Read => "read",
    Hover => "hover",
    Type => "type",
    Press => "press",
    Drag => "drag",
    Wait => "wait",
    Focus => "focus",
    Blur => "blur",
    Clear => "clear",
    GetAttribute => "getAttribute",
    GetProperty => "getProperty",
    Navigate => "navigate",
    ScrollIntoView => "scrollIntoView",
    SwitchFrame => "switchFrame",
    HandleDialog => "handleDialog",
    SetLocalStorage => "setLocalStorage",
    GetLocalStorage => "getLocalStorage",
    ClearLocalStorage => "clearLocalStorage",
    SetCookie => "setCookie",
    GetCookie => "getCookie",
    ClearCookies => "clearCookies",
    CopyToClipboard => "copyToClipboard",
    PasteFromClipboard => "pasteFromClipboard",
    Upload => "upload",
    Evaluate => "evaluate",
    AddListItem => "addListItem",
    RemoveListItem => "removeListItem",
    EditListItem => "editListItem",
    SetContent => "setContent",
    AppendContent => "appendContent",
    PrependContent => "prependContent",
    InsertHtml => "insertHTML",
}

impl From<ActionKind> for String {
    fn from(value: ActionKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an action should land. `description` is advisory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ActionTarget {
    pub fn element(id: impl Into<String>) -> Self {
        Self {
            element_id: Some(ElementId::new(id)),
            ..Default::default()
        }
    }

    pub fn selector(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.element_id.is_none() && self.selector.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    #[default]
    Down,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitCondition {
    #[default]
    Visible,
    Hidden,
    Exists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Start,
    #[default]
    Center,
    End,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigateAction {
    #[default]
    Goto,
    Back,
    Forward,
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogAction {
    #[default]
    Accept,
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListPosition {
    Before,
    After,
    First,
    #[default]
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    BeforeBegin,
    AfterBegin,
    #[default]
    BeforeEnd,
    AfterEnd,
}

impl InsertPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertPosition::BeforeBegin => "beforebegin",
            InsertPosition::AfterBegin => "afterbegin",
            InsertPosition::BeforeEnd => "beforeend",
            InsertPosition::AfterEnd => "afterend",
        }
    }
}

/// Drag destination: a selector or explicit viewport coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CookieOptions {
    /// Lifetime in seconds from now.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
}

/// File payload for `upload`; `content` is base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadFile {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub content: String,
}

/// Action-specific payload. Every field is optional; each action reads the
/// keys it needs and reports a `NO_*` code when a required one is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionParams {
    #[serde(default, deserialize_with = "string_like", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<ScrollDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<WaitCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<ScrollBehavior>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<ScrollBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate_action: Option<NavigateAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_action: Option<DialogAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_options: Option<CookieOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<UploadFile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ListPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_position: Option<InsertPosition>,
}

/// One agent-issued command, consumed exactly once by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAction {
    pub action: ActionKind,
    #[serde(default)]
    pub target: ActionTarget,
    #[serde(default)]
    pub params: ActionParams,
}

impl PageAction {
    pub fn new(action: ActionKind, target: ActionTarget) -> Self {
        Self {
            action,
            target,
            params: ActionParams::default(),
        }
    }

    pub fn with_params(mut self, params: ActionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.params.value = Some(value.into());
        self
    }
}

/// One element of an incoming batch.
///
/// Decoding an entry never fails: an object that does not fit the action
/// schema (a bad enum value, a fractional timeout) is kept as `Malformed` so
/// the batch still produces one result per element.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    Action(PageAction),
    Malformed {
        /// Action name, when the entry carried a readable one
        action: Option<String>,
        reason: String,
    },
}

impl BatchEntry {
    pub fn from_value(value: serde_json::Value) -> Self {
        let name = value
            .get("action")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        match serde_json::from_value::<PageAction>(value) {
            Ok(action) => BatchEntry::Action(action),
            Err(err) => BatchEntry::Malformed {
                action: name,
                reason: err.to_string(),
            },
        }
    }

    pub fn action(&self) -> Option<&PageAction> {
        match self {
            BatchEntry::Action(action) => Some(action),
            BatchEntry::Malformed { .. } => None,
        }
    }
}

impl From<PageAction> for BatchEntry {
    fn from(action: PageAction) -> Self {
        BatchEntry::Action(action)
    }
}

impl<'de> Deserialize<'de> for BatchEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(BatchEntry::from_value)
    }
}

/// Planners occasionally send numbers or booleans where a string is expected.
fn string_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_action_names_round_trip_through_wire_strings() {
        for kind in ActionKind::KNOWN {
            let wire = serde_json::to_string(kind).unwrap();
            let back: ActionKind = serde_json::from_str(&wire).unwrap();
            assert_eq!(&back, kind);
        }
        assert_eq!(ActionKind::KNOWN.len(), 42);
    }

    #[test]
    fn unknown_action_is_preserved() {
        let action: PageAction =
            serde_json::from_str(r#"{"action":"teleport","target":{}}"#).unwrap();
        assert_eq!(action.action, ActionKind::Unknown("teleport".into()));
        assert_eq!(action.action.as_str(), "teleport");
    }

    #[test]
    fn params_use_camel_case_and_accept_numeric_values() {
        let action: PageAction = serde_json::from_str(
            r##"{
                "action": "insertHTML",
                "target": {"elementId": "e_3", "selector": "#list"},
                "params": {"value": 42, "insertPosition": "afterbegin", "cookieOptions": {"expires": 60}, "navigateAction": "back"}
            }"##,
        )
        .unwrap();
        assert_eq!(action.action, ActionKind::InsertHtml);
        assert_eq!(action.target.element_id, Some(ElementId::new("e_3")));
        assert_eq!(action.params.value.as_deref(), Some("42"));
        assert_eq!(action.params.insert_position, Some(InsertPosition::AfterBegin));
        assert_eq!(action.params.cookie_options.unwrap().expires, Some(60));
        assert_eq!(action.params.navigate_action, Some(NavigateAction::Back));
    }

    #[test]
    fn bad_param_spoils_only_its_own_entry() {
        let entries: Vec<BatchEntry> = serde_json::from_str(
            r##"[
                {"action": "click", "target": {"selector": "#go"}},
                {"action": "scroll", "params": {"direction": "left"}},
                {"action": "wait", "params": {"timeout": 1500.5}}
            ]"##,
        )
        .unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].action().map(|a| &a.action), Some(&ActionKind::Click));
        match &entries[1] {
            BatchEntry::Malformed { action, reason } => {
                assert_eq!(action.as_deref(), Some("scroll"));
                assert!(reason.contains("left"), "{}", reason);
            }
            other => panic!("expected malformed entry, got {:?}", other),
        }
        assert!(entries[2].action().is_none());
    }

    #[test]
    fn target_defaults_when_missing() {
        let action: PageAction = serde_json::from_str(r#"{"action":"scroll"}"#).unwrap();
        assert!(action.target.is_empty());
        assert_eq!(action.params, ActionParams::default());
    }
}
