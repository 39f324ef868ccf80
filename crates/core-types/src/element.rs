//! Element snapshots and the compact page context sent to the agent.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{parse_wire_token, ElementId, WireError};

/// Viewport-relative bounding box in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether the top-left corner lies within `self` (edges inclusive).
    pub fn contains_origin_of(&self, other: &Rect) -> bool {
        other.x >= self.x && other.x <= self.right() && other.y >= self.y && other.y <= self.bottom()
    }
}

/// Best-effort surroundings of an element, used to tell similar controls apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub near_elements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_chain: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_label: Option<String>,
}

impl ElementContext {
    pub fn is_empty(&self) -> bool {
        self.section_title.is_none()
            && self.form_title.is_none()
            && self.near_elements.is_empty()
            && self.parent_chain.is_empty()
            && self.row_label.is_none()
    }
}

/// Descriptive snapshot of one interactive element, created once per
/// collection pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub id: ElementId,
    pub tag: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub rect: Rect,
    pub visible: bool,
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ElementContext>,
}

impl PageElement {
    pub fn new(id: ElementId, tag: impl Into<String>, rect: Rect) -> Self {
        Self {
            id,
            tag: tag.into(),
            input_type: None,
            text: None,
            placeholder: None,
            label: None,
            aria_label: None,
            name: None,
            value: None,
            rect,
            visible: true,
            disabled: false,
            context: None,
        }
    }

    /// Concatenation of the textual fields a keyword can match against.
    pub fn searchable_text(&self) -> String {
        [
            self.text.as_deref(),
            self.placeholder.as_deref(),
            self.label.as_deref(),
            self.aria_label.as_deref(),
            self.name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }
}

/// Token-economical projection of a [`PageElement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactElement {
    pub id: ElementId,
    pub desc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctx: Option<CompactContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompactContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearby: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl CompactContext {
    pub fn is_empty(&self) -> bool {
        self.section.is_none() && self.nearby.is_none() && self.path.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportInfo {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

/// Agent-facing payload for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub url: String,
    pub title: String,
    pub elements: Vec<CompactElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    pub viewport: ViewportInfo,
    /// Number of interactive elements collected before relevance filtering.
    pub total_elements: usize,
}

/// Page region used to scope a follow-up element request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Form,
    Header,
    Sidebar,
    Footer,
    BelowViewport,
    TabPanel,
    Modal,
    Menu,
}

impl FromStr for Region {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_wire_token("region", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementTypeFilter {
    Input,
    Button,
    Link,
    Select,
    Tab,
    #[serde(alias = "menu-item", alias = "menu_item")]
    Menu,
    #[serde(alias = "list-item", alias = "list_item")]
    List,
    Radio,
    Checkbox,
    All,
}

impl FromStr for ElementTypeFilter {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_wire_token("element type", s)
    }
}

/// Parameters of a "give me more elements" request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoreElementsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementTypeFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}
