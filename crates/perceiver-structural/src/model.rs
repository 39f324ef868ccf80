use serde::Serialize;

use pagepilot_core_types::PageElement;
use pagepilot_dom_adapter::NodeId;

/// Coarse element class used for ranking weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementCategory {
    Form,
    Button,
    Tab,
    Menu,
    List,
    Link,
    Text,
}

/// Where an element sits relative to the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportClass {
    Visible,
    Near,
    Hidden,
}

/// A collected element with its ranking inputs and outcome.
#[derive(Clone, Debug, Serialize)]
pub struct ScoredElement {
    #[serde(skip)]
    pub node: NodeId,
    pub element: PageElement,
    pub category: ElementCategory,
    pub viewport: ViewportClass,
    pub score: i32,
}
