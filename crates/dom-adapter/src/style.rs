//! Inline style model and the simplified layout built on top of it.
//!
//! Layout rules: an element is placed at its inline `left`/`top` (page
//! coordinates, px) or at its parent's origin when those are absent, and is
//! `width` x `height` px (default 100 x 20). Anything not rendered has an
//! empty rectangle.

use pagepilot_core_types::Rect;

use crate::document::Document;
use crate::errors::DomResult;
use crate::node::NodeId;

pub const DEFAULT_WIDTH: f64 = 100.0;
pub const DEFAULT_HEIGHT: f64 = 20.0;

const NEVER_RENDERED: &[&str] = &[
    "head", "script", "style", "template", "title", "meta", "link", "base", "noscript",
];

/// Split a `style` attribute into lowercase property names and raw values.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_string();
            if name.is_empty() {
                None
            } else {
                Some((name, value))
            }
        })
        .collect()
}

fn serialize_declarations(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(k, v)| format!("{}: {};", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a pixel length such as `120px` or `120`.
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl Document {
    pub fn inline_style(&self, id: NodeId) -> Vec<(String, String)> {
        self.attr(id, "style")
            .map(parse_declarations)
            .unwrap_or_default()
    }

    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        self.inline_style(id)
            .into_iter()
            .rev()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v)
    }

    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) -> DomResult<()> {
        let mut decls = self.inline_style(id);
        decls.retain(|(k, _)| k != property);
        decls.push((property.to_ascii_lowercase(), value.to_string()));
        self.set_attribute(id, "style", &serialize_declarations(&decls))
    }

    pub fn remove_style_property(&mut self, id: NodeId, property: &str) -> DomResult<()> {
        let mut decls = self.inline_style(id);
        let before = decls.len();
        decls.retain(|(k, _)| k != property);
        if decls.len() == before {
            return Ok(());
        }
        if decls.is_empty() {
            self.remove_attribute(id, "style")?;
            Ok(())
        } else {
            self.set_attribute(id, "style", &serialize_declarations(&decls))
        }
    }

    /// Own `display` value, resolving element defaults.
    pub fn computed_display(&self, id: NodeId) -> String {
        let Some(tag) = self.tag(id) else {
            return "none".into();
        };
        if self.has_attr(id, "hidden") || NEVER_RENDERED.contains(&tag) {
            return "none".into();
        }
        if self.input_type(id).as_deref() == Some("hidden") {
            return "none".into();
        }
        if let Some(display) = self.style_property(id, "display") {
            return display.to_ascii_lowercase();
        }
        match tag {
            "span" | "a" | "label" | "input" | "button" | "select" | "textarea" | "img" | "em"
            | "strong" | "b" | "i" | "code" | "small" => "inline".into(),
            "li" => "list-item".into(),
            _ => "block".into(),
        }
    }

    /// Inherited `visibility`.
    pub fn computed_visibility(&self, id: NodeId) -> String {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if let Some(v) = self.style_property(node, "visibility") {
                let v = v.to_ascii_lowercase();
                if v != "inherit" {
                    return v;
                }
            }
            cursor = self.parent_element(node);
        }
        "visible".into()
    }

    pub fn computed_opacity(&self, id: NodeId) -> f64 {
        self.style_property(id, "opacity")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(1.0)
    }

    /// Connected and no inclusive ancestor has `display: none`.
    pub fn is_rendered(&self, id: NodeId) -> bool {
        if !self.is_element(id) || !self.is_connected(id) {
            return false;
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .all(|node| self.computed_display(node) != "none")
    }

    /// Page-absolute rectangle.
    pub fn page_rect(&self, id: NodeId) -> Rect {
        if !self.is_rendered(id) {
            return Rect::default();
        }
        self.layout_rect(id)
    }

    fn layout_rect(&self, id: NodeId) -> Rect {
        let parent_origin = self
            .parent_element(id)
            .map(|p| {
                let rect = self.layout_rect(p);
                (rect.x, rect.y)
            })
            .unwrap_or((0.0, 0.0));
        let x = self
            .style_property(id, "left")
            .and_then(|v| parse_px(&v))
            .unwrap_or(parent_origin.0);
        let y = self
            .style_property(id, "top")
            .and_then(|v| parse_px(&v))
            .unwrap_or(parent_origin.1);
        let width = self
            .style_property(id, "width")
            .and_then(|v| parse_px(&v))
            .unwrap_or(DEFAULT_WIDTH);
        let height = self
            .style_property(id, "height")
            .and_then(|v| parse_px(&v))
            .unwrap_or(DEFAULT_HEIGHT);
        Rect::new(x, y, width.max(0.0), height.max(0.0))
    }

    /// Viewport-relative rectangle, as `getBoundingClientRect` reports it.
    pub fn bounding_rect(&self, id: NodeId) -> Rect {
        let rect = self.page_rect(id);
        if rect.is_empty() && !self.is_rendered(id) {
            return rect;
        }
        Rect::new(
            rect.x - self.window.scroll_x,
            rect.y - self.window.scroll_y,
            rect.width,
            rect.height,
        )
    }

    /// Total scrollable height: the lowest rendered edge, at least the viewport.
    pub fn document_height(&self) -> f64 {
        self.all_elements()
            .into_iter()
            .map(|n| self.page_rect(n).bottom())
            .fold(self.window.viewport_height, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declarations_parse_and_update() {
        let mut doc = Document::parse(r#"<div style="display: none; color:red !important">x</div>"#)
            .unwrap();
        let div = doc.query_selector("div").unwrap().unwrap();
        assert_eq!(doc.style_property(div, "color").as_deref(), Some("red"));
        assert_eq!(doc.computed_display(div), "none");
        doc.set_style_property(div, "display", "block").unwrap();
        assert_eq!(doc.computed_display(div), "block");
        doc.remove_style_property(div, "color").unwrap();
        assert_eq!(doc.attr(div, "style"), Some("display: block;"));
    }

    #[test]
    fn display_none_ancestor_collapses_layout() {
        let doc = Document::parse(
            r#"<div style="display:none"><button style="left:10px;top:10px">x</button></div>"#,
        )
        .unwrap();
        let button = doc.query_selector("button").unwrap().unwrap();
        assert!(!doc.is_rendered(button));
        assert!(doc.bounding_rect(button).is_empty());
    }

    #[test]
    fn children_inherit_parent_origin() {
        let doc = Document::parse(
            r#"<form style="left:40px; top:300px; width:400px; height:200px"><input name="a"></form>"#,
        )
        .unwrap();
        let input = doc.query_selector("input").unwrap().unwrap();
        let rect = doc.page_rect(input);
        assert_eq!((rect.x, rect.y), (40.0, 300.0));
        assert_eq!((rect.width, rect.height), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
    }

    #[test]
    fn visibility_is_inherited_and_can_be_overridden() {
        let doc = Document::parse(
            r#"<div style="visibility:hidden"><a id="x">x</a><a id="y" style="visibility:visible">y</a></div>"#,
        )
        .unwrap();
        let x = doc.get_element_by_id("x").unwrap();
        let y = doc.get_element_by_id("y").unwrap();
        assert_eq!(doc.computed_visibility(x), "hidden");
        assert_eq!(doc.computed_visibility(y), "visible");
    }

    #[test]
    fn bounding_rect_subtracts_scroll() {
        let mut doc = Document::parse(r#"<p style="top:900px">x</p>"#).unwrap();
        let p = doc.query_selector("p").unwrap().unwrap();
        doc.window_mut().scroll_y = 500.0;
        assert_eq!(doc.bounding_rect(p).y, 400.0);
    }

    #[test]
    fn px_values() {
        assert_eq!(parse_px("12px"), Some(12.0));
        assert_eq!(parse_px(" 7 "), Some(7.0));
        assert_eq!(parse_px("50%"), None);
    }
}
