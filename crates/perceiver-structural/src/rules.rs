//! Ordered classification tables.
//!
//! Each table is data: a predicate and the label it yields. Evaluation is
//! first-match-wins, so table order is precedence.

use pagepilot_dom_adapter::{Document, NodeId};

use crate::model::ElementCategory;

pub const TAB_LABEL: &str = "tab";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// `<input>` whose effective type equals the value.
    InputType(&'static str),
    /// Explicit `role` attribute.
    Role(&'static str),
    /// Any rule of [`TAB_RULES`].
    Tab,
    Tag(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct LabelRule {
    pub predicate: Predicate,
    pub label: &'static str,
}

const fn rule(predicate: Predicate, label: &'static str) -> LabelRule {
    LabelRule { predicate, label }
}

pub static TYPE_NAME_RULES: &[LabelRule] = &[
    rule(Predicate::InputType("password"), "password input"),
    rule(Predicate::InputType("submit"), "submit button"),
    rule(Predicate::InputType("button"), "button"),
    rule(Predicate::InputType("checkbox"), "checkbox"),
    rule(Predicate::InputType("radio"), "radio button"),
    rule(Predicate::InputType("search"), "search box"),
    rule(Predicate::InputType("email"), "email input"),
    rule(Predicate::InputType("tel"), "phone input"),
    rule(Predicate::InputType("number"), "number input"),
    rule(Predicate::InputType("url"), "url input"),
    rule(Predicate::InputType("date"), "date picker"),
    rule(Predicate::InputType("datetime-local"), "datetime picker"),
    rule(Predicate::InputType("time"), "time picker"),
    rule(Predicate::InputType("month"), "month picker"),
    rule(Predicate::InputType("week"), "week picker"),
    rule(Predicate::InputType("file"), "file upload"),
    rule(Predicate::InputType("color"), "color picker"),
    rule(Predicate::InputType("range"), "slider"),
    rule(Predicate::InputType("hidden"), "hidden field"),
    rule(Predicate::Role("tab"), TAB_LABEL),
    rule(Predicate::Role("tabpanel"), "tab panel"),
    rule(Predicate::Role("switch"), "switch"),
    rule(Predicate::Role("menuitem"), "menu item"),
    rule(Predicate::Role("option"), "option"),
    rule(Predicate::Role("listitem"), "list item"),
    rule(Predicate::Role("treeitem"), "tree item"),
    rule(Predicate::Role("gridcell"), "grid cell"),
    rule(Predicate::Role("radio"), "radio button"),
    rule(Predicate::Role("checkbox"), "checkbox"),
    rule(Predicate::Role("button"), "button"),
    rule(Predicate::Role("link"), "link"),
    rule(Predicate::Tab, TAB_LABEL),
    rule(Predicate::Tag("input"), "input"),
    rule(Predicate::Tag("textarea"), "textarea"),
    rule(Predicate::Tag("button"), "button"),
    rule(Predicate::Tag("a"), "link"),
    rule(Predicate::Tag("select"), "dropdown"),
    rule(Predicate::Tag("li"), "list item"),
    rule(Predicate::Tag("details"), "details"),
    rule(Predicate::Tag("summary"), "summary"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabSignal {
    Role,
    ClassContains(&'static str),
    HasAttribute(&'static str),
    DataRoleTab,
    ParentClassContains(&'static str),
}

pub static TAB_RULES: &[TabSignal] = &[
    TabSignal::Role,
    TabSignal::ClassContains("tab"),
    TabSignal::ClassContains("Tab"),
    TabSignal::HasAttribute("data-tab"),
    TabSignal::DataRoleTab,
    TabSignal::ParentClassContains("nav-tabs"),
    TabSignal::ParentClassContains("tabs"),
    TabSignal::ParentClassContains("tab-list"),
    TabSignal::ParentClassContains("tablist"),
];

/// Class substrings (case-insensitive) that mark a repeated content card.
pub static CARD_RULES: &[&str] = &["card", "item", "product", "result", "tile"];

pub fn matches_predicate(doc: &Document, node: NodeId, predicate: Predicate) -> bool {
    match predicate {
        Predicate::InputType(ty) => {
            doc.is_tag(node, "input") && doc.input_type(node).as_deref() == Some(ty)
        }
        Predicate::Role(role) => doc.attr(node, "role") == Some(role),
        Predicate::Tab => is_tab_element(doc, node),
        Predicate::Tag(tag) => doc.is_tag(node, tag),
    }
}

pub fn matches_tab_signal(doc: &Document, node: NodeId, signal: TabSignal) -> bool {
    match signal {
        TabSignal::Role => doc.attr(node, "role") == Some("tab"),
        TabSignal::ClassContains(fragment) => doc.class_name(node).contains(fragment),
        TabSignal::HasAttribute(name) => doc.has_attr(node, name),
        TabSignal::DataRoleTab => doc.attr(node, "data-role") == Some("tab"),
        TabSignal::ParentClassContains(fragment) => doc
            .parent_element(node)
            .is_some_and(|parent| doc.class_name(parent).contains(fragment)),
    }
}

pub fn is_tab_element(doc: &Document, node: NodeId) -> bool {
    TAB_RULES
        .iter()
        .any(|signal| matches_tab_signal(doc, node, *signal))
}

pub fn is_card_element(doc: &Document, node: NodeId) -> bool {
    let class = doc.class_name(node).to_ascii_lowercase();
    !class.is_empty() && CARD_RULES.iter().any(|fragment| class.contains(fragment))
}

/// Human-readable type name; falls back to the raw tag.
pub fn type_name(doc: &Document, node: NodeId) -> String {
    TYPE_NAME_RULES
        .iter()
        .find(|rule| matches_predicate(doc, node, rule.predicate))
        .map(|rule| rule.label.to_string())
        .or_else(|| doc.tag(node).map(str::to_string))
        .unwrap_or_default()
}

pub fn is_menu_item(doc: &Document, node: NodeId) -> bool {
    doc.attr(node, "role") == Some("menuitem")
        || doc.has_class(node, "menu-item")
        || doc.has_class(node, "dropdown-item")
}

pub fn is_list_item(doc: &Document, node: NodeId) -> bool {
    doc.is_tag(node, "li")
        || doc.attr(node, "role") == Some("listitem")
        || doc.has_class(node, "list-group-item")
}

pub fn is_button_like(doc: &Document, node: NodeId) -> bool {
    doc.is_tag(node, "button")
        || doc.attr(node, "role") == Some("button")
        || (doc.is_tag(node, "input")
            && matches!(
                doc.input_type(node).as_deref(),
                Some("submit") | Some("button") | Some("reset")
            ))
}

/// Ranking class, first match wins: form control, button, tab, menu, list,
/// link, text.
pub fn category(doc: &Document, node: NodeId) -> ElementCategory {
    let form_control = matches!(doc.tag(node), Some("input") | Some("textarea") | Some("select"))
        && !is_button_like(doc, node);
    if form_control {
        ElementCategory::Form
    } else if is_button_like(doc, node) {
        ElementCategory::Button
    } else if is_tab_element(doc, node) {
        ElementCategory::Tab
    } else if is_menu_item(doc, node) {
        ElementCategory::Menu
    } else if is_list_item(doc, node) || matches!(doc.tag(node), Some("details") | Some("summary")) {
        ElementCategory::List
    } else if doc.is_tag(node, "a") || doc.attr(node, "role") == Some("link") {
        ElementCategory::Link
    } else {
        ElementCategory::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(doc: &Document, selector: &str) -> NodeId {
        doc.query_selector(selector).unwrap().unwrap()
    }

    #[test]
    fn input_type_beats_role_and_tag() {
        let doc = Document::parse(r#"<input type="email" role="button">"#).unwrap();
        assert_eq!(type_name(&doc, first(&doc, "input")), "email input");
    }

    #[test]
    fn role_beats_tab_heuristic_and_tag() {
        let doc = Document::parse(
            r#"<div class="tab-strip"><a role="menuitem" class="tab">Files</a></div>"#,
        )
        .unwrap();
        assert_eq!(type_name(&doc, first(&doc, "a")), "menu item");
    }

    #[test]
    fn tab_heuristic_beats_tag() {
        let doc = Document::parse(r##"<ul class="nav-tabs"><li><a href="#a">A</a></li></ul>"##)
            .unwrap();
        assert_eq!(type_name(&doc, first(&doc, "li")), TAB_LABEL);
        assert_eq!(type_name(&doc, first(&doc, "a")), "link");
    }

    #[test]
    fn unknown_tags_fall_back_to_raw_tag() {
        let doc = Document::parse("<span>x</span>").unwrap();
        assert_eq!(type_name(&doc, first(&doc, "span")), "span");
    }

    #[test]
    fn each_tab_signal_fires() {
        let doc = Document::parse(
            r#"<div role="tab" id="a"></div>
               <div class="myTab" id="b"></div>
               <div data-tab="x" id="c"></div>
               <div data-role="tab" id="d"></div>
               <div class="tablist"><span id="e"></span></div>
               <div id="f"></div>"#,
        )
        .unwrap();
        for id in ["a", "b", "c", "d", "e"] {
            let node = doc.get_element_by_id(id).unwrap();
            assert!(is_tab_element(&doc, node), "{id} should be a tab");
        }
        assert!(!is_tab_element(&doc, doc.get_element_by_id("f").unwrap()));
    }

    #[test]
    fn card_rules_match_case_insensitively() {
        let doc = Document::parse(
            r#"<div class="ProductCard" id="a"></div><div class="hero" id="b"></div>"#,
        )
        .unwrap();
        assert!(is_card_element(&doc, doc.get_element_by_id("a").unwrap()));
        assert!(!is_card_element(&doc, doc.get_element_by_id("b").unwrap()));
    }

    #[test]
    fn categories_follow_precedence() {
        let doc = Document::parse(
            r#"<input id="f"><input type="submit" id="s"><a class="tab" id="t">T</a>
               <div class="menu-item" id="m"></div><li id="l"></li><a href="/x" id="k">x</a>
               <span tabindex="0" id="x"></span>"#,
        )
        .unwrap();
        let cat = |id: &str| category(&doc, doc.get_element_by_id(id).unwrap());
        assert_eq!(cat("f"), ElementCategory::Form);
        assert_eq!(cat("s"), ElementCategory::Button);
        assert_eq!(cat("t"), ElementCategory::Tab);
        assert_eq!(cat("m"), ElementCategory::Menu);
        assert_eq!(cat("l"), ElementCategory::List);
        assert_eq!(cat("k"), ElementCategory::Link);
        assert_eq!(cat("x"), ElementCategory::Text);
    }
}
