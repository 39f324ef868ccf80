//! Region and element-type predicates for follow-up element requests.

use pagepilot_core_types::{ElementTypeFilter, Region};
use pagepilot_dom_adapter::{Document, NodeId};
use pagepilot_policy_center::RegionPolicy;

use crate::registry::CollectedElement;
use crate::rules;

const TAB_PANEL: &str = r#"[role="tabpanel"], .tab-content, .tab-pane"#;
const MODAL: &str = r#"[role="dialog"], [role="alertdialog"], .modal, .dialog, [class*="modal"], [class*="dialog"]"#;
const MENU: &str = r#"[role="menu"], [role="menubar"], .menu, .dropdown-menu, .context-menu"#;

fn inside(doc: &Document, node: NodeId, selector: &str) -> bool {
    doc.closest(node, selector).ok().flatten().is_some()
}

pub fn in_region(doc: &Document, entry: &CollectedElement, region: Region, policy: &RegionPolicy) -> bool {
    let window = doc.window();
    let rect = entry.element.rect;
    match region {
        Region::Header => rect.y < policy.header_max_y,
        Region::Footer => rect.y > window.viewport_height - policy.footer_band,
        Region::Sidebar => {
            rect.x < policy.sidebar_band || rect.x > window.viewport_width - policy.sidebar_band
        }
        Region::BelowViewport => rect.y > window.viewport_height,
        Region::Form => inside(doc, entry.node, "form"),
        Region::TabPanel => inside(doc, entry.node, TAB_PANEL),
        Region::Modal => inside(doc, entry.node, MODAL),
        Region::Menu => inside(doc, entry.node, MENU),
    }
}

pub fn matches_type(doc: &Document, node: NodeId, filter: ElementTypeFilter) -> bool {
    let tag = doc.tag(node).unwrap_or_default();
    let input_type = doc.input_type(node);
    let role = doc.attr(node, "role");
    match filter {
        ElementTypeFilter::Input => matches!(tag, "input" | "textarea") && !rules::is_button_like(doc, node),
        ElementTypeFilter::Button => rules::is_button_like(doc, node),
        ElementTypeFilter::Link => tag == "a",
        ElementTypeFilter::Select => tag == "select",
        ElementTypeFilter::Tab => rules::is_tab_element(doc, node),
        ElementTypeFilter::Menu => rules::is_menu_item(doc, node),
        ElementTypeFilter::List => rules::is_list_item(doc, node),
        ElementTypeFilter::Radio => input_type.as_deref() == Some("radio") || role == Some("radio"),
        ElementTypeFilter::Checkbox => {
            input_type.as_deref() == Some("checkbox") || role == Some("checkbox")
        }
        ElementTypeFilter::All => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ElementRegistry;
    use pagepilot_policy_center::default_policy;

    fn collect(doc: &Document) -> Vec<CollectedElement> {
        ElementRegistry::new().collect(doc, &default_policy().collection)
    }

    fn ids_in(doc: &Document, region: Region) -> Vec<String> {
        let policy = default_policy().regions;
        collect(doc)
            .iter()
            .filter(|e| in_region(doc, e, region, &policy))
            .filter_map(|e| doc.attr_non_empty(e.node, "id"))
            .collect()
    }

    #[test]
    fn geometric_regions() {
        let doc = Document::parse(
            r#"<button id="top" style="left:400px;top:50px">Top</button>
               <button id="mid" style="left:400px;top:400px">Mid</button>
               <button id="low" style="left:400px;top:700px">Low</button>
               <button id="side" style="left:10px;top:400px">Side</button>
               <button id="below" style="left:400px;top:1200px">Below</button>"#,
        )
        .unwrap();
        assert_eq!(ids_in(&doc, Region::Header), vec!["top"]);
        assert_eq!(ids_in(&doc, Region::Footer), vec!["low", "below"]);
        assert_eq!(ids_in(&doc, Region::Sidebar), vec!["side"]);
        assert_eq!(ids_in(&doc, Region::BelowViewport), vec!["below"]);
    }

    #[test]
    fn container_regions() {
        let doc = Document::parse(
            r#"<form><input id="f"></form>
               <div role="dialog"><button id="m">OK</button></div>
               <div class="tab-pane"><a href="/x" id="t">x</a></div>
               <ul class="dropdown-menu"><li class="dropdown-item" id="d" tabindex="0">Copy</li></ul>"#,
        )
        .unwrap();
        assert_eq!(ids_in(&doc, Region::Form), vec!["f"]);
        assert_eq!(ids_in(&doc, Region::Modal), vec!["m"]);
        assert_eq!(ids_in(&doc, Region::TabPanel), vec!["t"]);
        assert_eq!(ids_in(&doc, Region::Menu), vec!["d"]);
    }

    #[test]
    fn type_filters() {
        let doc = Document::parse(
            r#"<input id="i"><input type="submit" id="s"><input type="radio" id="r">
               <div role="checkbox" id="c"></div><select id="sel"></select>"#,
        )
        .unwrap();
        let check = |id: &str, filter| matches_type(&doc, doc.get_element_by_id(id).unwrap(), filter);
        assert!(check("i", ElementTypeFilter::Input));
        assert!(!check("s", ElementTypeFilter::Input));
        assert!(check("s", ElementTypeFilter::Button));
        assert!(check("r", ElementTypeFilter::Radio));
        assert!(check("c", ElementTypeFilter::Checkbox));
        assert!(check("sel", ElementTypeFilter::Select));
        assert!(check("sel", ElementTypeFilter::All));
    }
}
