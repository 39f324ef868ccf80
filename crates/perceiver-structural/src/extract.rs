//! Read-only structured extraction of page content.

use std::collections::BTreeMap;

use serde::Serialize;

use pagepilot_dom_adapter::{Document, NodeId};

use crate::describer::associated_label;
use crate::rules::is_card_element;

const MAIN_CONTENT: &[&str] = &["main", "article", r#"[role="main"]"#, ".content", "#content"];
const NON_CONTENT: &[&str] = &["script", "style", "noscript", "iframe", "embed", "object"];
const EXCERPT_CHARS: usize = 500;
const CARD_TEXT_CHARS: usize = 200;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExtractedTable {
    pub headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExtractedList {
    pub ordered: bool,
    pub items: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExtractedCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExtractedField {
    pub tag: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub required: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExtractedForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub method: String,
    pub fields: Vec<ExtractedField>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub open_graph: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub twitter: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PageSummary {
    pub title: String,
    pub excerpt: String,
    pub outline: Vec<String>,
    pub link_count: usize,
}

fn all(doc: &Document, scope: NodeId, selector: &str) -> Vec<NodeId> {
    doc.query_selector_all_from(scope, selector).unwrap_or_default()
}

fn first(doc: &Document, scope: NodeId, selector: &str) -> Option<NodeId> {
    doc.query_selector_from(scope, selector).ok().flatten()
}

fn cells(doc: &Document, row: NodeId) -> Vec<NodeId> {
    doc.element_children(row)
        .into_iter()
        .filter(|c| matches!(doc.tag(*c), Some("td" | "th")))
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub fn extract_tables(doc: &Document) -> Vec<ExtractedTable> {
    let mut tables = Vec::new();
    for table in all(doc, doc.root(), "table") {
        let rows: Vec<NodeId> = all(doc, table, "tr")
            .into_iter()
            .filter(|row| doc.closest(*row, "table").ok().flatten() == Some(table))
            .collect();
        let Some(first_row) = rows.first().copied() else {
            continue;
        };
        let header_row = first(doc, table, "thead tr").unwrap_or(first_row);
        let headers: Vec<String> = cells(doc, header_row)
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                let text = doc.normalized_text(cell);
                if text.is_empty() {
                    format!("column_{}", i + 1)
                } else {
                    text
                }
            })
            .collect();

        let data_rows = rows
            .iter()
            .filter(|row| **row != header_row)
            .map(|row| {
                let mut record = BTreeMap::new();
                for (i, cell) in cells(doc, *row).into_iter().enumerate() {
                    let Some(header) = headers.get(i) else {
                        break;
                    };
                    record.insert(header.clone(), doc.normalized_text(cell));
                    if let Some(href) = first(doc, cell, "a[href]").and_then(|a| doc.attr_non_empty(a, "href")) {
                        record.insert(format!("{}_link", header), href);
                    }
                }
                record
            })
            .filter(|record| !record.is_empty())
            .collect();
        tables.push(ExtractedTable {
            headers,
            rows: data_rows,
        });
    }
    tables
}

pub fn extract_lists(doc: &Document) -> Vec<ExtractedList> {
    all(doc, doc.root(), r#"ul, ol, [role="list"]"#)
        .into_iter()
        .filter_map(|list| {
            let items: Vec<String> = doc
                .element_children(list)
                .into_iter()
                .filter(|c| doc.is_tag(*c, "li") || doc.attr(*c, "role") == Some("listitem"))
                .map(|item| doc.normalized_text(item))
                .filter(|text| !text.is_empty())
                .collect();
            (items.len() >= 2).then(|| ExtractedList {
                ordered: doc.is_tag(list, "ol"),
                items,
            })
        })
        .collect()
}

pub fn extract_cards(doc: &Document) -> Vec<ExtractedCard> {
    doc.all_elements()
        .into_iter()
        .filter(|node| is_card_element(doc, *node))
        .filter(|node| !doc.ancestors(*node).iter().any(|a| is_card_element(doc, *a)))
        .filter_map(|card| {
            let text = doc.normalized_text(card);
            if text.is_empty() {
                return None;
            }
            let title = first(doc, card, r#"h1, h2, h3, h4, h5, h6, [class*="title"]"#)
                .map(|h| doc.normalized_text(h))
                .filter(|t| !t.is_empty());
            let link = first(doc, card, "a[href]").and_then(|a| doc.attr_non_empty(a, "href"));
            Some(ExtractedCard {
                title,
                text: truncate(&text, CARD_TEXT_CHARS),
                link,
            })
        })
        .collect()
}

pub fn extract_forms(doc: &Document) -> Vec<ExtractedForm> {
    all(doc, doc.root(), "form")
        .into_iter()
        .map(|form| {
            let fields = all(doc, form, "input, select, textarea")
                .into_iter()
                .filter(|f| doc.input_type(*f).as_deref() != Some("hidden"))
                .map(|field| ExtractedField {
                    tag: doc.tag(field).unwrap_or_default().to_string(),
                    input_type: doc.input_type(field),
                    name: doc.attr_non_empty(field, "name"),
                    label: associated_label(doc, field).or_else(|| preceding_label(doc, field)),
                    required: doc.has_attr(field, "required"),
                })
                .collect();
            ExtractedForm {
                id: doc.attr_non_empty(form, "id"),
                name: doc.attr_non_empty(form, "name"),
                action: doc.attr_non_empty(form, "action"),
                method: doc
                    .attr_non_empty(form, "method")
                    .map(|m| m.to_ascii_lowercase())
                    .unwrap_or_else(|| "get".into()),
                fields,
            }
        })
        .collect()
}

fn preceding_label(doc: &Document, field: NodeId) -> Option<String> {
    let previous = doc.previous_element_sibling(field)?;
    doc.is_tag(previous, "label")
        .then(|| doc.normalized_text(previous))
        .filter(|t| !t.is_empty())
}

fn meta_content(doc: &Document, selector: &str) -> Option<String> {
    first(doc, doc.root(), selector).and_then(|m| doc.attr_non_empty(m, "content"))
}

pub fn page_metadata(doc: &Document) -> PageMetadata {
    let mut open_graph = BTreeMap::new();
    let mut twitter = BTreeMap::new();
    for meta in all(doc, doc.root(), "meta") {
        let Some(content) = doc.attr_non_empty(meta, "content") else {
            continue;
        };
        let key = doc
            .attr_non_empty(meta, "property")
            .or_else(|| doc.attr_non_empty(meta, "name"))
            .unwrap_or_default();
        if let Some(og) = key.strip_prefix("og:") {
            open_graph.insert(og.to_string(), content);
        } else if let Some(tw) = key.strip_prefix("twitter:") {
            twitter.insert(tw.to_string(), content);
        }
    }
    PageMetadata {
        title: doc.title(),
        url: doc.window().location().to_string(),
        description: meta_content(doc, r#"meta[name="description"]"#),
        keywords: meta_content(doc, r#"meta[name="keywords"]"#)
            .map(|k| {
                k.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        author: meta_content(doc, r#"meta[name="author"]"#),
        open_graph,
        twitter,
    }
}

fn content_text(doc: &Document, node: NodeId, out: &mut String) {
    for child in doc.children(node) {
        if doc.is_text(*child) {
            out.push_str(&doc.text_content(*child));
            out.push(' ');
        } else if let Some(tag) = doc.tag(*child) {
            if NON_CONTENT.contains(&tag) || doc.computed_display(*child) == "none" {
                continue;
            }
            content_text(doc, *child, out);
        }
    }
}

pub fn page_summary(doc: &Document) -> PageSummary {
    let main = MAIN_CONTENT
        .iter()
        .find_map(|selector| first(doc, doc.root(), selector))
        .or_else(|| doc.body())
        .unwrap_or_else(|| doc.root());
    let mut raw = String::new();
    content_text(doc, main, &mut raw);
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let title = first(doc, doc.root(), "h1")
        .map(|h| doc.normalized_text(h))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| doc.title());
    PageSummary {
        title,
        excerpt: truncate(&text, EXCERPT_CHARS),
        outline: all(doc, main, "h1, h2, h3")
            .into_iter()
            .map(|h| format!("{}: {}", doc.tag(h).unwrap_or_default(), doc.normalized_text(h)))
            .collect(),
        link_count: all(doc, main, "a[href]").len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_map_headers_and_links() {
        let doc = Document::parse(
            r#"<table>
                 <thead><tr><th>Name</th><th>Price</th></tr></thead>
                 <tbody>
                   <tr><td><a href="/a">Apple</a></td><td>$1</td></tr>
                   <tr><td>Pear</td><td>$2</td></tr>
                 </tbody>
               </table>"#,
        )
        .unwrap();
        let tables = extract_tables(&doc);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers, vec!["Name", "Price"]);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].rows[0]["Name"], "Apple");
        assert_eq!(tables[0].rows[0]["Name_link"], "/a");
        assert_eq!(tables[0].rows[1]["Price"], "$2");
    }

    #[test]
    fn single_item_lists_are_skipped() {
        let doc = Document::parse(
            "<ul><li>only</li></ul><ol><li>one</li><li>two</li></ol>",
        )
        .unwrap();
        let lists = extract_lists(&doc);
        assert_eq!(lists.len(), 1);
        assert!(lists[0].ordered);
        assert_eq!(lists[0].items, vec!["one", "two"]);
    }

    #[test]
    fn outermost_cards_only() {
        let doc = Document::parse(
            r#"<div class="product-card"><h3>Lamp</h3><p>Warm light</p>
                 <div class="card-footer"><a href="/lamp">Buy</a></div></div>
               <div class="hero">Welcome</div>"#,
        )
        .unwrap();
        let cards = extract_cards(&doc);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title.as_deref(), Some("Lamp"));
        assert_eq!(cards[0].link.as_deref(), Some("/lamp"));
    }

    #[test]
    fn forms_list_fields_with_labels() {
        let doc = Document::parse(
            r#"<form id="login" action="/session" method="POST">
                 <label for="u">User</label><input id="u" name="user" required>
                 <label>Password</label><input type="password" name="pw">
                 <input type="hidden" name="csrf" value="x">
               </form>"#,
        )
        .unwrap();
        let forms = extract_forms(&doc);
        assert_eq!(forms[0].method, "post");
        assert_eq!(forms[0].fields.len(), 2);
        assert_eq!(forms[0].fields[0].label.as_deref(), Some("User"));
        assert!(forms[0].fields[0].required);
        assert_eq!(forms[0].fields[1].label.as_deref(), Some("Password"));
    }

    #[test]
    fn metadata_collects_social_tags() {
        let doc = Document::parse(
            r#"<head><title>Shop</title>
                 <meta name="description" content="Things">
                 <meta name="keywords" content="a, b,,c">
                 <meta property="og:title" content="Shop OG">
                 <meta name="twitter:card" content="summary"></head>"#,
        )
        .unwrap();
        let meta = page_metadata(&doc);
        assert_eq!(meta.title, "Shop");
        assert_eq!(meta.keywords, vec!["a", "b", "c"]);
        assert_eq!(meta.open_graph["title"], "Shop OG");
        assert_eq!(meta.twitter["card"], "summary");
    }

    #[test]
    fn summary_prefers_main_and_skips_scripts() {
        let doc = Document::parse(
            r#"<body><nav><a href="/x">Nav</a></nav>
                 <main><h1>Guide</h1><script>var x = 1;</script>
                   <p>Step   one.</p><p hidden>secret</p><a href="/next">Next</a></main></body>"#,
        )
        .unwrap();
        let summary = page_summary(&doc);
        assert_eq!(summary.title, "Guide");
        assert_eq!(summary.excerpt, "Guide Step one. Next");
        assert_eq!(summary.outline, vec!["h1: Guide"]);
        assert_eq!(summary.link_count, 1);
    }
}
