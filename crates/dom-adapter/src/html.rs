//! Tolerant HTML parsing and serialization.
//!
//! The parser is a single-pass tag scanner with an open-element stack. It
//! understands void elements, raw-text elements, the common implied end tags
//! and character references. It never fails on malformed markup; stray end
//! tags are dropped and unterminated constructs become text.

use pagepilot_core_types::InsertPosition;
use tracing::debug;

use crate::document::Document;
use crate::errors::{DomError, DomResult};
use crate::node::{is_void_tag, NodeId, NodeKind};

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];
const ESCAPABLE_RAW_TEXT_TAGS: &[&str] = &["textarea", "title"];
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre", "section",
    "table", "ul",
];

impl Document {
    /// Parse a complete page.
    pub fn parse(html: &str) -> DomResult<Document> {
        let mut doc = Document::new();
        let root = doc.root();
        let created = parse_into(&mut doc, root, html)?;
        debug!(nodes = created.len(), "parsed document");
        Ok(doc)
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(id) {
            serialize_node(self, *child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        serialize_node(self, id, &mut out);
        out
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> DomResult<()> {
        if !self.is_element(id) {
            return Err(DomError::NotAnElement(id));
        }
        self.clear_children(id)?;
        parse_into(self, id, html)?;
        Ok(())
    }

    /// Parse `html` and insert the resulting nodes relative to `target`.
    /// Returns the inserted top-level nodes in order.
    pub fn insert_adjacent_html(
        &mut self,
        target: NodeId,
        position: InsertPosition,
        html: &str,
    ) -> DomResult<Vec<NodeId>> {
        if !self.is_element(target) {
            return Err(DomError::NotAnElement(target));
        }
        let container = self.create_element("template");
        parse_into(self, container, html)?;
        let fragment = self.children(container).to_vec();

        match position {
            InsertPosition::BeforeBegin | InsertPosition::AfterEnd => {
                let parent = self.parent(target).ok_or_else(|| {
                    DomError::Hierarchy(format!(
                        "{} has no parent for {}",
                        target,
                        position.as_str()
                    ))
                })?;
                let reference = match position {
                    InsertPosition::BeforeBegin => Some(target),
                    _ => self.next_sibling(target),
                };
                for node in &fragment {
                    self.insert_before(parent, *node, reference)?;
                }
            }
            InsertPosition::AfterBegin => {
                let reference = self.children(target).first().copied();
                for node in &fragment {
                    self.insert_before(target, *node, reference)?;
                }
            }
            InsertPosition::BeforeEnd => {
                for node in &fragment {
                    self.append_child(target, *node)?;
                }
            }
        }
        Ok(fragment)
    }
}

/// Parse `html` as children of `parent`; returns every node created.
pub(crate) fn parse_into(doc: &mut Document, parent: NodeId, html: &str) -> DomResult<Vec<NodeId>> {
    let mut created = Vec::new();
    let mut stack = vec![parent];
    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if html[i..].starts_with("<!--") {
            let end = html[i + 4..].find("-->").map(|p| i + 4 + p);
            let body = &html[i + 4..end.unwrap_or(html.len())];
            let comment = doc.create_comment(body);
            doc.append_child(current(&stack)?, comment)?;
            created.push(comment);
            i = end.map(|e| e + 3).unwrap_or(html.len());
            continue;
        }

        if bytes[i] == b'<' && matches!(bytes.get(i + 1), Some(b'!') | Some(b'?')) {
            i = html[i..].find('>').map(|p| i + p + 1).unwrap_or(html.len());
            continue;
        }

        if bytes[i] == b'<' && bytes.get(i + 1) == Some(&b'/') {
            match parse_end_tag(html, i) {
                Some((tag, next)) => {
                    close_element(doc, &mut stack, &tag);
                    i = next;
                }
                None => {
                    push_text(doc, &stack, &mut created, &html[i..])?;
                    i = html.len();
                }
            }
            continue;
        }

        if bytes[i] == b'<' && bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic) {
            let Some(tag) = parse_start_tag(html, i) else {
                push_text(doc, &stack, &mut created, &html[i..])?;
                break;
            };
            i = tag.next;
            apply_implied_end_tags(doc, &mut stack, &tag.name);

            let element = doc.create_element_with_attrs(&tag.name, tag.attrs);
            doc.append_child(current(&stack)?, element)?;
            created.push(element);

            let raw = RAW_TEXT_TAGS.contains(&tag.name.as_str());
            let escapable = ESCAPABLE_RAW_TEXT_TAGS.contains(&tag.name.as_str());
            if (raw || escapable) && !tag.self_closing {
                let close = find_end_tag(html, i, &tag.name).unwrap_or(html.len());
                let body = &html[i..close];
                if !body.is_empty() {
                    let text = if raw {
                        body.to_string()
                    } else {
                        decode_entities(body)
                    };
                    let text_node = doc.create_text(&text);
                    doc.append_child(element, text_node)?;
                    created.push(text_node);
                }
                i = parse_end_tag(html, close)
                    .map(|(_, next)| next)
                    .unwrap_or(html.len());
                if tag.name == "textarea" {
                    let value = doc.text_content(element);
                    doc.element_mut(element)?.value = value;
                }
                continue;
            }

            if !tag.self_closing && !is_void_tag(&tag.name) {
                stack.push(element);
            }
            continue;
        }

        let start = i;
        i += 1;
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }
        push_text(doc, &stack, &mut created, &html[start..i])?;
    }

    Ok(created)
}

fn current(stack: &[NodeId]) -> DomResult<NodeId> {
    stack
        .last()
        .copied()
        .ok_or_else(|| DomError::HtmlParse("open element stack is empty".into()))
}

fn push_text(
    doc: &mut Document,
    stack: &[NodeId],
    created: &mut Vec<NodeId>,
    raw: &str,
) -> DomResult<()> {
    if raw.is_empty() {
        return Ok(());
    }
    let parent = current(stack)?;
    // Whitespace-only runs between block tags carry no content.
    if raw.trim().is_empty() && !doc.is_element(parent) {
        return Ok(());
    }
    let text = doc.create_text(&decode_entities(raw));
    doc.append_child(parent, text)?;
    created.push(text);
    Ok(())
}

fn close_element(doc: &Document, stack: &mut Vec<NodeId>, tag: &str) {
    let Some(depth) = stack
        .iter()
        .skip(1)
        .rposition(|n| doc.tag(*n) == Some(tag))
        .map(|p| p + 1)
    else {
        return;
    };
    stack.truncate(depth);
}

fn apply_implied_end_tags(doc: &Document, stack: &mut Vec<NodeId>, opening: &str) {
    loop {
        if stack.len() <= 1 {
            return;
        }
        let top = stack[stack.len() - 1];
        let top_tag = doc.tag(top).unwrap_or("");
        let closes = match opening {
            "li" => top_tag == "li",
            "option" => top_tag == "option",
            "dt" | "dd" => matches!(top_tag, "dt" | "dd"),
            "td" | "th" => matches!(top_tag, "td" | "th"),
            "tr" => matches!(top_tag, "tr" | "td" | "th"),
            _ => top_tag == "p" && CLOSES_PARAGRAPH.contains(&opening),
        };
        if !closes {
            return;
        }
        stack.pop();
    }
}

struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    next: usize,
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_attr_name_char(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/' | b'"' | b'\'')
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn parse_start_tag(html: &str, at: usize) -> Option<StartTag> {
    let bytes = html.as_bytes();
    let mut i = at + 1;
    let name_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let name = html[name_start..i].to_ascii_lowercase();
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        match bytes.get(i) {
            None => return None,
            Some(b'>') => {
                i += 1;
                break;
            }
            Some(b'/') => {
                if bytes.get(i + 1) == Some(&b'>') {
                    self_closing = true;
                    i += 2;
                    break;
                }
                i += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        if attr_start == i {
            i += 1;
            continue;
        }
        let attr_name = html[attr_start..i].to_ascii_lowercase();
        skip_ws(bytes, &mut i);

        let value = if bytes.get(i) == Some(&b'=') {
            i += 1;
            skip_ws(bytes, &mut i);
            match bytes.get(i) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = i + 1;
                    let end = html[value_start..].find(quote as char)? + value_start;
                    i = end + 1;
                    decode_entities(&html[value_start..end])
                }
                _ => {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    decode_entities(&html[value_start..i])
                }
            }
        } else {
            String::new()
        };

        if !attrs.iter().any(|(k, _)| *k == attr_name) {
            attrs.push((attr_name, value));
        }
    }

    Some(StartTag {
        name,
        attrs,
        self_closing,
        next: i,
    })
}

fn parse_end_tag(html: &str, at: usize) -> Option<(String, usize)> {
    let bytes = html.as_bytes();
    let mut i = at + 2;
    let start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[start..i].to_ascii_lowercase();
    let close = html[i..].find('>')? + i;
    Some((tag, close + 1))
}

fn find_end_tag(html: &str, from: usize, tag: &str) -> Option<usize> {
    let lower = html[from..].to_ascii_lowercase();
    let needle = format!("</{}", tag);
    lower.find(&needle).map(|p| p + from)
}

/// Decode named and numeric character references.
pub fn decode_entities(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }
    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &tail[..end];
            decode_entity(entity).map(|ch| (ch, end))
        });
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric
            .strip_prefix('x')
            .or_else(|| numeric.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    Some(match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "laquo" => '«',
        "raquo" => '»',
        "middot" => '·',
        "euro" => '€',
        "pound" => '£',
        "yen" => '¥',
        "times" => '×',
        _ => return None,
    })
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn serialize_node(doc: &Document, id: NodeId, out: &mut String) {
    let Some(node) = doc.node(id) else {
        return;
    };
    match node.kind() {
        NodeKind::Document => {
            for child in node.children() {
                serialize_node(doc, *child, out);
            }
        }
        NodeKind::Text(text) => {
            let raw_parent = doc
                .parent(id)
                .and_then(|p| doc.tag(p))
                .is_some_and(|t| RAW_TEXT_TAGS.contains(&t));
            if raw_parent {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Element(data) => {
            out.push('<');
            out.push_str(data.tag());
            for (name, value) in data.attrs() {
                out.push(' ');
                out.push_str(name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
            }
            out.push('>');
            if is_void_tag(data.tag()) {
                return;
            }
            for child in node.children() {
                serialize_node(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(data.tag());
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_markup_with_void_and_raw_text() {
        let doc = Document::parse(
            r#"<html><head><title>Shop &amp; Co</title><script>if (a < b) {}</script></head>
            <body><form id="f"><input name="q" disabled><br><textarea>Hi &lt;3</textarea></form></body></html>"#,
        )
        .unwrap();
        assert_eq!(doc.title(), "Shop & Co");
        let input = doc.query_selector("input[name=q]").unwrap().unwrap();
        assert!(doc.has_attr(input, "disabled"));
        assert_eq!(doc.attr(input, "disabled"), Some(""));
        let script = doc.query_selector("script").unwrap().unwrap();
        assert_eq!(doc.text_content(script), "if (a < b) {}");
        let textarea = doc.query_selector("textarea").unwrap().unwrap();
        assert_eq!(doc.value(textarea), "Hi <3");
    }

    #[test]
    fn implied_end_tags_close_list_items_and_cells() {
        let doc = Document::parse("<ul><li>one<li>two</ul><table><tr><td>a<td>b<tr><td>c</table>")
            .unwrap();
        assert_eq!(doc.query_selector_all("ul > li").unwrap().len(), 2);
        assert_eq!(doc.query_selector_all("tr").unwrap().len(), 2);
        assert_eq!(doc.query_selector_all("td").unwrap().len(), 3);
    }

    #[test]
    fn stray_end_tags_are_ignored() {
        let doc = Document::parse("<div><span>x</b></span>y</div>").unwrap();
        let div = doc.query_selector("div").unwrap().unwrap();
        assert_eq!(doc.text_content(div), "xy");
    }

    #[test]
    fn serialization_round_trips_attributes_and_escapes() {
        let doc = Document::parse(r#"<p class="a" title="say &quot;hi&quot;">1 &lt; 2</p>"#).unwrap();
        assert_eq!(
            doc.to_html(),
            r#"<p class="a" title="say &quot;hi&quot;">1 &lt; 2</p>"#
        );
    }

    #[test]
    fn insert_adjacent_html_positions() {
        let mut doc = Document::parse("<ul><li id=\"b\">b</li></ul>").unwrap();
        let b = doc.get_element_by_id("b").unwrap();
        doc.insert_adjacent_html(b, InsertPosition::BeforeBegin, "<li>a</li>")
            .unwrap();
        doc.insert_adjacent_html(b, InsertPosition::AfterEnd, "<li>c</li>")
            .unwrap();
        doc.insert_adjacent_html(b, InsertPosition::AfterBegin, "<em>!</em>")
            .unwrap();
        let ul = doc.query_selector("ul").unwrap().unwrap();
        assert_eq!(
            doc.inner_html(ul),
            "<li>a</li><li id=\"b\"><em>!</em>b</li><li>c</li>"
        );
    }

    #[test]
    fn decodes_numeric_references_and_keeps_unknown() {
        assert_eq!(decode_entities("&#65;&#x42; &bogus; &"), "AB &bogus; &");
    }
}
