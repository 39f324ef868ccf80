//! Arena-backed document tree and its mutation API.

use crate::errors::{DomError, DomResult};
use crate::events::EventLog;
use crate::node::{AttachedFile, ElementData, Node, NodeId, NodeKind};
use crate::window::Window;

/// A live document plus the window state that surrounds it.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    pub(crate) window: Window,
    pub(crate) events: EventLog,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
            root: NodeId(0),
            window: Window::default(),
            events: EventLog::default(),
            focused: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_ref(&self, id: NodeId) -> DomResult<&Node> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).and_then(Node::as_element)
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(data) => Ok(data),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).map(Node::kind), Some(NodeKind::Text(_)))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::tag)
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id).is_some_and(|t| t == tag)
    }

    // ---- tree navigation -------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    fn sibling_index(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|c| *c == id)?;
        Some((parent, index))
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.sibling_index(id)?;
        index.checked_sub(1).map(|i| self.children(parent)[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.sibling_index(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.previous_sibling(id);
        while let Some(node) = cursor {
            if self.is_element(node) {
                return Some(node);
            }
            cursor = self.previous_sibling(node);
        }
        None
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.next_sibling(id);
        while let Some(node) = cursor {
            if self.is_element(node) {
                return Some(node);
            }
            cursor = self.next_sibling(node);
        }
        None
    }

    /// Element ancestors from the parent outwards.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent_element(id);
        while let Some(node) = cursor {
            out.push(node);
            cursor = self.parent_element(node);
        }
        out
    }

    /// Element descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for child in self.children(id) {
            self.collect_elements(*child, &mut out);
        }
        out
    }

    fn collect_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if self.is_element(id) {
            out.push(id);
        }
        for child in self.children(id) {
            self.collect_elements(*child, out);
        }
    }

    /// Every connected element in document order.
    pub fn all_elements(&self) -> Vec<NodeId> {
        self.descendants(self.root)
    }

    /// Text nodes under `id` in document order.
    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if self.is_text(node) {
                out.push(node);
            }
            for child in self.children(node).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.node(id).is_some() && self.contains(self.root, id)
    }

    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root).into_iter().next()
    }

    pub fn body(&self) -> Option<NodeId> {
        self.all_elements().into_iter().find(|n| self.is_tag(*n, "body"))
    }

    pub fn title(&self) -> String {
        self.all_elements()
            .into_iter()
            .find(|n| self.is_tag(*n, "title"))
            .map(|n| self.text_content(n).trim().to_string())
            .unwrap_or_default()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.all_elements()
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    // ---- attributes ------------------------------------------------------

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    /// Attribute value trimmed, with empty values treated as absent.
    pub fn attr_non_empty(&self, id: NodeId, name: &str) -> Option<String> {
        self.attr(id, name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<bool> {
        Ok(self.element_mut(id)?.remove_attr(name))
    }

    pub fn has_class(&self, id: NodeId, class_name: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class_name))
    }

    pub fn class_name(&self, id: NodeId) -> &str {
        self.element(id).map(ElementData::class_name).unwrap_or("")
    }

    pub fn add_class(&mut self, id: NodeId, class_name: &str) -> DomResult<()> {
        if self.has_class(id, class_name) {
            return Ok(());
        }
        let joined = match self.attr(id, "class").map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class_name),
            _ => class_name.to_string(),
        };
        self.set_attribute(id, "class", &joined)
    }

    pub fn remove_class(&mut self, id: NodeId, class_name: &str) -> DomResult<()> {
        let remaining = self
            .element(id)
            .ok_or(DomError::NotAnElement(id))?
            .classes()
            .filter(|c| *c != class_name)
            .collect::<Vec<_>>()
            .join(" ");
        if remaining.is_empty() {
            self.remove_attribute(id, "class")?;
            Ok(())
        } else {
            self.set_attribute(id, "class", &remaining)
        }
    }

    // ---- text ------------------------------------------------------------

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.push_text(id, &mut out);
        out
    }

    fn push_text(&self, id: NodeId, out: &mut String) {
        match self.node(id).map(Node::kind) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Element(_)) | Some(NodeKind::Document) => {
                for child in self.children(id) {
                    self.push_text(*child, out);
                }
            }
            _ => {}
        }
    }

    /// Text content with whitespace runs collapsed.
    pub fn normalized_text(&self, id: NodeId) -> String {
        self.text_content(id)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(existing) | NodeKind::Comment(existing) => {
                *existing = text.to_string();
                return Ok(());
            }
            NodeKind::Document => {
                return Err(DomError::Hierarchy("cannot set text of the document".into()))
            }
            NodeKind::Element(_) => {}
        }
        self.clear_children(id)?;
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        if self.is_tag(id, "textarea") {
            self.element_mut(id)?.value = text.to_string();
        }
        Ok(())
    }

    pub(crate) fn set_text_data(&mut self, id: NodeId, text: String) -> DomResult<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(existing) => {
                *existing = text;
                Ok(())
            }
            _ => Err(DomError::Hierarchy(format!("{} is not a text node", id))),
        }
    }

    // ---- construction and mutation ---------------------------------------

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element(ElementData::new(tag, Vec::new())))
    }

    pub fn create_element_with_attrs(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.push_node(NodeKind::Element(ElementData::new(tag, attrs)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Comment(text.to_string()))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference` (or at the end).
    /// The child is detached from any previous parent first.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.node_ref(child)?;
        match self.node_ref(parent)?.kind {
            NodeKind::Text(_) | NodeKind::Comment(_) => {
                return Err(DomError::Hierarchy(format!("{} cannot have children", parent)))
            }
            _ => {}
        }
        if child == self.root || self.contains(child, parent) {
            return Err(DomError::Hierarchy(format!(
                "cannot insert {} into its own subtree",
                child
            )));
        }
        self.detach(child)?;
        let index = match reference {
            Some(reference) => self
                .children(parent)
                .iter()
                .position(|c| *c == reference)
                .ok_or_else(|| {
                    DomError::Hierarchy(format!("{} is not a child of {}", reference, parent))
                })?,
            None => self.children(parent).len(),
        };
        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn insert_after(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> DomResult<()> {
        let next = self.next_sibling(reference).filter(|n| *n != child);
        self.insert_before(parent, child, next)
    }

    fn detach(&mut self, id: NodeId) -> DomResult<()> {
        if let Some(parent) = self.parent(id) {
            self.node_mut(parent)?.children.retain(|c| *c != id);
            self.node_mut(id)?.parent = None;
        }
        Ok(())
    }

    /// Detach a node from the tree. The node and its subtree stay readable.
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        if id == self.root {
            return Err(DomError::Hierarchy("cannot remove the document".into()));
        }
        self.node_ref(id)?;
        if self.focused.is_some_and(|f| self.contains(id, f)) {
            self.focused = None;
        }
        self.detach(id)
    }

    pub fn clear_children(&mut self, id: NodeId) -> DomResult<()> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// Replace `id` by its own children, keeping their order.
    pub fn unwrap_element(&mut self, id: NodeId) -> DomResult<()> {
        let parent = self
            .parent(id)
            .ok_or_else(|| DomError::Hierarchy(format!("{} is detached", id)))?;
        for child in self.children(id).to_vec() {
            self.insert_before(parent, child, Some(id))?;
        }
        self.remove(id)?;
        self.normalize(parent)
    }

    /// Merge adjacent text nodes directly under `id`.
    pub fn normalize(&mut self, id: NodeId) -> DomResult<()> {
        let children = self.children(id).to_vec();
        let mut previous_text: Option<NodeId> = None;
        for child in children {
            match self.node(child).and_then(Node::as_text).map(str::to_string) {
                Some(text) => match previous_text {
                    Some(prev) => {
                        let merged = format!("{}{}", self.text_content(prev), text);
                        self.set_text_data(prev, merged)?;
                        self.remove(child)?;
                    }
                    None => previous_text = Some(child),
                },
                None => previous_text = None,
            }
        }
        Ok(())
    }

    /// Split a text node at a character offset; returns the new node holding
    /// the tail, inserted right after the original.
    pub fn split_text(&mut self, id: NodeId, char_offset: usize) -> DomResult<NodeId> {
        let text = self
            .node(id)
            .and_then(Node::as_text)
            .ok_or_else(|| DomError::Hierarchy(format!("{} is not a text node", id)))?
            .to_string();
        let char_count = text.chars().count();
        if char_offset > char_count {
            return Err(DomError::OffsetOutOfRange(format!(
                "{} > {} in {}",
                char_offset, char_count, id
            )));
        }
        let byte_offset = byte_index(&text, char_offset);
        let (head, tail) = text.split_at(byte_offset);
        let tail_node = self.create_text(tail);
        self.set_text_data(id, head.to_string())?;
        if let Some(parent) = self.parent(id) {
            self.insert_after(parent, tail_node, id)?;
        }
        Ok(tail_node)
    }

    // ---- form controls ---------------------------------------------------

    pub fn input_type(&self, id: NodeId) -> Option<String> {
        if !self.is_tag(id, "input") {
            return None;
        }
        Some(
            self.attr(id, "type")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "text".to_string()),
        )
    }

    pub fn is_text_control(&self, id: NodeId) -> bool {
        match self.tag(id) {
            Some("textarea") => true,
            Some("input") => !matches!(
                self.input_type(id).as_deref(),
                Some(
                    "checkbox" | "radio" | "submit" | "button" | "reset" | "file" | "image"
                        | "hidden" | "range" | "color"
                )
            ),
            _ => false,
        }
    }

    pub fn is_content_editable(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            match self.attr(node, "contenteditable").map(str::to_ascii_lowercase) {
                Some(v) if v.is_empty() || v == "true" || v == "plaintext-only" => return true,
                Some(v) if v == "false" => return false,
                _ => {}
            }
            cursor = self.parent_element(node);
        }
        false
    }

    /// Current value as a script would read `element.value`.
    pub fn value(&self, id: NodeId) -> String {
        match self.tag(id) {
            Some("input") | Some("textarea") | Some("button") => {
                self.element(id).map(|e| e.value.clone()).unwrap_or_default()
            }
            Some("select") => self
                .selected_option(id)
                .map(|o| self.option_value(o))
                .unwrap_or_default(),
            Some("option") => self.option_value(id),
            _ => self.attr(id, "value").unwrap_or("").to_string(),
        }
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> DomResult<()> {
        let tag = self.tag(id).map(str::to_string);
        match tag.as_deref() {
            Some("select") => {
                let option = self
                    .select_options(id)
                    .into_iter()
                    .find(|o| self.option_value(*o) == value);
                match option {
                    Some(option) => self.set_selected_option(id, option),
                    None => {
                        for option in self.select_options(id) {
                            self.element_mut(option)?.selected = false;
                        }
                        Ok(())
                    }
                }
            }
            Some(_) => {
                self.element_mut(id)?.value = value.to_string();
                Ok(())
            }
            None => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn option_value(&self, option: NodeId) -> String {
        match self.attr(option, "value") {
            Some(v) => v.to_string(),
            None => self.normalized_text(option),
        }
    }

    pub fn select_options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|n| self.is_tag(*n, "option"))
            .collect()
    }

    /// Explicitly selected option, else the first one (single-select rules).
    pub fn selected_option(&self, select: NodeId) -> Option<NodeId> {
        let options = self.select_options(select);
        options
            .iter()
            .copied()
            .find(|o| self.element(*o).is_some_and(|e| e.selected))
            .or_else(|| options.first().copied())
    }

    pub fn set_selected_option(&mut self, select: NodeId, option: NodeId) -> DomResult<()> {
        for candidate in self.select_options(select) {
            self.element_mut(candidate)?.selected = candidate == option;
        }
        Ok(())
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|e| e.checked)
    }

    /// Set checked state; checking a radio unchecks its named group.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> DomResult<()> {
        if checked && self.input_type(id).as_deref() == Some("radio") {
            if let Some(name) = self.attr_non_empty(id, "name") {
                let scope = self.ancestors(id).into_iter().find(|a| self.is_tag(*a, "form"));
                let scope = scope.unwrap_or(self.root);
                for other in self.descendants(scope) {
                    if other != id
                        && self.input_type(other).as_deref() == Some("radio")
                        && self.attr(other, "name") == Some(name.as_str())
                    {
                        self.element_mut(other)?.checked = false;
                    }
                }
            }
        }
        self.element_mut(id)?.checked = checked;
        Ok(())
    }

    pub fn is_disabled(&self, id: NodeId) -> bool {
        if self.has_attr(id, "disabled") {
            return true;
        }
        self.ancestors(id)
            .into_iter()
            .any(|a| self.is_tag(a, "fieldset") && self.has_attr(a, "disabled"))
    }

    pub fn files(&self, id: NodeId) -> &[AttachedFile] {
        self.element(id).map(|e| e.files.as_slice()).unwrap_or(&[])
    }

    pub fn set_files(&mut self, id: NodeId, files: Vec<AttachedFile>) -> DomResult<()> {
        self.element_mut(id)?.files = files;
        Ok(())
    }

    // ---- focus -----------------------------------------------------------

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn set_focus(&mut self, id: Option<NodeId>) {
        self.focused = id;
    }

    /// Elements reachable with the Tab key, in document order.
    pub fn focusable_elements(&self) -> Vec<NodeId> {
        self.all_elements()
            .into_iter()
            .filter(|n| {
                if self.is_disabled(*n) {
                    return false;
                }
                if let Some(index) = self.attr(*n, "tabindex") {
                    return index.trim().parse::<i32>().map(|i| i >= 0).unwrap_or(false);
                }
                match self.tag(*n) {
                    Some("input") => self.input_type(*n).as_deref() != Some("hidden"),
                    Some("button") | Some("select") | Some("textarea") => true,
                    Some("a") => self.has_attr(*n, "href"),
                    _ => self.is_content_editable(*n),
                }
            })
            .collect()
    }

    // ---- window ----------------------------------------------------------

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }
}

pub(crate) fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        doc.append_child(doc.root(), body).unwrap();
        let a = doc.create_element("p");
        let b = doc.create_element("p");
        doc.append_child(body, a).unwrap();
        doc.append_child(body, b).unwrap();
        (doc, body, a, b)
    }

    #[test]
    fn removed_nodes_stay_readable_but_disconnected() {
        let (mut doc, _, a, _) = sample();
        doc.set_text_content(a, "hello").unwrap();
        doc.remove(a).unwrap();
        assert!(!doc.is_connected(a));
        assert_eq!(doc.text_content(a), "hello");
    }

    #[test]
    fn insert_before_moves_existing_child() {
        let (mut doc, body, a, b) = sample();
        doc.insert_before(body, b, Some(a)).unwrap();
        assert_eq!(doc.element_children(body), vec![b, a]);
    }

    #[test]
    fn cannot_insert_into_own_subtree() {
        let (mut doc, body, a, _) = sample();
        assert!(matches!(
            doc.append_child(a, body),
            Err(DomError::Hierarchy(_))
        ));
    }

    #[test]
    fn split_and_normalize_text() {
        let (mut doc, _, a, _) = sample();
        doc.set_text_content(a, "héllo world").unwrap();
        let text = doc.children(a)[0];
        let tail = doc.split_text(text, 5).unwrap();
        assert_eq!(doc.text_content(text), "héllo");
        assert_eq!(doc.text_content(tail), " world");
        doc.normalize(a).unwrap();
        assert_eq!(doc.children(a).len(), 1);
        assert_eq!(doc.text_content(a), "héllo world");
    }

    #[test]
    fn radio_group_is_exclusive() {
        let (mut doc, body, _, _) = sample();
        let first = doc.create_element_with_attrs(
            "input",
            vec![("type".into(), "radio".into()), ("name".into(), "g".into())],
        );
        let second = doc.create_element_with_attrs(
            "input",
            vec![("type".into(), "radio".into()), ("name".into(), "g".into())],
        );
        doc.append_child(body, first).unwrap();
        doc.append_child(body, second).unwrap();
        doc.set_checked(first, true).unwrap();
        doc.set_checked(second, true).unwrap();
        assert!(!doc.is_checked(first));
        assert!(doc.is_checked(second));
    }

    #[test]
    fn class_helpers_edit_class_attribute() {
        let (mut doc, _, a, _) = sample();
        doc.add_class(a, "one").unwrap();
        doc.add_class(a, "two").unwrap();
        assert_eq!(doc.attr(a, "class"), Some("one two"));
        doc.remove_class(a, "one").unwrap();
        assert_eq!(doc.attr(a, "class"), Some("two"));
    }
}
