//! In-memory document model for the simulated application.
//!
//! Nodes live in an arena indexed by [`NodeId`]; the tree is walked in
//! document order (pre-order from the root).

use std::collections::BTreeMap;

/// Index of a node in its [`Document`]
pub type NodeId = usize;

/// Element builder used by the views
#[derive(Debug, Clone)]
pub struct El {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    visible: bool,
}

impl El {
    /// Start an element with the given tag
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            text: String::new(),
            visible: true,
        }
    }

    /// Add a class
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        let entry = self.attrs.entry("class".to_string()).or_default();
        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(class);
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    /// Set a boolean attribute (`required`, `disabled`, ...)
    #[must_use]
    pub fn flag(self, name: &str) -> Self {
        self.attr(name, "")
    }

    /// Own text content
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Render hidden (`display: none`)
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// One element in the tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Lowercase tag name
    pub tag: String,
    attrs: BTreeMap<String, String>,
    /// Own text (children contribute their own)
    pub text: String,
    /// Whether the node itself is rendered
    pub visible: bool,
    /// Parent node, `None` for the root
    pub parent: Option<NodeId>,
    /// Children in document order
    pub children: Vec<NodeId>,
}

impl Node {
    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether the attribute is present
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Whether the class list contains `class`
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    /// Whether this is a text-entry control
    #[must_use]
    pub fn is_text_control(&self) -> bool {
        match self.tag.as_str() {
            "textarea" => true,
            "input" => !matches!(
                self.attr("type"),
                Some("submit" | "button" | "checkbox" | "radio" | "hidden")
            ),
            _ => false,
        }
    }

    /// Whether the node carries a form value
    #[must_use]
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "textarea" | "select")
    }

    /// Whether clicking this node submits its form
    #[must_use]
    pub fn is_submit(&self) -> bool {
        match self.tag.as_str() {
            "button" => matches!(self.attr("type"), None | Some("submit")),
            "input" => self.attr("type") == Some("submit"),
            _ => false,
        }
    }
}

/// A rendered page
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    nodes: Vec<Node>,
}

impl Document {
    /// Empty document with a `body` root
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            nodes: vec![Node {
                tag: "body".to_string(),
                attrs: BTreeMap::new(),
                text: String::new(),
                visible: true,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Document title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Root node
    #[must_use]
    pub const fn root(&self) -> NodeId {
        0
    }

    /// Append `el` as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, el: El) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            tag: el.tag,
            attrs: el.attrs,
            text: el.text,
            visible: el.visible,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Node by id
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Set an attribute on a node
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.attrs.insert(name.to_string(), value.into());
        }
    }

    /// Flip a node's own visibility
    pub fn toggle_visible(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.visible = !node.visible;
        }
    }

    /// Every node in document order
    #[must_use]
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = vec![self.root()];
        out.extend(self.descendants(self.root()));
        out
    }

    /// Descendants of `id` in document order, excluding `id`
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .node(id)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.node(next) {
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).and_then(|n| n.parent), move |&p| {
            self.node(p).and_then(|n| n.parent)
        })
    }

    /// Nearest ancestor with the given tag
    #[must_use]
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&a| self.node(a).is_some_and(|n| n.tag == tag))
    }

    /// Whether the node and all its ancestors are rendered
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if !node.visible || node.attr("type") == Some("hidden") {
            return false;
        }
        self.ancestors(id)
            .all(|a| self.node(a).is_some_and(|n| n.visible))
    }

    /// Rendered text: visible own and descendant text, whitespace collapsed
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if !self.is_visible(id) {
            return String::new();
        }
        let mut parts = Vec::new();
        self.collect_text(id, &mut parts);
        parts
            .iter()
            .flat_map(|p| p.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn collect_text<'a>(&'a self, id: NodeId, parts: &mut Vec<&'a str>) {
        let Some(node) = self.node(id) else {
            return;
        };
        if !node.visible || node.is_form_control() {
            return;
        }
        parts.push(&node.text);
        for &child in &node.children {
            self.collect_text(child, parts);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new("Sample");
        let root = doc.root();
        let card = doc.append(root, El::new("div").class("event-card").class("featured"));
        let title = doc.append(card, El::new("h3").class("event-title").text("  Tech \n Conference "));
        let menu = doc.append(root, El::new("div").class("menu").hidden());
        doc.append(menu, El::new("a").attr("href", "/logout").text("Log out"));
        (doc, card, title, menu)
    }

    #[test]
    fn test_classes() {
        let (doc, card, _, _) = sample();
        let node = doc.node(card).unwrap();
        assert!(node.has_class("event-card"));
        assert!(node.has_class("featured"));
        assert!(!node.has_class("event"));
    }

    #[test]
    fn test_text_is_collapsed() {
        let (doc, card, title, _) = sample();
        assert_eq!(doc.text_content(title), "Tech Conference");
        assert_eq!(doc.text_content(card), "Tech Conference");
    }

    #[test]
    fn test_hidden_subtree_has_no_text() {
        let (mut doc, _, _, menu) = sample();
        let link = doc.descendants(menu)[0];
        assert!(!doc.is_visible(link));
        assert_eq!(doc.text_content(link), "");

        doc.toggle_visible(menu);
        assert!(doc.is_visible(link));
        assert_eq!(doc.text_content(link), "Log out");
    }

    #[test]
    fn test_walk_is_document_order() {
        let (doc, card, title, menu) = sample();
        let order = doc.walk();
        assert_eq!(&order[..4], &[doc.root(), card, title, menu]);
    }

    #[test]
    fn test_closest() {
        let mut doc = Document::new("Form");
        let form = doc.append(doc.root(), El::new("form"));
        let group = doc.append(form, El::new("div"));
        let input = doc.append(group, El::new("input").attr("name", "email"));
        assert_eq!(doc.closest(input, "form"), Some(form));
        assert_eq!(doc.closest(form, "form"), None);
    }

    #[test]
    fn test_control_kinds() {
        let email = El::new("input").attr("type", "email");
        let mut doc = Document::new("Kinds");
        let e = doc.append(doc.root(), email);
        let b = doc.append(doc.root(), El::new("button"));
        let h = doc.append(doc.root(), El::new("input").attr("type", "hidden"));
        assert!(doc.node(e).unwrap().is_text_control());
        assert!(doc.node(b).unwrap().is_submit());
        assert!(!doc.node(h).unwrap().is_text_control());
        assert!(!doc.is_visible(h));
    }
}
