//! Owned DOM snapshot.
//!
//! A [`DomNode`] tree mirrors what the DevTools protocol returns for a
//! pierced `DOM.getDocument` call: every node keeps its light-DOM children
//! and, separately, the shadow roots it hosts.

use serde::{Deserialize, Serialize};

use crate::traverse::TreeNode;

/// Node categories the harness distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The document node.
    Document,
    /// An element.
    #[default]
    Element,
    /// A shadow root (document fragment attached to a host element).
    ShadowRoot,
    /// A text node.
    Text,
    /// Comments, doctypes and anything else.
    Other,
}

impl NodeKind {
    /// Map a DOM `nodeType` value.
    pub fn from_node_type(node_type: i64) -> Self {
        match node_type {
            1 => Self::Element,
            3 => Self::Text,
            9 => Self::Document,
            11 => Self::ShadowRoot,
            _ => Self::Other,
        }
    }
}

/// A node in a DOM snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomNode {
    /// Node category.
    pub kind: NodeKind,
    /// Lower-case local name for elements, empty otherwise.
    pub tag: String,
    /// Attributes in source order.
    pub attributes: Vec<(String, String)>,
    /// Text content for text nodes, empty otherwise.
    pub text: String,
    /// Light-DOM children.
    pub children: Vec<DomNode>,
    /// Shadow roots hosted by this node.
    pub shadow_roots: Vec<DomNode>,
}

impl DomNode {
    /// A document node with the given children.
    pub fn document(children: Vec<DomNode>) -> Self {
        Self {
            kind: NodeKind::Document,
            children,
            ..Default::default()
        }
    }

    /// An element with the given tag and no attributes or children.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Element,
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// A shadow root with the given children.
    pub fn shadow_root(children: Vec<DomNode>) -> Self {
        Self {
            kind: NodeKind::ShadowRoot,
            children,
            ..Default::default()
        }
    }

    /// A text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            text: value.into(),
            ..Default::default()
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder: append a light-DOM child.
    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder: attach a shadow root holding `children`.
    pub fn with_shadow(mut self, children: Vec<DomNode>) -> Self {
        self.shadow_roots.push(DomNode::shadow_root(children));
        self
    }

    /// Whether this node is an element.
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Value of an attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Whether the node hosts at least one shadow root.
    pub fn hosts_shadow(&self) -> bool {
        !self.shadow_roots.is_empty()
    }

    /// Concatenated text of all light-DOM text descendants, trimmed.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out.trim().to_string()
    }

    /// Total number of nodes in this subtree, shadow trees included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(DomNode::node_count).sum::<usize>()
            + self
                .shadow_roots
                .iter()
                .map(DomNode::node_count)
                .sum::<usize>()
    }
}

fn collect_text(node: &DomNode, out: &mut String) {
    if node.kind == NodeKind::Text {
        out.push_str(&node.text);
    }
    for child in &node.children {
        collect_text(child, out);
    }
}

impl TreeNode for DomNode {
    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// Expand function for [`crate::traverse::deep_query`] over snapshots:
/// a node's concealed subtrees are its shadow roots.
pub fn shadow_roots(node: &DomNode) -> &[DomNode] {
    &node.shadow_roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_lookup_is_case_insensitive() {
        let node = DomNode::element("DIV").with_attr("Data-Hooks-Ready", "true");
        assert_eq!(node.tag, "div");
        assert_eq!(node.attribute("data-hooks-ready"), Some("true"));
        assert_eq!(node.attribute("missing"), None);
    }

    #[test]
    fn test_text_content_ignores_shadow_trees() {
        let node = DomNode::element("div")
            .with_child(DomNode::text("  Hook "))
            .with_child(DomNode::element("span").with_child(DomNode::text("Test  ")))
            .with_shadow(vec![DomNode::text("hidden")]);
        assert_eq!(node.text_content(), "Hook Test");
    }

    #[test]
    fn test_node_count_includes_shadow_roots() {
        let node = DomNode::document(vec![
            DomNode::element("a").with_shadow(vec![DomNode::element("b")]),
        ]);
        // document, a, shadow root, b
        assert_eq!(node.node_count(), 4);
    }

    #[test]
    fn test_node_kind_mapping() {
        assert_eq!(NodeKind::from_node_type(1), NodeKind::Element);
        assert_eq!(NodeKind::from_node_type(11), NodeKind::ShadowRoot);
        assert_eq!(NodeKind::from_node_type(8), NodeKind::Other);
    }
}
