//! Pierced document snapshots.
//!
//! `DOM.getDocument` with `pierce: true` and unbounded depth returns the
//! whole tree including every shadow root. The protocol node is converted
//! into an owned [`DomNode`] so selection runs as plain Rust.

use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::dom::{GetDocumentParams, Node};
use exthooks_dom::{DomNode, NodeKind};

use crate::error::HarnessResult;

/// Fetch the full pierced document of `page`.
pub async fn pierced_document(page: &Page) -> HarnessResult<DomNode> {
    let params = GetDocumentParams::builder().depth(-1).pierce(true).build();
    let response = page.execute(params).await?;
    Ok(to_dom(&response.result.root))
}

/// Convert a protocol node and its descendants.
pub fn to_dom(node: &Node) -> DomNode {
    convert(
        node.node_type,
        &node.local_name,
        &node.node_value,
        node.attributes.as_deref(),
        node.children.iter().flatten().map(to_dom).collect(),
        node.shadow_roots.iter().flatten().map(to_dom).collect(),
    )
}

fn convert(
    node_type: i64,
    local_name: &str,
    node_value: &str,
    attributes: Option<&[String]>,
    children: Vec<DomNode>,
    shadow_roots: Vec<DomNode>,
) -> DomNode {
    let kind = NodeKind::from_node_type(node_type);
    DomNode {
        kind,
        tag: match kind {
            NodeKind::Element => local_name.to_ascii_lowercase(),
            _ => String::new(),
        },
        attributes: attributes.map(attribute_pairs).unwrap_or_default(),
        text: match kind {
            NodeKind::Text => node_value.to_string(),
            _ => String::new(),
        },
        children,
        shadow_roots,
    }
}

/// The protocol flattens attributes as `[name0, value0, name1, value1, ...]`.
fn attribute_pairs(flat: &[String]) -> Vec<(String, String)> {
    flat.chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}
