//! Reading the extension identifier off a management page snapshot.
//!
//! The browser's extension-management page renders each installed
//! extension as a custom element nested several shadow trees deep under a
//! manager element. No API reports the identifier of the extension the
//! harness just loaded, so it is read from the entry's `id` attribute.
//!
//! When several entries are present the default rule takes the last one in
//! document order, on the assumption that the most recently loaded
//! extension is appended last. That is a heuristic, not a guarantee;
//! [`Pick::NamedOrLast`] narrows it with the bundle's manifest name.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SelectionError, SelectorError};
use crate::node::{DomNode, shadow_roots};
use crate::selector::Selector;
use crate::traverse::{deep_query, query_all};

/// Element names and attributes of the management page.
#[derive(Debug, Clone)]
pub struct ManagementLayout {
    /// Manager root element, expected in the document's light tree.
    pub manager: Selector,
    /// One extension entry, somewhere under the manager's shadow tree.
    pub item: Selector,
    /// Attribute of an entry carrying the identifier.
    pub id_attribute: String,
    /// Displayed name inside an entry's shadow tree.
    pub name: Option<Selector>,
}

impl ManagementLayout {
    /// Build a layout from selector strings.
    pub fn new(
        manager: &str,
        item: &str,
        id_attribute: impl Into<String>,
        name: Option<&str>,
    ) -> Result<Self, SelectorError> {
        Ok(Self {
            manager: Selector::parse(manager)?,
            item: Selector::parse(item)?,
            id_attribute: id_attribute.into(),
            name: name
                .filter(|s| !s.trim().is_empty())
                .map(Selector::parse)
                .transpose()?,
        })
    }
}

/// Entry selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick<'a> {
    /// Last entry in document order.
    Last,
    /// Last entry whose displayed name equals the given name, else the last
    /// entry.
    NamedOrLast(&'a str),
}

/// One extension entry as seen on the management page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionCandidate {
    /// Position in document order.
    pub index: usize,
    /// Identifier attribute value.
    pub id: Option<String>,
    /// Displayed name, when the layout has a name selector and it matched.
    pub name: Option<String>,
}

/// Outcome of a successful selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSelection {
    /// Identifier of the chosen entry.
    pub id: String,
    /// Position of the chosen entry among `candidates`.
    pub index: usize,
    /// Every entry found, in document order.
    pub candidates: Vec<ExtensionCandidate>,
}

/// Pick an extension identifier out of a pierced document snapshot.
pub fn select_extension(
    document: &DomNode,
    layout: &ManagementLayout,
    pick: Pick<'_>,
) -> Result<ExtensionSelection, SelectionError> {
    let manager = query_all(document, &|node: &DomNode| layout.manager.matches(node))
        .into_iter()
        .next()
        .ok_or_else(|| SelectionError::ManagerMissing {
            selector: layout.manager.to_string(),
        })?;

    if !manager.hosts_shadow() {
        return Err(SelectionError::ManagerWithoutShadowRoot {
            selector: layout.manager.to_string(),
        });
    }

    let is_item = |node: &DomNode| layout.item.matches(node);
    let items: Vec<&DomNode> = manager
        .shadow_roots
        .iter()
        .flat_map(|root| deep_query(root, &shadow_roots, &is_item))
        .collect();

    if items.is_empty() {
        return Err(SelectionError::NoItems {
            selector: layout.item.to_string(),
        });
    }

    let candidates: Vec<ExtensionCandidate> = items
        .iter()
        .enumerate()
        .map(|(index, item)| ExtensionCandidate {
            index,
            id: item.attribute(&layout.id_attribute).map(str::to_string),
            name: display_name(item, layout.name.as_ref()),
        })
        .collect();

    for candidate in &candidates {
        debug!(
            index = candidate.index,
            id = ?candidate.id,
            name = ?candidate.name,
            "Extension entry"
        );
    }

    let last = candidates.len() - 1;
    let index = match pick {
        Pick::Last => last,
        Pick::NamedOrLast(wanted) => candidates
            .iter()
            .rposition(|c| c.name.as_deref() == Some(wanted))
            .unwrap_or(last),
    };

    let id = candidates[index]
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SelectionError::MissingIdentifier {
            index,
            attribute: layout.id_attribute.clone(),
        })?;

    Ok(ExtensionSelection {
        id,
        index,
        candidates,
    })
}

fn display_name(item: &DomNode, selector: Option<&Selector>) -> Option<String> {
    let selector = selector?;
    let is_name = |node: &DomNode| selector.matches(node);
    deep_query(item, &shadow_roots, &is_name)
        .first()
        .map(|node| node.text_content())
        .filter(|text| !text.is_empty())
}
