//! # exthooks-dom
//!
//! Browser-independent DOM handling for the harness:
//!
//! - [`node::DomNode`]: an owned snapshot of a document, including the
//!   encapsulated ("shadow") subtrees that ordinary selector queries do not
//!   see.
//! - [`selector::Selector`]: compound selectors (`tag#id.class[attr="v"]`).
//! - [`traverse`]: a generic tree search that also descends into concealed
//!   subtrees, parameterized by an expand function and a match predicate.
//! - [`extensions`]: picking the extension entry off a management page
//!   snapshot.

pub mod error;
pub mod extensions;
pub mod node;
pub mod selector;
pub mod traverse;

pub use error::{SelectionError, SelectorError};
pub use extensions::{
    ExtensionCandidate, ExtensionSelection, ManagementLayout, Pick, select_extension,
};
pub use node::{DomNode, NodeKind};
pub use selector::Selector;
pub use traverse::{TreeNode, deep_query, query_all};
