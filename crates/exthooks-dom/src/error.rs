//! Errors raised while parsing selectors or reading a management page
//! snapshot.

use thiserror::Error;

/// A selector string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector was empty or only whitespace.
    #[error("Selector is empty")]
    Empty,

    /// Descendant/child combinators are not supported.
    #[error("Selector '{selector}' uses a combinator; only compound selectors are supported")]
    Combinator {
        /// The offending selector.
        selector: String,
    },

    /// A `#`, `.` or `[` was not followed by a name.
    #[error("Selector '{selector}' has an empty name at offset {offset}")]
    EmptyName {
        /// The offending selector.
        selector: String,
        /// Byte offset of the empty component.
        offset: usize,
    },

    /// An attribute component was not closed or its value was malformed.
    #[error("Selector '{selector}' has a malformed attribute component")]
    MalformedAttribute {
        /// The offending selector.
        selector: String,
    },
}

/// Why no extension identifier could be read from a management page
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The manager root element is not in the document.
    #[error("Management root '{selector}' not found; the management page never loaded")]
    ManagerMissing {
        /// Selector used for the manager element.
        selector: String,
    },

    /// The manager element exists but hosts no shadow tree.
    #[error("Management root '{selector}' has no shadow root")]
    ManagerWithoutShadowRoot {
        /// Selector used for the manager element.
        selector: String,
    },

    /// No extension entries were found in the manager's shadow tree.
    #[error("No '{selector}' entries found under the management root")]
    NoItems {
        /// Selector used for extension entries.
        selector: String,
    },

    /// The chosen entry has no identifier attribute.
    #[error("Extension entry {index} has no '{attribute}' attribute")]
    MissingIdentifier {
        /// Position of the entry in document order.
        index: usize,
        /// Attribute that was expected to carry the identifier.
        attribute: String,
    },
}
