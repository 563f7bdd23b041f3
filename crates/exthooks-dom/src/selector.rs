//! Compound selectors.
//!
//! Supports a single compound selector: an optional tag (or `*`) followed by
//! any number of `#id`, `.class`, `[attr]` and `[attr="value"]` components.
//! Combinators are rejected; tree structure is handled by
//! [`crate::traverse`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SelectorError;
use crate::node::DomNode;

/// One `[name]` or `[name=value]` component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMatch {
    /// Attribute name.
    pub name: String,
    /// Required value; `None` means presence only.
    pub value: Option<String>,
}

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    source: String,
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

impl Selector {
    /// Parse a compound selector.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }

        let bytes = source.as_bytes();
        let mut selector = Selector {
            source: source.to_string(),
            tag: None,
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
        };

        let mut pos = 0;
        let (tag, next) = read_name(source, pos);
        if !tag.is_empty() {
            selector.tag = Some(tag.to_ascii_lowercase());
            pos = next;
        } else if bytes.first() == Some(&b'*') {
            pos = 1;
        }

        while pos < bytes.len() {
            match bytes[pos] {
                b'#' => {
                    let (name, next) = read_name(source, pos + 1);
                    if name.is_empty() {
                        return Err(empty_name(source, pos));
                    }
                    selector.id = Some(name.to_string());
                    pos = next;
                }
                b'.' => {
                    let (name, next) = read_name(source, pos + 1);
                    if name.is_empty() {
                        return Err(empty_name(source, pos));
                    }
                    selector.classes.push(name.to_string());
                    pos = next;
                }
                b'[' => {
                    let (attribute, next) = read_attribute(source, pos)?;
                    selector.attributes.push(attribute);
                    pos = next;
                }
                b' ' | b'\t' | b'\n' | b'>' | b'+' | b'~' | b',' => {
                    return Err(SelectorError::Combinator {
                        selector: source.to_string(),
                    });
                }
                _ => return Err(empty_name(source, pos)),
            }
        }

        Ok(selector)
    }

    /// Source text of the selector.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Required tag, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Whether `node` satisfies every component.
    pub fn matches(&self, node: &DomNode) -> bool {
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if node.tag != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|class| node.classes().any(|c| c == class))
        {
            return false;
        }
        self.attributes
            .iter()
            .all(|attr| match (node.attribute(&attr.name), &attr.value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            })
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn read_name(source: &str, start: usize) -> (&str, usize) {
    let bytes = source.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_name_byte(bytes[end]) {
        end += 1;
    }
    (&source[start..end], end)
}

fn empty_name(source: &str, offset: usize) -> SelectorError {
    SelectorError::EmptyName {
        selector: source.to_string(),
        offset,
    }
}

/// Parse `[name]` or `[name=value]` starting at the opening bracket.
fn read_attribute(source: &str, open: usize) -> Result<(AttributeMatch, usize), SelectorError> {
    let malformed = || SelectorError::MalformedAttribute {
        selector: source.to_string(),
    };
    let bytes = source.as_bytes();

    let (name, mut pos) = read_name(source, open + 1);
    if name.is_empty() {
        return Err(malformed());
    }

    match bytes.get(pos) {
        Some(b']') => Ok((
            AttributeMatch {
                name: name.to_string(),
                value: None,
            },
            pos + 1,
        )),
        Some(b'=') => {
            pos += 1;
            let value = match bytes.get(pos) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let rest = &source[pos + 1..];
                    let close = rest.find(quote as char).ok_or_else(malformed)?;
                    let value = &rest[..close];
                    pos += close + 2;
                    value
                }
                Some(_) => {
                    let (value, next) = read_name(source, pos);
                    if value.is_empty() {
                        return Err(malformed());
                    }
                    pos = next;
                    value
                }
                None => return Err(malformed()),
            };
            if bytes.get(pos) != Some(&b']') {
                return Err(malformed());
            }
            Ok((
                AttributeMatch {
                    name: name.to_string(),
                    value: Some(value.to_string()),
                },
                pos + 1,
            ))
        }
        _ => Err(malformed()),
    }
}
