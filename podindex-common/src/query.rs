//! Typed tag filter expressions
//!
//! The tag store accepts a boolean filter language over tag kind, name, value
//! attributes and containment relations:
//!
//! ```text
//! filetag and kind "guest" and samefile {kind "entities"}
//! ```
//!
//! Filters are built as predicate trees and rendered with every string
//! literal escaped, so user-selected values can never change the shape of
//! the expression.
//!
//! # Examples
//! ```
//! use podindex_common::TagFilter;
//!
//! let filter = TagFilter::FileTag
//!     .and(TagFilter::kind("guest"))
//!     .and(TagFilter::same_file(TagFilter::kind("entities")));
//! assert_eq!(
//!     filter.to_string(),
//!     r#"filetag and kind "guest" and samefile {kind "entities"}"#
//! );
//! ```

use std::fmt;

/// Predicate tree over tags
#[derive(Debug, Clone, PartialEq)]
pub enum TagFilter {
    /// Tag attached to a whole document
    FileTag,
    /// Tag attached to a block
    BlockTag,
    Kind(String),
    Name(String),
    /// `value("key") = "value"`
    ValueEquals { key: String, value: String },
    FileId(String),
    /// Another tag matching the inner filter exists in the same document
    SameFile(Box<TagFilter>),
    /// Another tag matching the inner filter overlaps this tag's span
    Overlaps(Box<TagFilter>),
    And(Vec<TagFilter>),
    Or(Vec<TagFilter>),
    Not(Box<TagFilter>),
}

impl TagFilter {
    pub fn kind(kind: impl Into<String>) -> Self {
        TagFilter::Kind(kind.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        TagFilter::Name(name.into())
    }

    pub fn value_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        TagFilter::ValueEquals {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn file_id(id: impl Into<String>) -> Self {
        TagFilter::FileId(id.into())
    }

    pub fn same_file(inner: TagFilter) -> Self {
        TagFilter::SameFile(Box::new(inner))
    }

    pub fn overlaps(inner: TagFilter) -> Self {
        TagFilter::Overlaps(Box::new(inner))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: TagFilter) -> Self {
        TagFilter::Not(Box::new(inner))
    }

    /// Conjunction, flattening nested `And`s
    pub fn and(self, other: TagFilter) -> Self {
        match (self, other) {
            (TagFilter::And(mut left), TagFilter::And(right)) => {
                left.extend(right);
                TagFilter::And(left)
            }
            (TagFilter::And(mut left), right) => {
                left.push(right);
                TagFilter::And(left)
            }
            (left, TagFilter::And(mut right)) => {
                right.insert(0, left);
                TagFilter::And(right)
            }
            (left, right) => TagFilter::And(vec![left, right]),
        }
    }

    /// Disjunction of alternatives; a single alternative is returned as is
    pub fn any_of(mut alternatives: Vec<TagFilter>) -> Self {
        if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            TagFilter::Or(alternatives)
        }
    }

    fn is_compound(&self) -> bool {
        match self {
            TagFilter::And(items) | TagFilter::Or(items) => items.len() > 1,
            _ => false,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_compound() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Quote a string literal for the filter language
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagFilter::FileTag => write!(f, "filetag"),
            TagFilter::BlockTag => write!(f, "blocktag"),
            TagFilter::Kind(kind) => write!(f, "kind {}", quote(kind)),
            TagFilter::Name(name) => write!(f, "name {}", quote(name)),
            TagFilter::ValueEquals { key, value } => {
                write!(f, "value({}) = {}", quote(key), quote(value))
            }
            TagFilter::FileId(id) => write!(f, "file_id {}", quote(id)),
            TagFilter::SameFile(inner) => write!(f, "samefile {{{}}}", inner),
            TagFilter::Overlaps(inner) => write!(f, "overlaps {{{}}}", inner),
            TagFilter::And(items) => write_joined(f, items, " and "),
            TagFilter::Or(items) => write_joined(f, items, " or "),
            TagFilter::Not(inner) => {
                write!(f, "not ")?;
                inner.fmt_operand(f)
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TagFilter], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        item.fmt_operand(f)?;
    }
    Ok(())
}
