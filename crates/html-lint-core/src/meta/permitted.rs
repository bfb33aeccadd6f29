//! Permitted-content rule lists.
//!
//! A rule list is a disjunction of entries. An entry is a tag name
//! (optionally suffixed `?` or `*`), a category such as `@flow`, a group
//! (array) of entries that must all match, or `{ exclude = ... }`. Exclude
//! entries anywhere in the list veto the whole list.

use serde::{Deserialize, Serialize};

use super::{Category, MetaElement};
use crate::error::MetaError;

/// Raw rule entry as written in metadata or configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermittedEntry {
    /// Tag name or `@category`.
    Name(String),
    /// Nested group.
    Group(Vec<PermittedEntry>),
    /// Veto.
    Exclude {
        /// Tag names or categories to reject.
        exclude: OneOrMany,
    },
}

/// A single name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// Single name.
    One(String),
    /// List of names.
    Many(Vec<String>),
}

impl OneOrMany {
    fn names(&self) -> Vec<&str> {
        match self {
            Self::One(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Occurrence limit of a tag term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Qualifier {
    /// `*` or no suffix: any number.
    #[default]
    Any,
    /// `?`: at most one.
    Optional,
}

/// Compiled rule term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Exact (case-sensitive) tag name.
    Tag {
        /// Tag name without qualifier.
        name: String,
        /// Occurrence limit.
        qualifier: Qualifier,
    },
    /// Category membership.
    Category {
        /// Category to test.
        category: Category,
        /// Occurrence limit.
        qualifier: Qualifier,
    },
    /// Every member must match.
    All(Vec<Term>),
    /// At least one member must match.
    Any(Vec<Term>),
}

impl Term {
    /// Parses a tag name or `@category` with an optional `?`/`*` suffix.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown category.
    pub fn parse(element: &str, raw: &str) -> Result<Self, MetaError> {
        let (name, qualifier) = match raw.strip_suffix('?') {
            Some(name) => (name, Qualifier::Optional),
            None => (raw.strip_suffix('*').unwrap_or(raw), Qualifier::Any),
        };
        if name.is_empty() {
            return Err(MetaError::InvalidRule {
                element: element.to_owned(),
                message: format!("empty term `{raw}`"),
            });
        }
        if name.starts_with('@') {
            let category = name.parse().map_err(|()| MetaError::UnknownCategory {
                element: element.to_owned(),
                category: name.to_owned(),
            })?;
            Ok(Self::Category {
                category,
                qualifier,
            })
        } else {
            Ok(Self::Tag {
                name: name.to_owned(),
                qualifier,
            })
        }
    }

    /// Tests whether an element matches this term.
    ///
    /// `default_match` is the answer for category terms on elements without
    /// metadata; tag terms always compare names.
    #[must_use]
    pub fn matches(&self, tag_name: &str, meta: Option<&MetaElement>, default_match: bool) -> bool {
        match self {
            Self::Tag { name, .. } => name == tag_name,
            Self::Category { category, .. } => {
                meta.map_or(default_match, |meta| category.matches(meta))
            }
            Self::All(terms) => terms
                .iter()
                .all(|t| t.matches(tag_name, meta, default_match)),
            Self::Any(terms) => terms
                .iter()
                .any(|t| t.matches(tag_name, meta, default_match)),
        }
    }

    /// Occurrence limit for tag and category terms.
    #[must_use]
    pub fn qualifier(&self) -> Qualifier {
        match self {
            Self::Tag { qualifier, .. } | Self::Category { qualifier, .. } => *qualifier,
            Self::All(_) | Self::Any(_) => Qualifier::Any,
        }
    }
}

/// Compiled rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permitted {
    /// Positive terms, any of which may match.
    pub terms: Vec<Term>,
    /// Excluded terms collected from the whole list.
    pub exclude: Vec<Term>,
}

impl Permitted {
    /// Compiles raw entries for `element`.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown categories or empty terms.
    pub fn compile(element: &str, entries: &[PermittedEntry]) -> Result<Self, MetaError> {
        let mut exclude = Vec::new();
        let terms = compile_entries(element, entries, 0, &mut exclude)?;
        Ok(Self { terms, exclude })
    }

    /// True when the element matches a positive term and no exclude term.
    ///
    /// A list made only of excludes accepts everything not excluded; an
    /// empty list accepts nothing.
    #[must_use]
    pub fn allows(&self, tag_name: &str, meta: Option<&MetaElement>) -> bool {
        let positive = if self.terms.is_empty() {
            !self.exclude.is_empty()
        } else {
            self.terms.iter().any(|t| t.matches(tag_name, meta, true))
        };
        positive && !self.excludes(tag_name, meta)
    }

    /// True when the element matches an exclude term.
    #[must_use]
    pub fn excludes(&self, tag_name: &str, meta: Option<&MetaElement>) -> bool {
        self.exclude.iter().any(|t| t.matches(tag_name, meta, false))
    }
}

fn compile_entries(
    element: &str,
    entries: &[PermittedEntry],
    depth: usize,
    exclude: &mut Vec<Term>,
) -> Result<Vec<Term>, MetaError> {
    let mut terms = Vec::new();
    for entry in entries {
        match entry {
            PermittedEntry::Name(raw) => terms.push(Term::parse(element, raw)?),
            PermittedEntry::Group(inner) => {
                let members = compile_entries(element, inner, depth + 1, exclude)?;
                if members.is_empty() {
                    continue;
                }
                // top level is OR, then AND, OR, ... by nesting depth
                terms.push(if depth % 2 == 0 {
                    Term::All(members)
                } else {
                    Term::Any(members)
                });
            }
            PermittedEntry::Exclude { exclude: names } => {
                for name in names.names() {
                    exclude.push(Term::parse(element, name)?);
                }
            }
        }
    }
    Ok(terms)
}
