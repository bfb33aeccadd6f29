//! Element metadata: content categories and content-model rules per tag.
//!
//! The built-in HTML5 table is embedded as TOML. Configuration can add
//! elements or replace existing ones with the same shape:
//!
//! ```toml
//! [my-widget]
//! flow = true
//! phrasing = true
//! permitted_content = ["@phrasing", { exclude = "a" }]
//! ```

mod permitted;
mod validator;

pub use permitted::{OneOrMany, Permitted, PermittedEntry, Qualifier, Term};
pub use validator::Validator;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::MetaError;

const HTML5: &str = include_str!("html5.toml");

/// Content category referenced as `@name` in rule lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `@meta`
    Metadata,
    /// `@flow`
    Flow,
    /// `@sectioning`
    Sectioning,
    /// `@heading`
    Heading,
    /// `@phrasing`
    Phrasing,
    /// `@embedded`
    Embedded,
    /// `@interactive`
    Interactive,
    /// `@foreign`
    Foreign,
    /// `@void`
    Void,
}

impl Category {
    /// True when `meta` belongs to this category.
    #[must_use]
    pub fn matches(self, meta: &MetaElement) -> bool {
        match self {
            Self::Metadata => meta.metadata,
            Self::Flow => meta.flow,
            Self::Sectioning => meta.sectioning,
            Self::Heading => meta.heading,
            Self::Phrasing => meta.phrasing,
            Self::Embedded => meta.embedded,
            Self::Interactive => meta.interactive,
            Self::Foreign => meta.foreign,
            Self::Void => meta.void,
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "@meta" => Ok(Self::Metadata),
            "@flow" => Ok(Self::Flow),
            "@sectioning" => Ok(Self::Sectioning),
            "@heading" => Ok(Self::Heading),
            "@phrasing" => Ok(Self::Phrasing),
            "@embedded" => Ok(Self::Embedded),
            "@interactive" => Ok(Self::Interactive),
            "@foreign" => Ok(Self::Foreign),
            "@void" => Ok(Self::Void),
            _ => Err(()),
        }
    }
}

/// Raw `transparent` value: `true` or a list of terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransparentDef {
    /// All children (or none when `false`).
    Flag(bool),
    /// Only children matching one of these terms.
    Terms(Vec<String>),
}

/// Raw element metadata as written in TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetaElementDef {
    /// Metadata content.
    pub metadata: bool,
    /// Flow content.
    pub flow: bool,
    /// Sectioning content.
    pub sectioning: bool,
    /// Heading content.
    pub heading: bool,
    /// Phrasing content.
    pub phrasing: bool,
    /// Embedded content.
    pub embedded: bool,
    /// Interactive content.
    pub interactive: bool,
    /// Foreign content (SVG, MathML).
    pub foreign: bool,
    /// Void element, never has an end tag.
    pub void: bool,
    /// Obsolete element.
    pub deprecated: bool,
    /// End tag may be omitted.
    pub optional_end: bool,
    /// Children delegate content validation to the parent.
    pub transparent: Option<TransparentDef>,
    /// Start tags that implicitly close this element.
    pub implicit_closed: Vec<String>,
    /// Attributes that must be present.
    pub required_attributes: Vec<String>,
    /// Allowed children.
    pub permitted_content: Option<Vec<PermittedEntry>>,
    /// Constraints on every descendant.
    pub permitted_descendants: Option<Vec<PermittedEntry>>,
    /// Required order of children.
    pub permitted_order: Option<Vec<String>>,
}

/// Which children of a transparent element delegate to its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Transparent {
    /// Not transparent.
    #[default]
    No,
    /// Every child.
    All,
    /// Children matching any of these terms.
    Only(Vec<Term>),
}

/// Compiled, shared metadata of one tag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct MetaElement {
    /// Tag name this entry describes.
    pub tag_name: String,
    /// Metadata content.
    pub metadata: bool,
    /// Flow content.
    pub flow: bool,
    /// Sectioning content.
    pub sectioning: bool,
    /// Heading content.
    pub heading: bool,
    /// Phrasing content.
    pub phrasing: bool,
    /// Embedded content.
    pub embedded: bool,
    /// Interactive content.
    pub interactive: bool,
    /// Foreign content.
    pub foreign: bool,
    /// Void element.
    pub void: bool,
    /// Obsolete element.
    pub deprecated: bool,
    /// End tag may be omitted.
    pub optional_end: bool,
    /// Transparency.
    pub transparent: Transparent,
    /// Lowercased start tags that implicitly close this element.
    pub implicit_closed: Vec<String>,
    /// Attributes that must be present.
    pub required_attributes: Vec<String>,
    /// Allowed children.
    pub permitted_content: Option<Permitted>,
    /// Constraints on every descendant.
    pub permitted_descendants: Option<Permitted>,
    /// Required order of children.
    pub permitted_order: Option<Vec<Term>>,
}

impl MetaElement {
    /// Compiles a raw definition.
    ///
    /// # Errors
    ///
    /// Returns an error when a rule list references an unknown category or
    /// contains an empty term.
    pub fn compile(tag_name: &str, def: &MetaElementDef) -> Result<Self, MetaError> {
        let transparent = match &def.transparent {
            None | Some(TransparentDef::Flag(false)) => Transparent::No,
            Some(TransparentDef::Flag(true)) => Transparent::All,
            Some(TransparentDef::Terms(terms)) => Transparent::Only(
                terms
                    .iter()
                    .map(|t| Term::parse(tag_name, t))
                    .collect::<Result<_, _>>()?,
            ),
        };
        let compile = |entries: &Option<Vec<PermittedEntry>>| {
            entries
                .as_deref()
                .map(|entries| Permitted::compile(tag_name, entries))
                .transpose()
        };
        let permitted_order = def
            .permitted_order
            .as_ref()
            .map(|order| {
                order
                    .iter()
                    .map(|t| Term::parse(tag_name, t))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(Self {
            tag_name: tag_name.to_owned(),
            metadata: def.metadata,
            flow: def.flow,
            sectioning: def.sectioning,
            heading: def.heading,
            phrasing: def.phrasing,
            embedded: def.embedded,
            interactive: def.interactive,
            foreign: def.foreign,
            void: def.void,
            deprecated: def.deprecated,
            optional_end: def.optional_end || !def.implicit_closed.is_empty(),
            transparent,
            implicit_closed: def
                .implicit_closed
                .iter()
                .map(|t| t.to_ascii_lowercase())
                .collect(),
            required_attributes: def.required_attributes.clone(),
            permitted_content: compile(&def.permitted_content)?,
            permitted_descendants: compile(&def.permitted_descendants)?,
            permitted_order,
        })
    }

    /// True when a start tag named `tag_name` implicitly closes this element.
    #[must_use]
    pub fn is_implicitly_closed_by(&self, tag_name: &str) -> bool {
        self.implicit_closed
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag_name))
    }
}

/// Lookup table from tag name to metadata.
#[derive(Debug, Clone, Default)]
pub struct MetaTable {
    elements: HashMap<String, Arc<MetaElement>>,
}

impl MetaTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the built-in HTML5 table.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded table is malformed.
    pub fn html5() -> Result<Self, MetaError> {
        Self::from_toml(HTML5)
    }

    /// Loads a table from a TOML document keyed by tag name.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TOML or invalid rule lists.
    pub fn from_toml(content: &str) -> Result<Self, MetaError> {
        let defs: HashMap<String, MetaElementDef> = toml::from_str(content)?;
        let mut table = Self::new();
        table.extend(defs)?;
        Ok(table)
    }

    /// Adds or replaces one element.
    ///
    /// # Errors
    ///
    /// Returns an error when the definition does not compile.
    pub fn insert(&mut self, tag_name: &str, def: &MetaElementDef) -> Result<(), MetaError> {
        let key = tag_name.to_ascii_lowercase();
        let element = MetaElement::compile(&key, def)?;
        self.elements.insert(key, Arc::new(element));
        Ok(())
    }

    /// Adds or replaces many elements.
    ///
    /// # Errors
    ///
    /// Returns the first compilation error.
    pub fn extend<I, K>(&mut self, defs: I) -> Result<(), MetaError>
    where
        I: IntoIterator<Item = (K, MetaElementDef)>,
        K: AsRef<str>,
    {
        for (tag_name, def) in defs {
            self.insert(tag_name.as_ref(), &def)?;
        }
        Ok(())
    }

    /// Metadata for `tag_name` (case-insensitive).
    #[must_use]
    pub fn get(&self, tag_name: &str) -> Option<Arc<MetaElement>> {
        self.elements.get(&tag_name.to_ascii_lowercase()).cloned()
    }

    /// Number of known elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when no element is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html5_table_loads() {
        let table = MetaTable::html5().unwrap();
        assert!(table.len() > 80);

        let input = table.get("INPUT").unwrap();
        assert!(input.void);
        assert!(input.phrasing);

        let li = table.get("li").unwrap();
        assert!(li.optional_end);
        assert!(li.is_implicitly_closed_by("LI"));

        assert!(table.get("center").unwrap().deprecated);
        assert!(table.get("custom-element").is_none());
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = MetaTable::from_toml("[x]\npermitted_content = [\"@nope\"]").unwrap_err();
        assert!(matches!(err, MetaError::UnknownCategory { ref category, .. } if category == "@nope"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(matches!(
            MetaTable::from_toml("[x]\ninline = true"),
            Err(MetaError::Parse(_))
        ));
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut table = MetaTable::html5().unwrap();
        let def = MetaElementDef {
            flow: true,
            deprecated: true,
            ..MetaElementDef::default()
        };
        table.insert("Div", &def).unwrap();
        let div = table.get("div").unwrap();
        assert!(div.deprecated);
        assert!(div.permitted_content.is_none());
    }

    #[test]
    fn transparent_terms_compile() {
        let table = MetaTable::from_toml("[w]\ntransparent = [\"@flow\"]").unwrap();
        assert!(matches!(table.get("w").unwrap().transparent, Transparent::Only(ref t) if t.len() == 1));
    }
}
