//! # html-lint-rules
//!
//! Built-in lint rules for html-lint.
//!
//! ## Available Rules
//!
//! | Name | Description |
//! |------|-------------|
//! | `attr-case` | Requires a consistent case for attribute names |
//! | `close-order` | Requires end tags to match the open elements |
//! | `deprecated` | Forbids obsolete elements |
//! | `doctype-html` | Requires the `<!DOCTYPE html>` doctype |
//! | `element-permitted-content` | Checks children against the parent's content model |
//! | `element-permitted-occurrences` | Checks that single-use children appear once |
//! | `element-permitted-order` | Checks the order of children |
//! | `element-required-attributes` | Requires mandatory attributes |
//! | `no-dup-id` | Forbids duplicate `id` values |
//! | `no-self-closing` | Forbids self-closed non-void elements |
//! | `void-content` | Forbids end tags on void elements |
//!
//! The presets also enable `no-unused-disable`, which the engine provides.
//!
//! ## Usage
//!
//! ```ignore
//! use html_lint_core::{Engine, ResolvedConfig, RuleOptions, Severity};
//! use html_lint_rules::bundled_rules;
//!
//! let config = ResolvedConfig::html5()?
//!     .with_rule("close-order", Severity::Error, RuleOptions::new());
//! let engine = Engine::new(config, bundled_rules());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attr_case;
mod close_order;
mod deprecated;
mod doctype_html;
mod element_permitted_content;
mod element_permitted_occurrences;
mod element_permitted_order;
mod element_required_attributes;
mod no_dup_id;
mod no_self_closing;
mod presets;
mod void_content;

#[cfg(test)]
mod test_util;

pub use attr_case::{AttrCase, CaseStyle};
pub use close_order::CloseOrder;
pub use deprecated::Deprecated;
pub use doctype_html::DoctypeHtml;
pub use element_permitted_content::ElementPermittedContent;
pub use element_permitted_occurrences::ElementPermittedOccurrences;
pub use element_permitted_order::ElementPermittedOrder;
pub use element_required_attributes::ElementRequiredAttributes;
pub use no_dup_id::NoDupId;
pub use no_self_closing::NoSelfClosing;
pub use presets::{all_rules, minimal_rules, recommended_rules, strict_rules, Preset};
pub use void_content::VoidContent;

/// Re-export core types for convenience.
pub use html_lint_core::{Rule, RuleRegistry, Severity};

use tracing::debug;

/// Registry of every bundled rule.
#[must_use]
pub fn bundled_rules() -> RuleRegistry {
    let registry = RuleRegistry::new()
        .with(attr_case::NAME, attr_case::create)
        .with(close_order::NAME, close_order::create)
        .with(deprecated::NAME, deprecated::create)
        .with(doctype_html::NAME, doctype_html::create)
        .with(element_permitted_content::NAME, element_permitted_content::create)
        .with(
            element_permitted_occurrences::NAME,
            element_permitted_occurrences::create,
        )
        .with(element_permitted_order::NAME, element_permitted_order::create)
        .with(
            element_required_attributes::NAME,
            element_required_attributes::create,
        )
        .with(no_dup_id::NAME, no_dup_id::create)
        .with(no_self_closing::NAME, no_self_closing::create)
        .with(void_content::NAME, void_content::create);
    debug!("Registered {} bundled rules", registry.len());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_rule_is_bundled() {
        let registry = bundled_rules();
        let names: Vec<_> = all_rules()
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| *name != html_lint_core::NO_UNUSED_DISABLE)
            .collect();
        for name in &names {
            assert!(
                matches!(registry.get(name), Some(Some(_))),
                "{name} is not bundled"
            );
        }
        assert_eq!(registry.len(), names.len());
    }
}
