//! Rule presets for common configurations.

use html_lint_core::{Severity, NO_UNUSED_DISABLE};
use std::str::FromStr;

use crate::{
    attr_case, close_order, deprecated, doctype_html, element_permitted_content,
    element_permitted_occurrences, element_permitted_order, element_required_attributes,
    no_dup_id, no_self_closing, void_content,
};

/// Preset configurations for html-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Recommended rules with sensible defaults.
    Recommended,
    /// Every rule as an error.
    Strict,
    /// Minimal rules for gradual adoption.
    Minimal,
    /// Every rule with its default severity.
    All,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<(&'static str, Severity)> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => strict_rules(),
            Self::Minimal => minimal_rules(),
            Self::All => all_rules(),
        }
    }

    /// Preset name as used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
            Self::All => "all",
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommended" => Ok(Self::Recommended),
            "strict" => Ok(Self::Strict),
            "minimal" => Ok(Self::Minimal),
            "all" => Ok(Self::All),
            other => Err(other.to_owned()),
        }
    }
}

/// Returns the recommended set of rules.
///
/// Structural problems are errors; style and obsolete markup are warnings.
#[must_use]
pub fn recommended_rules() -> Vec<(&'static str, Severity)> {
    vec![
        (close_order::NAME, Severity::Error),
        (deprecated::NAME, Severity::Error),
        (doctype_html::NAME, Severity::Warn),
        (element_permitted_content::NAME, Severity::Error),
        (element_permitted_occurrences::NAME, Severity::Error),
        (element_permitted_order::NAME, Severity::Error),
        (element_required_attributes::NAME, Severity::Error),
        (no_dup_id::NAME, Severity::Error),
        (no_self_closing::NAME, Severity::Error),
        (void_content::NAME, Severity::Error),
        (attr_case::NAME, Severity::Warn),
        (NO_UNUSED_DISABLE, Severity::Error),
    ]
}

/// Returns the strict set of rules: every rule as an error.
#[must_use]
pub fn strict_rules() -> Vec<(&'static str, Severity)> {
    all_rules()
        .into_iter()
        .map(|(name, _)| (name, Severity::Error))
        .collect()
}

/// Returns the minimal set of rules.
///
/// For gradual adoption, only includes checks for broken markup.
#[must_use]
pub fn minimal_rules() -> Vec<(&'static str, Severity)> {
    vec![
        (close_order::NAME, Severity::Error),
        (no_dup_id::NAME, Severity::Error),
        (void_content::NAME, Severity::Error),
    ]
}

/// Returns all available rules.
#[must_use]
pub fn all_rules() -> Vec<(&'static str, Severity)> {
    vec![
        (attr_case::NAME, Severity::Warn),
        (close_order::NAME, Severity::Error),
        (deprecated::NAME, Severity::Error),
        (doctype_html::NAME, Severity::Warn),
        (element_permitted_content::NAME, Severity::Error),
        (element_permitted_occurrences::NAME, Severity::Error),
        (element_permitted_order::NAME, Severity::Error),
        (element_required_attributes::NAME, Severity::Error),
        (no_dup_id::NAME, Severity::Error),
        (no_self_closing::NAME, Severity::Error),
        (void_content::NAME, Severity::Error),
        (NO_UNUSED_DISABLE, Severity::Error),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_rules() {
        assert!(!Preset::Recommended.rules().is_empty());
        assert!(!Preset::Strict.rules().is_empty());
        assert!(!Preset::Minimal.rules().is_empty());
        assert_eq!(Preset::All.rules().len(), Preset::Strict.rules().len());
    }

    #[test]
    fn test_strict_is_all_errors() {
        assert!(strict_rules().iter().all(|(_, s)| *s == Severity::Error));
    }

    #[test]
    fn test_preset_names() {
        for preset in [Preset::Recommended, Preset::Strict, Preset::Minimal, Preset::All] {
            assert_eq!(preset.as_str().parse::<Preset>(), Ok(preset));
        }
        assert_eq!("bogus".parse::<Preset>(), Err("bogus".to_owned()));
    }
}
