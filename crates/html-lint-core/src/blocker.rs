//! Rule suppression state set by directive comments.
//!
//! A directive scope mints a [`RuleBlocker`]. While the scope is active the
//! blocker is attached to the affected rules (and to the elements opened
//! inside the scope); reports carrying any blocker are not written but are
//! still announced through `rule:error`, which is how a scope learns it
//! was used.

use std::collections::{HashMap, HashSet};

use crate::dom::NodeId;
use crate::types::Severity;

/// Opaque id of one directive scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleBlocker(pub u64);

/// Mints monotonically increasing blockers.
#[derive(Debug, Default)]
pub struct BlockerSource {
    last: u64,
}

impl BlockerSource {
    /// Creates a source starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh blocker.
    pub fn create(&mut self) -> RuleBlocker {
        self.last += 1;
        RuleBlocker(self.last)
    }
}

/// Mutable per-source state of one rule instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleState {
    /// Current severity; directives may raise it.
    pub severity: Severity,
    /// Toggled by `enable`/`disable` directives.
    pub enabled: bool,
    /// Active blockers.
    pub blockers: Vec<RuleBlocker>,
}

impl RuleState {
    /// Creates an enabled, unblocked state.
    #[must_use]
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            enabled: true,
            blockers: Vec::new(),
        }
    }

    /// True when reports would be written (ignoring blockers).
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.severity.is_enabled()
    }

    /// Adds a blocker.
    pub fn block(&mut self, blocker: RuleBlocker) {
        if !self.blockers.contains(&blocker) {
            self.blockers.push(blocker);
        }
    }

    /// Removes a blocker.
    pub fn unblock(&mut self, blocker: RuleBlocker) {
        self.blockers.retain(|b| *b != blocker);
    }

    /// True while any blocker is active.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        !self.blockers.is_empty()
    }
}

/// Rule overrides attached to individual elements.
#[derive(Debug, Default)]
pub struct NodeAnnotations {
    disabled: HashMap<NodeId, HashSet<String>>,
    blockers: HashMap<NodeId, HashMap<String, Vec<RuleBlocker>>>,
}

impl NodeAnnotations {
    /// Creates empty annotations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables `rule` for reports on `node`.
    pub fn disable_rule(&mut self, node: NodeId, rule: &str) {
        self.disabled.entry(node).or_default().insert(rule.to_owned());
    }

    /// Re-enables `rule` for reports on `node`.
    pub fn enable_rule(&mut self, node: NodeId, rule: &str) {
        if let Some(rules) = self.disabled.get_mut(&node) {
            rules.remove(rule);
        }
    }

    /// True unless `rule` was disabled on `node`.
    #[must_use]
    pub fn rule_enabled(&self, node: NodeId, rule: &str) -> bool {
        self.disabled
            .get(&node)
            .map_or(true, |rules| !rules.contains(rule))
    }

    /// Attaches a blocker for `rule` to `node`.
    pub fn block_rule(&mut self, node: NodeId, rule: &str, blocker: RuleBlocker) {
        let list = self
            .blockers
            .entry(node)
            .or_default()
            .entry(rule.to_owned())
            .or_default();
        if !list.contains(&blocker) {
            list.push(blocker);
        }
    }

    /// Blockers attached to `node` for `rule`.
    #[must_use]
    pub fn blockers(&self, node: NodeId, rule: &str) -> &[RuleBlocker] {
        self.blockers
            .get(&node)
            .and_then(|rules| rules.get(rule))
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blockers_are_monotonic() {
        let mut source = BlockerSource::new();
        let a = source.create();
        let b = source.create();
        assert!(b > a);
    }

    #[test]
    fn rule_state_block_and_unblock() {
        let mut state = RuleState::new(Severity::Warn);
        let blocker = RuleBlocker(7);
        state.block(blocker);
        state.block(blocker);
        assert_eq!(state.blockers, vec![blocker]);
        assert!(state.is_blocked());
        state.unblock(blocker);
        assert!(!state.is_blocked());
    }

    #[test]
    fn disabled_severity_is_not_enabled() {
        assert!(!RuleState::new(Severity::Disabled).is_enabled());
        assert!(RuleState::new(Severity::Error).is_enabled());
    }

    #[test]
    fn node_annotations() {
        let mut notes = NodeAnnotations::new();
        let node = NodeId(3);
        notes.disable_rule(node, "foo");
        assert!(!notes.rule_enabled(node, "foo"));
        assert!(notes.rule_enabled(node, "bar"));
        notes.enable_rule(node, "foo");
        assert!(notes.rule_enabled(node, "foo"));

        notes.block_rule(node, "foo", RuleBlocker(1));
        assert_eq!(notes.blockers(node, "foo"), &[RuleBlocker(1)]);
        assert!(notes.blockers(node, "bar").is_empty());
    }
}
