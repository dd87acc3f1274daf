//! Insertion-ordered, identity-deduplicated rule storage.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexSet;

use crate::core::action::RuleAction;
use crate::core::spec::ModuleSpec;

/// A rule action paired with the modules it applies to.
#[derive(Debug, Clone)]
pub struct SpecRuleAction {
    action: Arc<RuleAction>,
    spec: ModuleSpec,
}

impl SpecRuleAction {
    pub fn new(action: Arc<RuleAction>, spec: ModuleSpec) -> Self {
        Self { action, spec }
    }

    pub fn action(&self) -> &RuleAction {
        &self.action
    }

    pub fn spec(&self) -> &ModuleSpec {
        &self.spec
    }

    fn action_ptr(&self) -> *const RuleAction {
        Arc::as_ptr(&self.action)
    }
}

/// Same action instance (not an equal one) and same scope.
impl PartialEq for SpecRuleAction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.action, &other.action) && self.spec == other.spec
    }
}

impl Eq for SpecRuleAction {}

impl Hash for SpecRuleAction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.action_ptr().hash(state);
        self.spec.hash(state);
    }
}

/// Registered rules, iterated in order of first registration.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: IndexSet<SpecRuleAction>,
}

impl RuleRegistry {
    /// Returns `false` if the identical rule was already registered.
    pub fn insert(&mut self, rule: SpecRuleAction) -> bool {
        self.rules.insert(rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpecRuleAction> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
