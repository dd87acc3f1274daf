//! Predicates scoping which modules a rule applies to.

use crate::core::details::ComponentMetadataDetails;
use crate::core::types::ModuleIdentifier;

/// Which modules a rule applies to.
///
/// Evaluation is pure and may happen any number of times per module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleSpec {
    /// Every module.
    All,
    /// Exactly one `(group, name)`; case-sensitive, any version.
    Module(ModuleIdentifier),
}

impl ModuleSpec {
    pub fn is_satisfied_by(&self, details: &ComponentMetadataDetails<'_>) -> bool {
        match self {
            ModuleSpec::All => true,
            ModuleSpec::Module(target) => details.id().module() == *target,
        }
    }
}
