//! Component metadata rules: registration and processing.
//!
//! Rules are registered through `&mut ComponentMetadataHandler` while the
//! build is being configured. Processing only needs `&self`, so once
//! configuration is over the handler can be shared across threads and the
//! registry can no longer change underneath a running resolution.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::core::action::{RuleAction, RuleActionAdapter};
use crate::core::details::ComponentMetadataDetails;
use crate::core::error::{ProcessError, RuleConfigError};
use crate::core::inputs::RuleInput;
use crate::core::notation::{ModuleNotation, parse_module_identifier};
use crate::core::registry::{RuleRegistry, SpecRuleAction};
use crate::core::spec::ModuleSpec;
use crate::core::status_validator::validate_status;
use crate::core::types::ModuleMetadata;
use crate::deprecation::{DeprecationReporter, TracingDeprecationReporter};

const EACH_COMPONENT_DEPRECATION: &str = "ComponentMetadataHandler::each_component() is deprecated \
     and will be removed in the next minor release. Use ComponentMetadataHandler::all() instead.";

/// Applies registered rules to one module's metadata.
pub trait ComponentMetadataProcessor {
    /// Run every applicable rule against `metadata`, then check its status.
    fn process_metadata(&self, metadata: &mut ModuleMetadata) -> Result<(), ProcessError>;
}

/// Registry of component metadata rules.
pub struct ComponentMetadataHandler {
    rules: RuleRegistry,
    adapter: RuleActionAdapter,
    deprecation: Arc<dyn DeprecationReporter>,
}

impl ComponentMetadataHandler {
    /// Handler with the built-in input capabilities that logs deprecations.
    pub fn new() -> Self {
        Self::with_parts(
            RuleActionAdapter::default(),
            Arc::new(TracingDeprecationReporter::default()),
        )
    }

    pub fn with_parts(
        adapter: RuleActionAdapter,
        deprecation: Arc<dyn DeprecationReporter>,
    ) -> Self {
        Self {
            rules: RuleRegistry::default(),
            adapter,
            deprecation,
        }
    }

    /// The adapter rule actions for this handler should be built with.
    pub fn adapter(&self) -> &RuleActionAdapter {
        &self.adapter
    }

    /// Apply `action` to every module.
    pub fn all(&mut self, action: Arc<RuleAction>) -> &mut Self {
        self.add_rule(SpecRuleAction::new(action, ModuleSpec::All))
    }

    /// Apply `action` to modules matching `id` (`"group:name"` or a map).
    pub fn with_module(
        &mut self,
        id: impl Into<ModuleNotation>,
        action: Arc<RuleAction>,
    ) -> Result<&mut Self, RuleConfigError> {
        let notation = id.into();
        let module =
            parse_module_identifier(&notation).map_err(|source| RuleConfigError::InvalidModule {
                notation: notation.to_string(),
                source,
            })?;
        Ok(self.add_rule(SpecRuleAction::new(action, ModuleSpec::Module(module))))
    }

    /// Closure shorthand for [`all`](Self::all) with no declared inputs.
    pub fn all_fn<F>(&mut self, rule: F) -> &mut Self
    where
        F: Fn(&mut ComponentMetadataDetails<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let action = Self::input_free(rule);
        self.all(action)
    }

    /// Closure shorthand for [`with_module`](Self::with_module) with no declared inputs.
    pub fn with_module_fn<F>(
        &mut self,
        id: impl Into<ModuleNotation>,
        rule: F,
    ) -> Result<&mut Self, RuleConfigError>
    where
        F: Fn(&mut ComponentMetadataDetails<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let action = Self::input_free(rule);
        self.with_module(id, action)
    }

    /// Legacy name for [`all`](Self::all).
    #[deprecated(note = "use `ComponentMetadataHandler::all` instead")]
    pub fn each_component(&mut self, action: Arc<RuleAction>) -> &mut Self {
        self.deprecation.warn_once(EACH_COMPONENT_DEPRECATION);
        self.all(action)
    }

    /// Number of distinct registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn add_rule(&mut self, rule: SpecRuleAction) -> &mut Self {
        if !self.rules.insert(rule) {
            debug!("rule already registered, ignoring duplicate");
        }
        self
    }

    /// No inputs means nothing to validate.
    fn input_free<F>(rule: F) -> Arc<RuleAction>
    where
        F: Fn(&mut ComponentMetadataDetails<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        RuleAction::callback(Vec::new(), move |details, _| rule(details))
    }

    /// Apply one rule. `Ok(())` covers both "ran" and "skipped".
    fn process_rule(
        &self,
        rule: &SpecRuleAction,
        details: &mut ComponentMetadataDetails<'_>,
    ) -> Result<(), ProcessError> {
        if !rule.spec().is_satisfied_by(details) {
            debug!(module = %details.id(), spec = ?rule.spec(), "rule not applicable");
            return Ok(());
        }

        let action = rule.action();
        let mut inputs: Vec<RuleInput> = Vec::with_capacity(action.input_types().len());
        for input_type in action.input_types() {
            let provider = self.adapter.capabilities().provider(input_type).ok_or_else(|| {
                ProcessError::UnboundInput {
                    id: details.id().clone(),
                    input: input_type.clone(),
                }
            })?;
            match provider.provide(details.metadata()) {
                Some(input) => inputs.push(input),
                None => {
                    debug!(
                        module = %details.id(),
                        input = %input_type,
                        origin = details.metadata().origin.label(),
                        "input unavailable for origin, skipping rule"
                    );
                    return Ok(());
                }
            }
        }

        action
            .execute(details, &inputs)
            .map_err(|source| ProcessError::RuleFailed {
                id: details.id().clone(),
                source,
            })?;
        debug!(module = %details.id(), rule = ?action, "rule applied");
        Ok(())
    }
}

impl ComponentMetadataProcessor for ComponentMetadataHandler {
    fn process_metadata(&self, metadata: &mut ModuleMetadata) -> Result<(), ProcessError> {
        {
            let mut details = ComponentMetadataDetails::new(metadata);
            for rule in self.rules.iter() {
                self.process_rule(rule, &mut details)?;
            }
        }
        validate_status(metadata)
    }
}

impl Default for ComponentMetadataHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentMetadataHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentMetadataHandler")
            .field("rules", &self.rules)
            .field("adapter", &self.adapter)
            .finish_non_exhaustive()
    }
}
