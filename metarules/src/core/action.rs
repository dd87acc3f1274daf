//! Rule actions and the adapter that builds them.
//!
//! Rules can be declared three ways: as a closure, as a [`ScriptBlock`], or as
//! a [`RuleSource`] object. The adapter turns each into the same
//! [`RuleAction`] and checks its declared inputs against the supported
//! [`InputCapabilities`] before anything is registered.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::core::details::ComponentMetadataDetails;
use crate::core::error::RuleConfigError;
use crate::core::inputs::{InputCapabilities, InputType, RuleInput};
use crate::core::script::{ScriptBlock, ScriptRule};

type RuleFn = dyn Fn(&mut ComponentMetadataDetails<'_>, &[RuleInput]) -> Result<()> + Send + Sync;

/// An object that carries a rule.
///
/// `input_types` is read once, when the rule is built.
pub trait RuleSource: Send + Sync {
    fn input_types(&self) -> Vec<InputType> {
        Vec::new()
    }

    fn apply(
        &self,
        details: &mut ComponentMetadataDetails<'_>,
        inputs: &[RuleInput],
    ) -> Result<()>;
}

enum RuleBody {
    Callback(Box<RuleFn>),
    Script(ScriptRule),
    Source(Box<dyn RuleSource>),
}

/// A validated rule body plus the inputs it declared.
///
/// Registration deduplicates by identity, so share an action through its
/// `Arc` to register it more than once.
pub struct RuleAction {
    inputs: Vec<InputType>,
    body: RuleBody,
}

impl RuleAction {
    /// Unvalidated; callers check `inputs` first.
    pub(crate) fn callback<F>(inputs: Vec<InputType>, callback: F) -> Arc<Self>
    where
        F: Fn(&mut ComponentMetadataDetails<'_>, &[RuleInput]) -> Result<()>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            inputs,
            body: RuleBody::Callback(Box::new(callback)),
        })
    }

    pub fn input_types(&self) -> &[InputType] {
        &self.inputs
    }

    /// Run the rule. `inputs` matches [`input_types`](Self::input_types) in
    /// order and length.
    pub fn execute(
        &self,
        details: &mut ComponentMetadataDetails<'_>,
        inputs: &[RuleInput],
    ) -> Result<()> {
        match &self.body {
            RuleBody::Callback(callback) => callback(details, inputs),
            RuleBody::Script(script) => script.execute(details, inputs),
            RuleBody::Source(source) => source.apply(details, inputs),
        }
    }

    fn kind(&self) -> &'static str {
        match self.body {
            RuleBody::Callback(_) => "callback",
            RuleBody::Script(_) => "script",
            RuleBody::Source(_) => "source",
        }
    }
}

impl fmt::Debug for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleAction")
            .field("kind", &self.kind())
            .field("inputs", &self.inputs)
            .finish()
    }
}

/// Builds [`RuleAction`]s, rejecting inputs the capabilities do not support.
#[derive(Debug, Clone, Default)]
pub struct RuleActionAdapter {
    capabilities: Arc<InputCapabilities>,
}

impl RuleActionAdapter {
    pub fn new(capabilities: InputCapabilities) -> Self {
        Self {
            capabilities: Arc::new(capabilities),
        }
    }

    pub fn capabilities(&self) -> &InputCapabilities {
        &self.capabilities
    }

    /// A closure rule.
    pub fn from_fn<F>(
        &self,
        inputs: &[InputType],
        callback: F,
    ) -> Result<Arc<RuleAction>, RuleConfigError>
    where
        F: Fn(&mut ComponentMetadataDetails<'_>, &[RuleInput]) -> Result<()>
            + Send
            + Sync
            + 'static,
    {
        self.validate(inputs)?;
        Ok(RuleAction::callback(inputs.to_vec(), callback))
    }

    /// A declarative rule; its expressions are compiled here.
    pub fn from_script(&self, block: ScriptBlock) -> Result<Arc<RuleAction>, RuleConfigError> {
        self.validate(&block.inputs)?;
        let script = ScriptRule::compile(block)?;
        Ok(Arc::new(RuleAction {
            inputs: script.inputs().to_vec(),
            body: RuleBody::Script(script),
        }))
    }

    /// A rule carried by an object.
    pub fn from_source<S>(&self, source: S) -> Result<Arc<RuleAction>, RuleConfigError>
    where
        S: RuleSource + 'static,
    {
        let inputs = source.input_types();
        self.validate(&inputs)?;
        Ok(Arc::new(RuleAction {
            inputs,
            body: RuleBody::Source(Box::new(source)),
        }))
    }

    fn validate(&self, inputs: &[InputType]) -> Result<(), RuleConfigError> {
        match inputs.iter().find(|input| !self.capabilities.supports(input)) {
            Some(input) => Err(RuleConfigError::UnsupportedInput {
                input: input.clone(),
                supported: self.capabilities.tags().map(ToString::to_string).collect(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;
    use crate::core::types::ModuleMetadata;
    use crate::test_support::maven_module;

    struct Promote;

    impl RuleSource for Promote {
        fn apply(
            &self,
            details: &mut ComponentMetadataDetails<'_>,
            _inputs: &[RuleInput],
        ) -> Result<()> {
            details.set_status("release");
            Ok(())
        }
    }

    struct WantsPom;

    impl RuleSource for WantsPom {
        fn input_types(&self) -> Vec<InputType> {
            vec![InputType::from_static("pom")]
        }

        fn apply(&self, _: &mut ComponentMetadataDetails<'_>, _: &[RuleInput]) -> Result<()> {
            bail!("never runs")
        }
    }

    #[test]
    fn every_declaration_style_executes() {
        let adapter = RuleActionAdapter::default();
        let callback = adapter
            .from_fn(&[], |details, _| {
                details.set_changing(true);
                Ok(())
            })
            .expect("callback");
        let script = adapter
            .from_script(ScriptBlock {
                status: Some("milestone".to_string()),
                ..ScriptBlock::default()
            })
            .expect("script");
        let source = adapter.from_source(Promote).expect("source");

        let mut metadata = maven_module("org", "lib", "1.0", "integration");
        let mut details = ComponentMetadataDetails::new(&mut metadata);
        callback.execute(&mut details, &[]).expect("callback runs");
        script.execute(&mut details, &[]).expect("script runs");
        assert_eq!(details.status(), "milestone");
        source.execute(&mut details, &[]).expect("source runs");
        assert_eq!(metadata.status, "release");
        assert!(metadata.changing);
    }

    #[test]
    fn unsupported_inputs_are_rejected_for_every_style() {
        let adapter = RuleActionAdapter::default();
        let pom = InputType::from_static("pom");

        let err = adapter.from_fn(&[pom.clone()], |_, _| Ok(())).expect_err("callback");
        assert_eq!(
            err.to_string(),
            "Rule may not have an input of type 'pom'. Supported input types: [ivy]"
        );

        let script = ScriptBlock {
            inputs: vec![pom],
            ..ScriptBlock::default()
        };
        assert!(matches!(
            adapter.from_script(script),
            Err(RuleConfigError::UnsupportedInput { .. })
        ));
        assert!(matches!(
            adapter.from_source(WantsPom),
            Err(RuleConfigError::UnsupportedInput { .. })
        ));
    }

    #[test]
    fn declared_inputs_are_kept_in_order() {
        let mut capabilities = InputCapabilities::builtin();
        capabilities
            .register(
                InputType::from_static("extra"),
                |_: &ModuleMetadata| -> Option<RuleInput> { None },
            )
            .expect("register");
        let adapter = RuleActionAdapter::new(capabilities);
        let inputs = [InputType::from_static("extra"), InputType::IVY_DESCRIPTOR];
        let action = adapter.from_fn(&inputs, |_, _| Ok(())).expect("action");
        assert_eq!(action.input_types(), &inputs);
    }
}
