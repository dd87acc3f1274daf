//! Declarative rules written as minijinja expressions and templates.
//!
//! A script block is the data-only way of declaring a rule, used by rules
//! files. Its logic is a `when` expression plus a handful of assignments; the
//! evaluation context exposes the module (`id`, `status`, `changing`,
//! `status_scheme`) and every declared input under its tag.

use anyhow::{Result, anyhow};
use minijinja::Environment;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::core::details::ComponentMetadataDetails;
use crate::core::error::RuleConfigError;
use crate::core::inputs::{InputType, RuleInput};

/// A rule declared as data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptBlock {
    /// Inputs bound before evaluation, in this order.
    pub inputs: Vec<InputType>,
    /// Boolean expression; the rule does nothing when it is falsy.
    pub when: Option<String>,
    /// Template rendered into an error message; the rule fails when set.
    pub fail: Option<String>,
    /// Template rendered (and trimmed) into the new status.
    pub status: Option<String>,
    pub changing: Option<bool>,
    pub status_scheme: Option<Vec<String>>,
}

const WHEN: &str = "when";
const FAIL: &str = "fail";
const STATUS: &str = "status";

/// A compiled script block.
///
/// `when`, `fail` and `status` are parsed once and kept in `env` under their
/// field names.
#[derive(Debug)]
pub(crate) struct ScriptRule {
    block: ScriptBlock,
    env: Environment<'static>,
}

impl ScriptRule {
    /// Checks every expression and template for syntax errors.
    pub(crate) fn compile(block: ScriptBlock) -> Result<Self, RuleConfigError> {
        let mut env = Environment::new();
        if let Some(when) = &block.when {
            let invalid = |source: minijinja::Error| RuleConfigError::InvalidScript {
                field: WHEN,
                source,
            };
            env.compile_expression_owned(when.clone()).map_err(invalid)?;
            env.add_template_owned(WHEN, format!("{{% if {when} %}}true{{% endif %}}"))
                .map_err(invalid)?;
        }
        for (field, template) in [(FAIL, &block.fail), (STATUS, &block.status)] {
            if let Some(template) = template {
                env.add_template_owned(field, template.clone())
                    .map_err(|source| RuleConfigError::InvalidScript { field, source })?;
            }
        }
        Ok(Self { block, env })
    }

    pub(crate) fn inputs(&self) -> &[InputType] {
        &self.block.inputs
    }

    pub(crate) fn execute(
        &self,
        details: &mut ComponentMetadataDetails<'_>,
        inputs: &[RuleInput],
    ) -> Result<()> {
        let ctx = self.context(details, inputs)?;

        if self.block.when.is_some() && self.render(WHEN, &ctx)? != "true" {
            return Ok(());
        }

        if self.block.fail.is_some() {
            let message = self.render(FAIL, &ctx)?;
            return Err(anyhow!(message));
        }

        if self.block.status.is_some() {
            let rendered = self.render(STATUS, &ctx)?;
            details.set_status(rendered.trim());
        }
        if let Some(changing) = self.block.changing {
            details.set_changing(changing);
        }
        if let Some(scheme) = &self.block.status_scheme {
            details.set_status_scheme(scheme.iter().cloned());
        }
        Ok(())
    }

    fn render(&self, field: &str, ctx: &Value) -> Result<String> {
        self.env
            .get_template(field)
            .and_then(|template| template.render(ctx))
            .map_err(|err| anyhow!("evaluate '{field}': {err:#}"))
    }

    fn context(
        &self,
        details: &ComponentMetadataDetails<'_>,
        inputs: &[RuleInput],
    ) -> Result<Value> {
        let mut ctx = Map::new();
        ctx.insert("id".to_string(), serde_json::to_value(details.id())?);
        ctx.insert("status".to_string(), json!(details.status()));
        ctx.insert("changing".to_string(), json!(details.is_changing()));
        ctx.insert("status_scheme".to_string(), json!(details.status_scheme()));
        for (tag, input) in self.block.inputs.iter().zip(inputs) {
            ctx.insert(tag.to_string(), serde_json::to_value(input)?);
        }
        Ok(Value::Object(ctx))
    }
}
