//! Rules file (`rules.toml`) loading.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::core::inputs::InputType;
use crate::core::notation::ModuleNotation;
use crate::core::script::ScriptBlock;
use crate::core::types::default_status_scheme;

/// Default rules file name, relative to the working directory.
pub const DEFAULT_RULES_PATH: &str = "rules.toml";

/// Rules file contents (TOML).
///
/// Missing fields default to an empty rule set and the standard
/// `integration`/`milestone`/`release` status scheme.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Scheme for metadata documents that do not declare one.
    pub default_status_scheme: Vec<String>,

    /// Rules, registered in file order.
    pub rules: Vec<RuleDecl>,

    /// Deprecated spelling of an unscoped rule; registered after `rules`.
    pub each_component: Vec<RuleDecl>,
}

/// One `[[rules]]` entry: an optional module scope plus the fields of a
/// [`ScriptBlock`]. Misspelled keys are rejected.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RuleDecl {
    /// Restrict the rule to one module; absent means every module.
    pub module: Option<ModuleNotation>,
    pub inputs: Vec<InputType>,
    pub when: Option<String>,
    pub fail: Option<String>,
    pub status: Option<String>,
    pub changing: Option<bool>,
    pub status_scheme: Option<Vec<String>>,
}

impl RuleDecl {
    /// The rule body, without its scope.
    pub fn script(&self) -> ScriptBlock {
        ScriptBlock {
            inputs: self.inputs.clone(),
            when: self.when.clone(),
            fail: self.fail.clone(),
            status: self.status.clone(),
            changing: self.changing,
            status_scheme: self.status_scheme.clone(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            default_status_scheme: default_status_scheme(),
            rules: Vec::new(),
            each_component: Vec::new(),
        }
    }
}

impl RulesConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_status_scheme.is_empty() {
            return Err(anyhow!("default_status_scheme must not be empty"));
        }
        let mut seen = HashSet::new();
        for status in &self.default_status_scheme {
            if status.trim().is_empty() {
                return Err(anyhow!("default_status_scheme entries must not be blank"));
            }
            if !seen.insert(status.as_str()) {
                return Err(anyhow!(
                    "default_status_scheme lists '{status}' more than once"
                ));
            }
        }
        if let Some(index) = self.each_component.iter().position(|d| d.module.is_some()) {
            return Err(anyhow!(
                "each_component[{index}]: 'module' is not allowed; use [[rules]] instead"
            ));
        }
        Ok(())
    }
}

/// Load the rules file.
///
/// If the file is missing, returns `RulesConfig::default()`.
pub fn load_config(path: &Path) -> Result<RulesConfig> {
    if !path.exists() {
        let cfg = RulesConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RulesConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
