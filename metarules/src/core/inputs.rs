//! Rule input capabilities.
//!
//! A rule may declare extra inputs besides the details it mutates. Each input
//! is identified by an [`InputType`] tag and materialized by a provider
//! registered in [`InputCapabilities`]. A provider returns `None` when the
//! module's origin cannot supply the input; the rule is then skipped for that
//! module.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::error::RuleConfigError;
use crate::core::types::{IvyModuleDescriptor, MetadataOrigin, ModuleMetadata};

/// Tag naming an input a rule may declare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputType(Cow<'static, str>);

impl InputType {
    /// Ivy descriptor extra info, branch and status.
    pub const IVY_DESCRIPTOR: InputType = InputType(Cow::Borrowed("ivy"));

    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A materialized rule input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RuleInput {
    IvyDescriptor(IvyModuleDescriptor),
    /// Inputs from capabilities registered outside this crate.
    Value(serde_json::Value),
}

impl RuleInput {
    pub fn as_ivy_descriptor(&self) -> Option<&IvyModuleDescriptor> {
        match self {
            RuleInput::IvyDescriptor(descriptor) => Some(descriptor),
            RuleInput::Value(_) => None,
        }
    }
}

/// Materializes one kind of input from raw metadata.
pub trait InputProvider: Send + Sync {
    /// Returns `None` when `metadata` cannot supply this input.
    fn provide(&self, metadata: &ModuleMetadata) -> Option<RuleInput>;
}

impl<F> InputProvider for F
where
    F: Fn(&ModuleMetadata) -> Option<RuleInput> + Send + Sync,
{
    fn provide(&self, metadata: &ModuleMetadata) -> Option<RuleInput> {
        self(metadata)
    }
}

/// Script context keys an input tag may not take.
pub const RESERVED_TAGS: [&str; 4] = ["id", "status", "changing", "status_scheme"];

/// Registry of supported rule inputs.
///
/// The set of registered tags is the allow-list rule declarations are
/// validated against.
#[derive(Clone)]
pub struct InputCapabilities {
    providers: IndexMap<InputType, Arc<dyn InputProvider>>,
}

impl InputCapabilities {
    /// No capabilities at all: only rules without inputs are accepted.
    pub fn empty() -> Self {
        Self {
            providers: IndexMap::new(),
        }
    }

    /// The built-in capabilities (currently only [`InputType::IVY_DESCRIPTOR`]).
    pub fn builtin() -> Self {
        let mut capabilities = Self::empty();
        capabilities
            .providers
            .insert(InputType::IVY_DESCRIPTOR, Arc::new(ivy_descriptor));
        capabilities
    }

    /// Register (or replace) the provider for `input`.
    ///
    /// Tags in [`RESERVED_TAGS`] are refused: script rules expose inputs
    /// under their tag next to the module fields.
    pub fn register(
        &mut self,
        input: InputType,
        provider: impl InputProvider + 'static,
    ) -> Result<&mut Self, RuleConfigError> {
        if RESERVED_TAGS.contains(&input.as_str()) {
            return Err(RuleConfigError::ReservedInput { input });
        }
        self.providers.insert(input, Arc::new(provider));
        Ok(self)
    }

    pub fn supports(&self, input: &InputType) -> bool {
        self.providers.contains_key(input)
    }

    pub fn provider(&self, input: &InputType) -> Option<&dyn InputProvider> {
        self.providers.get(input).map(|provider| provider.as_ref())
    }

    /// Registered tags, in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &InputType> {
        self.providers.keys()
    }
}

impl Default for InputCapabilities {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for InputCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.providers.keys()).finish()
    }
}

fn ivy_descriptor(metadata: &ModuleMetadata) -> Option<RuleInput> {
    match &metadata.origin {
        MetadataOrigin::Ivy(ivy) => Some(RuleInput::IvyDescriptor(IvyModuleDescriptor {
            extra_info: ivy.extra_info.clone(),
            branch: ivy.branch.clone(),
            ivy_status: metadata.status.clone(),
        })),
        MetadataOrigin::Maven => None,
    }
}
