//! Error types surfaced by rule registration and metadata processing.
//!
//! Registration errors ([`RuleConfigError`]) are raised while rules are being
//! declared and leave the registry untouched. Processing errors
//! ([`ProcessError`]) are raised per module and never affect other modules.

use thiserror::Error;

use crate::core::inputs::InputType;
use crate::core::types::ModuleVersionIdentifier;

/// A notation could not be turned into a module identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("Cannot convert the provided notation to a module identifier: {notation}. {hint}")]
    Unsupported { notation: String, hint: String },
}

/// A rule could not be registered.
#[derive(Debug, Error)]
pub enum RuleConfigError {
    #[error("Could not add a component metadata rule for module '{notation}'.")]
    InvalidModule {
        notation: String,
        #[source]
        source: NotationError,
    },

    #[error(
        "Rule may not have an input of type '{input}'. Supported input types: [{}]",
        .supported.join(", ")
    )]
    UnsupportedInput {
        input: InputType,
        supported: Vec<String>,
    },

    #[error(
        "Input type '{input}' is reserved by the rule script context. Reserved names: [{}]",
        crate::core::inputs::RESERVED_TAGS.join(", ")
    )]
    ReservedInput { input: InputType },

    #[error("Could not compile component metadata rule script ({field}).")]
    InvalidScript {
        field: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

/// Processing of one module's metadata failed.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// A rule body returned an error; later rules for the module did not run.
    #[error("Could not apply component metadata rule for {id}.")]
    RuleFailed {
        id: ModuleVersionIdentifier,
        #[source]
        source: anyhow::Error,
    },

    /// The final status is not part of the module's status scheme.
    #[error(
        "Unexpected status '{status}' specified for {id}. Expected one of: [{}]",
        .scheme.join(", ")
    )]
    InvalidStatus {
        id: ModuleVersionIdentifier,
        status: String,
        scheme: Vec<String>,
    },

    /// A rule declared an input no provider can bind. Registration validates
    /// inputs against the same capabilities, so reaching this is a bug.
    #[error("internal error: no provider bound for rule input '{input}' (module {id})")]
    UnboundInput {
        id: ModuleVersionIdentifier,
        input: InputType,
    },
}

impl ProcessError {
    /// Coordinates of the module whose processing failed.
    pub fn module_id(&self) -> &ModuleVersionIdentifier {
        match self {
            ProcessError::RuleFailed { id, .. }
            | ProcessError::InvalidStatus { id, .. }
            | ProcessError::UnboundInput { id, .. } => id,
        }
    }
}
