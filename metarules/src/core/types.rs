//! Shared data types for resolved module metadata.
//!
//! These types are plain values: they carry no behavior beyond formatting and
//! projection, and are shared by the notation parser, the rule engine and the
//! metadata documents read from disk.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Status scheme assumed when a module does not declare its own.
pub const DEFAULT_STATUS_SCHEME: [&str; 3] = ["integration", "milestone", "release"];

/// Returns [`DEFAULT_STATUS_SCHEME`] as owned strings.
pub fn default_status_scheme() -> Vec<String> {
    DEFAULT_STATUS_SCHEME.iter().map(|s| s.to_string()).collect()
}

/// Version-independent `(group, name)` coordinate of an external module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleIdentifier {
    group: String,
    name: String,
}

impl ModuleIdentifier {
    /// Only the notation parser and identifier projections build these.
    pub(crate) fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ModuleIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.name)
    }
}

/// Identifier of one resolved module version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleVersionIdentifier {
    pub group: String,
    pub name: String,
    pub version: String,
}

impl ModuleVersionIdentifier {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// The version-independent coordinate of this module.
    pub fn module(&self) -> ModuleIdentifier {
        ModuleIdentifier::new(self.group.clone(), self.name.clone())
    }
}

impl fmt::Display for ModuleVersionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

/// Descriptor format the metadata was resolved from.
///
/// Only Ivy descriptors carry extra info and a branch; rules asking for those
/// are skipped for every other origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum MetadataOrigin {
    Ivy(IvyOrigin),
    Maven,
}

impl MetadataOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            MetadataOrigin::Ivy(_) => "ivy",
            MetadataOrigin::Maven => "maven",
        }
    }
}

/// Ivy-specific descriptor fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IvyOrigin {
    #[serde(default)]
    pub extra_info: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Raw metadata of one resolved module.
///
/// Rules never touch this directly; they see it through
/// [`ComponentMetadataDetails`](crate::core::details::ComponentMetadataDetails).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub id: ModuleVersionIdentifier,
    pub status: String,
    pub status_scheme: Vec<String>,
    #[serde(default)]
    pub changing: bool,
    pub origin: MetadataOrigin,
}

impl ModuleMetadata {
    /// Metadata with the default status scheme and `changing = false`.
    pub fn new(
        id: ModuleVersionIdentifier,
        status: impl Into<String>,
        origin: MetadataOrigin,
    ) -> Self {
        Self {
            id,
            status: status.into(),
            status_scheme: default_status_scheme(),
            changing: false,
            origin,
        }
    }
}

/// Ivy descriptor view handed to rules that declare the `ivy` input.
///
/// A snapshot taken when the rule's inputs are bound; `ivy_status` is the
/// module status at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IvyModuleDescriptor {
    pub extra_info: BTreeMap<String, String>,
    pub branch: Option<String>,
    pub ivy_status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_projection_drops_version() {
        let id = ModuleVersionIdentifier::new("org.acme", "widget", "1.2");
        let module = id.module();
        assert_eq!(module.group(), "org.acme");
        assert_eq!(module.name(), "widget");
        assert_eq!(module.to_string(), "org.acme:widget");
        assert_eq!(id.to_string(), "org.acme:widget:1.2");
    }

    #[test]
    fn origin_serializes_with_format_tag() {
        let origin = MetadataOrigin::Ivy(IvyOrigin {
            extra_info: BTreeMap::from([("a".to_string(), "1".to_string())]),
            branch: Some("main".to_string()),
        });
        let json = serde_json::to_value(&origin).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"format": "ivy", "extra_info": {"a": "1"}, "branch": "main"})
        );

        let maven: MetadataOrigin =
            serde_json::from_value(serde_json::json!({"format": "maven"})).expect("deserialize");
        assert_eq!(maven, MetadataOrigin::Maven);
    }
}
