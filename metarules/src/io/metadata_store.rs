//! Module metadata document load/save helpers with schema validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::{Validator, validator_for};
use serde_json::Value;

use crate::core::types::ModuleMetadata;

const METADATA_SCHEMA: &str = include_str!("../../../schemas/module_metadata/v1.schema.json");

/// Reads module metadata documents.
///
/// Documents are checked against the v1 schema before deserialization.
/// Documents without a `status_scheme` get the configured default.
pub struct MetadataReader {
    validator: Validator,
    default_status_scheme: Vec<String>,
}

impl MetadataReader {
    pub fn new(default_status_scheme: Vec<String>) -> Result<Self> {
        let schema: Value =
            serde_json::from_str(METADATA_SCHEMA).context("parse module metadata schema")?;
        let validator = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
        Ok(Self {
            validator,
            default_status_scheme,
        })
    }

    /// Load and validate one document from disk.
    pub fn read(&self, path: &Path) -> Result<ModuleMetadata> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read metadata {}", path.display()))?;
        self.parse(&contents)
            .with_context(|| format!("load metadata {}", path.display()))
    }

    /// Parse and validate one document.
    pub fn parse(&self, contents: &str) -> Result<ModuleMetadata> {
        let mut value: Value = serde_json::from_str(contents).context("parse metadata json")?;
        self.validate_schema(&value)?;
        if let Value::Object(map) = &mut value {
            map.entry("status_scheme")
                .or_insert_with(|| Value::from(self.default_status_scheme.clone()));
        }
        serde_json::from_value(value).context("deserialize metadata")
    }

    fn validate_schema(&self, value: &Value) -> Result<()> {
        if self.validator.is_valid(value) {
            return Ok(());
        }
        let messages = self
            .validator
            .iter_errors(value)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        Err(anyhow!(
            "metadata schema validation failed: {}",
            messages.join("; ")
        ))
    }
}

/// Serialize metadata as pretty JSON with a trailing newline.
pub fn render_metadata(metadata: &ModuleMetadata) -> Result<String> {
    let mut buf = serde_json::to_string_pretty(metadata).context("serialize metadata")?;
    buf.push('\n');
    Ok(buf)
}

/// Write metadata back to disk.
pub fn write_metadata(path: &Path, metadata: &ModuleMetadata) -> Result<()> {
    let buf = render_metadata(metadata)?;
    fs::write(path, buf).with_context(|| format!("write metadata {}", path.display()))
}
