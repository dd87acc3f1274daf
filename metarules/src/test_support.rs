//! Test-only helpers for building module metadata and rule files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tempfile::TempDir;

use crate::core::types::{
    IvyOrigin, MetadataOrigin, ModuleMetadata, ModuleVersionIdentifier,
};
use crate::deprecation::DeprecationReporter;
use crate::io::metadata_store::render_metadata;

/// Maven-origin metadata with the default status scheme.
pub fn maven_module(group: &str, name: &str, version: &str, status: &str) -> ModuleMetadata {
    ModuleMetadata::new(
        ModuleVersionIdentifier::new(group, name, version),
        status,
        MetadataOrigin::Maven,
    )
}

/// Ivy-origin metadata with the default status scheme.
pub fn ivy_module(
    group: &str,
    name: &str,
    version: &str,
    status: &str,
    extra_info: &[(&str, &str)],
    branch: Option<&str>,
) -> ModuleMetadata {
    let extra_info: BTreeMap<String, String> = extra_info
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ModuleMetadata::new(
        ModuleVersionIdentifier::new(group, name, version),
        status,
        MetadataOrigin::Ivy(IvyOrigin {
            extra_info,
            branch: branch.map(str::to_string),
        }),
    )
}

/// Collects every deprecation notice, including repeats.
#[derive(Debug, Default)]
pub struct RecordingDeprecationReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingDeprecationReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl DeprecationReporter for RecordingDeprecationReporter {
    fn warn_once(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

/// Scratch directory holding a rules file and metadata documents.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir().context("create tempdir")?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `rules.toml` and return its path.
    pub fn write_rules(&self, contents: &str) -> Result<PathBuf> {
        self.write_file("rules.toml", contents)
    }

    /// Write `metadata` as `<file_name>` and return its path.
    pub fn write_metadata(&self, file_name: &str, metadata: &ModuleMetadata) -> Result<PathBuf> {
        let buf = render_metadata(metadata)?;
        self.write_file(file_name, &buf)
    }

    pub fn write_file(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(file_name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
