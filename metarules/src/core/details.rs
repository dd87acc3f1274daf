//! Mutable view over one module's resolved metadata.

use crate::core::types::{ModuleMetadata, ModuleVersionIdentifier};

/// The view rules inspect and mutate.
///
/// Writes go straight to the wrapped metadata; there is no commit step. The
/// identifier is read-only.
#[derive(Debug)]
pub struct ComponentMetadataDetails<'a> {
    metadata: &'a mut ModuleMetadata,
}

impl<'a> ComponentMetadataDetails<'a> {
    pub fn new(metadata: &'a mut ModuleMetadata) -> Self {
        Self { metadata }
    }

    pub fn id(&self) -> &ModuleVersionIdentifier {
        &self.metadata.id
    }

    pub fn status(&self) -> &str {
        &self.metadata.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.metadata.status = status.into();
    }

    pub fn is_changing(&self) -> bool {
        self.metadata.changing
    }

    pub fn set_changing(&mut self, changing: bool) {
        self.metadata.changing = changing;
    }

    pub fn status_scheme(&self) -> &[String] {
        &self.metadata.status_scheme
    }

    /// Replaces the scheme the final status is validated against.
    pub fn set_status_scheme<I, S>(&mut self, scheme: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata.status_scheme = scheme.into_iter().map(Into::into).collect();
    }

    /// Raw metadata, for binding rule inputs.
    pub(crate) fn metadata(&self) -> &ModuleMetadata {
        self.metadata
    }
}
