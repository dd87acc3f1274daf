//! Orchestration for `metarules check` and `metarules apply`.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::error::ProcessError;
use crate::core::types::ModuleMetadata;
use crate::handler::{ComponentMetadataHandler, ComponentMetadataProcessor};
use crate::io::config::{RulesConfig, load_config};
use crate::io::metadata_store::MetadataReader;

/// A rules file turned into a ready-to-use handler.
#[derive(Debug)]
pub struct LoadedRules {
    pub handler: ComponentMetadataHandler,
    pub config: RulesConfig,
}

/// Register every rule declared in `config`.
///
/// `[[rules]]` come first, in file order, then `[[each_component]]`.
pub fn build_handler(config: &RulesConfig) -> Result<ComponentMetadataHandler> {
    let mut handler = ComponentMetadataHandler::new();
    for (index, decl) in config.rules.iter().enumerate() {
        let action = handler
            .adapter()
            .from_script(decl.script())
            .with_context(|| format!("rules[{index}]"))?;
        match &decl.module {
            Some(module) => {
                handler
                    .with_module(module.clone(), action)
                    .with_context(|| format!("rules[{index}]"))?;
            }
            None => {
                handler.all(action);
            }
        }
    }
    for (index, decl) in config.each_component.iter().enumerate() {
        let action = handler
            .adapter()
            .from_script(decl.script())
            .with_context(|| format!("each_component[{index}]"))?;
        #[allow(deprecated)]
        handler.each_component(action);
    }
    Ok(handler)
}

/// Load a rules file and register its rules.
pub fn load_rules(path: &Path) -> Result<LoadedRules> {
    let config = load_config(path).with_context(|| "load rules file")?;
    let handler = build_handler(&config)?;
    info!(path = %path.display(), rules = handler.len(), "rules loaded");
    Ok(LoadedRules { handler, config })
}

/// Result of processing one metadata document.
#[derive(Debug)]
pub struct ModuleOutcome {
    pub path: PathBuf,
    pub result: Result<ModuleMetadata, ProcessError>,
}

/// Read every document, then process all of them against `handler`.
///
/// Unreadable or schema-invalid documents fail the whole call; rule and
/// status failures are reported per module.
pub fn apply_to_files(
    handler: &ComponentMetadataHandler,
    reader: &MetadataReader,
    paths: &[PathBuf],
) -> Result<Vec<ModuleOutcome>> {
    let modules = paths
        .iter()
        .map(|path| reader.read(path).map(|metadata| (path.clone(), metadata)))
        .collect::<Result<Vec<_>>>()?;
    Ok(process_all(handler, modules))
}

/// Process modules concurrently. Outcomes keep the input order.
pub fn process_all<P>(handler: &P, modules: Vec<(PathBuf, ModuleMetadata)>) -> Vec<ModuleOutcome>
where
    P: ComponentMetadataProcessor + Sync,
{
    if modules.is_empty() {
        return Vec::new();
    }
    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(modules.len());
    let chunk_size = modules.len().div_ceil(workers);
    debug!(modules = modules.len(), workers, "processing modules");

    let mut chunks: Vec<Vec<(PathBuf, ModuleMetadata)>> = Vec::with_capacity(workers);
    let mut remaining = modules.into_iter().peekable();
    while remaining.peek().is_some() {
        chunks.push(remaining.by_ref().take(chunk_size).collect());
    }

    thread::scope(|scope| {
        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| scope.spawn(move || process_chunk(handler, chunk)))
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(outcomes) => outcomes,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}

fn process_chunk<P>(handler: &P, chunk: Vec<(PathBuf, ModuleMetadata)>) -> Vec<ModuleOutcome>
where
    P: ComponentMetadataProcessor,
{
    chunk
        .into_iter()
        .map(|(path, mut metadata)| {
            let result = handler
                .process_metadata(&mut metadata)
                .map(|()| metadata);
            ModuleOutcome { path, result }
        })
        .collect()
}
