//! Module identifier notation parsing.
//!
//! Accepts `"group:name"` strings, `{group, name}` maps, and existing
//! identifiers. Versions, wildcards and ranges are rejected: rules are scoped
//! to a module, never to a version.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::core::error::NotationError;
use crate::core::types::ModuleIdentifier;

const INVALID_CHARS: [char; 7] = ['*', '[', ']', '(', ')', ',', '+'];

static TEXT_NOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^:]+?)\s*:\s*([^:]+?)\s*$").expect("module notation regex should be valid")
});

/// User-supplied value naming a module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ModuleNotation {
    /// `"group:name"`.
    Text(String),
    /// A map with `group` and `name` keys.
    Map(BTreeMap<String, String>),
    #[serde(skip_deserializing)]
    Identifier(ModuleIdentifier),
    /// No value at all.
    #[serde(skip_deserializing)]
    Null,
}

impl fmt::Display for ModuleNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleNotation::Text(text) => f.write_str(text),
            ModuleNotation::Map(map) => {
                let entries: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            ModuleNotation::Identifier(id) => write!(f, "{id}"),
            ModuleNotation::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for ModuleNotation {
    fn from(value: &str) -> Self {
        ModuleNotation::Text(value.to_string())
    }
}

impl From<String> for ModuleNotation {
    fn from(value: String) -> Self {
        ModuleNotation::Text(value)
    }
}

impl From<BTreeMap<String, String>> for ModuleNotation {
    fn from(value: BTreeMap<String, String>) -> Self {
        ModuleNotation::Map(value)
    }
}

impl From<ModuleIdentifier> for ModuleNotation {
    fn from(value: ModuleIdentifier) -> Self {
        ModuleNotation::Identifier(value)
    }
}

impl<T: Into<ModuleNotation>> From<Option<T>> for ModuleNotation {
    fn from(value: Option<T>) -> Self {
        value.map_or(ModuleNotation::Null, Into::into)
    }
}

/// Resolve a notation into a canonical module identifier.
pub fn parse_module_identifier(notation: &ModuleNotation) -> Result<ModuleIdentifier, NotationError> {
    match notation {
        ModuleNotation::Identifier(id) => Ok(id.clone()),
        ModuleNotation::Text(text) => {
            let caps = TEXT_NOTATION_RE
                .captures(text)
                .ok_or_else(|| unsupported(notation, "Expected the form 'group:name'."))?;
            let group = validate_part(&caps[1], notation)?;
            let name = validate_part(&caps[2], notation)?;
            Ok(ModuleIdentifier::new(group, name))
        }
        ModuleNotation::Map(map) => {
            if let Some(key) = map.keys().find(|k| *k != "group" && *k != "name") {
                return Err(unsupported(
                    notation,
                    &format!("Unexpected key '{key}'; only 'group' and 'name' are allowed."),
                ));
            }
            let group = map
                .get("group")
                .ok_or_else(|| unsupported(notation, "Missing required key 'group'."))?;
            let name = map
                .get("name")
                .ok_or_else(|| unsupported(notation, "Missing required key 'name'."))?;
            let group = validate_part(group.trim(), notation)?;
            let name = validate_part(name.trim(), notation)?;
            Ok(ModuleIdentifier::new(group, name))
        }
        ModuleNotation::Null => Err(unsupported(notation, "A module notation is required.")),
    }
}

fn validate_part<'a>(part: &'a str, notation: &ModuleNotation) -> Result<&'a str, NotationError> {
    if part.is_empty() {
        return Err(unsupported(notation, "Group and name must not be empty."));
    }
    if let Some(c) = part.chars().find(|c| INVALID_CHARS.contains(c)) {
        return Err(unsupported(
            notation,
            &format!("Character '{c}' is not allowed in a module identifier."),
        ));
    }
    Ok(part)
}

fn unsupported(notation: &ModuleNotation, hint: &str) -> NotationError {
    NotationError::Unsupported {
        notation: notation.to_string(),
        hint: hint.to_string(),
    }
}
