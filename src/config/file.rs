//! Reading and parsing configuration documents.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::Value;

use super::{ConfigError, DocumentError};

/// Document grammar of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Yaml,
    Toml,
}

impl Format {
    /// Picks TOML for `.toml` files and YAML for everything else.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }

    pub fn parse<T: DeserializeOwned>(self, contents: &str) -> Result<T, DocumentError> {
        match self {
            Format::Yaml => Ok(serde_yaml::from_str(contents)?),
            Format::Toml => Ok(toml::from_str(contents)?),
        }
    }
}

/// Reads and deserializes a configuration file.
pub(crate) fn load_document<T: DeserializeOwned>(
    path: &Path,
    format: Format,
) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    format
        .parse(&contents)
        .map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Reads a configuration file over an existing record.
///
/// Keys present in the document replace the record's values, nested mappings
/// merge key by key, and keys the document leaves out keep their current
/// value. An empty document changes nothing.
pub(crate) fn load_document_into<T: Serialize + DeserializeOwned>(
    path: &Path,
    format: Format,
    target: &mut T,
) -> Result<(), ConfigError> {
    let overlay: Value = load_document(path, format)?;
    let parse_error = |e: serde_yaml::Error| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e.into(),
    };

    let mut merged = serde_yaml::to_value(&*target).map_err(parse_error)?;
    if !overlay.is_null() {
        deep_merge(&mut merged, overlay);
    }
    *target = serde_yaml::from_value(merged).map_err(parse_error)?;
    Ok(())
}

fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
