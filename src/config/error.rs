use std::path::PathBuf;
use thiserror::Error;

use super::path::FieldPath;

/// Boxed error returned by validators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config target must be a present, mutable record")]
    InvalidTarget,

    #[error("unable to read configuration file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unable to parse configuration file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: DocumentError,
    },

    #[error("invalid value for env {key} ({path}): {source}")]
    Override {
        path: FieldPath,
        key: &'static str,
        source: CoerceError,
    },

    #[error("{}{}", .path.prefix(), .source)]
    Validation { path: FieldPath, source: BoxError },
}

impl ConfigError {
    /// Dotted path of the field or section the error was raised for, if any.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            ConfigError::Override { path, .. } | ConfigError::Validation { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Failure to turn a raw override string into a field value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoerceError {
    #[error("expected bool, got {0:?}")]
    InvalidBoolean(String),

    #[error("expected duration, got {0:?}")]
    InvalidDuration(String),

    #[error("expected {kind}, got {raw:?}")]
    InvalidNumber { raw: String, kind: &'static str },

    #[error("unsupported field type {0}")]
    UnsupportedOverrideTarget(String),
}

/// Error produced by the structured-text deserializer.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
