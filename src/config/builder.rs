use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::env::{Environment, ProcessEnv};
use super::file::{load_document, load_document_into, Format};
use super::overrides::apply_overrides;
use super::section::Section;
use super::validate::validate;
use super::ConfigError;

/// Loads a configuration file into a typed record.
///
/// Loading runs four steps in order and stops at the first failure:
///
/// 1. read the file,
/// 2. deserialize it (YAML, or TOML for `.toml` files),
/// 3. apply environment overrides to every bound field,
/// 4. run the validators of the record and all its sections.
///
/// ## Example
///
/// ```no_run
/// use serde::Deserialize;
/// use server_config::{section, Loader};
///
/// #[derive(Debug, Default, Deserialize)]
/// #[serde(default)]
/// struct AppConfig {
///     name: String,
///     port: u16,
/// }
///
/// section!(AppConfig {
///     name => value,
///     port = "APP_PORT" => value,
/// });
///
/// // port: 8080 in the file, APP_PORT=9191 in the environment
/// let config: AppConfig = Loader::new("config/app.yaml").load()?;
/// # Ok::<(), server_config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
#[must_use = "loaders do nothing until .load() is called"]
pub struct Loader<E = ProcessEnv> {
    path: PathBuf,
    format: Option<Format>,
    env: E,
}

impl Loader<ProcessEnv> {
    /// Creates a loader for `path` backed by the process environment.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format: None,
            env: ProcessEnv,
        }
    }
}

impl<E: Environment> Loader<E> {
    /// Forces the document format instead of inferring it from the extension.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Replaces the source of environment overrides.
    pub fn with_env<F: Environment>(self, env: F) -> Loader<F> {
        Loader {
            path: self.path,
            format: self.format,
            env,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format.unwrap_or_else(|| Format::from_path(&self.path))
    }

    /// Loads, overrides and validates a new record.
    pub fn load<T: Section + DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let format = self.format();
        debug!(path = %self.path.display(), ?format, "loading configuration");

        let mut config: T = load_document(&self.path, format)?;
        self.hydrate(&mut config)?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but reads the document over an existing record.
    ///
    /// Values the document does not mention keep what the target already held;
    /// nested sections merge key by key and lists are replaced whole. An absent
    /// target fails with [`ConfigError::InvalidTarget`] before the file is
    /// touched. After a failure the target may hold a partially loaded value.
    pub fn load_into<T: Section + Serialize + DeserializeOwned>(
        &self,
        target: Option<&mut T>,
    ) -> Result<(), ConfigError> {
        let target = target.ok_or(ConfigError::InvalidTarget)?;
        let format = self.format();
        debug!(path = %self.path.display(), ?format, "loading configuration");

        load_document_into(&self.path, format, target)?;
        self.hydrate(target)
    }

    fn hydrate(&self, config: &mut dyn Section) -> Result<(), ConfigError> {
        apply_overrides(config, &self.env)?;
        validate(config)?;
        debug!(path = %self.path.display(), "configuration loaded");
        Ok(())
    }
}

/// Loads `path` with overrides from the process environment.
pub fn load<T: Section + DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    Loader::new(path).load()
}

/// Loads `path` into `target` with overrides from the process environment.
pub fn read<T: Section + Serialize + DeserializeOwned>(
    path: impl AsRef<Path>,
    target: Option<&mut T>,
) -> Result<(), ConfigError> {
    Loader::new(path).load_into(target)
}
