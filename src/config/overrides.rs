//! Environment override pass.

use tracing::debug;

use super::coerce::Coerce;
use super::env::Environment;
use super::path::FieldPath;
use super::section::{Field, Section, Visitor};
use super::{CoerceError, ConfigError};

/// Replaces every bound field whose key is set in `env`.
///
/// Fields are visited depth first in declaration order. The pass stops at the
/// first value that fails to coerce; overrides applied before it are kept.
pub fn apply_overrides(root: &mut dyn Section, env: &dyn Environment) -> Result<(), ConfigError> {
    let mut applier = OverrideApplier {
        env,
        path: FieldPath::root(),
    };
    root.visit(&mut applier)
}

struct OverrideApplier<'e> {
    env: &'e dyn Environment,
    path: FieldPath,
}

impl OverrideApplier<'_> {
    /// The raw value for a bound field, if its key is set.
    fn lookup(&self, field: &Field) -> Option<(&'static str, String)> {
        let key = field.env?;
        self.env.var(key).map(|raw| (key, raw))
    }
}

impl Visitor for OverrideApplier<'_> {
    fn value(&mut self, field: Field, value: &mut dyn Coerce) -> Result<(), ConfigError> {
        let Some((key, raw)) = self.lookup(&field) else {
            return Ok(());
        };
        let path = self.path.child(field.name);
        value
            .coerce(&raw)
            .map_err(|source| ConfigError::Override {
                path: path.clone(),
                key,
                source,
            })?;
        debug!(%path, env = key, "applied environment override");
        Ok(())
    }

    fn section(
        &mut self,
        field: Field,
        section: Option<&mut dyn Section>,
    ) -> Result<(), ConfigError> {
        if let Some((key, _)) = self.lookup(&field) {
            return Err(ConfigError::Override {
                path: self.path.child(field.name),
                key,
                source: CoerceError::UnsupportedOverrideTarget(field.type_name.to_string()),
            });
        }

        let Some(section) = section else {
            return Ok(());
        };
        self.path.push(field.name);
        let result = section.visit(self);
        self.path.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::MapEnv;
    use crate::section;
    use std::time::Duration;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Runtime {
        enabled: bool,
        port: i32,
        hosts: Vec<String>,
        timeout: Duration,
        max_retries: Option<i32>,
    }

    section!(Runtime {
        enabled = "APP_ENABLED" => value,
        port = "APP_PORT" => value,
        hosts = "APP_HOSTS" => value,
        timeout = "APP_TIMEOUT" => value,
        max_retries = "APP_MAX_RETRIES" => value,
    });

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Plain {
        name: String,
        runtime: Runtime,
    }

    section!(Plain {
        name => value,
        runtime => section,
    });

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Root {
        plain: Plain,
        extra: Option<Box<Runtime>>,
        bound: Runtime,
    }

    section!(Root {
        plain => section,
        extra => optional,
        bound = "APP_BOUND" => section,
    });

    fn sample() -> Root {
        Root {
            plain: Plain {
                name: "from-yaml".into(),
                runtime: Runtime {
                    enabled: false,
                    port: 8080,
                    hosts: vec!["host-a".into()],
                    timeout: Duration::from_secs(5),
                    max_retries: Some(1),
                },
            },
            extra: None,
            bound: Runtime::default(),
        }
    }

    #[test]
    fn test_empty_environment_is_noop() {
        let mut root = sample();
        apply_overrides(&mut root, &MapEnv::new()).unwrap();
        assert_eq!(root, sample());
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Unbound {
        name: String,
        port: i32,
        nested: Plainer,
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Plainer {
        enabled: bool,
    }

    section!(Unbound {
        name => value,
        port => value,
        nested => section,
    });

    section!(Plainer {
        enabled => value,
    });

    #[test]
    fn test_tree_without_bindings_ignores_populated_environment() {
        let env = MapEnv::new()
            .with("name", "env-name")
            .with("NAME", "env-name")
            .with("port", "1")
            .with("PORT", "1")
            .with("enabled", "true")
            .with("ENABLED", "true")
            .with("APP_PORT", "9191");

        let before = Unbound {
            name: "from-yaml".into(),
            port: 8080,
            nested: Plainer { enabled: false },
        };
        let mut root = before.clone();
        apply_overrides(&mut root, &env).unwrap();
        assert_eq!(root, before);
    }

    #[test]
    fn test_overrides_reach_unbound_parents() {
        let env = MapEnv::new()
            .with("APP_ENABLED", "true")
            .with("APP_PORT", "9191")
            .with("APP_HOSTS", "host-x, host-y")
            .with("APP_TIMEOUT", "45s")
            .with("APP_MAX_RETRIES", "7");

        let mut root = sample();
        apply_overrides(&mut root, &env).unwrap();

        // Both `plain.runtime` and `bound` share the same keys.
        for runtime in [&root.plain.runtime, &root.bound] {
            assert!(runtime.enabled);
            assert_eq!(runtime.port, 9191);
            assert_eq!(runtime.hosts, vec!["host-x", "host-y"]);
            assert_eq!(runtime.timeout, Duration::from_secs(45));
            assert_eq!(runtime.max_retries, Some(7));
        }
        assert_eq!(root.plain.name, "from-yaml");
    }

    #[test]
    fn test_absent_keys_keep_source_values() {
        let env = MapEnv::new().with("APP_PORT", "9191");
        let mut root = sample();
        apply_overrides(&mut root, &env).unwrap();

        assert_eq!(root.plain.runtime.port, 9191);
        assert_eq!(root.plain.runtime.hosts, vec!["host-a"]);
        assert_eq!(root.plain.runtime.timeout, Duration::from_secs(5));
        assert_eq!(root.plain.runtime.max_retries, Some(1));
    }

    #[test]
    fn test_absent_optional_section_is_not_created() {
        let env = MapEnv::new().with("APP_PORT", "9191");
        let mut root = sample();
        apply_overrides(&mut root, &env).unwrap();
        assert!(root.extra.is_none());

        root.extra = Some(Box::default());
        apply_overrides(&mut root, &env).unwrap();
        assert_eq!(root.extra.as_ref().map(|r| r.port), Some(9191));
    }

    #[test]
    fn test_failure_aborts_with_path_and_keeps_earlier_overrides() {
        let env = MapEnv::new()
            .with("APP_ENABLED", "true")
            .with("APP_PORT", "not-a-port");

        let mut root = sample();
        let err = apply_overrides(&mut root, &env).unwrap_err();

        match &err {
            ConfigError::Override { path, key, source } => {
                assert_eq!(*path, "plain.runtime.port");
                assert_eq!(*key, "APP_PORT");
                assert!(matches!(source, CoerceError::InvalidNumber { kind: "i32", .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("APP_PORT (plain.runtime.port)"));

        assert!(root.plain.runtime.enabled);
        assert_eq!(root.plain.runtime.port, 8080);
        // Traversal stopped before the second runtime.
        assert!(!root.bound.enabled);
    }

    #[test]
    fn test_bound_record_is_unsupported_target() {
        let env = MapEnv::new().with("APP_BOUND", "anything");
        let mut root = sample();
        let err = apply_overrides(&mut root, &env).unwrap_err();

        match err {
            ConfigError::Override {
                path,
                source: CoerceError::UnsupportedOverrideTarget(ty),
                ..
            } => {
                assert_eq!(path, "bound");
                assert!(ty.contains("Runtime"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_duration_reports_invalid_duration() {
        let env = MapEnv::new().with("APP_TIMEOUT", "bogus");
        let mut root = sample();
        let err = apply_overrides(&mut root, &env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Override {
                source: CoerceError::InvalidDuration(_),
                ..
            }
        ));
        assert_eq!(root.plain.runtime.timeout, Duration::from_secs(5));
    }
}
