pub mod config;
pub mod sections;

pub use config::{
    apply_overrides, load, read, validate, BoxError, Coerce, CoerceError, ConfigError,
    DocumentError, Environment, Field, FieldPath, Format, Loader, MapEnv, NodeId, ProcessEnv,
    Section, Validate, Validator, Visitor,
};
pub use sections::ServerConfig;
