//! Configuration hydration: load a document, apply environment overrides, validate.

mod builder;
mod coerce;
mod env;
mod error;
mod file;
mod overrides;
mod path;
mod section;
mod validate;

pub use builder::{load, read, Loader};
pub use coerce::Coerce;
pub use env::{Environment, MapEnv, ProcessEnv};
pub use error::{BoxError, CoerceError, ConfigError, DocumentError};
pub use file::Format;
pub use overrides::apply_overrides;
pub use path::FieldPath;
pub use section::{Field, NodeId, Section, Validate, Validator, Visitor};
pub use validate::validate;
