//! Record model walked by the override and validation passes.
//!
//! A configuration record describes its own fields by implementing [`Section`]:
//! `visit` hands every overridable value and every nested record to a
//! [`Visitor`], in declaration order. Records that check or normalise
//! themselves also implement [`Validate`] and expose it through
//! [`Section::validator`].
//!
//! The [`section!`](crate::section) macro writes both for you:
//!
//! ```
//! use serde::Deserialize;
//! use server_config::{section, BoxError, Validate};
//!
//! #[derive(Debug, Default, Deserialize)]
//! #[serde(default)]
//! struct Runtime {
//!     port: u16,
//!     hosts: Vec<String>,
//! }
//!
//! impl Validate for Runtime {
//!     fn validate(&mut self) -> Result<(), BoxError> {
//!         if self.port == 0 {
//!             self.port = 8080;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! section!(Runtime: Validate {
//!     port = "APP_PORT" => value,
//!     hosts = "APP_HOSTS" => value,
//! });
//! ```

use std::any::TypeId;

use super::coerce::Coerce;
use super::error::BoxError;
use super::ConfigError;

/// Static description of one field as seen by a [`Visitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Rust field name, used as the path segment.
    pub name: &'static str,
    /// Environment key that overrides this field, if any.
    pub env: Option<&'static str>,
    /// Declared type, for diagnostics.
    pub type_name: &'static str,
}

impl Field {
    /// An empty key counts as no binding.
    pub fn new(name: &'static str, env: Option<&'static str>, type_name: &'static str) -> Self {
        Self {
            name,
            env: env.filter(|key| !key.is_empty()),
            type_name,
        }
    }
}

/// Receives the fields of a record.
pub trait Visitor {
    /// A leaf value: scalar, duration, string list, or an optional of those.
    fn value(&mut self, field: Field, value: &mut dyn Coerce) -> Result<(), ConfigError>;

    /// A nested record. `None` marks an absent optional record.
    fn section(&mut self, field: Field, section: Option<&mut dyn Section>)
        -> Result<(), ConfigError>;
}

/// A configuration record.
pub trait Section {
    /// Hands each field to `visitor` in declaration order, stopping at the first error.
    fn visit(&mut self, visitor: &mut dyn Visitor) -> Result<(), ConfigError>;

    /// The record's validation capability. Records without one keep the default.
    fn validator(&mut self) -> Option<Validator<'_>> {
        None
    }
}

impl<T: Section + ?Sized> Section for Box<T> {
    fn visit(&mut self, visitor: &mut dyn Visitor) -> Result<(), ConfigError> {
        (**self).visit(visitor)
    }

    fn validator(&mut self) -> Option<Validator<'_>> {
        (**self).validator()
    }
}

/// Check-and-normalise step for a record.
///
/// Validators may rewrite their own fields (defaults, derived values) and must
/// be idempotent: a second run over already normalised data is a no-op.
pub trait Validate: 'static {
    fn validate(&mut self) -> Result<(), BoxError>;

    /// Wraps `self` for [`Section::validator`].
    fn as_validator(&mut self) -> Validator<'_>
    where
        Self: Sized,
    {
        Validator::new(self)
    }
}

/// Identity of a validated record: where it lives and what it is.
///
/// The type is part of the identity because a record and its first field can
/// share an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    addr: usize,
    type_id: TypeId,
}

impl NodeId {
    pub fn of<T: 'static>(node: &T) -> Self {
        Self {
            addr: node as *const T as usize,
            type_id: TypeId::of::<T>(),
        }
    }
}

/// A borrowed validation capability together with the identity of its record.
///
/// Zero-sized records have no identity: distinct fields of such a type share
/// an address, so each one is validated.
pub struct Validator<'a> {
    id: Option<NodeId>,
    target: &'a mut dyn Validate,
}

impl<'a> Validator<'a> {
    pub fn new<T: Validate>(target: &'a mut T) -> Self {
        Self {
            id: (std::mem::size_of::<T>() != 0).then(|| NodeId::of(&*target)),
            target,
        }
    }

    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn run(self) -> Result<(), BoxError> {
        self.target.validate()
    }
}

impl std::fmt::Debug for Validator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator").field("id", &self.id).finish()
    }
}

/// Implements [`Section`] for a struct from a list of its fields.
///
/// Each entry is `field => kind` or `field = "ENV_KEY" => kind`, where `kind` is
/// `value` (a [`Coerce`] leaf), `section` (a nested record, by value or boxed)
/// or `optional` (an `Option` of a nested record). Fields left out are not
/// walked. Writing `Type: Validate` wires the type's [`Validate`] impl in as its
/// validator.
#[macro_export]
macro_rules! section {
    (@env) => {
        ::std::option::Option::None
    };
    (@env $env:literal) => {
        ::std::option::Option::Some($env)
    };
    (@field $visitor:ident, $this:ident, $name:ident, $field:expr, value) => {
        $visitor.value($field, &mut $this.$name)?
    };
    (@field $visitor:ident, $this:ident, $name:ident, $field:expr, section) => {
        $visitor.section(
            $field,
            ::std::option::Option::Some(&mut $this.$name as &mut dyn $crate::Section),
        )?
    };
    (@field $visitor:ident, $this:ident, $name:ident, $field:expr, optional) => {
        $visitor.section(
            $field,
            $this
                .$name
                .as_mut()
                .map(|inner| inner as &mut dyn $crate::Section),
        )?
    };
    ($ty:ident $(: $cap:ident)? { $($name:ident $(= $env:literal)? => $kind:ident),* $(,)? }) => {
        impl $crate::Section for $ty {
            #[allow(unused_variables)]
            fn visit(
                &mut self,
                visitor: &mut dyn $crate::Visitor,
            ) -> ::std::result::Result<(), $crate::ConfigError> {
                $(
                    let field = $crate::Field::new(
                        stringify!($name),
                        $crate::section!(@env $($env)?),
                        ::std::any::type_name_of_val(&self.$name),
                    );
                    $crate::section!(@field visitor, self, $name, field, $kind);
                )*
                ::std::result::Result::Ok(())
            }

            $(
                fn validator(&mut self) -> ::std::option::Option<$crate::Validator<'_>> {
                    ::std::option::Option::Some(<Self as $crate::$cap>::as_validator(self))
                }
            )?
        }
    };
}
