//! Conversion of raw override strings into typed field values.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use super::CoerceError;

/// A field value that can be replaced from a raw environment string.
///
/// Implementations must leave the value untouched when they return an error.
pub trait Coerce {
    fn coerce(&mut self, raw: &str) -> Result<(), CoerceError>;
}

impl Coerce for String {
    fn coerce(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = raw.to_string();
        Ok(())
    }
}

impl Coerce for PathBuf {
    fn coerce(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = PathBuf::from(raw);
        Ok(())
    }
}

impl Coerce for bool {
    fn coerce(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = parse_bool(raw).ok_or_else(|| CoerceError::InvalidBoolean(raw.to_string()))?;
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl Coerce for Duration {
    fn coerce(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = humantime::parse_duration(raw)
            .map_err(|_| CoerceError::InvalidDuration(raw.to_string()))?;
        Ok(())
    }
}

macro_rules! coerce_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Coerce for $ty {
                fn coerce(&mut self, raw: &str) -> Result<(), CoerceError> {
                    *self = raw.parse::<$ty>().map_err(|_| CoerceError::InvalidNumber {
                        raw: raw.to_string(),
                        kind: stringify!($ty),
                    })?;
                    Ok(())
                }
            }
        )*
    };
}

coerce_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f64);

impl Coerce for f32 {
    fn coerce(&mut self, raw: &str) -> Result<(), CoerceError> {
        let invalid = || CoerceError::InvalidNumber {
            raw: raw.to_string(),
            kind: "f32",
        };
        let wide = raw.parse::<f64>().map_err(|_| invalid())?;
        let narrow = wide as f32;
        // "inf" is fine, 1e40 is not
        if wide.is_finite() && narrow.is_infinite() {
            return Err(invalid());
        }
        *self = narrow;
        Ok(())
    }
}

/// Only lists of strings can be overridden; any other element type is rejected.
impl<T: 'static> Coerce for Vec<T> {
    fn coerce(&mut self, raw: &str) -> Result<(), CoerceError> {
        let any: &mut dyn Any = self;
        let list = any.downcast_mut::<Vec<String>>().ok_or_else(|| {
            CoerceError::UnsupportedOverrideTarget(std::any::type_name::<Vec<T>>().to_string())
        })?;
        *list = split_list(raw);
        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|part| part.trim().to_string()).collect()
}

impl<T: Coerce + Default> Coerce for Option<T> {
    fn coerce(&mut self, raw: &str) -> Result<(), CoerceError> {
        match self {
            Some(value) => value.coerce(raw),
            None => {
                let mut value = T::default();
                value.coerce(raw)?;
                *self = Some(value);
                Ok(())
            }
        }
    }
}

impl<T: Coerce + ?Sized> Coerce for Box<T> {
    fn coerce(&mut self, raw: &str) -> Result<(), CoerceError> {
        (**self).coerce(raw)
    }
}

impl<K, V, S> Coerce for HashMap<K, V, S> {
    fn coerce(&mut self, _raw: &str) -> Result<(), CoerceError> {
        Err(CoerceError::UnsupportedOverrideTarget(
            std::any::type_name::<Self>().to_string(),
        ))
    }
}

impl<K, V> Coerce for BTreeMap<K, V> {
    fn coerce(&mut self, _raw: &str) -> Result<(), CoerceError> {
        Err(CoerceError::UnsupportedOverrideTarget(
            std::any::type_name::<Self>().to_string(),
        ))
    }
}
