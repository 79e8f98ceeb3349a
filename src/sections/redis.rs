//! Redis connection and pool settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BoxError;
use crate::{section, Validate};

pub const DEFAULT_MAX_IDLE: i32 = 3;
pub const DEFAULT_MAX_ACTIVE: i32 = 32;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RedisError {
    #[error("missing Redis Server (or REDISSERVER environment variable)")]
    MissingServer,
}

/// Settings for a single Redis connection or a pool of them.
///
/// `max_idle`, `max_active` and `idle_timeout` only apply to pools; zero
/// values are replaced with defaults during validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub server: String,
    pub user: String,
    pub password: String,
    #[serde(rename = "databaseindex")]
    pub database_index: String,
    #[serde(rename = "maxidle")]
    pub max_idle: i32,
    #[serde(rename = "maxactive")]
    pub max_active: i32,
    #[serde(rename = "idletimeout", with = "humantime_serde")]
    pub idle_timeout: Duration,
}

impl Validate for RedisConfig {
    fn validate(&mut self) -> Result<(), BoxError> {
        if self.server.is_empty() {
            return Err(RedisError::MissingServer.into());
        }
        if self.max_idle == 0 {
            self.max_idle = DEFAULT_MAX_IDLE;
        }
        if self.max_active == 0 {
            self.max_active = DEFAULT_MAX_ACTIVE;
        }
        if self.idle_timeout.is_zero() {
            self.idle_timeout = DEFAULT_IDLE_TIMEOUT;
        }
        Ok(())
    }
}

section!(RedisConfig: Validate {
    server = "REDISSERVER" => value,
    user = "REDISUSER" => value,
    password = "REDISPASS" => value,
    database_index => value,
    max_idle => value,
    max_active => value,
    idle_timeout => value,
});
