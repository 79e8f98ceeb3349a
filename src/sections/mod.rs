//! Ready-made sections for a typical server application.
//!
//! Each section is an ordinary [`Section`](crate::Section); the ones that check
//! or complete themselves implement [`Validate`](crate::Validate).
//!
//! ```yaml
//! logging:
//!   syslog_enabled: true
//! database:
//!   server: db.local:3306
//!   user: app
//!   db: maindb
//! redis:
//!   server: redis.local:6379
//! http:
//!   externalhostname:
//!     - example.com
//!   static_cert:
//!     certfile: /etc/ssl/cert.pem
//!     privatekeyfile: /etc/ssl/key.pem
//! ```

mod database;
mod http;
mod logging;
mod redis;
mod smtp;

pub use database::{DatabaseError, MySqlDatabase, ParamValue, PostgresDatabase};
pub use http::{
    check_external_hostname, HostnameError, HttpAcmeConfig, HttpConfig, HttpError,
    HttpSessionCookieConfig, HttpStaticCertConfig,
};
pub use logging::{Facility, LoggingConfig, LoggingError, Priority, Severity, SyslogConfig};
pub use redis::{RedisConfig, RedisError};
pub use smtp::SmtpConfig;

use serde::{Deserialize, Serialize};

use crate::section;

/// Complete configuration of a server application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub logging: LoggingConfig,
    pub database: MySqlDatabase,
    pub redis: RedisConfig,
    pub smtp: SmtpConfig,
    pub http: HttpConfig,
}

section!(ServerConfig {
    logging => section,
    database => section,
    redis => section,
    smtp => section,
    http => section,
});
