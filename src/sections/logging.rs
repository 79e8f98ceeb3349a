//! Syslog output settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BoxError;
use crate::{section, Validate};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoggingError {
    #[error("invalid logging facility specified: '{0}'")]
    InvalidFacility(String),

    #[error("invalid logging severity specified: '{0}'")]
    InvalidSeverity(String),
}

/// Syslog facility, encoded as in `<syslog.h>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Facility {
    Kern = 0,
    User = 1 << 3,
    Mail = 2 << 3,
    Daemon = 3 << 3,
    Auth = 4 << 3,
    Syslog = 5 << 3,
    Lpr = 6 << 3,
    News = 7 << 3,
    Uucp = 8 << 3,
    Cron = 9 << 3,
    AuthPriv = 10 << 3,
    Ftp = 11 << 3,
    Local0 = 16 << 3,
    Local1 = 17 << 3,
    Local2 = 18 << 3,
    Local3 = 19 << 3,
    Local4 = 20 << 3,
    Local5 = 21 << 3,
    Local6 = 22 << 3,
    Local7 = 23 << 3,
}

impl FromStr for Facility {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, LoggingError> {
        Ok(match s {
            "LOG_KERN" => Facility::Kern,
            "LOG_USER" => Facility::User,
            "LOG_MAIL" => Facility::Mail,
            "LOG_DAEMON" => Facility::Daemon,
            "LOG_AUTH" => Facility::Auth,
            "LOG_SYSLOG" => Facility::Syslog,
            "LOG_LPR" => Facility::Lpr,
            "LOG_NEWS" => Facility::News,
            "LOG_UUCP" => Facility::Uucp,
            "LOG_CRON" => Facility::Cron,
            "LOG_AUTHPRIV" => Facility::AuthPriv,
            "LOG_FTP" => Facility::Ftp,
            "LOG_LOCAL0" => Facility::Local0,
            "LOG_LOCAL1" => Facility::Local1,
            "LOG_LOCAL2" => Facility::Local2,
            "LOG_LOCAL3" => Facility::Local3,
            "LOG_LOCAL4" => Facility::Local4,
            "LOG_LOCAL5" => Facility::Local5,
            "LOG_LOCAL6" => Facility::Local6,
            "LOG_LOCAL7" => Facility::Local7,
            _ => return Err(LoggingError::InvalidFacility(s.to_string())),
        })
    }
}

/// Syslog severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Severity {
    Emerg = 0,
    Alert = 1,
    Crit = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl FromStr for Severity {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, LoggingError> {
        Ok(match s {
            "LOG_EMERG" => Severity::Emerg,
            "LOG_ALERT" => Severity::Alert,
            "LOG_CRIT" => Severity::Crit,
            "LOG_ERR" => Severity::Error,
            "LOG_WARNING" => Severity::Warning,
            "LOG_NOTICE" => Severity::Notice,
            "LOG_INFO" => Severity::Info,
            "LOG_DEBUG" => Severity::Debug,
            _ => return Err(LoggingError::InvalidSeverity(s.to_string())),
        })
    }
}

/// Combined facility and severity, as passed to `openlog`/`syslog`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Priority(u8);

impl Priority {
    pub fn new(facility: Facility, severity: Severity) -> Self {
        Self(facility as u8 | severity as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const DEFAULT_FACILITY: &str = "LOG_LOCAL5";
pub const DEFAULT_SEVERITY: &str = "LOG_INFO";

/// Where and how the application logs.
///
/// ```yaml
/// logging:
///   syslog_enabled: true
///   syslog:
///     facility: LOG_LOCAL5
///     severity: LOG_INFO
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub syslog_enabled: bool,
    pub syslog: SyslogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyslogConfig {
    pub facility: String,
    pub severity: String,
    #[serde(skip)]
    priority: Priority,
}

impl SyslogConfig {
    /// Only meaningful after validation.
    pub fn priority(&self) -> Priority {
        self.priority
    }
}

impl Validate for LoggingConfig {
    fn validate(&mut self) -> Result<(), BoxError> {
        let syslog = &mut self.syslog;
        if syslog.facility.is_empty() {
            syslog.facility = DEFAULT_FACILITY.to_string();
        }
        if syslog.severity.is_empty() {
            syslog.severity = DEFAULT_SEVERITY.to_string();
        }

        let facility: Facility = syslog.facility.parse()?;
        let severity: Severity = syslog.severity.parse()?;
        syslog.priority = Priority::new(facility, severity);
        Ok(())
    }
}

section!(LoggingConfig: Validate {
    syslog_enabled => value,
    syslog => section,
});

section!(SyslogConfig {
    facility => value,
    severity => value,
});
