use serde::{Deserialize, Serialize};

use crate::section;

/// Outgoing mail server settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
}

section!(SmtpConfig {
    server => value,
    port => value,
    user = "SMTPUSER" => value,
    password = "SMTPPASS" => value,
    from => value,
});
