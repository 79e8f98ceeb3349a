//! HTTP/HTTPS server settings.

use std::net::{IpAddr, ToSocketAddrs};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::BoxError;
use crate::{section, Validate};

/// Public services that echo the caller's IPv4 address.
const EXTERNAL_IP_PROVIDERS: [&str; 4] = [
    "https://ipv4.whatismyip.akamai.com",
    "https://ipv4.myexternalip.com/raw",
    "https://ipecho.net/plain",
    "https://eth0.me",
];

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("missing at least one externalhostname in configuration")]
    MissingExternalHostname,

    #[error("external hostname test failed: {0}")]
    HostnameTest(#[source] HostnameError),

    #[error("ACME certificates are enabled, but the config is missing http.acme.email value for email address for registration")]
    MissingAcmeEmail,

    #[error("ACME certificates are enabled, but the config is missing http.acme.diskcache value caching certificates")]
    MissingAcmeDiskCache,
}

#[derive(Debug, Error)]
pub enum HostnameError {
    #[error("unable to resolve {hostname}: {source}")]
    Lookup {
        hostname: String,
        source: std::io::Error,
    },

    #[error("unable to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("unable to get external IP from any provider")]
    NoExternalAddress,

    #[error("external IP lookup thread panicked")]
    LookupPanicked,

    #[error("external IP {external} doesn't match any value in DNS ({resolved}) for host name {hostname}")]
    Mismatch {
        external: IpAddr,
        resolved: String,
        hostname: String,
    },
}

/// Settings needed to start an HTTP/HTTPS server.
///
/// ```yaml
/// http:
///   bindaddr: ":80"
///   sslbindaddr: ":443"
///   externalhostname:
///     - www.example.com
///   acme:
///     email: admin@example.com
///     diskcache: /var/cache/acme
/// ```
///
/// Unless `skiphostnametest` is set, validation checks that the first
/// external hostname resolves to the address this host is seen from on the
/// internet. Without a static certificate, ACME settings are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "sslbindaddr")]
    pub ssl_bind_addr: String,
    #[serde(rename = "bindaddr")]
    pub bind_addr: String,
    #[serde(rename = "templatepath")]
    pub template_path: String,
    #[serde(rename = "externalhostname")]
    pub external_hostname: Vec<String>,
    #[serde(rename = "skiphostnametest")]
    pub skip_hostname_test: bool,
    #[serde(rename = "sessioncookie")]
    pub session: HttpSessionCookieConfig,
    pub static_cert: HttpStaticCertConfig,
    pub acme: HttpAcmeConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSessionCookieConfig {
    #[serde(rename = "hashkey")]
    pub hash_key: String,
    #[serde(rename = "encryptkey")]
    pub encrypt_key: String,
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpStaticCertConfig {
    #[serde(rename = "certfile")]
    pub cert_file: String,
    #[serde(rename = "privatekeyfile")]
    pub private_key_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpAcmeConfig {
    pub email: String,
    #[serde(rename = "cadirurl")]
    pub ca_dir_url: String,
    #[serde(rename = "diskcache")]
    pub disk_cache: String,
}

impl HttpConfig {
    fn has_static_cert(&self) -> bool {
        !self.static_cert.cert_file.is_empty() && !self.static_cert.private_key_file.is_empty()
    }
}

impl Validate for HttpConfig {
    fn validate(&mut self) -> Result<(), BoxError> {
        let hostname = match self.external_hostname.first() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(HttpError::MissingExternalHostname.into()),
        };

        if !self.skip_hostname_test {
            check_external_hostname(hostname).map_err(HttpError::HostnameTest)?;
        }

        if !self.has_static_cert() {
            if self.acme.email.is_empty() {
                return Err(HttpError::MissingAcmeEmail.into());
            }
            if self.acme.disk_cache.is_empty() {
                return Err(HttpError::MissingAcmeDiskCache.into());
            }
        }
        Ok(())
    }
}

section!(HttpConfig: Validate {
    ssl_bind_addr => value,
    bind_addr => value,
    template_path => value,
    external_hostname => value,
    skip_hostname_test => value,
    session => section,
    static_cert => section,
    acme => section,
});

section!(HttpSessionCookieConfig {
    hash_key = "SESSIONHASHKEY" => value,
    encrypt_key = "SESSIONENCRYPTKEY" => value,
    domain => value,
});

section!(HttpStaticCertConfig {
    cert_file => value,
    private_key_file => value,
});

section!(HttpAcmeConfig {
    email => value,
    ca_dir_url => value,
    disk_cache => value,
});

/// Checks that `hostname` resolves to the IPv4 address this host reaches the
/// internet from.
///
/// The external address is asked from public echo services, so a host behind
/// NAT is checked against its translated address. Inbound NAT to a different
/// address and IPv6 (AAAA) records are not checked.
///
/// The lookup runs on its own thread, so this is safe to call from within an
/// async runtime.
pub fn check_external_hostname(hostname: &str) -> Result<(), HostnameError> {
    let resolved = resolve_host(hostname)?;
    let external = std::thread::scope(|s| s.spawn(external_ipv4).join())
        .map_err(|_| HostnameError::LookupPanicked)??;
    match_external_address(hostname, external, &resolved)
}

fn resolve_host(hostname: &str) -> Result<Vec<IpAddr>, HostnameError> {
    let addrs = (hostname, 0)
        .to_socket_addrs()
        .map_err(|source| HostnameError::Lookup {
            hostname: hostname.to_string(),
            source,
        })?;
    Ok(addrs.map(|addr| addr.ip()).collect())
}

fn external_ipv4() -> Result<IpAddr, HostnameError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(PROVIDER_TIMEOUT)
        .build()?;

    for provider in EXTERNAL_IP_PROVIDERS {
        let body = match client.get(provider).send().and_then(|resp| resp.text()) {
            Ok(body) => body,
            Err(e) => {
                warn!(provider, error = %e, "external IP provider failed");
                continue;
            }
        };
        if let Ok(ip) = body.trim().parse::<IpAddr>() {
            debug!(provider, %ip, "found external IP");
            return Ok(ip);
        }
    }

    Err(HostnameError::NoExternalAddress)
}

fn match_external_address(
    hostname: &str,
    external: IpAddr,
    resolved: &[IpAddr],
) -> Result<(), HostnameError> {
    if resolved.contains(&external) {
        return Ok(());
    }
    let resolved = resolved
        .iter()
        .map(IpAddr::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(HostnameError::Mismatch {
        external,
        resolved,
        hostname: hostname.to_string(),
    })
}
