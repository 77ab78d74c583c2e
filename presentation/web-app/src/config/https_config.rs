use std::path::PathBuf;
use std::time::Duration;

use business::domain::errors::ConfigurationError;

use super::Lookup;

const DEFAULT_TLS_PORT: u16 = 8443;
/// 30 days.
const DEFAULT_HSTS_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Certificate and key used by the HTTPS listener.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Strict-Transport-Security header settings.
#[derive(Debug, Clone)]
pub struct HstsConfig {
    pub max_age: Duration,
    pub include_subdomains: bool,
    pub preload: bool,
}

impl Default for HstsConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_HSTS_MAX_AGE,
            include_subdomains: false,
            preload: false,
        }
    }
}

impl HstsConfig {
    /// Renders the header value, e.g. `max-age=2592000; includeSubDomains`.
    pub fn header_value(&self) -> String {
        let mut value = format!("max-age={}", self.max_age.as_secs());
        if self.include_subdomains {
            value.push_str("; includeSubDomains");
        }
        if self.preload {
            value.push_str("; preload");
        }
        value
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpsConfig {
    /// Public HTTPS port used for redirects. `None` disables redirection.
    pub port: Option<u16>,
    pub tls: Option<TlsConfig>,
    pub hsts: HstsConfig,
}

impl HttpsConfig {
    /// Keys:
    /// - HTTPS_PORT: public HTTPS port (optional; 8443 when TLS files are set)
    /// - TLS_CERT_PATH / TLS_KEY_PATH: PEM files for the HTTPS listener (both or neither)
    /// - HSTS_MAX_AGE_SECS, HSTS_INCLUDE_SUBDOMAINS, HSTS_PRELOAD
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigurationError> {
        let port = lookup("HTTPS_PORT")
            .map(|raw| parse_port("HTTPS_PORT", &raw))
            .transpose()?;

        let tls = match (lookup("TLS_CERT_PATH"), lookup("TLS_KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigurationError::missing_value("TLS_KEY_PATH")),
            (None, Some(_)) => return Err(ConfigurationError::missing_value("TLS_CERT_PATH")),
        };

        let port = match (port, &tls) {
            (None, Some(_)) => Some(DEFAULT_TLS_PORT),
            (port, _) => port,
        };

        let defaults = HstsConfig::default();
        let hsts = HstsConfig {
            max_age: lookup("HSTS_MAX_AGE_SECS")
                .map(|raw| {
                    raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                        ConfigurationError::invalid_value("HSTS_MAX_AGE_SECS", "expected seconds")
                    })
                })
                .transpose()?
                .unwrap_or(defaults.max_age),
            include_subdomains: lookup("HSTS_INCLUDE_SUBDOMAINS")
                .map(|raw| parse_bool("HSTS_INCLUDE_SUBDOMAINS", &raw))
                .transpose()?
                .unwrap_or(defaults.include_subdomains),
            preload: lookup("HSTS_PRELOAD")
                .map(|raw| parse_bool("HSTS_PRELOAD", &raw))
                .transpose()?
                .unwrap_or(defaults.preload),
        };

        Ok(Self { port, tls, hsts })
    }
}

fn parse_port(key: &str, raw: &str) -> Result<u16, ConfigurationError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigurationError::invalid_value(key, "expected a port number")),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigurationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigurationError::invalid_value(key, "expected true or false")),
    }
}
