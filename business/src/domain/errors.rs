/// Configuration errors raised while validating startup settings.
/// Use code-style identifiers for all error variants for i18n compatibility.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("configuration.missing_value: {key}")]
    MissingValue { key: String },
    #[error("configuration.invalid_uri: {key} ({reason})")]
    InvalidUri { key: String, reason: String },
    #[error("configuration.invalid_value: {key} ({reason})")]
    InvalidValue { key: String, reason: String },
}

impl ConfigurationError {
    pub fn missing_value(key: impl Into<String>) -> Self {
        ConfigurationError::MissingValue { key: key.into() }
    }
    pub fn invalid_uri(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidUri {
            key: key.into(),
            reason: reason.into(),
        }
    }
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// The configuration key the error refers to.
    pub fn key(&self) -> &str {
        match self {
            ConfigurationError::MissingValue { key }
            | ConfigurationError::InvalidUri { key, .. }
            | ConfigurationError::InvalidValue { key, .. } => key,
        }
    }
}

/// Parses an absolute `http`/`https` URL, reporting failures against `key`.
pub fn parse_http_url(key: &str, raw: &str) -> Result<url::Url, ConfigurationError> {
    let parsed =
        url::Url::parse(raw.trim()).map_err(|e| ConfigurationError::invalid_uri(key, e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigurationError::invalid_uri(
            key,
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ConfigurationError::invalid_uri(key, "missing host"));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_https_url() {
        let url = parse_http_url("Some:Key", "https://example.openai.azure.com/").unwrap();
        assert_eq!(url.host_str(), Some("example.openai.azure.com"));
    }

    #[test]
    fn should_reject_relative_url() {
        let err = parse_http_url("Some:Key", "/just/a/path").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidUri { .. }));
        assert_eq!(err.key(), "Some:Key");
    }

    #[test]
    fn should_reject_non_http_scheme() {
        let err = parse_http_url("Some:Key", "ftp://example.com").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn should_reject_url_without_host() {
        let err = parse_http_url("Some:Key", "mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidUri { .. }));
    }
}
