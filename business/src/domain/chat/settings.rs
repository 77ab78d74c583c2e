use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::domain::errors::{ConfigurationError, parse_http_url};

pub const ENDPOINT_KEY: &str = "AzureOpenAI:Endpoint";
pub const API_KEY_KEY: &str = "AzureOpenAI:ApiKey";
pub const DEPLOYMENT_NAME_KEY: &str = "AzureOpenAI:DeploymentName";

/// Validated connection settings for the hosted chat deployment.
///
/// Construction fails on the first missing, blank or malformed value, so a
/// `ChatClientSettings` in hand is always usable.
#[derive(Debug, Clone)]
pub struct ChatClientSettings {
    endpoint: Url,
    api_key: SecretString,
    deployment_name: String,
}

impl ChatClientSettings {
    pub fn new(
        endpoint: Option<String>,
        api_key: Option<String>,
        deployment_name: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let endpoint = required(ENDPOINT_KEY, endpoint)?;
        let endpoint = parse_http_url(ENDPOINT_KEY, &endpoint)?;
        let api_key = required(API_KEY_KEY, api_key)?;
        let deployment_name = required(DEPLOYMENT_NAME_KEY, deployment_name)?;

        if !is_valid_deployment_name(&deployment_name) {
            return Err(ConfigurationError::invalid_value(
                DEPLOYMENT_NAME_KEY,
                "may only contain ASCII letters, digits, '.', '_' and '-'",
            ));
        }

        Ok(Self {
            endpoint,
            api_key: SecretString::from(api_key),
            deployment_name,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    pub fn deployment_name(&self) -> &str {
        &self.deployment_name
    }
}

/// Deployment names end up as a raw URL path segment.
fn is_valid_deployment_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && name != "."
        && name != ".."
}

fn required(key: &str, value: Option<String>) -> Result<String, ConfigurationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigurationError::missing_value(key)),
    }
}
