use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

use business::domain::chat::errors::ChatError;
use business::domain::chat::settings::ChatClientSettings;

pub const API_VERSION: &str = "2024-10-21";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared Azure OpenAI HTTP client configuration for one deployment.
pub struct AzureOpenAIClient {
    pub client: Client,
    api_key: SecretString,
    endpoint: String,
    deployment: String,
}

impl AzureOpenAIClient {
    pub fn new(settings: &ChatClientSettings) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ChatError::ClientUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            api_key: SecretString::from(settings.api_key().to_string()),
            endpoint: settings.endpoint().as_str().trim_end_matches('/').to_string(),
            deployment: settings.deployment_name().to_string(),
        })
    }

    /// Value of the `api-key` header.
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Returns the chat completions endpoint URL of the configured deployment.
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, API_VERSION
        )
    }
}
