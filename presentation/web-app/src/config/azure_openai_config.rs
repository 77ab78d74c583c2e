use business::domain::chat::settings::{
    API_KEY_KEY, ChatClientSettings, DEPLOYMENT_NAME_KEY, ENDPOINT_KEY,
};
use business::domain::errors::ConfigurationError;

use super::Lookup;

/// Configuration for Azure OpenAI access.
///
/// Keys (all required):
/// - AzureOpenAI:Endpoint
/// - AzureOpenAI:ApiKey
/// - AzureOpenAI:DeploymentName
pub fn chat_client_settings(lookup: Lookup<'_>) -> Result<ChatClientSettings, ConfigurationError> {
    ChatClientSettings::new(
        lookup(ENDPOINT_KEY),
        lookup(API_KEY_KEY),
        lookup(DEPLOYMENT_NAME_KEY),
    )
}
