use std::path::PathBuf;

use business::domain::chat::settings::ChatClientSettings;
use business::domain::errors::ConfigurationError;

use super::{
    Lookup, azure_openai_config, catalog_config::CatalogConfig, env_lookup,
    environment_config::HostEnvironment, https_config::HttpsConfig, server_config::ServerConfig,
};

pub struct AppConfig {
    pub server: ServerConfig,
    pub environment: HostEnvironment,
    pub https: HttpsConfig,
    pub chat: ChatClientSettings,
    pub catalog: CatalogConfig,
    pub static_files_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(&env_lookup)
    }

    /// Loads and validates every setting; the first invalid value aborts loading.
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigurationError> {
        Ok(Self {
            server: ServerConfig::from_lookup(lookup),
            environment: HostEnvironment::from_lookup(lookup),
            https: HttpsConfig::from_lookup(lookup)?,
            chat: azure_openai_config::chat_client_settings(lookup)?,
            catalog: CatalogConfig::from_lookup(lookup)?,
            static_files_dir: lookup("STATIC_FILES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("wwwroot")),
        })
    }
}
