use url::Url;

use business::domain::errors::{ConfigurationError, parse_http_url};

use super::Lookup;

const CATALOG_BASE_URL_KEY: &str = "CATALOG_BASE_URL";
const DEFAULT_CATALOG_BASE_URL: &str = "http://localhost:5301";

/// Location of the catalog service that serves product pictures.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: Url,
}

impl CatalogConfig {
    /// Reads CATALOG_BASE_URL (default: "http://localhost:5301").
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigurationError> {
        let raw = lookup(CATALOG_BASE_URL_KEY)
            .unwrap_or_else(|| DEFAULT_CATALOG_BASE_URL.to_string());
        let base_url = parse_http_url(CATALOG_BASE_URL_KEY, &raw)?;
        Ok(Self { base_url })
    }
}
