pub mod app_config;
pub mod azure_openai_config;
pub mod catalog_config;
pub mod environment_config;
pub mod https_config;
pub mod server_config;

/// Looks up a configuration key, returning `None` when unset.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads `key` from the process environment.
///
/// Hierarchical keys use `:` as separator, which environment variables cannot
/// carry, so `AzureOpenAI:Endpoint` is read from `AzureOpenAI__Endpoint`.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key.replace(':', "__")).ok()
}

#[cfg(test)]
pub(crate) fn map_lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}
