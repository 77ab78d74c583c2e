use super::Lookup;

/// Server configuration for HTTP listener
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub ip: String,
    pub port: String,
}

impl ServerConfig {
    /// Load server configuration
    ///
    /// Keys:
    /// - SERVICE_IP: IP address to bind (default: "127.0.0.1")
    /// - SERVICE_PORT: Port to bind (default: "8080")
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let ip = lookup("SERVICE_IP").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("SERVICE_PORT").unwrap_or_else(|| "8080".to_string());

        Self { ip, port }
    }

    /// Get the bind address as "ip:port"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}
