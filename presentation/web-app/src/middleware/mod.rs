pub mod antiforgery;
pub mod exception_handler;
pub mod hsts;
pub mod https_redirection;

use poem::Request;
use poem::http::header::HOST;
use poem::http::uri::Scheme;

/// Whether the request arrived over TLS.
pub fn is_https(req: &Request) -> bool {
    *req.scheme() == Scheme::HTTPS || req.uri().scheme() == Some(&Scheme::HTTPS)
}

/// Host the client addressed, including any port, from `Host` or an absolute URI.
pub fn request_host(req: &Request) -> Option<String> {
    req.headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.as_str().to_string()))
        .filter(|host| !host.is_empty())
}

/// Strips a trailing `:port` from a host, keeping bracketed IPv6 literals intact.
pub fn host_without_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

pub fn is_loopback_host(host: &str) -> bool {
    matches!(
        host_without_port(host).to_ascii_lowercase().as_str(),
        "localhost" | "127.0.0.1" | "[::1]"
    )
}
