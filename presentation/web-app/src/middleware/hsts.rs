use poem::http::HeaderValue;
use poem::http::header::STRICT_TRANSPORT_SECURITY;
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};

use crate::config::https_config::HstsConfig;

use super::{is_https, is_loopback_host, request_host};

/// Adds `Strict-Transport-Security` to responses served over HTTPS.
///
/// Loopback hosts are excluded so local development certificates are not pinned.
pub struct Hsts {
    header: Option<HeaderValue>,
}

impl Hsts {
    pub fn new(config: &HstsConfig) -> Self {
        Self {
            header: HeaderValue::from_str(&config.header_value()).ok(),
        }
    }
}

impl<E: Endpoint> Middleware<E> for Hsts {
    type Output = HstsEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        HstsEndpoint {
            inner: ep,
            header: self.header.clone(),
        }
    }
}

pub struct HstsEndpoint<E> {
    inner: E,
    header: Option<HeaderValue>,
}

impl<E: Endpoint> Endpoint for HstsEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let applies = is_https(&req)
            && request_host(&req).is_some_and(|host| !is_loopback_host(&host));

        let mut resp = self.inner.call(req).await?.into_response();
        if let (true, Some(header)) = (applies, &self.header) {
            resp.headers_mut()
                .insert(STRICT_TRANSPORT_SECURITY, header.clone());
        }
        Ok(resp)
    }
}
