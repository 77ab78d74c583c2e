use std::sync::atomic::{AtomicBool, Ordering};

use poem::http::StatusCode;
use poem::http::header::LOCATION;
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};

use super::{host_without_port, is_https, request_host};

/// Redirects plain-HTTP requests to the HTTPS equivalent URL.
///
/// Without a configured HTTPS port there is nowhere to redirect to, so
/// requests pass through and a warning is logged once.
pub struct HttpsRedirection {
    https_port: Option<u16>,
}

impl HttpsRedirection {
    pub fn new(https_port: Option<u16>) -> Self {
        Self { https_port }
    }
}

impl<E: Endpoint> Middleware<E> for HttpsRedirection {
    type Output = HttpsRedirectionEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        HttpsRedirectionEndpoint {
            inner: ep,
            https_port: self.https_port,
            warned: AtomicBool::new(false),
        }
    }
}

pub struct HttpsRedirectionEndpoint<E> {
    inner: E,
    https_port: Option<u16>,
    warned: AtomicBool,
}

impl<E: Endpoint> Endpoint for HttpsRedirectionEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        if is_https(&req) {
            return self.inner.call(req).await.map(IntoResponse::into_response);
        }

        let Some(port) = self.https_port else {
            if !self.warned.swap(true, Ordering::Relaxed) {
                tracing::warn!("Failed to determine the https port for redirect");
            }
            return self.inner.call(req).await.map(IntoResponse::into_response);
        };

        let Some(host) = request_host(&req) else {
            return Err(poem::Error::from_status(StatusCode::BAD_REQUEST));
        };

        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let location = https_location(&host, port, path_and_query);

        Ok(Response::builder()
            .status(StatusCode::TEMPORARY_REDIRECT)
            .header(LOCATION, location)
            .finish())
    }
}

pub fn https_location(host: &str, port: u16, path_and_query: &str) -> String {
    let host = host_without_port(host);
    if port == 443 {
        format!("https://{}{}", host, path_and_query)
    } else {
        format!("https://{}:{}{}", host, port, path_and_query)
    }
}
