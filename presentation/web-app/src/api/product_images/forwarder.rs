use std::sync::Arc;

use futures::TryStreamExt;
use poem::http::StatusCode;
use poem::{Body, Endpoint, IntoResponse, Middleware, Request, Response, Result};

use business::domain::forwarding::rule::ForwardRule;

/// Headers that describe a single connection and must not cross the proxy.
fn is_hop_by_hop(name: &str) -> bool {
    name.eq_ignore_ascii_case("connection")
        || name.eq_ignore_ascii_case("keep-alive")
        || name.eq_ignore_ascii_case("proxy-authenticate")
        || name.eq_ignore_ascii_case("proxy-authorization")
        || name.eq_ignore_ascii_case("proxy-connection")
        || name.eq_ignore_ascii_case("te")
        || name.eq_ignore_ascii_case("trailer")
        || name.eq_ignore_ascii_case("trailers")
        || name.eq_ignore_ascii_case("transfer-encoding")
        || name.eq_ignore_ascii_case("upgrade")
}

/// `Host` is set from the target URL and `Content-Length` from the buffered body.
fn should_forward_request_header(name: &str) -> bool {
    !(is_hop_by_hop(name)
        || name.eq_ignore_ascii_case("host")
        || name.eq_ignore_ascii_case("content-length"))
}

/// Proxies requests matching the rule's inbound template to the catalog service.
/// Other requests go to the wrapped endpoint.
pub struct ProductImageForwarder {
    rule: Arc<ForwardRule>,
    client: reqwest::Client,
}

impl ProductImageForwarder {
    pub fn new(rule: ForwardRule) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            rule: Arc::new(rule),
            client,
        })
    }
}

impl<E: Endpoint> Middleware<E> for ProductImageForwarder {
    type Output = ProductImageForwarderEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        ProductImageForwarderEndpoint {
            inner: ep,
            rule: self.rule.clone(),
            client: self.client.clone(),
        }
    }
}

pub struct ProductImageForwarderEndpoint<E> {
    inner: E,
    rule: Arc<ForwardRule>,
    client: reqwest::Client,
}

impl<E> ProductImageForwarderEndpoint<E> {
    async fn forward(&self, mut req: Request) -> Result<Response> {
        let target = self
            .rule
            .resolve(req.uri().path(), req.uri().query())
            .map_err(|e| poem::Error::from_string(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR))?;

        let body = req.take_body().into_bytes().await?;

        let mut upstream = self.client.request(req.method().clone(), target.clone());
        for (name, value) in req.headers() {
            if should_forward_request_header(name.as_str()) {
                upstream = upstream.header(name.clone(), value.clone());
            }
        }
        if !body.is_empty() {
            upstream = upstream.body(body);
        }

        match upstream.send().await {
            Ok(resp) => Ok(into_response(resp)),
            Err(err) => {
                tracing::warn!(target = %target, error = %err, "Product image upstream request failed");
                Ok(StatusCode::BAD_GATEWAY.into_response())
            }
        }
    }
}

fn into_response(upstream: reqwest::Response) -> Response {
    let mut builder = Response::builder().status(upstream.status());
    for (name, value) in upstream.headers() {
        if !is_hop_by_hop(name.as_str()) {
            builder = builder.header(name.clone(), value.clone());
        }
    }

    let stream = upstream.bytes_stream().map_err(std::io::Error::other);
    builder.body(Body::from_bytes_stream(stream))
}

impl<E: Endpoint> Endpoint for ProductImageForwarderEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        if self.rule.inbound().matches(req.uri().path()).is_none() {
            return self.inner.call(req).await.map(IntoResponse::into_response);
        }
        self.forward(req).await
    }
}
