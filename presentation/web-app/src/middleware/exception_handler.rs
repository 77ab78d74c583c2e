use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use poem::http::header::CONTENT_TYPE;
use poem::http::{Method, StatusCode, Uri};
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};

use super::{is_https, request_host};

/// A request that failed with a server error or a panic.
#[derive(Debug)]
enum Failure {
    Error(poem::Error),
    Panic(String),
}

impl Failure {
    fn status(&self) -> StatusCode {
        match self {
            Failure::Error(err) => err.status(),
            Failure::Panic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Error(err) => write!(f, "{}", err),
            Failure::Panic(message) => write!(f, "panic: {}", message),
        }
    }
}

/// Runs `ep`, turning 5xx errors and panics into a [`Failure`].
/// Errors with any other status are rendered as their own response.
async fn capture<E: Endpoint>(ep: &E, req: Request) -> std::result::Result<Response, Failure> {
    match AssertUnwindSafe(ep.call(req)).catch_unwind().await {
        Ok(Ok(output)) => Ok(output.into_response()),
        Ok(Err(err)) if err.status().is_server_error() => Err(Failure::Error(err)),
        Ok(Err(err)) => Ok(err.into_response()),
        Err(payload) => Err(Failure::Panic(panic_message(payload))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Re-executes failed requests against an error page path and returns that
/// page with status 500.
pub struct ExceptionHandler {
    error_path: Uri,
}

impl ExceptionHandler {
    pub fn new(error_path: Uri) -> Self {
        Self { error_path }
    }
}

impl<E: Endpoint> Middleware<E> for ExceptionHandler {
    type Output = ExceptionHandlerEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        ExceptionHandlerEndpoint {
            inner: ep,
            error_path: self.error_path.clone(),
        }
    }
}

pub struct ExceptionHandlerEndpoint<E> {
    inner: E,
    error_path: Uri,
}

impl<E> ExceptionHandlerEndpoint<E> {
    /// Request for the error page, keeping the host and scheme of the failed request.
    fn error_request(&self, https: bool, host: Option<&str>) -> Request {
        let uri = match (https, host) {
            (true, Some(host)) => format!("https://{}{}", host, self.error_path)
                .parse::<Uri>()
                .unwrap_or_else(|_| self.error_path.clone()),
            _ => self.error_path.clone(),
        };

        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(host) = host {
            builder = builder.header(poem::http::header::HOST, host);
        }
        builder.finish()
    }
}

impl<E: Endpoint> Endpoint for ExceptionHandlerEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let https = is_https(&req);
        let host = request_host(&req);

        let failure = match capture(&self.inner, req).await {
            Ok(resp) => return Ok(resp),
            Err(failure) => failure,
        };

        tracing::error!(%method, %path, error = %failure, "Unhandled error while processing request");

        let error_req = self.error_request(https, host.as_deref());
        match capture(&self.inner, error_req).await {
            Ok(mut resp) => {
                resp.set_status(StatusCode::INTERNAL_SERVER_ERROR);
                Ok(resp)
            }
            Err(err) => {
                tracing::error!(error = %err, "Error page failed to render");
                Ok(StatusCode::INTERNAL_SERVER_ERROR.into_response())
            }
        }
    }
}

/// Renders failures as a plain-text diagnostic. Meant for development only.
pub struct DeveloperExceptionPage;

impl<E: Endpoint> Middleware<E> for DeveloperExceptionPage {
    type Output = DeveloperExceptionPageEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        DeveloperExceptionPageEndpoint { inner: ep }
    }
}

pub struct DeveloperExceptionPageEndpoint<E> {
    inner: E,
}

impl<E: Endpoint> Endpoint for DeveloperExceptionPageEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        match capture(&self.inner, req).await {
            Ok(resp) => Ok(resp),
            Err(failure) => {
                tracing::error!(%method, %path, error = %failure, "Unhandled error while processing request");
                let body = format!(
                    "An unhandled error occurred while processing the request.\n\n{} {}\n\n{}\n",
                    method, path, failure
                );
                Ok(Response::builder()
                    .status(failure.status())
                    .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                    .body(body))
            }
        }
    }
}
