use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use poem::http::header::CONTENT_TYPE;
use poem::http::{Method, StatusCode};
use poem::middleware::{CookieJarManager, CookieJarManagerEndpoint};
use poem::web::cookie::{Cookie, SameSite};
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};

pub const COOKIE_NAME: &str = "storefront.antiforgery";
pub const HEADER_NAME: &str = "RequestVerificationToken";
pub const FORM_FIELD: &str = "__RequestVerificationToken";

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM: &str = "multipart/form-data";

/// Token of the current request, available to handlers through `Data<&AntiforgeryToken>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AntiforgeryToken(pub String);

impl AntiforgeryToken {
    fn generate() -> Self {
        Self(URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Issues an anti-forgery cookie and rejects form posts that do not echo it back.
///
/// Cookies are read and written through poem's cookie jar, so the endpoint is
/// wrapped in a [`CookieJarManager`]. An outer manager, when present, is reused.
pub struct Antiforgery;

impl<E: Endpoint> Middleware<E> for Antiforgery {
    type Output = CookieJarManagerEndpoint<AntiforgeryEndpoint<E>>;

    fn transform(&self, ep: E) -> Self::Output {
        CookieJarManager::new().transform(AntiforgeryEndpoint { inner: ep })
    }
}

pub struct AntiforgeryEndpoint<E> {
    inner: E,
}

impl<E: Endpoint> Endpoint for AntiforgeryEndpoint<E> {
    type Output = Response;

    async fn call(&self, mut req: Request) -> Result<Self::Output> {
        let existing = cookie_token(&req);
        let issued = existing.is_none();
        let token = existing.unwrap_or_else(AntiforgeryToken::generate);

        if requires_validation(&req) && !presents_token(&mut req, &token).await? {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                "Rejected request with a missing or invalid anti-forgery token"
            );
            return Err(poem::Error::from_string(
                "antiforgery.invalid_token",
                StatusCode::BAD_REQUEST,
            ));
        }

        if issued {
            req.cookie().add(token_cookie(&token));
        }
        req.extensions_mut().insert(token);
        self.inner.call(req).await.map(IntoResponse::into_response)
    }
}

fn token_cookie(token: &AntiforgeryToken) -> Cookie {
    let mut cookie = Cookie::new_with_str(COOKIE_NAME, token.as_str());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie
}

fn cookie_token(req: &Request) -> Option<AntiforgeryToken> {
    req.cookie()
        .get(COOKIE_NAME)
        .map(|cookie| cookie.value_str().to_string())
        .filter(|value| !value.is_empty())
        .map(AntiforgeryToken)
}

fn content_type(req: &Request) -> Option<String> {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
}

fn requires_validation(req: &Request) -> bool {
    let unsafe_method = matches!(
        *req.method(),
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    );
    unsafe_method
        && matches!(
            content_type(req).as_deref(),
            Some(FORM_URLENCODED) | Some(MULTIPART_FORM)
        )
}

/// Checks the header first, then the URL-encoded form field. The body is put
/// back so handlers can still read it.
async fn presents_token(req: &mut Request, expected: &AntiforgeryToken) -> Result<bool> {
    if let Some(header) = req
        .headers()
        .get(HEADER_NAME)
        .and_then(|value| value.to_str().ok())
    {
        return Ok(constant_time_eq(header.as_bytes(), expected.0.as_bytes()));
    }

    if content_type(req).as_deref() != Some(FORM_URLENCODED) {
        return Ok(false);
    }

    let body = req.take_body().into_bytes().await?;
    let submitted = url::form_urlencoded::parse(&body)
        .find(|(name, _)| name == FORM_FIELD)
        .map(|(_, value)| value.into_owned());
    req.set_body(body);

    Ok(submitted.is_some_and(|value| constant_time_eq(value.as_bytes(), expected.0.as_bytes())))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
