use poem::http::Uri;
use poem::{Endpoint, EndpointExt, endpoint::BoxEndpoint};

use crate::config::environment_config::HostEnvironment;
use crate::config::https_config::HttpsConfig;
use crate::middleware::antiforgery::Antiforgery;
use crate::middleware::exception_handler::{DeveloperExceptionPage, ExceptionHandler};
use crate::middleware::hsts::Hsts;
use crate::middleware::https_redirection::HttpsRedirection;

/// Page re-executed by the exception handler outside development.
pub const ERROR_PATH: &str = "/Error";

/// One layer of the request pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    DeveloperExceptionPage,
    ExceptionHandler,
    Hsts,
    HttpsRedirection,
    Antiforgery,
}

/// Stages for `environment`, outermost first.
pub fn stages(environment: &HostEnvironment) -> Vec<PipelineStage> {
    let mut stages = Vec::with_capacity(4);
    if environment.is_development() {
        stages.push(PipelineStage::DeveloperExceptionPage);
    } else {
        stages.push(PipelineStage::ExceptionHandler);
        stages.push(PipelineStage::Hsts);
    }
    stages.push(PipelineStage::HttpsRedirection);
    stages.push(PipelineStage::Antiforgery);
    stages
}

/// Wraps `endpoint` in `stages` so that the first stage sees requests first.
pub fn apply<E>(endpoint: E, stages: &[PipelineStage], https: &HttpsConfig) -> BoxEndpoint<'static>
where
    E: Endpoint + 'static,
{
    let mut endpoint = endpoint.map_to_response().boxed();
    for stage in stages.iter().rev() {
        endpoint = match stage {
            PipelineStage::DeveloperExceptionPage => endpoint.with(DeveloperExceptionPage).boxed(),
            PipelineStage::ExceptionHandler => endpoint
                .with(ExceptionHandler::new(Uri::from_static(ERROR_PATH)))
                .boxed(),
            PipelineStage::Hsts => endpoint.with(Hsts::new(&https.hsts)).boxed(),
            PipelineStage::HttpsRedirection => {
                endpoint.with(HttpsRedirection::new(https.port)).boxed()
            }
            PipelineStage::Antiforgery => endpoint.with(Antiforgery).boxed(),
        };
    }
    endpoint
}

#[cfg(test)]
mod tests {
    use super::*;
    use poem::http::StatusCode;
    use poem::http::header::{HOST, LOCATION};
    use poem::test::TestClient;
    use poem::{Result, Route, get, handler, post};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[handler]
    fn fails() -> Result<&'static str> {
        Err(poem::Error::from_string(
            "catalog offline",
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }

    #[handler]
    fn panics() -> &'static str {
        panic!("unexpected state")
    }

    #[handler]
    fn error() -> &'static str {
        "generic error page"
    }

    #[handler]
    fn submit() -> &'static str {
        "accepted"
    }

    fn routes() -> Route {
        Route::new()
            .at("/fails", get(fails))
            .at("/panics", get(panics))
            .at("/submit", post(submit))
            .at(ERROR_PATH, get(error))
    }

    fn client(environment: HostEnvironment, https: HttpsConfig) -> TestClient<BoxEndpoint<'static>> {
        TestClient::new(apply(routes(), &stages(&environment), &https))
    }

    #[test]
    fn should_order_stages_per_environment() {
        assert_eq!(
            stages(&HostEnvironment::Development),
            vec![
                PipelineStage::DeveloperExceptionPage,
                PipelineStage::HttpsRedirection,
                PipelineStage::Antiforgery,
            ]
        );
        for environment in [
            HostEnvironment::Production,
            HostEnvironment::Staging,
            HostEnvironment::Other("qa".to_string()),
        ] {
            assert_eq!(
                stages(&environment),
                vec![
                    PipelineStage::ExceptionHandler,
                    PipelineStage::Hsts,
                    PipelineStage::HttpsRedirection,
                    PipelineStage::Antiforgery,
                ]
            );
        }
    }

    #[tokio::test]
    async fn should_render_error_page_for_failing_handler_outside_development() {
        let cli = client(HostEnvironment::Production, HttpsConfig::default());

        for path in ["/fails", "/panics"] {
            let resp = cli.get(path).send().await;
            resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
            resp.assert_text("generic error page").await;
        }
    }

    #[tokio::test]
    async fn should_show_diagnostics_in_development() {
        let cli = client(HostEnvironment::Development, HttpsConfig::default());

        let resp = cli.get("/fails").send().await;

        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let text = resp.0.into_body().into_string().await.unwrap();
        assert!(text.contains("catalog offline"));
    }

    #[tokio::test]
    async fn should_redirect_before_handlers_run() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Route::new().at(
            "/*path",
            poem::endpoint::make_sync(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                "page"
            }),
        );
        let https = HttpsConfig {
            port: Some(443),
            ..HttpsConfig::default()
        };
        let cli = TestClient::new(apply(
            app,
            &stages(&HostEnvironment::Production),
            &https,
        ));

        let resp = cli
            .get("/catalog")
            .header(HOST, "shop.example.com")
            .send()
            .await;

        resp.assert_status(StatusCode::TEMPORARY_REDIRECT);
        resp.assert_header(LOCATION, "https://shop.example.com/catalog");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn should_reject_form_post_without_token_in_every_environment() {
        for environment in [HostEnvironment::Development, HostEnvironment::Production] {
            let cli = client(environment, HttpsConfig::default());

            let resp = cli
                .post("/submit")
                .content_type("application/x-www-form-urlencoded")
                .body("message=hi")
                .send()
                .await;

            resp.assert_status(StatusCode::BAD_REQUEST);
        }
    }
}
