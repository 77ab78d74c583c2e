use std::time::Duration;

use anyhow::Context;
use poem::endpoint::{BoxEndpoint, StaticFilesEndpoint};
use poem::listener::{Listener, RustlsCertificate, RustlsConfig, TcpListener};
use poem::middleware::Tracing;
use poem::{EndpointExt, Route, Server as PoemServer, get, post};
use poem_openapi::OpenApiService;
use tokio::signal;

use crate::api::pages::routes::{error_page, home, send_chat};
use crate::config::app_config::AppConfig;
use crate::config::https_config::TlsConfig;
use crate::setup::dependency_injection::DependencyContainer;
use crate::setup::pipeline::{self, ERROR_PATH};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Server;

impl Server {
    /// Builds the complete application: routes, forwarding, middleware pipeline and tracing.
    pub fn app(config: &AppConfig, container: DependencyContainer) -> BoxEndpoint<'static> {
        let api_service = OpenApiService::new(
            (container.health_api, container.chat_api),
            "Storefront Web API",
            env!("CARGO_PKG_VERSION"),
        )
        .server("/api");

        let mut routes = Route::new()
            .at("/", get(home))
            .at("/chat", post(send_chat))
            .at(ERROR_PATH, get(error_page))
            .nest(
                "/assets",
                StaticFilesEndpoint::new(&config.static_files_dir),
            );
        if config.environment.is_development() {
            routes = routes
                .nest("/api/docs", api_service.swagger_ui())
                .nest("/api/openapi.json", api_service.spec_endpoint());
        }
        let routes = routes
            .nest("/api", api_service)
            .data(container.send_message_use_case)
            .with(container.image_forwarder);

        let stages = pipeline::stages(&config.environment);
        pipeline::apply(routes, &stages, &config.https)
            .with(Tracing)
            .boxed()
    }

    pub async fn run(config: AppConfig, container: DependencyContainer) -> anyhow::Result<()> {
        let addr = config.server.bind_address();
        let app = Self::app(&config, container);

        tracing::info!(environment = %config.environment, "Storefront running at http://{}", addr);

        match (&config.https.tls, config.https.port) {
            (Some(tls), Some(port)) => {
                let tls_addr = format!("{}:{}", config.server.ip, port);
                let rustls = rustls_config(tls).await?;
                tracing::info!("Storefront running at https://{}", tls_addr);
                let listener =
                    TcpListener::bind(addr).combine(TcpListener::bind(tls_addr).rustls(rustls));
                serve(listener, app).await
            }
            _ => serve(TcpListener::bind(addr), app).await,
        }
    }
}

async fn rustls_config(tls: &TlsConfig) -> anyhow::Result<RustlsConfig> {
    let cert = tokio::fs::read(&tls.cert_path)
        .await
        .with_context(|| format!("reading TLS certificate {}", tls.cert_path.display()))?;
    let key = tokio::fs::read(&tls.key_path)
        .await
        .with_context(|| format!("reading TLS key {}", tls.key_path.display()))?;

    Ok(RustlsConfig::new().fallback(RustlsCertificate::new().cert(cert).key(key)))
}

async fn serve<L>(listener: L, app: BoxEndpoint<'static>) -> anyhow::Result<()>
where
    L: Listener + 'static,
{
    PoemServer::new(listener)
        .run_with_graceful_shutdown(app, shutdown_signal(), Some(SHUTDOWN_TIMEOUT))
        .await?;
    tracing::info!("Storefront stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use poem::http::StatusCode;
    use poem::http::header::{COOKIE, SET_COOKIE};
    use poem::test::TestClient;

    use business::domain::chat::errors::ChatError;
    use business::domain::chat::model::{
        ChatCompletion, ChatMessage, ChatOptions, ChatRole, FinishReason,
    };
    use business::domain::chat::services::ChatClient;
    use logger::TracingLogger;

    use crate::config::map_lookup;
    use crate::middleware::antiforgery::{COOKIE_NAME, FORM_FIELD};

    struct CannedClient;

    #[async_trait]
    impl ChatClient for CannedClient {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _options: &ChatOptions,
        ) -> Result<ChatCompletion, ChatError> {
            assert_eq!(messages[0].role, ChatRole::System);
            Ok(ChatCompletion {
                message: ChatMessage::assistant(format!("You said: {}", messages[1].text())),
                finish_reason: FinishReason::Stop,
                usage: None,
            })
        }
    }

    fn client(environment: &str) -> TestClient<BoxEndpoint<'static>> {
        let config = AppConfig::from_lookup(&map_lookup(&[
            ("APP_ENVIRONMENT", environment),
            ("AzureOpenAI:Endpoint", "https://shop.openai.azure.com/"),
            ("AzureOpenAI:ApiKey", "key"),
            ("AzureOpenAI:DeploymentName", "gpt-4o-mini"),
        ]))
        .unwrap();
        let container = DependencyContainer::assemble(
            &config,
            Arc::new(TracingLogger),
            Arc::new(CannedClient),
        )
        .unwrap();
        TestClient::new(Server::app(&config, container))
    }

    fn issued_token(resp: &poem::test::TestResponse) -> String {
        let set_cookie = resp.0.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap();
        pair.trim_start_matches(&format!("{}=", COOKIE_NAME))
            .to_string()
    }

    #[tokio::test]
    async fn should_serve_home_page_with_antiforgery_cookie() {
        let resp = client("Production").get("/").send().await;

        resp.assert_status_is_ok();
        let token = issued_token(&resp);
        let body = resp.0.into_body().into_string().await.unwrap();
        assert!(body.contains(&format!(r#"name="{}" value="{}""#, FORM_FIELD, token)));
    }

    #[tokio::test]
    async fn should_chat_through_form_post_with_token() {
        let cli = client("Production");
        let token = issued_token(&cli.get("/").send().await);

        let resp = cli
            .post("/chat")
            .header(COOKIE, format!("{}={}", COOKIE_NAME, token))
            .form(&[("message", "tents"), (FORM_FIELD, token.as_str())])
            .send()
            .await;

        resp.assert_status_is_ok();
        let body = resp.0.into_body().into_string().await.unwrap();
        assert!(body.contains("You said: tents"));
    }

    #[tokio::test]
    async fn should_reject_chat_post_without_token() {
        let resp = client("Production")
            .post("/chat")
            .form(&[("message", "tents")])
            .send()
            .await;

        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_serve_json_api_without_token() {
        let resp = client("Production")
            .post("/api/chat")
            .body_json(&serde_json::json!({
                "messages": [{ "role": "user", "content": "boots" }]
            }))
            .send()
            .await;

        resp.assert_status_is_ok();
        let json = resp.json().await;
        json.value()
            .object()
            .get("content")
            .assert_string("You said: boots");
    }

    #[tokio::test]
    async fn should_expose_health_endpoints() {
        let cli = client("Production");

        cli.get("/api/alive").send().await.assert_status_is_ok();
        cli.get("/api/health").send().await.assert_status_is_ok();
    }

    #[tokio::test]
    async fn should_expose_swagger_only_in_development() {
        client("Development")
            .get("/api/docs")
            .send()
            .await
            .assert_status_is_ok();
        client("Production")
            .get("/api/docs")
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
