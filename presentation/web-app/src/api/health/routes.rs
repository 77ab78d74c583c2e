use chrono::Utc;
use poem_openapi::{Object, OpenApi, payload::Json, payload::PlainText};
use serde::{Deserialize, Serialize};

use crate::api::tags::ApiTags;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct HealthCheckResponse {
    /// Service status
    pub status: String,
    /// Hosting environment name
    pub environment: String,
    /// Current server timestamp
    pub timestamp: String,
    /// Service version
    pub version: String,
}

/// Liveness and health endpoints for orchestrators and load balancers.
pub struct HealthApi {
    environment: String,
}

impl HealthApi {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
        }
    }
}

#[OpenApi]
impl HealthApi {
    /// Health check endpoint
    ///
    /// Returns the current status of the service.
    #[oai(path = "/health", method = "get", tag = "ApiTags::Health")]
    async fn health_check(&self) -> Json<HealthCheckResponse> {
        Json(HealthCheckResponse {
            status: "healthy".to_string(),
            environment: self.environment.clone(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Liveness probe
    ///
    /// Answers as long as the process can serve requests.
    #[oai(path = "/alive", method = "get", tag = "ApiTags::Health")]
    async fn alive(&self) -> PlainText<&'static str> {
        PlainText("Healthy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poem::Route;
    use poem::test::TestClient;
    use poem_openapi::OpenApiService;

    fn client() -> TestClient<Route> {
        let api = OpenApiService::new(HealthApi::new("Staging"), "test", "0.1.0");
        TestClient::new(Route::new().nest("/api", api))
    }

    #[tokio::test]
    async fn should_report_healthy_with_environment() {
        let resp = client().get("/api/health").send().await;

        resp.assert_status_is_ok();
        let json = resp.json().await;
        let value = json.value().object();
        value.get("status").assert_string("healthy");
        value.get("environment").assert_string("Staging");
        value.get("version").assert_string(env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn should_answer_liveness_probe() {
        let resp = client().get("/api/alive").send().await;

        resp.assert_status_is_ok();
        resp.assert_text("Healthy").await;
    }
}
