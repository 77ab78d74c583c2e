use std::sync::Arc;

use logger::TracingLogger;
use openai::chat_client::AzureOpenAIChatClient;
use openai::client::AzureOpenAIClient;

use business::application::catalog::product_image_function::GetProductImageUrlFunction;
use business::application::chat::send_message::SendChatMessageUseCaseImpl;
use business::domain::catalog::product_image::{ProductImageUrlProvider, product_image_rule};
use business::domain::chat::function_invocation::FunctionInvokingChatClient;
use business::domain::chat::model::ChatOptions;
use business::domain::chat::services::ChatClient;
use business::domain::chat::settings::ChatClientSettings;
use business::domain::chat::shared_client::{ChatClientFactory, SharedChatClient};
use business::domain::chat::use_cases::send_message::SendChatMessageUseCase;
use business::domain::logger::Logger;

use crate::api::chat::routes::ChatApi;
use crate::api::health::routes::HealthApi;
use crate::api::product_images::forwarder::ProductImageForwarder;
use crate::config::app_config::AppConfig;

pub struct DependencyContainer {
    pub health_api: HealthApi,
    pub chat_api: ChatApi,
    pub send_message_use_case: Arc<dyn SendChatMessageUseCase>,
    pub image_forwarder: ProductImageForwarder,
}

impl DependencyContainer {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger);

        let image_urls = Arc::new(ProductImageUrlProvider::new()?);
        let chat_client = Arc::new(SharedChatClient::new(chat_client_factory(
            config.chat.clone(),
            image_urls,
            logger.clone(),
        )));

        Self::assemble(config, logger, chat_client)
    }

    /// Wires everything around an already built chat client.
    pub fn assemble(
        config: &AppConfig,
        logger: Arc<dyn Logger>,
        chat_client: Arc<dyn ChatClient>,
    ) -> anyhow::Result<Self> {
        let send_message_use_case: Arc<dyn SendChatMessageUseCase> =
            Arc::new(SendChatMessageUseCaseImpl {
                client: chat_client,
                logger,
                options: ChatOptions::default(),
            });

        let rule = product_image_rule(config.catalog.base_url.clone())?;
        let image_forwarder = ProductImageForwarder::new(rule)?;

        Ok(Self {
            health_api: HealthApi::new(config.environment.to_string()),
            chat_api: ChatApi::new(send_message_use_case.clone()),
            send_message_use_case,
            image_forwarder,
        })
    }
}

/// Builds the Azure OpenAI client decorated with function invocation on first use.
fn chat_client_factory(
    settings: ChatClientSettings,
    image_urls: Arc<ProductImageUrlProvider>,
    logger: Arc<dyn Logger>,
) -> ChatClientFactory {
    Box::new(move || {
        logger.info(&format!(
            "Creating chat client for deployment {}",
            settings.deployment_name()
        ));

        let inner: Arc<dyn ChatClient> = Arc::new(AzureOpenAIChatClient::new(
            AzureOpenAIClient::new(&settings)?,
        ));
        let client = FunctionInvokingChatClient::new(inner, logger.clone()).with_function(
            Arc::new(GetProductImageUrlFunction {
                provider: image_urls.clone(),
            }),
        );

        Ok(Arc::new(client) as Arc<dyn ChatClient>)
    })
}
