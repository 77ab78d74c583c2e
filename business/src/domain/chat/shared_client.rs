use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::OnceCell;

use super::errors::ChatError;
use super::model::{ChatCompletion, ChatMessage, ChatOptions};
use super::services::ChatClient;

pub type ChatClientFactory = Box<dyn Fn() -> Result<Arc<dyn ChatClient>, ChatError> + Send + Sync>;

/// Process-wide chat client, built on first use and reused afterwards.
///
/// A failed construction is not cached; the next resolution retries the factory.
pub struct SharedChatClient {
    factory: ChatClientFactory,
    instance: OnceCell<Arc<dyn ChatClient>>,
}

impl SharedChatClient {
    pub fn new(factory: ChatClientFactory) -> Self {
        Self {
            factory,
            instance: OnceCell::new(),
        }
    }

    pub fn resolve(&self) -> Result<Arc<dyn ChatClient>, ChatError> {
        self.instance
            .get_or_try_init(|| (self.factory)())
            .map(Arc::clone)
    }

    pub fn is_resolved(&self) -> bool {
        self.instance.get().is_some()
    }
}

#[async_trait]
impl ChatClient for SharedChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatCompletion, ChatError> {
        self.resolve()?.complete(messages, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::model::FinishReason;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoClient;

    #[async_trait]
    impl ChatClient for EchoClient {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _options: &ChatOptions,
        ) -> Result<ChatCompletion, ChatError> {
            let last = messages.last().ok_or(ChatError::EmptyConversation)?;
            Ok(ChatCompletion {
                message: ChatMessage::assistant(last.text()),
                finish_reason: FinishReason::Stop,
                usage: None,
            })
        }
    }

    fn counting_factory(calls: Arc<AtomicUsize>) -> ChatClientFactory {
        Box::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(EchoClient) as Arc<dyn ChatClient>)
        })
    }

    #[test]
    fn should_not_build_client_before_first_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let shared = SharedChatClient::new(counting_factory(calls.clone()));

        assert!(!shared.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn should_return_identical_instance_on_every_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let shared = SharedChatClient::new(counting_factory(calls.clone()));

        let first = shared.resolve().unwrap();
        let second = shared.resolve().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_build_once_under_concurrent_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let shared = Arc::new(SharedChatClient::new(counting_factory(calls.clone())));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.resolve().unwrap())
            })
            .collect();
        let clients: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(clients.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn should_not_cache_failed_construction() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let shared = SharedChatClient::new(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ChatError::ClientUnavailable("no tls backend".to_string()))
        }));

        assert!(shared.resolve().is_err());
        assert!(shared.resolve().is_err());
        assert!(!shared.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn should_delegate_completions_to_resolved_client() {
        let calls = Arc::new(AtomicUsize::new(0));
        let shared = SharedChatClient::new(counting_factory(calls.clone()));

        let completion = shared
            .complete(&[ChatMessage::user("ping")], &ChatOptions::default())
            .await
            .unwrap();

        assert_eq!(completion.message.text(), "ping");
        assert!(shared.is_resolved());
    }
}
