use std::sync::Arc;

use async_trait::async_trait;

use crate::config::LLMConfig;
use crate::llm::anthropic::AnthropicAdapter;
use crate::types::{AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_message(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Build the chat adapter from configuration; `None` when no key is set.
pub fn adapter_from_config(config: &LLMConfig) -> Option<Arc<dyn LLMAdapter>> {
    let api_key = config.anthropic_api_key.as_deref()?;
    Some(Arc::new(
        AnthropicAdapter::new(api_key)
            .with_api_url(&config.api_url)
            .with_api_version(&config.api_version),
    ))
}
