use async_trait::async_trait;
use reqwest::Client;

use super::{
    decode_chat, decode_image, ChatOutput, DispatchError, Dispatcher, ImageOutput, PromptRequest,
};

/// reqwest-backed client for the assistant backend
#[derive(Clone)]
pub struct HttpDispatcher {
    client: Client,
    base_url: String,
}

impl HttpDispatcher {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_prompt(&self, endpoint: &str, prompt: &str) -> Result<String, DispatchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, prompt_len = prompt.len(), "sending prompt");

        let response = self
            .client
            .post(&url)
            .json(&PromptRequest { prompt })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DispatchError::from_status(status.as_u16(), &body));
        }

        Ok(body)
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn send_chat(&self, prompt: &str) -> Result<ChatOutput, DispatchError> {
        let result = self
            .post_prompt("chat", prompt)
            .await
            .and_then(|body| decode_chat(&body));

        match &result {
            Ok(output) => tracing::debug!(source = ?output.source, "chat reply decoded"),
            Err(e) => tracing::warn!("chat request failed: {}", e),
        }
        result
    }

    async fn send_image(&self, prompt: &str) -> Result<ImageOutput, DispatchError> {
        let result = self
            .post_prompt("image", prompt)
            .await
            .and_then(|body| decode_image(&body));

        match &result {
            Ok(ImageOutput::Image(payload)) => {
                tracing::debug!(bytes = payload.decoded_len(), "image received")
            }
            Ok(ImageOutput::Empty) => tracing::debug!("image response had no payload"),
            Err(e) => tracing::warn!("image request failed: {}", e),
        }
        result
    }
}
