//! Upstream chat-completion client
//!
//! One pooled `reqwest::Client` is built at startup. Every call is a single
//! POST with a bearer credential and a bounded timeout; nothing is retried.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;

use super::error::ChatError;
use super::types::{CompletionRequest, UpstreamReply};
use crate::config::ChatConfig;

pub struct ChatUpstream {
    http_client: Client,
    api_url: String,
}

impl ChatUpstream {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ChatError::Client)?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Send one completion request and return whatever the upstream answered.
    ///
    /// Non-2xx statuses are not errors here; only a failed exchange or a body
    /// that is not JSON is.
    pub async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest<'_>,
    ) -> Result<UpstreamReply, ChatError> {
        let response = self
            .http_client
            .post(&self.api_url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .json(request)
            .send()
            .await
            .map_err(ChatError::from_transport)?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(ChatError::from_transport)?;
        let body = serde_json::from_slice(&bytes)?;

        Ok(UpstreamReply { status, body })
    }
}
