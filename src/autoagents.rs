use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{Platform, Settings};

/// Path of the chat completions endpoint, identical on every platform host.
pub const CHAT_COMPLETIONS_PATH: &str = "/openapi/agent/chat/completions/v1";

/// Upper bound on one upstream round trip.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure modes of an upstream chat call.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The configured platform key is not in the fixed host table.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
    /// The upstream answered with a non-200 status.
    #[error("Request failed with status code {0}")]
    UpstreamStatus(u16),
    /// The HTTP call itself failed (connect error, timeout, ...).
    #[error("Request exception: {0}")]
    Request(#[from] reqwest::Error),
    /// The upstream body was not the expected JSON shape.
    #[error("Failed to parse response: {0}")]
    MalformedReply(String),
}

/// Interface to the upstream agent platform. One prompt in, the complete
/// answer text out; implementations do not stream.
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// Sends a single prompt and waits for the full answer.
    async fn fetch_answer(&self, query: &str) -> Result<String, AgentError>;
}

/// Request body of the AutoAgents chat completions endpoint.
///
/// `chat_id` is always serialized, as an explicit `null`, which is what the
/// platform expects from stateless callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatCompletionRequest {
    pub agent_id: String,
    pub chat_id: Option<String>,
    pub user_chat_input: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionReply {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub content: String,
}

/// HTTP client for the AutoAgents platform.
pub struct AutoAgentsClient {
    client: reqwest::Client,
    settings: Arc<Settings>,
    base_override: Option<String>,
}

impl AutoAgentsClient {
    pub fn new(settings: Arc<Settings>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;
        let base_override = settings.agents_host.clone();

        info!(
            "Initialized AutoAgents client: platform={}, agent_id={}",
            settings.platform, settings.agent_id
        );

        Ok(Self {
            client,
            settings,
            base_override,
        })
    }

    /// Full URL of the chat completions endpoint for the configured platform.
    fn endpoint(&self) -> Result<String, AgentError> {
        if let Some(base) = &self.base_override {
            return Ok(format!(
                "{}{}",
                base.trim_end_matches('/'),
                CHAT_COMPLETIONS_PATH
            ));
        }

        let platform = Platform::from_key(&self.settings.platform)
            .ok_or_else(|| AgentError::UnsupportedPlatform(self.settings.platform.clone()))?;
        Ok(format!("{}{}", platform.base_url(), CHAT_COMPLETIONS_PATH))
    }
}

#[async_trait]
impl AgentApi for AutoAgentsClient {
    async fn fetch_answer(&self, query: &str) -> Result<String, AgentError> {
        let url = self.endpoint()?;
        debug!(
            "Sending chat completion to {} ({} chars)",
            url,
            query.chars().count()
        );

        let body = ChatCompletionRequest {
            agent_id: self.settings.agent_id.clone(),
            chat_id: None,
            user_chat_input: query.to_string(),
        };
        let token = format!("{}.{}", self.settings.auth_key, self.settings.auth_secret);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        if status.as_u16() != 200 {
            error!("AutoAgents returned {}: {}", status, raw);
            return Err(AgentError::UpstreamStatus(status.as_u16()));
        }

        let reply: ChatCompletionReply = serde_json::from_str(&raw).map_err(|e| {
            error!("Failed to parse AutoAgents reply: {} (body: {})", e, raw);
            AgentError::MalformedReply(e.to_string())
        })?;
        let answer = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.content)
            .ok_or_else(|| AgentError::MalformedReply("reply contained no choices".to_string()))?;

        info!("Received answer ({} chars)", answer.chars().count());
        Ok(answer)
    }
}
