use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AiConfig;
use crate::error::ModelError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".to_string(), content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: Option<Usage>,
}

/// Per-1K-token pricing (input, output) for models with known rates.
/// Unknown models still get token totals, just no cost estimate.
const TOKEN_RATES_PER_1K: &[(&str, f64, f64)] = &[
    ("gpt-4o", 0.005, 0.015),
    ("gpt-3.5-turbo", 0.0005, 0.0015),
];

/// Running token/cost totals for a session. Purely observational: nothing
/// reads these to make control-flow decisions.
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    pub calls: u32,
    pub total_tokens: u64,
    pub total_cost: f64,
}

impl UsageTracker {
    /// Record one completed call. Returns the estimated cost of this call
    /// when the model has a known rate.
    pub fn record(&mut self, usage: &Usage, model: &str) -> Option<f64> {
        self.calls += 1;
        self.total_tokens += u64::from(usage.total_tokens);

        let (_, input_rate, output_rate) = TOKEN_RATES_PER_1K
            .iter()
            .find(|(name, _, _)| model.starts_with(name))?;
        let cost = (f64::from(usage.prompt_tokens) * input_rate
            + f64::from(usage.completion_tokens) * output_rate)
            / 1000.0;
        self.total_cost += cost;
        Some(cost)
    }
}

/// The single seam between the conversation logic and the network:
/// messages in, assistant text out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, ModelError>;
}

/// OpenAI-compatible chat-completions client. Constructed once at startup
/// and shared read-only for the rest of the session.
#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    usage: Mutex<UsageTracker>,
}

impl ApiClient {
    pub fn new(config: &AiConfig) -> Result<Self, ModelError> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent("promptforge/0.1")
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            usage: Mutex::new(UsageTracker::default()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn usage_summary(&self) -> UsageTracker {
        self.usage.lock().expect("usage tracker lock").clone()
    }

    async fn request_once(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ModelError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ModelError::Api { status: status.as_u16(), body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ModelClient for ApiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, ModelError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            temperature,
        };

        let response = match self.request_once(&request).await {
            // One retry on transport failures only; HTTP and credential
            // errors propagate immediately.
            Err(ModelError::Http(e)) if e.is_timeout() || e.is_connect() => {
                warn!(error = %e, "transport error, retrying once");
                self.request_once(&request).await?
            }
            other => other?,
        };

        if let Some(usage) = &response.usage {
            let cost = self
                .usage
                .lock()
                .expect("usage tracker lock")
                .record(usage, &self.model);
            debug!(
                total_tokens = usage.total_tokens,
                cost = cost.unwrap_or(0.0),
                "recorded call usage"
            );
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyResponse)?;
        Ok(choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_tracker_accumulates_known_model_costs() {
        let mut tracker = UsageTracker::default();
        let usage = Usage { prompt_tokens: 1000, completion_tokens: 1000, total_tokens: 2000 };

        let cost = tracker.record(&usage, "gpt-3.5-turbo");
        assert_eq!(cost, Some(0.002));
        assert_eq!(tracker.calls, 1);
        assert_eq!(tracker.total_tokens, 2000);

        // Versioned model names share the base rate.
        tracker.record(&usage, "gpt-3.5-turbo-0125");
        assert_eq!(tracker.calls, 2);
        assert!((tracker.total_cost - 0.004).abs() < 1e-9);
    }

    #[test]
    fn usage_tracker_counts_tokens_for_unknown_models() {
        let mut tracker = UsageTracker::default();
        let usage = Usage { prompt_tokens: 10, completion_tokens: 5, total_tokens: 15 };

        assert_eq!(tracker.record(&usage, "some-local-model"), None);
        assert_eq!(tracker.total_tokens, 15);
        assert_eq!(tracker.total_cost, 0.0);
    }

    #[test]
    fn client_requires_an_api_key() {
        let config = AiConfig {
            model: "gpt-4o".to_string(),
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: "  ".to_string(),
        };
        assert!(matches!(ApiClient::new(&config), Err(ModelError::MissingApiKey)));
    }
}
