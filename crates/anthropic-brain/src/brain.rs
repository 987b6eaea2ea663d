//! AnthropicBrain implementation using the Messages API.

use brain_core::{async_trait, Brain, BrainError, ChatTurn, Role};
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{ApiError, ApiMessage, MessagesRequest, MessagesResponse};
use crate::config::{AnthropicBrainConfig, API_VERSION};

/// Placeholder user turn used when a transcript opens with the assistant.
///
/// The Messages API requires the first message to come from the user, while
/// a followup transcript opens with the agent's greeting.
const CONVERSATION_START: &str = "(conversation started)";

/// A brain that asks an Anthropic model for the next followup message.
///
/// The brain keeps no per-conversation state; the caller supplies the
/// transcript on every call.
pub struct AnthropicBrain {
    client: Client,
    config: AnthropicBrainConfig,
}

impl AnthropicBrain {
    /// Create a new AnthropicBrain with the given configuration.
    pub fn new(config: AnthropicBrainConfig) -> Result<Self, BrainError> {
        if config.api_key.is_empty() {
            return Err(BrainError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| {
                BrainError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            "AnthropicBrain initialized with model: {}, max_tokens: {}",
            config.model, config.max_tokens
        );

        Ok(Self { client, config })
    }

    /// Create an AnthropicBrain from environment variables.
    ///
    /// See [`AnthropicBrainConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, BrainError> {
        Self::new(AnthropicBrainConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &AnthropicBrainConfig {
        &self.config
    }

    /// Build the request body for a transcript.
    fn build_request(&self, turns: Vec<ChatTurn>) -> MessagesRequest {
        let (system, messages) = normalize_turns(turns);
        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system,
            messages,
            temperature: self.config.temperature,
        }
    }

    /// Send a request to the Messages API.
    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse, BrainError> {
        let url = format!("{}/v1/messages", self.config.api_url.trim_end_matches('/'));

        debug!(
            "Sending {} messages to Anthropic model {}",
            request.messages.len(),
            request.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| BrainError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            let message = match serde_json::from_str::<ApiError>(&error_text) {
                Ok(api_error) => match api_error.error.error_type {
                    Some(kind) => format!("{}: {}", kind, api_error.error.message),
                    None => api_error.error.message,
                },
                Err(_) => error_text,
            };

            return Err(BrainError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl Brain for AnthropicBrain {
    async fn generate(&self, turns: Vec<ChatTurn>) -> Result<String, BrainError> {
        let request = self.build_request(turns);
        if request.messages.is_empty() {
            return Err(BrainError::ProcessingFailed(
                "transcript has no conversation turns".to_string(),
            ));
        }

        let completion = self.send(&request).await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Anthropic {} ({}) stop: {:?}, tokens in: {}, out: {}",
                completion.id,
                completion.model,
                completion.stop_reason,
                usage.input_tokens,
                usage.output_tokens
            );
        }

        let text = completion.text();
        if text.trim().is_empty() {
            return Err(BrainError::ProcessingFailed(
                "model returned no text".to_string(),
            ));
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "AnthropicBrain"
    }
}

/// Split a transcript into the `system` field and an alternating message list.
///
/// System turns are joined with blank lines. Consecutive turns of the same
/// role are merged, and a placeholder user turn is inserted when the
/// conversation opens with the assistant.
fn normalize_turns(turns: Vec<ChatTurn>) -> (Option<String>, Vec<ApiMessage>) {
    let mut system_parts = Vec::new();
    let mut messages: Vec<ApiMessage> = Vec::new();

    for turn in turns {
        let role = match turn.role {
            Role::System => {
                system_parts.push(turn.content);
                continue;
            }
            Role::User => "user",
            Role::Assistant => "assistant",
        };

        match messages.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(&turn.content);
            }
            _ => {
                if messages.is_empty() && role == "assistant" {
                    messages.push(ApiMessage::user(CONVERSATION_START));
                }
                messages.push(match turn.role {
                    Role::User => ApiMessage::user(turn.content),
                    _ => ApiMessage::assistant(turn.content),
                });
            }
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    (system, messages)
}
