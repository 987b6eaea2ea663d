//! Configuration for AnthropicBrain.

use brain_core::BrainError;
use std::env;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

/// Value sent in the `anthropic-version` header.
pub const API_VERSION: &str = "2023-06-01";

/// Configuration for AnthropicBrain.
#[derive(Debug, Clone)]
pub struct AnthropicBrainConfig {
    /// API base URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Maximum tokens for the reply.
    pub max_tokens: u32,

    /// Temperature for generation (0.0 - 1.0).
    pub temperature: Option<f32>,
}

impl Default for AnthropicBrainConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: Some(0.0),
        }
    }
}

impl AnthropicBrainConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ANTHROPIC_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `ANTHROPIC_API_URL` - API URL (default: https://api.anthropic.com)
    /// - `ANTHROPIC_MODEL` - Model name (default: claude-3-5-sonnet-20240620)
    /// - `ANTHROPIC_MAX_TOKENS` - Max tokens (default: 1024)
    /// - `ANTHROPIC_TEMPERATURE` - Temperature (default: 0)
    pub fn from_env() -> Result<Self, BrainError> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| BrainError::Configuration("ANTHROPIC_API_KEY not set".to_string()))?;

        let api_url = env::var("ANTHROPIC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let model = env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let max_tokens = env::var("ANTHROPIC_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1024);

        let temperature = env::var("ANTHROPIC_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(0.0));

        Ok(Self {
            api_url,
            api_key,
            model,
            max_tokens,
            temperature,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> AnthropicBrainConfigBuilder {
        AnthropicBrainConfigBuilder::default()
    }
}

/// Builder for AnthropicBrainConfig.
#[derive(Debug, Default)]
pub struct AnthropicBrainConfigBuilder {
    config: AnthropicBrainConfig,
}

impl AnthropicBrainConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = tokens;
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AnthropicBrainConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnthropicBrainConfig::default();

        assert_eq!(config.api_url, "https://api.anthropic.com");
        assert!(config.api_key.is_empty());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.temperature, Some(0.0));
    }

    #[test]
    fn test_builder_all_options() {
        let config = AnthropicBrainConfig::builder()
            .api_key("my-key")
            .api_url("http://localhost:9999")
            .model("claude-other")
            .max_tokens(256)
            .temperature(0.5)
            .build();

        assert_eq!(config.api_key, "my-key");
        assert_eq!(config.api_url, "http://localhost:9999");
        assert_eq!(config.model, "claude-other");
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.temperature, Some(0.5));
    }

    // Environment-based scenarios share one test because env vars are
    // process-global and tests run in parallel.
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_vars() {
            for var in [
                "ANTHROPIC_API_KEY",
                "ANTHROPIC_API_URL",
                "ANTHROPIC_MODEL",
                "ANTHROPIC_MAX_TOKENS",
                "ANTHROPIC_TEMPERATURE",
            ] {
                std::env::remove_var(var);
            }
        }

        // Missing key
        clear_all_vars();
        match AnthropicBrainConfig::from_env() {
            Err(BrainError::Configuration(msg)) => assert!(msg.contains("ANTHROPIC_API_KEY")),
            other => panic!("expected Configuration error, got {:?}", other.map(|_| ())),
        }

        // Blank key counts as missing
        std::env::set_var("ANTHROPIC_API_KEY", "  ");
        assert!(AnthropicBrainConfig::from_env().is_err());

        // Defaults
        clear_all_vars();
        std::env::set_var("ANTHROPIC_API_KEY", "env-key");
        let config = AnthropicBrainConfig::from_env().unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 1024);

        // Overrides, with an unparsable number falling back
        std::env::set_var("ANTHROPIC_MODEL", "claude-x");
        std::env::set_var("ANTHROPIC_MAX_TOKENS", "lots");
        std::env::set_var("ANTHROPIC_TEMPERATURE", "0.3");
        let config = AnthropicBrainConfig::from_env().unwrap();
        assert_eq!(config.model, "claude-x");
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.temperature, Some(0.3));

        clear_all_vars();
    }
}
