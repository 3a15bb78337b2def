use crate::config::{ImportConfig, ProviderConfig};
use crate::error::ImportError;
use crate::providers::{AnthropicProvider, LlmProvider, OpenAIProvider};

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
    ) -> Result<Box<dyn LlmProvider>, ImportError> {
        if !config.enabled {
            return Err(ImportError::ProviderError(format!(
                "Provider '{provider_name}' is not enabled in configuration"
            )));
        }

        match provider_name {
            "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config)?)),
            _ => Err(ImportError::ProviderError(format!(
                "Unknown provider: {provider_name}"
            ))),
        }
    }

    /// Build the provider named by the configuration's `default_provider`.
    ///
    /// When no provider section is configured at all, falls back to OpenAI
    /// with its default model, taking the API key from the environment.
    pub fn from_config(config: &ImportConfig) -> Result<Box<dyn LlmProvider>, ImportError> {
        match config.default_provider_config() {
            Some(provider_config) => Self::create(&config.default_provider, provider_config),
            None if config.providers.is_empty() => {
                let fallback = ProviderConfig {
                    enabled: true,
                    model: "gpt-4o-mini".to_string(),
                    temperature: 0.2,
                    max_tokens: 4000,
                    api_key: None,
                    base_url: None,
                };
                Self::create("openai", &fallback)
            }
            None => Err(ImportError::ProviderError(format!(
                "Default provider '{}' not found in configuration",
                config.default_provider
            ))),
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["openai", "anthropic"]
    }
}
