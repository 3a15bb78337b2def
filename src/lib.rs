pub mod cleaner;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod llm;
pub mod model;
pub mod pipeline;
pub mod providers;
pub mod structured;

pub use config::{ImportConfig, ProviderConfig};
pub use error::ImportError;
pub use fetcher::PageFetcher;
pub use model::{Difficulty, Recipe};
pub use pipeline::RecipePipeline;
pub use providers::{LlmProvider, ProviderFactory};

use std::time::Duration;

/// Build a pipeline from configuration and import one recipe URL.
///
/// Loads `config.toml` / `RECIPE_IMPORT__*` environment variables, builds
/// the fetcher and the configured LLM provider once, and runs the
/// pipeline. Library users who want to reuse clients across imports
/// should construct [`RecipePipeline`] themselves instead.
pub async fn import_recipe(url: &str) -> Result<Recipe, ImportError> {
    let config = ImportConfig::load()?;
    let fetcher = PageFetcher::new(Some(Duration::from_secs(config.timeout)))?;
    let provider = ProviderFactory::from_config(&config)?;

    RecipePipeline::new(fetcher, provider).import(url).await
}
