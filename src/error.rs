use thiserror::Error;

/// Errors that can occur during recipe import operations
#[derive(Error, Debug)]
pub enum ImportError {
    /// Every configured fetch profile failed to retrieve the page
    #[error("Failed to fetch URL: {0}")]
    FetchError(String),

    /// The fallback extraction path could not produce a valid recipe
    #[error("Failed to extract recipe: {0}")]
    ExtractionError(String),

    /// LLM provider could not be constructed or is misconfigured
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Failed to build the HTTP client
    #[error("HTTP client error: {0}")]
    ClientError(#[from] reqwest::Error),

    /// Error parsing HTTP headers
    #[error("Header parse error: {0}")]
    HeaderError(#[from] reqwest::header::InvalidHeaderValue),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
