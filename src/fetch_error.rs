#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Weather API returned status {0}")]
    Status(u16),
    #[error("Failed to parse observation body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Weather API returned no observation data")]
    NoData,
}
