use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set; add it to the environment or a .env file")]
    MissingToken(&'static str),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Rate limit exceeded. Please wait 1 minute.")]
    RateLimited,
    #[error("Failed to fetch data: {code} {reason}")]
    Status { code: u16, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    Shape(String),
    #[error("could not decode crest image: {0}")]
    Image(#[from] image::ImageError),
}

impl FetchError {
    /// Upstream HTTP status behind this failure, when there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::RateLimited => Some(429),
            FetchError::Status { code, .. } => Some(*code),
            FetchError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited)
    }
}
