#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build chain connector client: {0}")]
    ChainClient(reqwest::Error),
    #[error("chain connector request to {url} failed: {source}")]
    ChainRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("chain connector returned HTTP {status} for {url}")]
    ChainStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to decode chain connector response from {url}: {source}")]
    ChainDecode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read agent name cache: {0}")]
    CacheRead(std::io::Error),
    #[error("failed to write agent name cache: {0}")]
    CacheWrite(std::io::Error),
    #[error("failed to serialize agent name cache: {0}")]
    CacheSerialization(serde_json::Error),
    #[error("failed to deserialize agent name cache: {0}")]
    CacheDeserialization(serde_json::Error),
}

impl From<agentdna_types::TextError> for DashboardError {
    fn from(err: agentdna_types::TextError) -> Self {
        DashboardError::InvalidInput(err.to_string())
    }
}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;
