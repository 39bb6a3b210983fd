use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioChatError {
    #[error("API request failed: {0}")]
    ApiStatus(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stream read error: {0}")]
    StreamRead(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Session storage error: {0}")]
    SessionStore(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FolioChatError>;
