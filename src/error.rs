use thiserror::Error;

/// Failures reading or writing the JSON stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures talking to the chat platform.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to send message: {0}")]
    Send(String),

    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("not supported by this platform: {0}")]
    Unsupported(&'static str),
}

/// Startup failures. These are the only errors allowed to stop the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("no bot token configured (set `token` or MEMEBOT_TOKEN)")]
    MissingToken,

    #[error("no owner configured (set `owner` or MEMEBOT_OWNER)")]
    MissingOwner,
}
