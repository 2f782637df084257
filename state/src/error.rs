use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("transport is closed")]
    TransportClosed,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("malformed packet log entry: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
