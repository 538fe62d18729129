use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("invalid report bundle JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid report bundle: {0}")]
    InvalidBundle(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn invalid_bundle(msg: impl fmt::Display) -> Self {
        Error::InvalidBundle(msg.to_string())
    }
}
