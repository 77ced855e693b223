//! Error types for wordclick

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    /// No session can be built from an empty corpus.
    #[error("corpus is empty")]
    EmptyCorpus,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("corpus error: {0}")]
    Corpus(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("score store error: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
