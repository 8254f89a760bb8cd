// Minfo Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinfoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid command template: {0}")]
    InvalidTemplate(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Fixture generation failed: {0}")]
    FixtureGeneration(String),
}

pub type Result<T> = std::result::Result<T, MinfoError>;
