use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum SysMetrixError {
    #[error("Failed to render snapshot: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Runtime error: {0}")]
    Runtime(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse data: {0}")]
    Parse(String),

    #[error("System API error: {0}")]
    SystemApi(String),

    #[error("Counter unavailable: {0}")]
    CounterUnavailable(String),

    #[error("Task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for CollectionError {
    fn from(err: tokio::task::JoinError) -> Self {
        CollectionError::Task(err.to_string())
    }
}
