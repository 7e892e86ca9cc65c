use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskboardError>;

#[derive(Debug, Error)]
pub enum TaskboardError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Board not initialized")]
    BoardNotInitialized,

    #[error("Invalid task ID format: {0}")]
    InvalidTaskId(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration value for {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("Change stream error: {0}")]
    StreamError(String),

    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for TaskboardError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for TaskboardError {
    fn from(err: toml::ser::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}
