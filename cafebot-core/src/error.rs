use thiserror::Error;

#[derive(Error, Debug)]
pub enum CafebotError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Dialog error: {0}")]
    Dialog(String),

    #[error("Recognizer error: {0}")]
    Recognizer(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CafebotError>;
