use cafebot_core::CafebotError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("Recognizer configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LUIS API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed LUIS response: {0}")]
    Parse(String),
}

impl From<RecognizerError> for CafebotError {
    fn from(e: RecognizerError) -> Self {
        match e {
            RecognizerError::Config(msg) => CafebotError::Config(msg),
            other => CafebotError::Recognizer(other.to_string()),
        }
    }
}
