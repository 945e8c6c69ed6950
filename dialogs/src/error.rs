use cafebot_core::CafebotError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DialogError {
    #[error("Dialog '{0}' is not registered")]
    NotFound(String),

    #[error("Dialog '{0}' is already registered")]
    Duplicate(String),
}

impl From<DialogError> for CafebotError {
    fn from(e: DialogError) -> Self {
        CafebotError::Dialog(e.to_string())
    }
}
