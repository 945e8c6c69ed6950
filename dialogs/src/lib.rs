//! # Dialogs
//!
//! A dialog stack per conversation. [`DialogSet`] holds the registered [`Dialog`]s and the state
//! accessor for the stack; [`DialogContext`] is created per turn and drives begin / continue /
//! end / cancel. The top of the stack is the active dialog; ending a dialog resumes its parent.

mod context;
mod dialog;
mod dialog_set;
mod error;
mod state;

pub use context::DialogContext;
pub use dialog::{Dialog, DialogTurnResult, DialogTurnStatus};
pub use dialog_set::DialogSet;
pub use error::DialogError;
pub use state::{DialogInstance, DialogState};
