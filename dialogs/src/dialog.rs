//! Dialog trait and turn results.

use async_trait::async_trait;
use cafebot_core::Result;
use serde_json::Value;

use crate::context::DialogContext;

/// Outcome of driving the stack for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTurnStatus {
    /// No dialog was active.
    Empty,
    /// The active dialog is waiting for the next turn.
    Waiting,
    /// The last dialog on the stack ended.
    Complete,
    /// The stack was cancelled.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogTurnResult {
    pub status: DialogTurnStatus,
    pub result: Option<Value>,
}

impl DialogTurnResult {
    pub fn empty() -> Self {
        Self {
            status: DialogTurnStatus::Empty,
            result: None,
        }
    }

    pub fn waiting() -> Self {
        Self {
            status: DialogTurnStatus::Waiting,
            result: None,
        }
    }

    pub fn complete(result: Option<Value>) -> Self {
        Self {
            status: DialogTurnStatus::Complete,
            result,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            status: DialogTurnStatus::Cancelled,
            result: None,
        }
    }
}

/// A multi-turn conversational flow. Implementations read and write their instance state through
/// the [`DialogContext`] and finish with `dc.end_dialog(..)`.
#[async_trait]
pub trait Dialog: Send + Sync {
    /// Id the dialog is registered and begun under.
    fn id(&self) -> &str;

    /// Called when the dialog is pushed onto the stack.
    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        options: Option<Value>,
    ) -> Result<DialogTurnResult>;

    /// Called on each later turn while this dialog is active. Default: end without a result.
    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> Result<DialogTurnResult> {
        dc.end_dialog(None).await
    }

    /// Called when a child dialog ended. Default: end with the child's result.
    async fn resume_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        result: Option<Value>,
    ) -> Result<DialogTurnResult> {
        dc.end_dialog(result).await
    }
}
