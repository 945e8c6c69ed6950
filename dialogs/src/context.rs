//! Per-turn view of the dialog stack.

use cafebot_core::{Result, TurnContext};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::dialog::DialogTurnResult;
use crate::dialog_set::DialogSet;
use crate::error::DialogError;
use crate::state::{DialogInstance, DialogState};

/// Drives the conversation's dialog stack for one turn. Every stack change is written back to the
/// dialog state accessor, so the auto-save middleware persists it at turn end.
pub struct DialogContext<'a> {
    dialogs: &'a DialogSet,
    context: &'a TurnContext,
    state: DialogState,
}

impl<'a> DialogContext<'a> {
    pub(crate) fn new(dialogs: &'a DialogSet, context: &'a TurnContext, state: DialogState) -> Self {
        Self {
            dialogs,
            context,
            state,
        }
    }

    pub fn context(&self) -> &'a TurnContext {
        self.context
    }

    pub fn stack(&self) -> &[DialogInstance] {
        &self.state.dialog_stack
    }

    /// Top of the stack, if any.
    pub fn active_dialog(&self) -> Option<&DialogInstance> {
        self.state.dialog_stack.last()
    }

    /// State of the active dialog instance.
    pub fn instance_state(&self) -> Option<&Map<String, Value>> {
        self.active_dialog().map(|instance| &instance.state)
    }

    /// Replaces the active dialog instance's state. No-op when the stack is empty.
    pub async fn set_instance_state(&mut self, state: Map<String, Value>) -> Result<()> {
        if let Some(instance) = self.state.dialog_stack.last_mut() {
            instance.state = state;
            self.persist().await?;
        }
        Ok(())
    }

    /// Pushes `dialog_id` onto the stack and begins it.
    pub async fn begin_dialog(
        &mut self,
        dialog_id: &str,
        options: Option<Value>,
    ) -> Result<DialogTurnResult> {
        let dialog = self
            .dialogs
            .find(dialog_id)
            .ok_or_else(|| DialogError::NotFound(dialog_id.to_string()))?;

        self.state.dialog_stack.push(DialogInstance::new(dialog_id));
        self.persist().await?;
        info!(
            dialog_id = %dialog_id,
            depth = self.state.dialog_stack.len(),
            "step: dialog begun"
        );

        dialog.begin_dialog(self, options).await
    }

    /// Continues the active dialog, or reports `Empty` when there is none.
    pub async fn continue_dialog(&mut self) -> Result<DialogTurnResult> {
        let Some(active_id) = self.active_dialog().map(|instance| instance.id.clone()) else {
            debug!("No active dialog to continue");
            return Ok(DialogTurnResult::empty());
        };

        let dialog = self
            .dialogs
            .find(&active_id)
            .ok_or(DialogError::NotFound(active_id.clone()))?;
        debug!(dialog_id = %active_id, "Continuing active dialog");
        dialog.continue_dialog(self).await
    }

    /// Pops the active dialog and resumes its parent with `result`; `Complete` when the stack empties.
    pub async fn end_dialog(&mut self, result: Option<Value>) -> Result<DialogTurnResult> {
        if let Some(ended) = self.state.dialog_stack.pop() {
            info!(dialog_id = %ended.id, "step: dialog ended");
        }
        self.persist().await?;

        let Some(parent_id) = self.active_dialog().map(|instance| instance.id.clone()) else {
            return Ok(DialogTurnResult::complete(result));
        };

        let parent = self
            .dialogs
            .find(&parent_id)
            .ok_or(DialogError::NotFound(parent_id.clone()))?;
        parent.resume_dialog(self, result).await
    }

    /// Clears the whole stack. `Empty` when nothing was active.
    pub async fn cancel_all_dialogs(&mut self) -> Result<DialogTurnResult> {
        if self.state.dialog_stack.is_empty() {
            return Ok(DialogTurnResult::empty());
        }
        let cancelled = self.state.dialog_stack.len();
        self.state.dialog_stack.clear();
        self.persist().await?;
        info!(cancelled = cancelled, "step: all dialogs cancelled");
        Ok(DialogTurnResult::cancelled())
    }

    async fn persist(&self) -> Result<()> {
        self.dialogs.save_state(self.context, &self.state).await
    }
}
