use bot_state::StatePropertyAccessor;
use cafebot_core::{Result, TurnContext};
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::DialogContext;
use crate::dialog::Dialog;
use crate::error::DialogError;
use crate::state::DialogState;

/// Registered dialogs plus the accessor the conversation's stack is stored under.
pub struct DialogSet {
    dialogs: HashMap<String, Arc<dyn Dialog>>,
    dialog_state: StatePropertyAccessor<DialogState>,
}

impl DialogSet {
    pub fn new(dialog_state: StatePropertyAccessor<DialogState>) -> Self {
        Self {
            dialogs: HashMap::new(),
            dialog_state,
        }
    }

    /// Registers a dialog under its id. Ids must be unique within the set.
    pub fn add(&mut self, dialog: Arc<dyn Dialog>) -> std::result::Result<&mut Self, DialogError> {
        let id = dialog.id().to_string();
        if self.dialogs.contains_key(&id) {
            return Err(DialogError::Duplicate(id));
        }
        self.dialogs.insert(id, dialog);
        Ok(self)
    }

    pub fn find(&self, id: &str) -> Option<Arc<dyn Dialog>> {
        self.dialogs.get(id).cloned()
    }

    /// Loads the conversation's stack and returns a context for driving it this turn.
    pub async fn create_context<'a>(&'a self, context: &'a TurnContext) -> Result<DialogContext<'a>> {
        let state = self.dialog_state.get_or_default(context).await?;
        Ok(DialogContext::new(self, context, state))
    }

    pub(crate) async fn save_state(&self, context: &TurnContext, state: &DialogState) -> Result<()> {
        self.dialog_state.set(context, state).await?;
        Ok(())
    }
}
