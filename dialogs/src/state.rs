//! Persisted form of the dialog stack.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The conversation's dialog stack; the last element is the active dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogState {
    #[serde(default)]
    pub dialog_stack: Vec<DialogInstance>,
}

/// One running dialog and the state it keeps between turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogInstance {
    pub id: String,
    #[serde(default)]
    pub state: Map<String, Value>,
}

impl DialogInstance {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Map::new(),
        }
    }
}
