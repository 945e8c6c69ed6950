use async_trait::async_trait;
use bot_state::StatePropertyAccessor;
use cafebot_core::{Result, TurnContext};
use dialogs::{Dialog, DialogContext, DialogTurnResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::{display_value, CANCEL_INTENT, DATE_TIME_ENTITY, LOCATION_ENTITY, PARTY_SIZE_ENTITY};
use crate::turn_properties::TurnProperties;

pub const BOOK_TABLE_DIALOG: &str = "bookTable";

pub const PARTY_SIZE_PROMPT: &str = "How many guests are in your party?";
pub const DATE_TIME_PROMPT: &str = "When would you like to come in?";
pub const LOCATION_PROMPT: &str =
    "Which cafe should I book? We are in Seattle, Bellevue, Redmond and Kirkland.";
pub const BOOKING_CANCELLED_MESSAGE: &str = "Ok, I have cancelled the table booking.";

/// Slots collected by [`BookTableDialog`], kept in the dialog instance state between turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_size: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    /// Entity name of the slot the last prompt asked for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asked: Option<String>,
}

impl BookingState {
    fn from_instance(state: Option<&Map<String, Value>>) -> Result<Self> {
        match state {
            Some(map) => Ok(serde_json::from_value(Value::Object(map.clone()))?),
            None => Ok(Self::default()),
        }
    }

    fn to_instance(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    fn slot_mut(&mut self, entity: &str) -> Option<&mut Option<Value>> {
        match entity {
            PARTY_SIZE_ENTITY => Some(&mut self.party_size),
            DATE_TIME_ENTITY => Some(&mut self.date_time),
            LOCATION_ENTITY => Some(&mut self.location),
            _ => None,
        }
    }

    /// Copies slot entities from the turn. Returns true when at least one slot was filled.
    pub fn apply_entities(&mut self, properties: &TurnProperties) -> bool {
        let mut filled = false;
        for entity in properties.entities() {
            if let Some(slot) = self.slot_mut(entity.name()) {
                *slot = Some(entity.first_value().clone());
                filled = true;
            }
        }
        filled
    }

    /// Fills the slot the last prompt asked for with the raw reply text.
    pub fn answer_prompt(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(asked) = self.asked.clone() else {
            return;
        };
        if let Some(slot) = self.slot_mut(&asked) {
            *slot = Some(Value::String(text.to_string()));
        }
    }

    /// First unfilled slot, in the order the dialog asks for them.
    pub fn next_missing(&self) -> Option<&'static str> {
        if self.party_size.is_none() {
            Some(PARTY_SIZE_ENTITY)
        } else if self.date_time.is_none() {
            Some(DATE_TIME_ENTITY)
        } else if self.location.is_none() {
            Some(LOCATION_ENTITY)
        } else {
            None
        }
    }

    /// The completed booking, returned as the dialog result.
    pub fn to_booking(&self) -> Value {
        json!({
            "partySize": self.party_size,
            "dateTime": self.date_time,
            "location": self.location,
        })
    }

    pub fn confirmation(&self) -> String {
        let render = |v: &Option<Value>| v.as_ref().map(display_value).unwrap_or_default();
        format!(
            "Ok. I have a table for {} at our {} cafe, {}.",
            render(&self.party_size),
            render(&self.location),
            render(&self.date_time)
        )
    }
}

fn prompt_for(entity: &str) -> &'static str {
    match entity {
        PARTY_SIZE_ENTITY => PARTY_SIZE_PROMPT,
        DATE_TIME_ENTITY => DATE_TIME_PROMPT,
        _ => LOCATION_PROMPT,
    }
}

/// Collects party size, date/time and location, asking for the first missing one each turn.
pub struct BookTableDialog {
    on_turn_property: StatePropertyAccessor<TurnProperties>,
}

impl BookTableDialog {
    pub fn new(on_turn_property: StatePropertyAccessor<TurnProperties>) -> Self {
        Self { on_turn_property }
    }

    async fn turn_properties(&self, context: &TurnContext) -> Result<TurnProperties> {
        Ok(self
            .on_turn_property
            .get(context)
            .await?
            .unwrap_or_default())
    }

    /// Prompts for the next missing slot, or confirms and ends the dialog with the booking.
    async fn prompt_or_complete(
        &self,
        dc: &mut DialogContext<'_>,
        mut booking: BookingState,
    ) -> Result<DialogTurnResult> {
        match booking.next_missing() {
            Some(slot) => {
                booking.asked = Some(slot.to_string());
                dc.set_instance_state(booking.to_instance()?).await?;
                debug!(slot = %slot, "Prompting for booking slot");
                dc.context().send_text(prompt_for(slot)).await?;
                Ok(DialogTurnResult::waiting())
            }
            None => {
                info!(booking = %booking.to_booking(), "step: table booked");
                dc.context().send_text(&booking.confirmation()).await?;
                dc.end_dialog(Some(booking.to_booking())).await
            }
        }
    }
}

#[async_trait]
impl Dialog for BookTableDialog {
    fn id(&self) -> &str {
        BOOK_TABLE_DIALOG
    }

    async fn begin_dialog(
        &self,
        dc: &mut DialogContext<'_>,
        _options: Option<Value>,
    ) -> Result<DialogTurnResult> {
        let properties = self.turn_properties(dc.context()).await?;
        let mut booking = BookingState::default();
        booking.apply_entities(&properties);
        self.prompt_or_complete(dc, booking).await
    }

    async fn continue_dialog(&self, dc: &mut DialogContext<'_>) -> Result<DialogTurnResult> {
        let properties = self.turn_properties(dc.context()).await?;
        if properties.intent() == Some(CANCEL_INTENT) {
            dc.context().send_text(BOOKING_CANCELLED_MESSAGE).await?;
            return dc.end_dialog(None).await;
        }

        let mut booking = BookingState::from_instance(dc.instance_state())?;
        if !booking.apply_entities(&properties) {
            let text = dc.context().activity().text.clone().unwrap_or_default();
            booking.answer_prompt(&text);
        }
        self.prompt_or_complete(dc, booking).await
    }
}
