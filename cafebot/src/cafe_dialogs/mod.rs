//! The cafe bot's dialogs.
//!
//! - [`MainDispatcher`] – routes the turn's intent to a reply or a child dialog
//! - [`BookTableDialog`] – collects party size, date/time and location over several turns
//! - [`UserProfile`] – user-scoped profile remembered across conversations

mod book_table;
mod main_dispatcher;
mod user_profile;

pub use book_table::{
    BookTableDialog, BookingState, BOOKING_CANCELLED_MESSAGE, BOOK_TABLE_DIALOG, DATE_TIME_PROMPT,
    LOCATION_PROMPT, PARTY_SIZE_PROMPT,
};
pub use main_dispatcher::{
    MainDispatcher, MAIN_DISPATCHER_DIALOG, NOTHING_TO_CANCEL_MESSAGE, NOT_UNDERSTOOD_MESSAGE,
    WHAT_CAN_YOU_DO_MESSAGE, WHO_ARE_YOU_MESSAGE,
};
pub use user_profile::{UserProfile, USER_PROFILE_PROPERTY};

pub const BOOK_TABLE_INTENT: &str = "BookTable";
pub const WHO_ARE_YOU_INTENT: &str = "WhoAreYou";
pub const WHAT_CAN_YOU_DO_INTENT: &str = "WhatCanYouDo";
pub const GREETING_INTENT: &str = "Greeting";
pub const CANCEL_INTENT: &str = "Cancel";

pub const PARTY_SIZE_ENTITY: &str = "PartySize";
pub const DATE_TIME_ENTITY: &str = "DateTime";
pub const LOCATION_ENTITY: &str = "Location";
pub const USER_NAME_ENTITY: &str = "UserName";

/// Renders an entity value for a reply: strings without quotes, everything else as JSON.
pub(crate) fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
