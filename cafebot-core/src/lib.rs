//! # cafebot-core
//!
//! Core types and traits for the cafe bot: [`Activity`], [`TurnContext`], [`Channel`],
//! [`ActivityHandler`], [`Middleware`], the shared error type, and tracing initialization.
//! Transport-agnostic; used by turn-pipeline, bot-state, dialogs and the channels.

pub mod channel;
pub mod context;
pub mod error;
pub mod logger;
pub mod types;

pub use channel::Channel;
pub use context::TurnContext;
pub use error::{CafebotError, Result};
pub use logger::{init_file_tracing, init_tracing};
pub use types::{
    Activity, ActivityHandler, ActivityType, Attachment, ChannelAccount, ConversationAccount,
    Middleware, ADAPTIVE_CARD_CONTENT_TYPE,
};
