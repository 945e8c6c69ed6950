//! Outbound side of a conversation.
//!
//! [`Channel`] is transport-agnostic; the console and Telegram channels implement it.

use crate::error::Result;
use crate::types::Activity;
use async_trait::async_trait;

/// Delivers outbound activities to a transport. Activities arrive already addressed.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Sends one activity (text and/or attachments) to its conversation.
    async fn send_activity(&self, activity: &Activity) -> Result<()>;
}
