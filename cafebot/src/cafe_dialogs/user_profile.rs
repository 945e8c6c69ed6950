use serde::{Deserialize, Serialize};

/// User-state property holding the [`UserProfile`].
pub const USER_PROFILE_PROPERTY: &str = "userProfile";

/// What the bot remembers about a user across conversations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
