//! Bot configuration file: a JSON document listing the external services the bot uses.
//!
//! ```json
//! { "name": "cafebot",
//!   "services": [
//!     { "type": "luis", "name": "cafeDispatchModel", "appId": "…", "subscriptionKey": "…", "region": "westus" },
//!     { "type": "endpoint", "name": "development", "endpoint": "http://localhost:3978/api/messages" } ] }
//! ```
//!
//! Only `luis` entries are read; other service types are accepted and ignored.

use std::path::Path;

use cafebot_core::{CafebotError, Result};
use luis_recognizer::LuisService;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotConfiguration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

/// One `services[]` entry, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServiceConfig {
    Luis(LuisService),
    #[serde(other)]
    Other,
}

impl BotConfiguration {
    /// Reads and parses the bot file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CafebotError::Config(format!("cannot read bot file {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&raw)?;
        debug!(
            path = %path.display(),
            services = config.services.len(),
            "Bot file loaded"
        );
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| CafebotError::Config(format!("invalid bot file: {}", e)))
    }

    /// The `luis` service entry called `name`. A missing entry is a configuration error.
    pub fn find_luis_service(&self, name: &str) -> Result<&LuisService> {
        self.services
            .iter()
            .find_map(|service| match service {
                ServiceConfig::Luis(luis) if luis.name == name => Some(luis),
                _ => None,
            })
            .ok_or_else(|| {
                CafebotError::Config(format!(
                    "could not find a luis service named '{}' in the bot file",
                    name
                ))
            })
    }
}
