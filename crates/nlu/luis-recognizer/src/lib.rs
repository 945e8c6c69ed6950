//! # Intent recognizer
//!
//! Defines the [`IntentRecognizer`] trait and its result type, plus a LUIS prediction-endpoint
//! implementation ([`LuisRecognizer`]). The turn dispatcher depends only on the trait so tests and
//! other NLU services can be substituted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

mod error;
mod luis;
mod mask;

pub use error::RecognizerError;
pub use luis::{LuisApplication, LuisRecognizer, LuisService};
pub use mask::mask_token;

/// Intent reported when nothing was recognized.
pub const NONE_INTENT: &str = "None";

/// Classification of one utterance: scored intents and recognized entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizerResult {
    pub text: String,
    /// Intent name → score in `0.0..=1.0`.
    pub intents: BTreeMap<String, f64>,
    /// Entity name → value (LUIS reports an array of values per entity type).
    pub entities: Map<String, Value>,
}

impl RecognizerResult {
    /// Highest scoring intent, or [`NONE_INTENT`] when there are no intents.
    pub fn top_intent(&self) -> &str {
        self.top_intent_with_threshold(0.0)
    }

    /// Highest scoring intent whose score is at least `min_score`, else [`NONE_INTENT`].
    pub fn top_intent_with_threshold(&self, min_score: f64) -> &str {
        self.intents
            .iter()
            .filter(|(_, score)| **score >= min_score)
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, _)| name.as_str())
            .unwrap_or(NONE_INTENT)
    }
}

/// NLU service interface: classify free text into intents and entities.
#[async_trait]
pub trait IntentRecognizer: Send + Sync {
    async fn recognize(&self, text: &str) -> Result<RecognizerResult, RecognizerError>;
}
