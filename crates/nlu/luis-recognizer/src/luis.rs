//! LUIS (v2 prediction endpoint) implementation of [`IntentRecognizer`].
//!
//! Request: `GET {endpoint}/luis/v2.0/apps/{app_id}?subscription-key=…&q=…&verbose=true`.
//! Response intents become scores; entities are grouped by type (with any `builtin.` prefix
//! removed) into arrays of resolved values.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::error::RecognizerError;
use crate::mask::mask_token;
use crate::{IntentRecognizer, RecognizerResult, NONE_INTENT};

/// A `luis` entry of the bot configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LuisService {
    pub name: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub subscription_key: String,
    #[serde(default)]
    pub authoring_key: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Overrides the region-derived endpoint (e.g. a container or a test server).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Resolved LUIS application: id, key, and endpoint base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct LuisApplication {
    pub app_id: String,
    pub endpoint_key: String,
    pub endpoint: String,
}

impl LuisApplication {
    /// Validates a bot-file service entry. The subscription key falls back to the authoring key.
    pub fn from_service(service: &LuisService) -> Result<Self, RecognizerError> {
        if service.app_id.trim().is_empty() {
            return Err(RecognizerError::Config(format!(
                "LUIS service '{}' has no appId",
                service.name
            )));
        }

        let endpoint_key = if service.subscription_key.is_empty() {
            service.authoring_key.clone()
        } else {
            service.subscription_key.clone()
        };
        if endpoint_key.is_empty() {
            return Err(RecognizerError::Config(format!(
                "LUIS service '{}' has neither subscriptionKey nor authoringKey",
                service.name
            )));
        }

        let endpoint = match service.endpoint.as_deref().filter(|s| !s.is_empty()) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if !service.region.is_empty() => {
                format!("https://{}.api.cognitive.microsoft.com", service.region)
            }
            None => {
                return Err(RecognizerError::Config(format!(
                    "LUIS service '{}' has neither region nor endpoint",
                    service.name
                )))
            }
        };

        Ok(Self {
            app_id: service.app_id.clone(),
            endpoint_key,
            endpoint,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LuisResponse {
    #[serde(default)]
    query: String,
    top_scoring_intent: Option<LuisIntent>,
    #[serde(default)]
    intents: Vec<LuisIntent>,
    #[serde(default)]
    entities: Vec<LuisEntity>,
}

#[derive(Debug, Deserialize)]
struct LuisIntent {
    intent: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LuisEntity {
    entity: String,
    #[serde(rename = "type")]
    entity_type: String,
    resolution: Option<Value>,
}

impl LuisEntity {
    /// `resolution.value` when present (numeric strings become numbers), else the matched text.
    fn value(&self) -> Value {
        let resolved = self
            .resolution
            .as_ref()
            .and_then(|r| r.get("value"))
            .cloned();
        match resolved {
            Some(Value::String(s)) => number_or_string(s),
            Some(other) => other,
            None => Value::String(self.entity.clone()),
        }
    }
}

fn number_or_string(s: String) -> Value {
    if let Ok(n) = s.parse::<i64>() {
        return Value::from(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::from(f),
        _ => Value::String(s),
    }
}

impl From<LuisResponse> for RecognizerResult {
    fn from(response: LuisResponse) -> Self {
        let mut intents: std::collections::BTreeMap<String, f64> = response
            .intents
            .into_iter()
            .map(|i| (i.intent, i.score))
            .collect();
        if let Some(top) = response.top_scoring_intent {
            intents.entry(top.intent).or_insert(top.score);
        }

        let mut entities = Map::new();
        for entity in &response.entities {
            let name = entity
                .entity_type
                .strip_prefix("builtin.")
                .unwrap_or(&entity.entity_type)
                .to_string();
            let slot = entities
                .entry(name)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(values) = slot {
                values.push(entity.value());
            }
        }

        RecognizerResult {
            text: response.query,
            intents,
            entities,
        }
    }
}

/// LUIS client. Cheap to clone (shares the reqwest connection pool).
#[derive(Debug, Clone)]
pub struct LuisRecognizer {
    client: Client,
    application: LuisApplication,
}

impl LuisRecognizer {
    pub fn new(application: LuisApplication) -> Self {
        Self {
            client: Client::new(),
            application,
        }
    }

    /// Builds a recognizer from a bot-file service entry; fails on incomplete configuration.
    pub fn from_service(service: &LuisService) -> Result<Self, RecognizerError> {
        Ok(Self::new(LuisApplication::from_service(service)?))
    }

    pub fn application(&self) -> &LuisApplication {
        &self.application
    }

    fn prediction_url(&self) -> String {
        format!(
            "{}/luis/v2.0/apps/{}",
            self.application.endpoint, self.application.app_id
        )
    }
}

#[async_trait]
impl IntentRecognizer for LuisRecognizer {
    #[instrument(skip(self, text), fields(app_id = %self.application.app_id))]
    async fn recognize(&self, text: &str) -> Result<RecognizerResult, RecognizerError> {
        let utterance = text.trim();
        if utterance.is_empty() {
            let mut result = RecognizerResult {
                text: text.to_string(),
                ..Default::default()
            };
            result.intents.insert(NONE_INTENT.to_string(), 1.0);
            return Ok(result);
        }

        info!(
            endpoint = %self.application.endpoint,
            key = %mask_token(&self.application.endpoint_key),
            text_len = utterance.len(),
            "step: LUIS recognize request"
        );

        let response = self
            .client
            .get(self.prediction_url())
            .query(&[
                ("subscription-key", self.application.endpoint_key.as_str()),
                ("q", utterance),
                ("verbose", "true"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(status, error = %e, "Failed to read LUIS error body");
                    String::new()
                }
            };
            return Err(RecognizerError::Status { status, body });
        }

        let body = response.text().await?;
        let parsed: LuisResponse =
            serde_json::from_str(&body).map_err(|e| RecognizerError::Parse(e.to_string()))?;
        let result = RecognizerResult::from(parsed);

        debug!(
            top_intent = %result.top_intent(),
            intents = result.intents.len(),
            entities = ?result.entities.keys().collect::<Vec<_>>(),
            "step: LUIS recognize done"
        );
        Ok(result)
    }
}
