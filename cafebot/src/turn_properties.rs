//! Normalized per-turn input: the intent and entities derived from either a card submission or
//! the recognizer's output. Persisted to conversation state under [`ON_TURN_PROPERTY`].

use luis_recognizer::RecognizerResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Conversation-state property holding the current turn's [`TurnProperties`].
pub const ON_TURN_PROPERTY: &str = "onTurnProperty";

/// Conversation-state property holding the dialog stack.
pub const DIALOG_STATE_PROPERTY: &str = "dialogState";

/// Entity names copied from recognizer output, in this order. Anything else is dropped.
pub const RECOGNIZED_ENTITIES: [&str; 5] =
    ["PartySize", "DateTime", "Location", "UserName", "Confirmation"];

/// A named value extracted from user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProperty {
    name: String,
    value: Value,
}

impl EntityProperty {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The first element when the value is a non-empty array (recognizers report lists), else the value.
    pub fn first_value(&self) -> &Value {
        match &self.value {
            Value::Array(items) => items.first().unwrap_or(&self.value),
            other => other,
        }
    }
}

/// Intent plus entities for one turn. At most one entity per name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnProperties {
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    entities: Vec<EntityProperty>,
}

impl TurnProperties {
    pub fn new(intent: Option<String>) -> Self {
        Self {
            intent,
            entities: Vec::new(),
        }
    }

    pub fn intent(&self) -> Option<&str> {
        self.intent.as_deref()
    }

    pub fn entities(&self) -> &[EntityProperty] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&EntityProperty> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Adds an entity; a later value for the same name replaces the earlier one in place.
    pub fn add_entity(&mut self, entity: EntityProperty) {
        match self.entities.iter_mut().find(|e| e.name == entity.name) {
            Some(existing) => existing.value = entity.value,
            None => self.entities.push(entity),
        }
    }

    /// Maps a card submission: the first key equal to `intent` after trimming and lowercasing
    /// becomes the intent; every other key becomes one entity, in payload order.
    ///
    /// String intents are used verbatim, `null` leaves the intent unset, other values are
    /// stored as their JSON text. A non-object payload yields empty properties.
    pub fn from_card_input(payload: &Value) -> Self {
        let mut properties = Self::default();
        let Value::Object(fields) = payload else {
            return properties;
        };

        let mut intent_seen = false;
        for (key, value) in fields {
            if !intent_seen && key.trim().eq_ignore_ascii_case("intent") {
                intent_seen = true;
                properties.intent = match value {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                };
                continue;
            }
            properties.add_entity(EntityProperty::new(key.clone(), value.clone()));
        }
        properties
    }

    /// Maps recognizer output: the top intent, plus the entities named in `allow_list` (in
    /// allow-list order). Entity values are passed through unchanged.
    pub fn from_recognizer_result(result: &RecognizerResult, allow_list: &[&str]) -> Self {
        let mut properties = Self::new(Some(result.top_intent().to_string()));
        for name in allow_list {
            if let Some(value) = result.entities.get(*name) {
                properties.add_entity(EntityProperty::new(*name, value.clone()));
            }
        }
        properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn names(properties: &TurnProperties) -> Vec<&str> {
        properties.entities().iter().map(EntityProperty::name).collect()
    }

    #[test]
    fn test_card_input_intent_key_is_case_insensitive() {
        for key in ["intent", "Intent", "INTENT", " intent "] {
            let mut payload = Map::new();
            payload.insert(key.to_string(), json!("BookTable"));
            payload.insert("PartySize".to_string(), json!(4));

            let properties = TurnProperties::from_card_input(&Value::Object(payload));

            assert_eq!(properties.intent(), Some("BookTable"), "key {key:?}");
            assert_eq!(names(&properties), vec!["PartySize"]);
        }
    }

    #[test]
    fn test_card_input_entity_count() {
        let with_intent = TurnProperties::from_card_input(&json!({
            "intent": "BookTable", "PartySize": 4, "Location": "Seattle", "DateTime": "tonight"
        }));
        assert_eq!(with_intent.entities().len(), 3);

        let without_intent =
            TurnProperties::from_card_input(&json!({ "PartySize": 4, "Location": "Seattle" }));
        assert_eq!(without_intent.intent(), None);
        assert_eq!(without_intent.entities().len(), 2);
    }

    #[test]
    fn test_card_input_keeps_payload_order_and_values() {
        let properties = TurnProperties::from_card_input(&json!({
            "Location": "Seattle", "intent": "BookTable", "PartySize": { "adults": 2 }
        }));

        assert_eq!(names(&properties), vec!["Location", "PartySize"]);
        assert_eq!(properties.entity("PartySize").unwrap().value(), &json!({ "adults": 2 }));
    }

    #[test]
    fn test_card_input_only_first_intent_key_sets_intent() {
        let properties =
            TurnProperties::from_card_input(&json!({ "intent": "BookTable", "INTENT": "Cancel" }));

        assert_eq!(properties.intent(), Some("BookTable"));
        assert_eq!(names(&properties), vec!["INTENT"]);
    }

    #[test]
    fn test_card_input_non_string_intent() {
        assert_eq!(
            TurnProperties::from_card_input(&json!({ "intent": 7 })).intent(),
            Some("7")
        );
        assert_eq!(
            TurnProperties::from_card_input(&json!({ "intent": null })).intent(),
            None
        );
    }

    #[test]
    fn test_card_input_non_object_payload() {
        assert_eq!(
            TurnProperties::from_card_input(&json!("BookTable")),
            TurnProperties::default()
        );
    }

    #[test]
    fn test_recognizer_result_filters_and_orders_by_allow_list() {
        let mut entities = Map::new();
        entities.insert("Location".to_string(), json!(["seattle"]));
        entities.insert("number".to_string(), json!([4]));
        entities.insert("PartySize".to_string(), json!([4]));
        let result = RecognizerResult {
            text: "table for 4 in seattle".to_string(),
            intents: [("BookTable".to_string(), 0.9)].into_iter().collect(),
            entities,
        };

        let properties = TurnProperties::from_recognizer_result(&result, &RECOGNIZED_ENTITIES);

        assert_eq!(properties.intent(), Some("BookTable"));
        assert_eq!(names(&properties), vec!["PartySize", "Location"]);
        assert_eq!(properties.entity("PartySize").unwrap().first_value(), &json!(4));
    }

    #[test]
    fn test_recognizer_result_without_intents_is_none() {
        let properties =
            TurnProperties::from_recognizer_result(&RecognizerResult::default(), &RECOGNIZED_ENTITIES);
        assert_eq!(properties.intent(), Some("None"));
        assert!(properties.entities().is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let mut properties = TurnProperties::new(Some("BookTable".to_string()));
        properties.add_entity(EntityProperty::new("PartySize", json!(4)));
        properties.add_entity(EntityProperty::new("PartySize", json!(5)));

        assert_eq!(
            serde_json::to_value(&properties).unwrap(),
            json!({ "intent": "BookTable", "entities": [{ "name": "PartySize", "value": 5 }] })
        );
    }
}
