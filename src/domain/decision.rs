use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker substituted for masked field values.
pub const MASKED: &str = "***";

/// The filtered view of a resource produced by one evaluation.
///
/// Contains only the fields the matched policy disclosed or masked, plus
/// optional grant metadata under the `_meta` key. Serializes to the same
/// shape as the input resource, which is also the decision-service wire
/// format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    /// Disclosed and masked fields, in resource order.
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    /// Grant metadata, present only when a justification unlocked a
    /// time-bounded grant.
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<DecisionMeta>,
}

impl DecisionResult {
    /// The empty result: deny-all, no metadata.
    pub fn empty() -> Self {
        DecisionResult::default()
    }

    /// A disclosed or masked field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// True when the matched policy masked this field.
    pub fn is_masked(&self, field: &str) -> bool {
        self.fields.get(field) == Some(&Value::String(MASKED.to_string()))
    }

    /// True when nothing was disclosed and no grant was attached.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.meta.is_none()
    }

    /// When the attached grant expires, if one was attached.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.meta.as_ref().map(|m| m.expires_at)
    }
}

/// Metadata attached to a justified, time-bounded grant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionMeta {
    /// Absolute time at which the grant lapses.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_result_serializes_to_empty_object() {
        let json = serde_json::to_value(DecisionResult::empty()).unwrap();
        assert_eq!(json, json!({}));
    }

    #[test]
    fn test_result_serialization_with_meta() {
        let mut result = DecisionResult::empty();
        result.fields.insert("name".to_string(), json!("Lisa Chang"));
        result.fields.insert("diagnosis".to_string(), json!(MASKED));
        result.meta = Some(DecisionMeta {
            expires_at: "2026-01-01T12:00:00Z".parse().unwrap(),
        });

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["name"], json!("Lisa Chang"));
        assert_eq!(json["diagnosis"], json!("***"));
        assert!(json["_meta"]["expires_at"].is_string());
    }

    #[test]
    fn test_result_round_trip() {
        let wire = json!({
            "name": "Lisa Chang",
            "diagnosis": "***",
            "_meta": {"expires_at": "2026-01-01T12:00:00Z"},
        });

        let result: DecisionResult = serde_json::from_value(wire.clone()).unwrap();
        assert!(result.is_masked("diagnosis"));
        assert!(result.expires_at().is_some());
        assert!(!result.fields.contains_key("_meta"));

        assert_eq!(serde_json::to_value(&result).unwrap(), wire);
    }
}
