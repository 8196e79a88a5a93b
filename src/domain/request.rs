use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A protected record: an opaque mapping from field name to value.
///
/// The engine never inspects values, it only copies or replaces them.
pub type Resource = Map<String, Value>;

/// Attribute name carrying the caller's access justification.
pub const JUSTIFICATION_ATTR: &str = "justification";

/// An access request: who is asking, why, under what runtime context,
/// and for which record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Requester role identifier.
    pub role: String,

    /// Declared purpose of the access.
    pub intent: String,

    /// Caller-supplied runtime context (shift status, department, ...),
    /// compared only for equality against policy conditions.
    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// The record to filter.
    pub resource: Resource,
}

impl AccessRequest {
    /// Build a request from parts.
    pub fn new(
        role: impl Into<String>,
        intent: impl Into<String>,
        attributes: Map<String, Value>,
        resource: Resource,
    ) -> Self {
        AccessRequest {
            role: role.into(),
            intent: intent.into(),
            attributes,
            resource,
        }
    }

    /// The caller's justification attribute, if it carries a non-empty value.
    ///
    /// Null, `false`, empty strings, zero and empty containers all count
    /// as "no justification supplied".
    pub fn justification(&self) -> Option<&Value> {
        self.attributes
            .get(JUSTIFICATION_ATTR)
            .filter(|v| is_present(v))
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request_with_justification(value: Value) -> AccessRequest {
        let mut attributes = Map::new();
        attributes.insert(JUSTIFICATION_ATTR.to_string(), value);
        AccessRequest::new("nurse", "treatment", attributes, Resource::new())
    }

    #[test]
    fn test_justification_present() {
        let req = request_with_justification(json!("Monthly reconciliation"));
        assert_eq!(req.justification(), Some(&json!("Monthly reconciliation")));
    }

    #[test]
    fn test_empty_justification_absent() {
        for empty in [json!(null), json!(false), json!(""), json!(0), json!([]), json!({})] {
            let req = request_with_justification(empty);
            assert_eq!(req.justification(), None);
        }
    }

    #[test]
    fn test_no_justification_attribute() {
        let req = AccessRequest::new("nurse", "treatment", Map::new(), Resource::new());
        assert_eq!(req.justification(), None);
    }

    #[test]
    fn test_request_deserialization_defaults_attributes() {
        let req: AccessRequest = serde_json::from_value(json!({
            "role": "doctor",
            "intent": "treatment",
            "resource": {"name": "Lisa Chang"},
        }))
        .unwrap();

        assert!(req.attributes.is_empty());
        assert_eq!(req.resource.get("name"), Some(&json!("Lisa Chang")));
    }
}
