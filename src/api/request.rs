use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::Resource;

/// Batch evaluation request: one (role, intent, attributes) triple applied
/// to each resource in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEvaluateRequest {
    pub role: String,

    pub intent: String,

    #[serde(default)]
    pub attributes: Map<String, Value>,

    pub resources: Vec<Resource>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_request_deserialization() {
        let req: BatchEvaluateRequest = serde_json::from_value(json!({
            "role": "nurse",
            "intent": "treatment",
            "resources": [
                {"name": "Lisa Chang"},
                {"name": "Omar Reyes"},
            ],
        }))
        .unwrap();

        assert_eq!(req.role, "nurse");
        assert!(req.attributes.is_empty());
        assert_eq!(req.resources.len(), 2);
    }
}
