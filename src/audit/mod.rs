//! Redaction helpers and the audit-trail record shape.
//!
//! Everything here operates on copies; the engine's output and the
//! caller's data are never mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

use crate::domain::MASKED;

/// Recursively replace the named fields with the mask marker.
///
/// Traverses objects and arrays; matching keys are masked at any depth.
/// Returns a fresh copy, the input is untouched.
pub fn mask_fields(data: &Value, fields: &HashSet<String>) -> Value {
    if fields.is_empty() {
        return data.clone();
    }

    match data {
        Value::Object(map) => {
            let masked = map
                .iter()
                .map(|(key, value)| {
                    if fields.contains(key) {
                        (key.clone(), Value::String(MASKED.to_string()))
                    } else {
                        (key.clone(), mask_fields(value, fields))
                    }
                })
                .collect();
            Value::Object(masked)
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| mask_fields(item, fields)).collect())
        }
        other => other.clone(),
    }
}

/// Logger that redacts configured field names before emitting an event.
///
/// Intended for callers that want to log a Decision Result without
/// re-deriving the access decision: it masks exactly the names it is told
/// to and treats everything else as already pre-filtered.
#[derive(Debug, Clone, Default)]
pub struct SafeLogger {
    masked_fields: HashSet<String>,
}

impl SafeLogger {
    pub fn new<I, S>(masked_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SafeLogger {
            masked_fields: masked_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// A redacted copy of `data`, safe to log.
    pub fn redact(&self, data: &Map<String, Value>) -> Map<String, Value> {
        data.iter()
            .map(|(key, value)| {
                if self.masked_fields.contains(key) {
                    (key.clone(), Value::String(MASKED.to_string()))
                } else {
                    (key.clone(), mask_fields(value, &self.masked_fields))
                }
            })
            .collect()
    }

    /// Emit an info event carrying the redacted payload.
    pub fn info(&self, message: &str, data: &Map<String, Value>) {
        let redacted = Value::Object(self.redact(data));
        info!(data = %redacted, "{message}");
    }
}

/// One justification record posted to the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique record identifier.
    pub record_id: Uuid,

    /// Requester role.
    pub role: String,

    /// Declared access intent.
    pub intent: String,

    /// Identifier of the accessed resource, never the resource itself.
    pub resource_id: String,

    /// The caller-supplied justification text.
    pub justification: String,

    /// When the access happened.
    pub timestamp: DateTime<Utc>,

    /// When the justified grant lapses, if one was attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuditRecord {
    /// Build a record timestamped now.
    pub fn new(
        role: impl Into<String>,
        intent: impl Into<String>,
        resource_id: impl Into<String>,
        justification: impl Into<String>,
    ) -> Self {
        AuditRecord {
            record_id: Uuid::new_v4(),
            role: role.into(),
            intent: intent.into(),
            resource_id: resource_id.into(),
            justification: justification.into(),
            timestamp: Utc::now(),
            expires_at: None,
        }
    }

    /// Attach the grant expiry from a decision result.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mask_fields_top_level() {
        let data = json!({"name": "Lisa Chang", "ssn": "123-45-6789"});
        let masked = mask_fields(&data, &fields(&["ssn"]));

        assert_eq!(masked["name"], json!("Lisa Chang"));
        assert_eq!(masked["ssn"], json!("***"));
    }

    #[test]
    fn test_mask_fields_nested_and_arrays() {
        let data = json!({
            "patient": {"name": "Lisa Chang", "ssn": "123-45-6789"},
            "visits": [{"notes": "stable", "ssn": "dup"}],
        });

        let masked = mask_fields(&data, &fields(&["ssn"]));

        assert_eq!(masked["patient"]["ssn"], json!("***"));
        assert_eq!(masked["patient"]["name"], json!("Lisa Chang"));
        assert_eq!(masked["visits"][0]["ssn"], json!("***"));
        assert_eq!(masked["visits"][0]["notes"], json!("stable"));
    }

    #[test]
    fn test_mask_fields_does_not_mutate_input() {
        let data = json!({"ssn": "123-45-6789"});
        let _ = mask_fields(&data, &fields(&["ssn"]));
        assert_eq!(data["ssn"], json!("123-45-6789"));
    }

    #[test]
    fn test_mask_fields_no_fields_is_identity() {
        let data = json!({"ssn": "123-45-6789"});
        assert_eq!(mask_fields(&data, &HashSet::new()), data);
    }

    #[test]
    fn test_safe_logger_redact() {
        let logger = SafeLogger::new(["diagnosis", "ssn"]);
        let data = json!({"name": "Lisa Chang", "diagnosis": "Asthma"})
            .as_object()
            .unwrap()
            .clone();

        let redacted = logger.redact(&data);

        assert_eq!(redacted["name"], json!("Lisa Chang"));
        assert_eq!(redacted["diagnosis"], json!("***"));
    }

    #[test]
    fn test_audit_record_serialization() {
        let record = AuditRecord::new("billing_admin", "billing", "patient-7", "reconciliation")
            .with_expiry("2026-01-01T12:00:00Z".parse().unwrap());

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["role"], json!("billing_admin"));
        assert_eq!(json["resource_id"], json!("patient-7"));
        assert!(json["expires_at"].is_string());

        let back: AuditRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_audit_record_expiry_omitted_when_absent() {
        let record = AuditRecord::new("nurse", "treatment", "patient-7", "assessment");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("expires_at").is_none());
    }
}
