use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A single field-level access rule.
///
/// Policies are matched in store order against (role, intent, conditions);
/// the first structural match wins and later policies are never consulted.
/// Authors should be aware that a later, more specific policy does NOT
/// override an earlier general one for the same (role, intent) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Role identifier, exact match required.
    pub role: String,

    /// Declared access intent, exact match required.
    pub intent: String,

    /// Attribute equality conditions; empty means "always matches"
    /// once role and intent match.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub conditions: Map<String, Value>,

    /// Fields disclosed unchanged: the `"*"` wildcard or a set of names.
    #[serde(default)]
    pub allow: AllowList,

    /// Fields disclosed with their value replaced by the mask marker.
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub mask: HashSet<String>,

    /// Fields omitted entirely; deny beats mask beats allow when a name
    /// appears in more than one list.
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub deny: HashSet<String>,

    /// Minutes a justified grant remains valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification_ttl: Option<i64>,
}

impl Policy {
    /// Check whether this policy matches a request's role, intent and
    /// runtime attributes. Condition values compare by strict equality,
    /// no type coercion.
    pub fn matches(&self, role: &str, intent: &str, attributes: &Map<String, Value>) -> bool {
        self.role == role
            && self.intent == intent
            && self
                .conditions
                .iter()
                .all(|(key, required)| attributes.get(key) == Some(required))
    }
}

/// Fields a policy discloses: everything, or an explicit set.
#[derive(Debug, Clone, PartialEq)]
pub enum AllowList {
    /// The `"*"` wildcard: every field not denied or masked is disclosed.
    All,
    /// An explicit set of field names.
    Fields(HashSet<String>),
}

impl AllowList {
    /// True if this list discloses the named field.
    pub fn permits(&self, field: &str) -> bool {
        match self {
            AllowList::All => true,
            AllowList::Fields(fields) => fields.contains(field),
        }
    }

    /// Build an explicit field set from an iterator of names.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowList::Fields(names.into_iter().map(Into::into).collect())
    }
}

impl Default for AllowList {
    fn default() -> Self {
        AllowList::Fields(HashSet::new())
    }
}

impl Serialize for AllowList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AllowList::All => serializer.serialize_str("*"),
            AllowList::Fields(fields) => {
                let mut names: Vec<&str> = fields.iter().map(String::as_str).collect();
                names.sort_unstable();
                names.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for AllowList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Marker(String),
            Fields(Vec<String>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Marker(s) if s == "*" => Ok(AllowList::All),
            Repr::Marker(s) => Err(de::Error::custom(format!(
                "allow must be \"*\" or a list of field names, got string {s:?}"
            ))),
            Repr::Fields(names) => Ok(AllowList::Fields(names.into_iter().collect())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_deserialization() {
        let yaml = r#"
role: receptionist
intent: treatment
conditions:
  active_shift_only: true
allow: [name, dob]
mask: [diagnosis]
deny: [insurance_number]
justification_ttl: 30
"#;

        let policy: Policy = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(policy.role, "receptionist");
        assert_eq!(policy.intent, "treatment");
        assert_eq!(policy.conditions.get("active_shift_only"), Some(&json!(true)));
        assert!(policy.allow.permits("name"));
        assert!(!policy.allow.permits("diagnosis"));
        assert!(policy.mask.contains("diagnosis"));
        assert!(policy.deny.contains("insurance_number"));
        assert_eq!(policy.justification_ttl, Some(30));
    }

    #[test]
    fn test_wildcard_allow() {
        let policy: Policy = serde_yaml::from_str(
            r#"
role: doctor
intent: treatment
allow: "*"
"#,
        )
        .unwrap();

        assert_eq!(policy.allow, AllowList::All);
        assert!(policy.allow.permits("anything"));
    }

    #[test]
    fn test_non_wildcard_string_allow_rejected() {
        let result: Result<Policy, _> = serde_yaml::from_str(
            r#"
role: doctor
intent: treatment
allow: "name"
"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_role_rejected() {
        let result: Result<Policy, _> = serde_yaml::from_str(
            r#"
intent: treatment
allow: [name]
"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let policy: Policy = serde_json::from_value(json!({
            "role": "nurse",
            "intent": "treatment",
        }))
        .unwrap();

        assert_eq!(policy.allow, AllowList::default());
        assert!(policy.mask.is_empty());
        assert!(policy.deny.is_empty());
        assert!(policy.conditions.is_empty());
        assert_eq!(policy.justification_ttl, None);
    }

    #[test]
    fn test_condition_matching_is_strict_equality() {
        let policy: Policy = serde_json::from_value(json!({
            "role": "receptionist",
            "intent": "treatment",
            "conditions": {"active_shift_only": true},
            "allow": ["name"],
        }))
        .unwrap();

        let mut attrs = Map::new();
        attrs.insert("active_shift_only".to_string(), json!(true));
        assert!(policy.matches("receptionist", "treatment", &attrs));

        // No coercion: the string "true" is not the boolean true
        attrs.insert("active_shift_only".to_string(), json!("true"));
        assert!(!policy.matches("receptionist", "treatment", &attrs));

        // Missing attribute fails the condition
        attrs.clear();
        assert!(!policy.matches("receptionist", "treatment", &attrs));
    }

    #[test]
    fn test_allow_round_trip() {
        let json = serde_json::to_string(&AllowList::All).unwrap();
        assert_eq!(json, "\"*\"");

        let parsed: AllowList = serde_json::from_str("[\"name\",\"dob\"]").unwrap();
        assert!(parsed.permits("name"));
        assert!(parsed.permits("dob"));
        assert!(!parsed.permits("ssn"));
    }
}
