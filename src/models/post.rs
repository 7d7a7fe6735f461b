use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Fields the generator must supply for a post to be publishable.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "title",
    "description",
    "meta_title",
    "meta_description",
    "keywords",
    "content",
];

/// A generated blog post on its way to the database.
///
/// The draft is kept as the raw JSON object the model produced rather than a
/// typed struct: validation is presence-only (the prompt is trusted for field
/// formats), and keeping the map means the persisted record contains exactly
/// the fields the model returned plus `created_at`, nothing else.
#[derive(Debug, Clone)]
pub struct BlogDraft {
    fields: Map<String, Value>,
}

impl BlogDraft {
    /// Parses sanitized generator output as a JSON object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let fields: Map<String, Value> = serde_json::from_str(text)?;
        Ok(Self { fields })
    }

    /// Names of required fields absent from the draft, in declaration order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .filter(|field| !self.fields.contains_key(**field))
            .copied()
            .collect()
    }

    /// Attaches the `created_at` timestamp. Called by the orchestrator after
    /// validation; the generator never supplies this field.
    pub fn attach_timestamp(&mut self, now: DateTime<Utc>) {
        self.fields.insert(
            "created_at".to_string(),
            Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.fields.get("description").and_then(Value::as_str)
    }

    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> BlogDraft {
        BlogDraft::from_json(
            r#"{"title":"T","description":"D","meta_title":"MT","meta_description":"MD","keywords":["a","b"],"content":"C"}"#,
        )
        .unwrap()
    }

    #[test]
    fn complete_draft_has_no_missing_fields() {
        assert!(complete_draft().missing_fields().is_empty());
    }

    #[test]
    fn reports_exactly_the_missing_fields() {
        let draft = BlogDraft::from_json(r#"{"title":"T","keywords":[]}"#).unwrap();
        assert_eq!(
            draft.missing_fields(),
            vec!["description", "meta_title", "meta_description", "content"]
        );
    }

    #[test]
    fn field_value_types_are_not_checked() {
        // Presence-only validation: the LLM is trusted for format compliance.
        let draft = BlogDraft::from_json(
            r#"{"title":1,"description":null,"meta_title":[],"meta_description":{},"keywords":"x","content":true}"#,
        )
        .unwrap();
        assert!(draft.missing_fields().is_empty());
    }

    #[test]
    fn non_object_input_is_a_parse_error() {
        assert!(BlogDraft::from_json("[1, 2, 3]").is_err());
        assert!(BlogDraft::from_json("\"just a string\"").is_err());
        assert!(BlogDraft::from_json("not json").is_err());
    }

    #[test]
    fn timestamp_round_trip_adds_only_created_at() {
        let mut draft = complete_draft();
        draft.attach_timestamp(Utc::now());

        let serialized = serde_json::to_string(draft.as_map()).unwrap();
        let reparsed: Map<String, Value> = serde_json::from_str(&serialized).unwrap();

        assert_eq!(reparsed.len(), 7);
        for field in REQUIRED_FIELDS {
            assert!(reparsed.contains_key(field), "lost field {field}");
        }
        let created_at = reparsed["created_at"].as_str().unwrap();
        assert!(created_at.parse::<DateTime<Utc>>().is_ok());
    }

    #[test]
    fn accessors_read_string_fields() {
        let draft = complete_draft();
        assert_eq!(draft.title(), Some("T"));
        assert_eq!(draft.description(), Some("D"));
    }
}
