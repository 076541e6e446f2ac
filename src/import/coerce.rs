//! Turning raw cell text into typed JSON values

use serde_json::{json, Value};

/// Fields sent as a comma-separated list
const LIST_FIELDS: &[&str] = &["keywords", "tags"];

/// Array fields the API expects wrapped as `{"members": [...]}`
const MEMBER_FIELDS: &[&str] = &["authors", "inventors", "team_members", "developers"];

/// Coerce one cell value for the given (already mapped) field name
///
/// Rules are applied in a fixed order: list splitting for `keywords`/`tags`,
/// then JSON detection for values that look like an array or object, then
/// per-field wrapping of parsed arrays. Anything else stays a string.
pub fn coerce(field: &str, raw: &str) -> Value {
    if LIST_FIELDS.contains(&field) {
        return split_list(raw);
    }

    let trimmed = raw.trim_start();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return Value::String(raw.to_string());
    }

    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|parsed| wrap(field, parsed))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn split_list(raw: &str) -> Value {
    Value::Array(
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.to_string()))
            .collect(),
    )
}

/// `None` sends the raw cell text instead
fn wrap(field: &str, parsed: Value) -> Option<Value> {
    let Value::Array(items) = parsed else {
        return Some(parsed);
    };

    if MEMBER_FIELDS.contains(&field) {
        Some(json!({ "members": items }))
    } else if field == "related_projects" {
        Some(json!({ "projects": items }))
    } else if field == "participants" {
        items
            .into_iter()
            .map(participant_name)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array)
    } else {
        Some(Value::Array(items))
    }
}

/// A participant is a name or an object carrying one; a `null` entry
/// makes the whole list unusable
fn participant_name(item: Value) -> Option<Value> {
    match item {
        Value::Null => None,
        Value::String(_) => Some(item),
        Value::Object(mut obj) => Some(
            obj.remove("name")
                .filter(is_truthy)
                .unwrap_or_else(|| Value::String(String::new())),
        ),
        _ => Some(Value::String(String::new())),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_comma_split() {
        assert_eq!(coerce("tags", "ai, nlp, vision"), json!(["ai", "nlp", "vision"]));
    }

    #[test]
    fn test_tags_split_before_json_detection() {
        assert_eq!(coerce("tags", "[a,b]"), json!(["[a", "b]"]));
        assert_eq!(coerce("keywords", r#"["x","y"]"#), json!([r#"["x""#, r#""y"]"#]));
    }

    #[test]
    fn test_keywords_drop_empty_pieces() {
        assert_eq!(coerce("keywords", " graph,, ,learning,"), json!(["graph", "learning"]));
    }

    #[test]
    fn test_authors_wrapped_as_members() {
        assert_eq!(
            coerce("authors", r#"["Alice","Bob"]"#),
            json!({ "members": ["Alice", "Bob"] })
        );
    }

    #[test]
    fn test_other_member_fields_wrapped() {
        for field in ["inventors", "team_members", "developers"] {
            assert_eq!(coerce(field, r#"["A"]"#), json!({ "members": ["A"] }));
        }
    }

    #[test]
    fn test_related_projects_wrapped() {
        assert_eq!(
            coerce("related_projects", r#"["P-1", "P-2"]"#),
            json!({ "projects": ["P-1", "P-2"] })
        );
    }

    #[test]
    fn test_participants_flattened_to_names() {
        let raw = r#"["Alice", {"name": "Bob", "role": "speaker"}, {"role": "chair"}, 7]"#;
        assert_eq!(coerce("participants", raw), json!(["Alice", "Bob", "", ""]));
    }

    #[test]
    fn test_participant_names_keep_non_string_values() {
        let raw = r#"[{"name": 42}, {"name": 0}, {"name": ""}, {"name": null}]"#;
        assert_eq!(coerce("participants", raw), json!([42, "", "", ""]));
    }

    #[test]
    fn test_null_participant_sends_raw_text() {
        let raw = r#"["Alice", null]"#;
        assert_eq!(coerce("participants", raw), json!(raw));
    }

    #[test]
    fn test_wrapped_field_with_object_is_left_alone() {
        let raw = r#"{"members": ["Alice"], "corresponding": "Alice"}"#;
        assert_eq!(
            coerce("authors", raw),
            json!({ "members": ["Alice"], "corresponding": "Alice" })
        );
    }

    #[test]
    fn test_plain_json_fields_unwrapped() {
        assert_eq!(coerce("metadata", r#"{"k": 1}"#), json!({ "k": 1 }));
        assert_eq!(coerce("scores", "[1, 2.5]"), json!([1, 2.5]));
    }

    #[test]
    fn test_leading_whitespace_still_detected() {
        assert_eq!(coerce("authors", r#"  ["Alice"]"#), json!({ "members": ["Alice"] }));
    }

    #[test]
    fn test_invalid_json_falls_back_to_raw() {
        assert_eq!(coerce("authors", "[not valid json"), json!("[not valid json"));
        assert_eq!(coerce("notes", "{oops"), json!("{oops"));
    }

    #[test]
    fn test_plain_values_stay_strings() {
        assert_eq!(coerce("citation_count", "42"), json!("42"));
        assert_eq!(coerce("title", "Attention, again"), json!("Attention, again"));
    }
}
