use crate::{moods, tags::split_tags};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A stored diary record. Every instance has passed through [`normalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: String,
    pub created_at: String,
    pub mood: String,
    pub fact: String,
    pub emotions: String,
    pub psychological: Vec<String>,
    pub physiological: Vec<String>,
    pub thoughts: String,
    pub behaviors: String,
    pub consequences: String,
}

impl DiaryEntry {
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.created_at)
    }

    pub fn mood_meta(&self) -> &'static moods::MoodOption {
        moods::lookup(&self.mood)
    }
}

/// A free-text field as it may appear in stored or user-supplied data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Unsupported(Value),
}

impl TextInput {
    fn into_text(self) -> Option<String> {
        match self {
            TextInput::Text(text) => Some(text),
            TextInput::Number(number) => Some(number.to_string()),
            TextInput::Flag(flag) => Some(flag.to_string()),
            TextInput::Unsupported(_) => None,
        }
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        TextInput::Text(text.to_string())
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        TextInput::Text(text)
    }
}

/// Tag fields accept either a list or a single delimited string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    List(Vec<Value>),
    Text(String),
    Unsupported(Value),
}

impl TagInput {
    fn into_tags(self) -> Vec<String> {
        match self {
            // Lists are taken as given; only non-scalar items are dropped.
            TagInput::List(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(tag) => Some(tag),
                    Value::Number(number) => Some(number.to_string()),
                    Value::Bool(flag) => Some(flag.to_string()),
                    _ => None,
                })
                .collect(),
            TagInput::Text(text) => split_tags(Some(&text)),
            TagInput::Unsupported(_) => Vec::new(),
        }
    }
}

impl From<Vec<String>> for TagInput {
    fn from(tags: Vec<String>) -> Self {
        TagInput::List(tags.into_iter().map(Value::String).collect())
    }
}

impl From<&str> for TagInput {
    fn from(text: &str) -> Self {
        TagInput::Text(text.to_string())
    }
}

/// Partial, loosely typed input for creating or updating an entry.
///
/// Carries the legacy field names (`event`, `feeling`, `thought`, `behavior`,
/// `result`) so older snapshots keep loading.
///
/// Each field is `None` when absent and `Some(None)` when given as `null`, so
/// a `null` in an update overrides the stored value like any other value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiaryDraft {
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub mood: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub fact: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub event: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub emotions: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub feeling: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub psychological: Option<Option<TagInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub physiological: Option<Option<TagInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub thoughts: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub thought: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub behaviors: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub behavior: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub consequences: Option<Option<TextInput>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub result: Option<Option<TextInput>>,
}

/// Keeps an explicit `null` distinct from a missing field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl DiaryDraft {
    /// Reads a draft out of any JSON value. Non-objects read as an empty draft.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => DiaryDraft::default(),
        }
    }

    /// Overlays every field present in `updates` onto `self`, explicit nulls included.
    pub fn merge(self, updates: DiaryDraft) -> DiaryDraft {
        DiaryDraft {
            id: updates.id.or(self.id),
            created_at: updates.created_at.or(self.created_at),
            mood: updates.mood.or(self.mood),
            fact: updates.fact.or(self.fact),
            event: updates.event.or(self.event),
            emotions: updates.emotions.or(self.emotions),
            feeling: updates.feeling.or(self.feeling),
            psychological: updates.psychological.or(self.psychological),
            physiological: updates.physiological.or(self.physiological),
            thoughts: updates.thoughts.or(self.thoughts),
            thought: updates.thought.or(self.thought),
            behaviors: updates.behaviors.or(self.behaviors),
            behavior: updates.behavior.or(self.behavior),
            consequences: updates.consequences.or(self.consequences),
            result: updates.result.or(self.result),
        }
    }
}

impl From<&DiaryEntry> for DiaryDraft {
    fn from(entry: &DiaryEntry) -> Self {
        DiaryDraft {
            id: Some(Some(entry.id.as_str().into())),
            created_at: Some(Some(entry.created_at.as_str().into())),
            mood: Some(Some(entry.mood.as_str().into())),
            fact: Some(Some(entry.fact.as_str().into())),
            emotions: Some(Some(entry.emotions.as_str().into())),
            psychological: Some(Some(entry.psychological.clone().into())),
            physiological: Some(Some(entry.physiological.clone().into())),
            thoughts: Some(Some(entry.thoughts.as_str().into())),
            behaviors: Some(Some(entry.behaviors.as_str().into())),
            consequences: Some(Some(entry.consequences.as_str().into())),
            ..DiaryDraft::default()
        }
    }
}

/// `<unix millis>-<random hex>`.
pub fn generate_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &random[..13])
}

pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Accepts RFC 3339 as well as the bare `YYYY-MM-DD[THH:MM[:SS]]` forms older
/// entries were saved with. Offset-less values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }

    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    Some(naive.and_utc().fixed_offset())
}

fn non_empty(input: Option<Option<TextInput>>) -> Option<String> {
    input
        .flatten()
        .and_then(TextInput::into_text)
        .filter(|text| !text.is_empty())
}

fn text_or_alias(value: Option<Option<TextInput>>, alias: Option<Option<TextInput>>) -> String {
    value
        .flatten()
        .and_then(TextInput::into_text)
        .or_else(|| alias.flatten().and_then(TextInput::into_text))
        .unwrap_or_default()
}

/// Maps any draft onto the canonical entry shape.
///
/// Missing or null text fields fall back to their legacy alias and then to an
/// empty string; an explicit empty string is kept. `id`, `createdAt` and
/// `mood` also treat the empty string as missing, and an unparsable
/// `createdAt` is replaced with the current time.
pub fn normalize(draft: DiaryDraft) -> DiaryEntry {
    let created_at = non_empty(draft.created_at)
        .filter(|raw| parse_timestamp(raw).is_some())
        .unwrap_or_else(now_timestamp);

    DiaryEntry {
        id: non_empty(draft.id).unwrap_or_else(generate_id),
        created_at,
        mood: non_empty(draft.mood).unwrap_or_else(|| moods::DEFAULT_MOOD.to_string()),
        fact: text_or_alias(draft.fact, draft.event),
        emotions: text_or_alias(draft.emotions, draft.feeling),
        psychological: draft
            .psychological
            .flatten()
            .map(TagInput::into_tags)
            .unwrap_or_default(),
        physiological: draft
            .physiological
            .flatten()
            .map(TagInput::into_tags)
            .unwrap_or_default(),
        thoughts: text_or_alias(draft.thoughts, draft.thought),
        behaviors: text_or_alias(draft.behaviors, draft.behavior),
        consequences: text_or_alias(draft.consequences, draft.result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(value: Value) -> DiaryDraft {
        DiaryDraft::from_value(value)
    }

    #[test]
    fn empty_input_produces_a_valid_entry() {
        let entry = normalize(draft(json!({})));

        assert!(!entry.id.is_empty());
        assert!(entry.timestamp().is_some());
        assert_eq!(entry.mood, "neutral");
        assert_eq!(entry.fact, "");
        assert!(entry.psychological.is_empty());
        assert!(entry.physiological.is_empty());
    }

    #[test]
    fn non_object_input_is_treated_as_empty() {
        for value in [json!(5), json!("text"), json!(null), json!([1, 2])] {
            let entry = normalize(draft(value));
            assert_eq!(entry.mood, "neutral");
            assert!(!entry.id.is_empty());
        }
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let first = normalize(draft(json!({
            "mood": "bad",
            "event": "Missed the train",
            "feeling": "annoyed",
            "psychological": "worry, 焦虑",
            "physiological": ["tense"],
            "thought": "I am always late",
            "result": "called in",
        })));
        let second = normalize(DiaryDraft::from(&first));

        assert_eq!(first, second);
    }

    #[test]
    fn canonical_names_win_over_legacy_aliases() {
        let both = normalize(draft(json!({ "fact": "A", "event": "B" })));
        assert_eq!(both.fact, "A");

        let legacy = normalize(draft(json!({ "event": "B" })));
        assert_eq!(legacy.fact, "B");

        let legacy_all = normalize(draft(json!({
            "feeling": "f",
            "thought": "t",
            "behavior": "b",
            "result": "r",
        })));
        assert_eq!(legacy_all.emotions, "f");
        assert_eq!(legacy_all.thoughts, "t");
        assert_eq!(legacy_all.behaviors, "b");
        assert_eq!(legacy_all.consequences, "r");
    }

    #[test]
    fn explicit_empty_text_is_kept_over_alias() {
        let entry = normalize(draft(json!({ "fact": "", "event": "B" })));
        assert_eq!(entry.fact, "");

        let null_fact = normalize(draft(json!({ "fact": null, "event": "B" })));
        assert_eq!(null_fact.fact, "B");
    }

    #[test]
    fn explicit_null_is_kept_apart_from_a_missing_field() {
        let with_null = draft(json!({ "fact": null }));
        assert_eq!(with_null.fact, Some(None));
        assert_eq!(with_null.event, None);

        let merged = DiaryDraft {
            fact: Some(Some("old".into())),
            ..DiaryDraft::default()
        }
        .merge(with_null);
        assert_eq!(merged.fact, Some(None));
        assert_eq!(normalize(merged).fact, "");
    }

    #[test]
    fn tag_strings_are_split_and_lists_are_copied() {
        let entry = normalize(draft(json!({
            "psychological": "a, b，c",
            "physiological": ["x", " y "],
        })));

        assert_eq!(entry.psychological, vec!["a", "b", "c"]);
        assert_eq!(entry.physiological, vec!["x", " y "]);
    }

    #[test]
    fn unsupported_tag_shapes_become_empty() {
        let entry = normalize(draft(json!({ "psychological": { "a": 1 }, "physiological": 3 })));

        assert!(entry.psychological.is_empty());
        assert!(entry.physiological.is_empty());
    }

    #[test]
    fn blank_identity_fields_are_filled() {
        let entry = normalize(draft(json!({ "id": "", "createdAt": "", "mood": "" })));

        assert!(!entry.id.is_empty());
        assert!(entry.timestamp().is_some());
        assert_eq!(entry.mood, "neutral");
    }

    #[test]
    fn unknown_mood_passes_through() {
        let entry = normalize(draft(json!({ "mood": "ecstatic" })));

        assert_eq!(entry.mood, "ecstatic");
        assert_eq!(entry.mood_meta().value, "neutral");
    }

    #[test]
    fn supplied_identity_is_kept() {
        let entry = normalize(draft(json!({ "id": "abc", "createdAt": "2024-02-01" })));

        assert_eq!(entry.id, "abc");
        assert_eq!(entry.created_at, "2024-02-01");
    }

    #[test]
    fn garbage_timestamp_is_replaced() {
        let entry = normalize(draft(json!({ "createdAt": "yesterday-ish" })));

        assert_ne!(entry.created_at, "yesterday-ish");
        assert!(entry.timestamp().is_some());
    }

    #[test]
    fn timestamps_parse_in_several_forms() {
        assert!(parse_timestamp("2024-03-01T08:30:00.000Z").is_some());
        assert!(parse_timestamp("2024-03-01T08:30:00+08:00").is_some());
        assert!(parse_timestamp("2024-03-01T08:30").is_some());
        assert!(parse_timestamp("2024-03-01").is_some());
        assert!(parse_timestamp("March").is_none());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let entry = normalize(draft(json!({ "id": "x", "createdAt": "2024-01-01" })));
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["createdAt"], "2024-01-01");
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(generate_id(), generate_id());
    }
}
