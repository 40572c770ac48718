use crate::diary_entry::{generate_id, normalize, DiaryDraft, DiaryEntry};
use crate::storage::{KeyValueStore, DIARY_KEY};
use color_eyre::eyre::{bail, Result, WrapErr};
use log::{debug, warn};
use serde_json::Value;

/// Owns the diary entries and keeps the stored snapshot in step with them.
pub struct DiaryState<S> {
    entries: Vec<DiaryEntry>,
    store: S,
}

impl<S: KeyValueStore> DiaryState<S> {
    /// Never fails: an unreadable snapshot is logged and treated as empty.
    pub fn load(store: S) -> Self {
        let entries = match read_entries(&store) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not read diary entries from storage: {e:#}");
                Vec::new()
            }
        };
        debug!("Loaded {} diary entries", entries.len());

        DiaryState { entries, store }
    }

    /// Newest first by `createdAt`.
    pub fn list(&self) -> Vec<&DiaryEntry> {
        let mut sorted: Vec<&DiaryEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|entry| std::cmp::Reverse(entry.timestamp()));
        sorted
    }

    pub fn get_by_id(&self, id: &str) -> Option<&DiaryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores a new entry under a freshly generated id, ignoring any id in `draft`.
    pub fn add(&mut self, mut draft: DiaryDraft) -> Result<DiaryEntry> {
        draft.id = Some(Some(generate_id().into()));
        let entry = normalize(draft);
        self.entries.push(entry.clone());
        self.save_to_store()?;
        debug!("Added diary entry {}", entry.id);
        Ok(entry)
    }

    /// Returns `Ok(None)` without writing when `id` is unknown.
    pub fn update(&mut self, id: &str, updates: DiaryDraft) -> Result<Option<DiaryEntry>> {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return Ok(None);
        };

        let mut merged = DiaryDraft::from(&self.entries[index]).merge(updates);
        merged.id = Some(Some(id.into()));
        let updated = normalize(merged);
        self.entries[index] = updated.clone();
        self.save_to_store()?;
        debug!("Updated diary entry {id}");
        Ok(Some(updated))
    }

    /// Returns `Ok(false)` without writing when `id` is unknown.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id) else {
            return Ok(false);
        };

        self.entries.remove(index);
        self.save_to_store()?;
        debug!("Deleted diary entry {id}");
        Ok(true)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn save_to_store(&mut self) -> Result<()> {
        let serialized = serde_json::to_string(&self.entries)?;
        self.store
            .set(DIARY_KEY, &serialized)
            .wrap_err("Failed to save diary entries")
    }
}

fn read_entries<S: KeyValueStore>(store: &S) -> Result<Vec<DiaryEntry>> {
    let raw = match store.get(DIARY_KEY)? {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(Vec::new()),
    };

    let parsed: Value = serde_json::from_str(&raw).wrap_err("Stored diary is not valid JSON")?;
    let Value::Array(items) = parsed else {
        bail!("Stored diary is not a list");
    };

    Ok(items
        .into_iter()
        .map(DiaryDraft::from_value)
        .map(normalize)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use serde_json::json;

    fn draft(value: Value) -> DiaryDraft {
        DiaryDraft::from_value(value)
    }

    fn state_with(value: Value) -> DiaryState<MemoryStore> {
        DiaryState::load(MemoryStore::with_value(DIARY_KEY, &value.to_string()))
    }

    fn ids(state: &DiaryState<MemoryStore>) -> Vec<String> {
        state.list().iter().map(|entry| entry.id.clone()).collect()
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let state = DiaryState::load(MemoryStore::new());
        assert!(state.is_empty());
    }

    #[test]
    fn corrupt_or_misshapen_snapshot_loads_empty() {
        let corrupt = DiaryState::load(MemoryStore::with_value(DIARY_KEY, "{not json"));
        assert!(corrupt.is_empty());

        let object = state_with(json!({ "id": "a" }));
        assert!(object.is_empty());
        assert_eq!(object.store().writes(), 0);
    }

    #[test]
    fn malformed_elements_do_not_abort_the_load() {
        let state = state_with(json!([
            { "id": "a", "createdAt": "2024-01-01", "event": "legacy" },
            42,
            { "id": "c", "psychological": "x y" },
        ]));

        assert_eq!(state.len(), 3);
        assert_eq!(state.get_by_id("a").unwrap().fact, "legacy");
        assert_eq!(state.get_by_id("c").unwrap().psychological, vec!["x", "y"]);
    }

    #[test]
    fn list_is_newest_first() {
        let state = state_with(json!([
            { "id": "jan", "createdAt": "2024-01-01" },
            { "id": "mar", "createdAt": "2024-03-01" },
            { "id": "feb", "createdAt": "2024-02-01" },
        ]));

        assert_eq!(ids(&state), vec!["mar", "feb", "jan"]);
    }

    #[test]
    fn add_replaces_supplied_id_and_persists() {
        let mut state = DiaryState::load(MemoryStore::new());
        let entry = state
            .add(draft(json!({ "id": "mine", "fact": "Rain", "mood": "bad" })))
            .unwrap();

        assert_ne!(entry.id, "mine");
        assert_eq!(entry.fact, "Rain");
        assert_eq!(state.get_by_id(&entry.id), Some(&entry));
        assert_eq!(state.store().writes(), 1);

        let reloaded = DiaryState::load(state.store().clone());
        assert_eq!(reloaded.get_by_id(&entry.id), Some(&entry));
    }

    #[test]
    fn update_merges_and_renormalizes() {
        let mut state = state_with(json!([
            { "id": "a", "createdAt": "2024-01-01", "fact": "old", "thoughts": "keep" },
        ]));

        let updated = state
            .update(
                "a",
                draft(json!({ "id": "hijack", "fact": "new", "physiological": "tired，sore" })),
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, "a");
        assert_eq!(updated.created_at, "2024-01-01");
        assert_eq!(updated.fact, "new");
        assert_eq!(updated.thoughts, "keep");
        assert_eq!(updated.physiological, vec!["tired", "sore"]);
        assert_eq!(state.get_by_id("a"), Some(&updated));
        assert_eq!(state.store().writes(), 1);
    }

    #[test]
    fn legacy_alias_in_update_does_not_override_existing_field() {
        let mut state = state_with(json!([{ "id": "a", "fact": "kept" }]));

        let updated = state.update("a", draft(json!({ "event": "ignored" }))).unwrap().unwrap();

        assert_eq!(updated.fact, "kept");
    }

    #[test]
    fn null_in_update_clears_the_field() {
        let mut state = state_with(json!([
            { "id": "a", "fact": "old", "emotions": "kept", "psychological": ["x"] },
        ]));

        let updated = state
            .update("a", draft(json!({ "fact": null, "psychological": null })))
            .unwrap()
            .unwrap();

        assert_eq!(updated.fact, "");
        assert!(updated.psychological.is_empty());
        assert_eq!(updated.emotions, "kept");
    }

    #[test]
    fn null_in_update_falls_back_to_alias_in_the_same_update() {
        let mut state = state_with(json!([{ "id": "a", "thoughts": "old" }]));

        let updated = state
            .update("a", draft(json!({ "thoughts": null, "thought": "legacy" })))
            .unwrap()
            .unwrap();

        assert_eq!(updated.thoughts, "legacy");
    }

    #[test]
    fn update_of_unknown_id_changes_nothing() {
        let mut state = state_with(json!([
            { "id": "a", "createdAt": "2024-01-01", "fact": "same" },
        ]));
        let before: Vec<DiaryEntry> = state.list().into_iter().cloned().collect();

        let result = state.update("missing", draft(json!({ "fact": "x" }))).unwrap();

        let after: Vec<DiaryEntry> = state.list().into_iter().cloned().collect();
        assert_eq!(result, None);
        assert_eq!(before, after);
        assert_eq!(state.store().writes(), 0);
    }

    #[test]
    fn delete_removes_exactly_one_entry() {
        let mut state = state_with(json!([{ "id": "a" }, { "id": "b" }]));

        assert!(state.delete("a").unwrap());
        assert_eq!(state.len(), 1);
        assert!(state.get_by_id("a").is_none());

        assert!(!state.delete("a").unwrap());
        assert_eq!(state.len(), 1);
        assert_eq!(state.store().writes(), 1);
    }

    #[test]
    fn unreadable_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("emotion-diary-entries.json"), [0xff, 0xfe])
            .expect("write snapshot");

        let state = DiaryState::load(FileStore::new(dir.path()));

        assert!(state.is_empty());
    }

    #[test]
    fn snapshot_survives_a_file_store_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut state = DiaryState::load(FileStore::new(dir.path()));
        let entry = state
            .add(draft(json!({ "fact": "Talked to a friend", "psychological": ["calm"] })))
            .unwrap();

        let reloaded = DiaryState::load(FileStore::new(dir.path()));
        assert_eq!(reloaded.list(), vec![&entry]);
    }
}
