use crate::storage::{KeyValueStore, SETTINGS_KEY};
use color_eyre::eyre::{bail, Result, WrapErr};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub api_key: String,
}

pub struct SettingsState<S> {
    settings: SettingsRecord,
    store: S,
}

impl<S: KeyValueStore> SettingsState<S> {
    pub fn load(store: S) -> Self {
        let settings = read_settings(&store).unwrap_or_else(|e| {
            warn!("Could not read settings from storage: {e:#}");
            SettingsRecord::default()
        });

        SettingsState { settings, store }
    }

    pub fn api_key(&self) -> &str {
        &self.settings.api_key
    }

    pub fn has_api_key(&self) -> bool {
        !self.settings.api_key.is_empty()
    }

    /// The key with everything except the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let total = self.settings.api_key.chars().count();
        let shown = total.min(4);
        self.settings
            .api_key
            .chars()
            .enumerate()
            .map(|(i, c)| if i < total - shown { '•' } else { c })
            .collect()
    }

    pub fn set_api_key(&mut self, value: Option<&str>) -> Result<()> {
        self.settings = SettingsRecord {
            api_key: value.unwrap_or_default().trim().to_string(),
        };
        self.save_to_store()
    }

    /// Does not touch storage when the key is already empty.
    pub fn clear_api_key(&mut self) -> Result<()> {
        if self.settings.api_key.is_empty() {
            return Ok(());
        }
        self.settings = SettingsRecord::default();
        self.save_to_store()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn save_to_store(&mut self) -> Result<()> {
        let serialized = serde_json::to_string(&self.settings)?;
        self.store
            .set(SETTINGS_KEY, &serialized)
            .wrap_err("Failed to save settings")
    }
}

fn read_settings<S: KeyValueStore>(store: &S) -> Result<SettingsRecord> {
    let raw = match store.get(SETTINGS_KEY)? {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(SettingsRecord::default()),
    };

    let parsed: Value = serde_json::from_str(&raw).wrap_err("Stored settings are not valid JSON")?;
    let Value::Object(fields) = parsed else {
        bail!("Stored settings are not an object");
    };

    Ok(SettingsRecord {
        api_key: fields
            .get("apiKey")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}
