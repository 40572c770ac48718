use color_eyre::eyre::{Result, WrapErr};
use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
};

pub const DIARY_KEY: &str = "emotion-diary-entries";
pub const SETTINGS_KEY: &str = "emotion-diary-settings";

/// String-keyed storage holding one serialized snapshot per key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Keeps each key in its own `<key>.json` file under `root`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).wrap_err_with(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root).wrap_err_with(|| {
            format!("Failed to create data directory {}", self.root.display())
        })?;

        let path = self.path_for(key);
        let staged = path.with_extension("json.new");
        fs::write(&staged, value)
            .wrap_err_with(|| format!("Failed to write {}", staged.display()))?;
        fs::rename(&staged, &path)
            .wrap_err_with(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

/// In-process store; counts writes so callers can tell a no-op from a save.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = MemoryStore::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
