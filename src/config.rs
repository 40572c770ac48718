use std::{env, path::PathBuf};

pub const DATA_DIR_ENV: &str = "EMOTION_DIARY_DATA_DIR";
const APP_DIR_NAME: &str = "emotion-diary";
const LOG_FILE_NAME: &str = "emotion-diary.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Config::with_override(env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    /// Uses `data_dir` when given, else the platform data directory, else the
    /// working directory.
    pub fn with_override(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(APP_DIR_NAME));

        Config { data_dir }
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}
