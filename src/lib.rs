//! Mood-tagged diary entries stored in a local key-value store.
//!
//! [`diary_state::DiaryState`] and [`settings_state::SettingsState`] own the
//! persisted data; everything else is stateless support for the terminal UI.

pub mod config;
pub mod diary_entry;
pub mod diary_state;
pub mod insights;
pub mod moods;
pub mod routes;
pub mod settings_state;
pub mod storage;
pub mod tags;
pub mod ui;
