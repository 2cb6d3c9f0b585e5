//! Widget settings: typed sections, defaults, persistence, import/export
//!
//! The settings document is split into named sections, one per widget. It is
//! loaded once from storage and merged over the default document, then
//! written back after every change.

mod document;
mod section;
mod store;

pub use document::SettingsDocument;
pub use section::{
    BackgroundSettings, BookmarkSettings, ClockSettings, GeneralSettings, GithubSettings,
    LabelsPosition, NotesSettings, NotesSortBy, SearchSettings, Section, SettingsSection,
    SortDirection, TempScale, ThemeSettings, WeatherSettings,
};
pub use store::{SettingsStore, SETTINGS_KEY};

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by the settings store
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Imported text is not valid JSON
    #[error("invalid settings JSON: {0}")]
    Import(#[from] serde_json::Error),

    /// Imported document or partial update is not a JSON object
    #[error("expected a JSON object for {0}")]
    NotAnObject(String),

    /// Section name does not match any known section
    #[error("unknown settings section '{0}'")]
    UnknownSection(String),

    /// Writing the document to storage failed
    #[error("failed to persist settings: {0}")]
    Storage(#[from] StorageError),
}
