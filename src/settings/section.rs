//! Settings sections and their typed views
//!
//! Every widget owns one named section of the settings document. The structs
//! here are the typed view of a section: deserializing one fills any field the
//! stored section lacks from that section's default.

use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::SettingsError;

/// Named partition of the settings document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Background,
    Clock,
    Search,
    Theme,
    Github,
    Bookmark,
    Weather,
    Notes,
    General,
}

impl Section {
    /// All sections, in document order
    pub const ALL: [Section; 9] = [
        Section::Background,
        Section::Clock,
        Section::Search,
        Section::Theme,
        Section::Github,
        Section::Bookmark,
        Section::Weather,
        Section::Notes,
        Section::General,
    ];

    /// Key of this section in the serialized document
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Background => "background",
            Section::Clock => "clock",
            Section::Search => "search",
            Section::Theme => "theme",
            Section::Github => "github",
            Section::Bookmark => "bookmark",
            Section::Weather => "weather",
            Section::Notes => "notes",
            Section::General => "general",
        }
    }

    /// Default value of this section as stored JSON
    pub fn default_value(self) -> serde_json::Value {
        match self {
            Section::Background => default_json::<BackgroundSettings>(),
            Section::Clock => default_json::<ClockSettings>(),
            Section::Search => default_json::<SearchSettings>(),
            Section::Theme => default_json::<ThemeSettings>(),
            Section::Github => default_json::<GithubSettings>(),
            Section::Bookmark => default_json::<BookmarkSettings>(),
            Section::Weather => default_json::<WeatherSettings>(),
            Section::Notes => default_json::<NotesSettings>(),
            Section::General => default_json::<GeneralSettings>(),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SettingsError::UnknownSection(s.to_string()))
    }
}

fn default_json<S: SettingsSection>() -> serde_json::Value {
    // Plain structs of primitives always serialize.
    serde_json::to_value(S::default()).unwrap_or_default()
}

/// Typed view of one section of the settings document
///
/// `Default` is the hard-coded default for the section. Implementors use
/// `#[serde(default)]` so fields missing from storage read as their default.
pub trait SettingsSection: Serialize + DeserializeOwned + Default {
    const SECTION: Section;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundSettings {
    /// Overlay brightness, 0.0 to 1.0
    pub brightness: f64,
    pub selected_images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_image: Option<String>,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            brightness: 0.5,
            selected_images: Vec::new(),
            current_image: None,
        }
    }
}

impl SettingsSection for BackgroundSettings {
    const SECTION: Section = Section::Background;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClockSettings {
    pub enable: bool,
    /// UTC offset in hours, fractional for zones like +05:30
    pub timezone: f64,
    /// BCP 47 locale used to format the date
    pub locate_code: String,
    pub hour12: bool,
    pub show_seconds: bool,
    pub show_weekdays: bool,
    pub transparent_background: bool,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            enable: true,
            timezone: 7.0,
            locate_code: "vi-VN".to_string(),
            hour12: false,
            show_seconds: true,
            show_weekdays: false,
            transparent_background: true,
        }
    }
}

impl SettingsSection for ClockSettings {
    const SECTION: Section = Section::Clock;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchSettings {
    pub enable: bool,
    /// Index into the list of search engines (Google, Bing, DuckDuckGo)
    pub default_engine: u32,
    pub background_transparent: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            enable: true,
            default_engine: 0,
            background_transparent: true,
        }
    }
}

impl SettingsSection for SearchSettings {
    const SECTION: Section = Section::Search;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeSettings {
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
    pub dark_mode: bool,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            primary_color: "#646cff".to_string(),
            background_color: "#242424".to_string(),
            text_color: "rgba(255, 255, 255, 0.87)".to_string(),
            dark_mode: true,
        }
    }
}

impl SettingsSection for ThemeSettings {
    const SECTION: Section = Section::Theme;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GithubSettings {
    pub username: String,
    pub show_user_info: bool,
    pub show_language_stats: bool,
    pub show_stats: bool,
    pub show_commit_activity: bool,
    /// How long fetched profile data stays fresh
    pub cache_duration_minutes: u64,
    pub excluded_languages: Vec<String>,
    pub font_size: u32,
    pub compact_mode: bool,
    pub chart_size: u32,
    pub blur: u32,
    pub background_transparent: bool,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            show_user_info: true,
            show_language_stats: true,
            show_stats: true,
            show_commit_activity: true,
            cache_duration_minutes: 10,
            excluded_languages: Vec::new(),
            font_size: 14,
            compact_mode: false,
            chart_size: 250,
            blur: 10,
            background_transparent: true,
        }
    }
}

impl SettingsSection for GithubSettings {
    const SECTION: Section = Section::Github;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelsPosition {
    Bottom,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookmarkSettings {
    pub enable: bool,
    pub show_labels: bool,
    pub show_icons: bool,
    pub show_folders: bool,
    pub background_transparent: bool,
    pub blur: u32,
    pub labels_position: LabelsPosition,
    pub icon_size: u32,
}

impl Default for BookmarkSettings {
    fn default() -> Self {
        Self {
            enable: true,
            show_labels: true,
            show_icons: true,
            show_folders: true,
            background_transparent: true,
            blur: 10,
            labels_position: LabelsPosition::Bottom,
            icon_size: 16,
        }
    }
}

impl SettingsSection for BookmarkSettings {
    const SECTION: Section = Section::Bookmark;
}

/// Temperature scale used for weather display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TempScale {
    #[default]
    #[serde(alias = "c")]
    C,
    #[serde(alias = "f")]
    F,
}

impl TempScale {
    pub fn as_str(self) -> &'static str {
        match self {
            TempScale::C => "C",
            TempScale::F => "F",
        }
    }

    /// Unit suffix shown after a temperature
    pub fn suffix(self) -> &'static str {
        match self {
            TempScale::C => "°C",
            TempScale::F => "°F",
        }
    }
}

impl FromStr for TempScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" | "c" => Ok(TempScale::C),
            "F" | "f" => Ok(TempScale::F),
            other => Err(format!("invalid temperature scale '{}', expected C or F", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeatherSettings {
    pub enable: bool,
    pub location: String,
    pub temp_scale: TempScale,
    /// Refresh period in minutes; also the TTL of cached forecasts
    pub refresh_interval: u64,
    pub font_size: u32,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            enable: true,
            location: "Hồ Chí Minh".to_string(),
            temp_scale: TempScale::C,
            refresh_interval: 30,
            font_size: 14,
        }
    }
}

impl SettingsSection for WeatherSettings {
    const SECTION: Section = Section::Weather;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotesSortBy {
    CreatedAt,
    UpdatedAt,
    Deadline,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotesSettings {
    pub enable: bool,
    pub background_transparent: bool,
    pub blur: u32,
    pub font_size: u32,
    pub expanded_view: bool,
    pub show_deadline: bool,
    pub sort_by: NotesSortBy,
    pub sort_direction: SortDirection,
}

impl Default for NotesSettings {
    fn default() -> Self {
        Self {
            enable: true,
            background_transparent: true,
            blur: 10,
            font_size: 14,
            expanded_view: false,
            show_deadline: true,
            sort_by: NotesSortBy::CreatedAt,
            sort_direction: SortDirection::Desc,
        }
    }
}

impl SettingsSection for NotesSettings {
    const SECTION: Section = Section::Notes;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralSettings {
    pub notifications: bool,
    pub language: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            language: "vi-VN".to_string(),
        }
    }
}

impl SettingsSection for GeneralSettings {
    const SECTION: Section = Section::General;
}
