//! Command-line interface parsing for devtab
//!
//! This module handles parsing of CLI arguments using clap and resolving the
//! directories the settings and cache stores live in.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use serde_json::Value;

use crate::settings::{Section, TempScale};
use crate::storage::{FileStore, StorageError};

/// devtab - new-tab dashboard settings and widget data from the terminal
#[derive(Parser, Debug)]
#[command(name = "devtab")]
#[command(about = "Manage devtab dashboard settings and fetch widget data")]
#[command(version)]
pub struct Cli {
    /// Directory for settings; cached widget data goes in DIR/cache
    ///
    /// Defaults to the platform data and cache directories.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show, change, import or export settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },

    /// Show today's hourly forecast
    Weather {
        /// Location to query instead of the configured one
        #[arg(long)]
        location: Option<String>,

        /// Temperature scale (C or F) instead of the configured one
        #[arg(long, value_name = "C|F")]
        scale: Option<TempScale>,
    },

    /// Show the GitHub profile summary
    Github {
        /// Username to query instead of the configured one
        #[arg(long)]
        username: Option<String>,
    },

    /// Fetch weather and GitHub data together
    Dashboard,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the whole document or one section
    Show {
        section: Option<Section>,
    },

    /// Print the document as pretty JSON
    Export,

    /// Replace the document with the contents of a JSON file
    Import {
        file: PathBuf,
    },

    /// Set one field of a section
    ///
    /// VALUE is parsed as JSON when possible and taken as a plain string
    /// otherwise, so `devtab settings set weather location Hanoi` works.
    Set {
        section: Section,
        field: String,
        value: String,
    },

    /// Restore defaults for one section, or for everything
    Reset {
        section: Option<Section>,
    },
}

impl Cli {
    /// Store holding the settings document
    pub fn settings_storage(&self) -> Result<FileStore, StorageError> {
        match &self.data_dir {
            Some(dir) => Ok(FileStore::with_dir(dir.clone())),
            None => FileStore::for_settings().ok_or(StorageError::NoDirectory),
        }
    }

    /// Store holding cached widget data
    pub fn cache_storage(&self) -> Result<FileStore, StorageError> {
        match &self.data_dir {
            Some(dir) => Ok(FileStore::with_dir(dir.join("cache"))),
            None => FileStore::for_cache().ok_or(StorageError::NoDirectory),
        }
    }

    /// Log level implied by the -v count
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

/// Parses a value given on the command line.
///
/// Valid JSON (numbers, booleans, arrays, quoted strings) is kept as-is;
/// anything else becomes a JSON string.
pub fn parse_setting_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
