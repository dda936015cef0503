use std::path::PathBuf;

use thiserror::Error;

/// Failures of the note-file core.
///
/// Directory and write failures abort the enclosing command. An unreadable
/// note file is reported per-file by the caller and the scan moves on.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("failed to read daily notes directory {}: {source}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read note file {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write note file {}: {source}", path.display())]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("date format '{0}' cannot name note files")]
    InvalidDateFormat(String),
}

/// Failures while loading or persisting settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "daily_notes_folder_path is required. Please set it using:\n  \
         altum config set daily_notes_folder_path <folder_path>\n  \
         or use --daily-notes-folder-path flag"
    )]
    MissingNotesFolder,

    #[error("Invalid key '{0}'. Valid keys are: daily_notes_folder_path, date_format")]
    InvalidKey(String),

    #[error(
        "Invalid date_format '{0}'. Use a strftime pattern with year, month and day, \
         e.g. %Y-%m-%d"
    )]
    InvalidDateFormat(String),

    #[error("could not determine the user config directory")]
    NoConfigDir,

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
