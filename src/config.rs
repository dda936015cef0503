use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::notes::directory::is_date_format;

/// chrono strftime pattern used when no `date_format` is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

const ENV_NOTES_FOLDER: &str = "ALTUM_DAILY_NOTES_FOLDER_PATH";
const ENV_DATE_FORMAT: &str = "ALTUM_DATE_FORMAT";

/// A settable configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DailyNotesFolderPath,
    DateFormat,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 2] = [ConfigKey::DailyNotesFolderPath, ConfigKey::DateFormat];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::DailyNotesFolderPath => "daily_notes_folder_path",
            ConfigKey::DateFormat => "date_format",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidKey(s.to_string()))
    }
}

/// One layer of raw values, as stored in `config.yaml` or read from the environment.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_notes_folder_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
}

impl ConfigLayer {
    /// Read a YAML config file. A missing or blank file is an empty layer.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write this layer as YAML, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;

        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, yaml).map_err(write_err)
    }

    /// Values from `ALTUM_*` environment variables.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            daily_notes_folder_path: var(ENV_NOTES_FOLDER),
            date_format: var(ENV_DATE_FORMAT),
        }
    }

    pub fn set(&mut self, key: ConfigKey, value: String) {
        match key {
            ConfigKey::DailyNotesFolderPath => self.daily_notes_folder_path = Some(value),
            ConfigKey::DateFormat => self.date_format = Some(value),
        }
    }

    /// Overlay `other` on top of `self`. Blank values never override.
    fn merge(self, other: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            daily_notes_folder_path: non_blank(other.daily_notes_folder_path)
                .or(non_blank(self.daily_notes_folder_path)),
            date_format: non_blank(other.date_format).or(non_blank(self.date_format)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Values supplied on the command line. Highest-priority layer.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub layer: ConfigLayer,
}

impl Overrides {
    /// Explicit `--config` path, or `<config_dir>/altum/config.yaml`.
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.config_file {
            Some(path) => Ok(path.clone()),
            None => default_config_path().ok_or(ConfigError::NoConfigDir),
        }
    }
}

/// Path of the user-level config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("altum").join("config.yaml"))
}

/// Reject a `date_format` that cannot both name and be read back from a note file.
pub fn check_date_format(date_format: &str) -> Result<(), ConfigError> {
    if is_date_format(date_format) {
        Ok(())
    } else {
        Err(ConfigError::InvalidDateFormat(date_format.to_string()))
    }
}

/// Effective settings, built once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub daily_notes_folder_path: Option<PathBuf>,
    pub date_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_notes_folder_path: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from all sources.
    ///
    /// Precedence (highest to lowest):
    /// 1. Command-line flags
    /// 2. `ALTUM_*` environment variables
    /// 3. The YAML config file
    /// 4. Defaults
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = match overrides.config_path() {
            Ok(path) => {
                let layer = ConfigLayer::read(&path)?;
                if layer != ConfigLayer::default() {
                    tracing::debug!(path = %path.display(), "loaded config file");
                }
                layer
            }
            Err(ConfigError::NoConfigDir) => ConfigLayer::default(),
            Err(e) => return Err(e),
        };

        let settings = Self::resolve([file, ConfigLayer::from_env(), overrides.layer.clone()]);
        check_date_format(&settings.date_format)?;
        Ok(settings)
    }

    /// Fold layers lowest-priority first.
    pub fn resolve(layers: impl IntoIterator<Item = ConfigLayer>) -> Self {
        let merged = layers
            .into_iter()
            .fold(ConfigLayer::default(), ConfigLayer::merge);

        Self {
            daily_notes_folder_path: merged.daily_notes_folder_path.map(PathBuf::from),
            date_format: merged
                .date_format
                .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
        }
    }

    /// The notes directory, which every note operation requires.
    pub fn notes_dir(&self) -> Result<&Path, ConfigError> {
        self.daily_notes_folder_path
            .as_deref()
            .ok_or(ConfigError::MissingNotesFolder)
    }

    pub fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::DailyNotesFolderPath => self
                .daily_notes_folder_path
                .as_ref()
                .map(|p| p.display().to_string()),
            ConfigKey::DateFormat => Some(self.date_format.clone()),
        }
    }
}
