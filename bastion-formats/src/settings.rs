//! Settings file (`settings.toml` in the platform config directory)
//!
//! Missing or unparsable files yield defaults; saving creates the directory.

use std::io;
use std::path::{Path, PathBuf};

use bastion_binary::{DEFAULT_MAX_DEPTH, ReadOptions};
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("No configuration directory is available on this platform")]
    NoConfigDir,

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// User settings, organized into sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub game: GameSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Game install location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GameSettings {
    /// Root of the game install (default: unset)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Record engine limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Deepest record nesting accepted when reading (default: 64)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is not set (default: "info")
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl EngineSettings {
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            max_depth: self.max_depth,
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "BastionMod")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

impl Settings {
    /// Load from the platform configuration directory
    pub fn load() -> Self {
        config_dir()
            .map(|dir| Self::load_from(dir.join(SETTINGS_FILE)))
            .unwrap_or_default()
    }

    /// Load from a specific file, falling back to defaults
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring invalid settings file"
                );
                Self::default()
            }
        }
    }

    /// Save to the platform configuration directory
    pub fn save(&self) -> Result<(), SettingsError> {
        let dir = config_dir().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(dir.join(SETTINGS_FILE))
    }

    /// Save to a specific file, creating its directory
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
