use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::data::organizer::TransferMode;
use crate::training::{ClassifierJob, DetectorJob};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Organizer paths and transfer mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerSettings {
    pub manifest: PathBuf,
    pub raw_images_dir: PathBuf,
    pub output_dir: PathBuf,
    pub transfer: TransferMode,
}

impl Default for OrganizerSettings {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("labels.txt"),
            raw_images_dir: PathBuf::from("classification_dataset/images_raw"),
            output_dir: PathBuf::from("classification_dataset/images"),
            transfer: TransferMode::Copy,
        }
    }
}

/// Persistent settings, read from a JSON file. Every field is optional in
/// the file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub organizer: OrganizerSettings,

    /// Flag dark frames during `inspect`
    pub detect_black: bool,

    /// Seed for the split preview
    pub split_seed: u64,

    pub classifier: ClassifierJob,
    pub detector: DetectorJob,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            organizer: OrganizerSettings::default(),
            detect_black: false,
            split_seed: 42,
            classifier: ClassifierJob::default(),
            detector: DetectorJob::default(),
        }
    }
}

impl Settings {
    /// Default location of the settings file in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "species-sorter").map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings.
    ///
    /// An explicit path must exist and parse. Without one, the default
    /// location is tried; a missing or corrupt file there falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from(path);
        }

        let Some(config_path) = Self::default_path() else {
            warn!("Could not determine config directory. Using defaults.");
            return Ok(Self::default());
        };

        match Self::load_from(&config_path) {
            Ok(settings) => Ok(settings),
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                info!("No settings file found. Using defaults.");
                Ok(Self::default())
            }
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading settings from: {:?}", path);
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save settings to disk, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Settings saved to: {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.organizer.manifest, PathBuf::from("labels.txt"));
        assert_eq!(
            settings.organizer.raw_images_dir,
            PathBuf::from("classification_dataset/images_raw")
        );
        assert_eq!(
            settings.organizer.output_dir,
            PathBuf::from("classification_dataset/images")
        );
        assert_eq!(settings.organizer.transfer, TransferMode::Copy);
        assert_eq!(settings.classifier.data_dir, settings.organizer.output_dir);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(
            &path,
            r#"{"organizer": {"manifest": "my_labels.txt", "transfer": "move"}, "split_seed": 7}"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.organizer.manifest, PathBuf::from("my_labels.txt"));
        assert_eq!(settings.organizer.transfer, TransferMode::Move);
        assert_eq!(
            settings.organizer.output_dir,
            PathBuf::from("classification_dataset/images")
        );
        assert_eq!(settings.split_seed, 7);
        assert_eq!(settings.detector, DetectorJob::default());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = Settings::load(Some(&temp.path().join("absent.json")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_explicit_corrupt_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Settings::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("settings.json");
        let mut settings = Settings::default();
        settings.detect_black = true;
        settings.classifier.epochs = 12;

        settings.save(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();

        assert_eq!(loaded, settings);
    }
}
