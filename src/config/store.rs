//! Settings and catalog files under the per-user config directory

use super::settings::Settings;
use crate::automation::catalog::ActionCatalog;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SETTINGS_FILE: &str = "settings.json";
pub const CATALOG_FILE: &str = "catalog.json";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// `~/.auto-input-run`, or the working directory when no home is known.
pub fn config_dir() -> PathBuf {
    homedir::my_home()
        .ok()
        .flatten()
        .map(|home| home.join(".auto-input-run"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let contents = serde_json::to_string_pretty(value).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, contents).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads settings, falling back to defaults when the file is missing or broken.
pub fn load_settings(path: &Path) -> Settings {
    log::info!("Looking for settings at: {}", path.display());
    if !path.exists() {
        log::info!("{} not found. Using default settings.", path.display());
        return Settings::default();
    }
    match read_json(path) {
        Ok(settings) => {
            log::info!("Settings loaded from {}", path.display());
            settings
        }
        Err(e) => {
            log::warn!("{}. Using default settings.", e);
            Settings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &Settings) -> ConfigResult<()> {
    write_json(path, settings)
}

/// Loads the auto-eat catalog.
///
/// A missing or unreadable file is replaced by [`ActionCatalog::builtin`], which
/// is written back best-effort so the user has something to edit.
pub fn load_catalog(path: &Path) -> ActionCatalog {
    match read_json::<ActionCatalog>(path) {
        Ok(catalog) => {
            if catalog.is_empty() {
                log::warn!("🍖 Catalog {} is empty; auto-eat has no items", path.display());
            } else {
                log::info!("🍖 Loaded {} catalog items from {}", catalog.len(), path.display());
            }
            catalog
        }
        Err(e) => {
            log::warn!("{}. Using built-in catalog.", e);
            let catalog = ActionCatalog::builtin();
            match write_json(path, &catalog) {
                Ok(()) => log::info!("🍖 Wrote default catalog to {}", path.display()),
                Err(e) => log::warn!("Could not save default catalog: {}", e),
            }
            catalog
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::RunMode;
    use tempfile::tempdir;

    #[test]
    fn test_missing_settings_use_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_settings(&dir.path().join(SETTINGS_FILE));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_corrupt_settings_use_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn test_settings_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let settings = Settings {
            mode: RunMode::Fisher,
            secondary_item: "bread".to_string(),
            ..Settings::default()
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), settings);
    }

    #[test]
    fn test_missing_catalog_falls_back_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE);

        let catalog = load_catalog(&path);
        assert_eq!(catalog, ActionCatalog::builtin());
        assert!(path.exists(), "default catalog written back");

        let reloaded: ActionCatalog = read_json(&path).unwrap();
        assert_eq!(reloaded, catalog);
    }

    #[test]
    fn test_corrupt_catalog_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE);
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert_eq!(load_catalog(&path), ActionCatalog::builtin());
    }

    #[test]
    fn test_empty_catalog_is_kept_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE);
        fs::write(&path, "{}").unwrap();
        let catalog = load_catalog(&path);
        assert!(catalog.is_empty());
        assert!(catalog.lookup("steak").is_err());
    }
}
