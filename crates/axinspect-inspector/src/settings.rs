//! Persistent user settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use axinspect_core::InspectConfig;

/// Application name reported by the inspector's own windows.
pub const SELF_APP_NAME: &str = "axinspect";

/// Persistent user settings stored in config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Descend into document objects while scanning.
    pub drill_into_documents: bool,
    /// Favorites file; the platform config directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorites_path: Option<PathBuf>,
}

impl Settings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("axinspect").join("settings.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from `path`, or return defaults.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Save settings to disk.
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No config directory")
        })?;
        self.save_to(&path)
    }

    /// Save settings to `path`, creating its directory.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(path, content)
    }

    /// Inspection config for these settings.
    pub fn to_config(&self) -> InspectConfig {
        InspectConfig {
            drill_into_documents: self.drill_into_documents,
            self_app_name: Some(SELF_APP_NAME.to_string()),
            favorites_path: self.favorites_path.clone(),
            ..InspectConfig::default()
        }
    }
}
