use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::app::infrastructure::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeMode {
    Light,
    Dark,
    SystemDefault,
}

impl ThemeMode {
    /// Initial value for the theme store. `detect` is only consulted for
    /// `SystemDefault`.
    pub fn resolve<F: FnOnce() -> bool>(self, detect: F) -> bool {
        match self {
            Self::Light => false,
            Self::Dark => true,
            Self::SystemDefault => detect(),
        }
    }
}

/// Which spoken variety the deck drills, and so which romanization the
/// annotation shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Mandarin,
    #[default]
    Cantonese,
}

impl Script {
    /// Value stored in the `script` column of the vocabulary collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mandarin => "mandarin",
            Self::Cantonese => "cantonese",
        }
    }

    pub fn romanization_name(&self) -> &'static str {
        match self {
            Self::Mandarin => "Pinyin",
            Self::Cantonese => "Jyutping",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Initial annotation visibility. Toggling at runtime does not write it back.
    #[serde(default = "default_annotation_visible")]
    pub annotation_visible: bool,

    #[serde(default = "default_theme_mode")]
    pub theme_mode: ThemeMode,

    #[serde(default)]
    pub script: Script,

    /// Owner of the progress record. Progress tracking is skipped when unset.
    #[serde(default)]
    pub user_id: Option<u64>,

    #[serde(default = "default_deck_limit")]
    pub deck_limit: usize,
}

fn default_annotation_visible() -> bool {
    true
}

fn default_theme_mode() -> ThemeMode {
    ThemeMode::SystemDefault
}

fn default_deck_limit() -> usize {
    50
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            annotation_visible: default_annotation_visible(),
            theme_mode: default_theme_mode(),
            script: Script::default(),
            user_id: None,
            deck_limit: default_deck_limit(),
        }
    }
}

impl AppConfig {
    /// Load settings from disk, or create default if not exists
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config at {}, writing defaults", path.display());
                let default = Self::default();
                if let Err(e) = default.save_to(path) {
                    warn!("Could not write default config: {}", e);
                }
                default
            }
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::get_config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        Ok(())
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("cantocards");
        path.push("settings.json");
        path
    }
}
