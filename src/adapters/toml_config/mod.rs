// TOML config adapter - Settings loaded from TOML files

use std::path::{Path, PathBuf};

use crate::error::{ReelcutError, ReelcutResult};
use crate::settings::Settings;

/// Files searched, in order, when no explicit path is given
pub const CONFIG_CANDIDATES: &[&str] = &[
    "config/production.toml",
    "config/development.toml",
    "reelcut.toml",
];

/// Reads `Settings` from TOML. Missing keys keep their defaults.
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Load settings from `path`, which must exist
    pub fn load(path: &Path) -> ReelcutResult<Settings> {
        if !path.exists() {
            return Err(ReelcutError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|message| ReelcutError::ConfigParse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Parse settings from TOML text
    pub fn parse(content: &str) -> Result<Settings, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// First existing candidate below `base`
    pub fn discover(base: &Path) -> Option<PathBuf> {
        CONFIG_CANDIDATES
            .iter()
            .map(|candidate| base.join(candidate))
            .find(|path| path.is_file())
    }
}
