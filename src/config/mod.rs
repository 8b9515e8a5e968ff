// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Application configuration.
//!
//! This module manages the application configuration file.

use serde::{Deserialize, Serialize};

const CONFIG_NAME: &str = "panelplay";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    /// Directories added to the playlist at start-up.
    pub media_dirs: Vec<String>,
    /// Audio file extensions accepted when expanding directories.
    pub extensions: Vec<String>,
    /// Initial output level, `0.0` to `1.0`.
    pub volume: f64,
    /// Start playing as soon as tracks are added to an idle player.
    pub autoplay: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            media_dirs: vec![],
            extensions: ["mp3", "flac", "ogg", "opus", "wav", "m4a"]
                .into_iter()
                .map(String::from)
                .collect(),
            volume: 1.0,
            autoplay: true,
        }
    }
}

pub fn load_config() -> AppConfig {
    confy::load(CONFIG_NAME, None).unwrap_or_else(|e| {
        log::warn!("Using default configuration: {}", e);
        AppConfig::default()
    })
}

pub fn save_config(cfg: &AppConfig) -> Result<(), confy::ConfyError> {
    confy::store(CONFIG_NAME, None, cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_autoplay_at_full_volume() {
        let config = AppConfig::default();

        assert!(config.autoplay);
        assert_eq!(config.volume, 1.0);
        assert!(config.extensions.iter().any(|e| e == "mp3"));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("panelplay.toml");
        std::fs::write(&path, "media_dirs = [\"/music\"]\nautoplay = false\n").unwrap();

        let config: AppConfig = confy::load_path(&path).unwrap();

        assert_eq!(config.media_dirs, vec!["/music".to_string()]);
        assert!(!config.autoplay);
        assert_eq!(config.extensions, AppConfig::default().extensions);
    }

    #[test]
    fn stored_volume_is_loaded_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("panelplay.toml");
        let config = AppConfig {
            volume: 0.35,
            ..AppConfig::default()
        };

        confy::store_path(&path, &config).unwrap();
        let loaded: AppConfig = confy::load_path(&path).unwrap();

        assert_eq!(loaded, config);
    }
}
