//! Configuration management for chireader.
//!
//! Configuration is read from `~/.config/chireader/config.toml` at startup
//! (or the path given with `--config`). If the default file doesn't exist,
//! one with comments is created.

pub mod colors;
pub mod keybindings;

pub use colors::ColorConfig;
pub use keybindings::KeybindingConfig;

use crate::cache::CacheConfig;
use crate::reader::ReaderConfig;
use crate::scraper::ScraperConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub cache: CacheConfig,
    pub reader: ReaderConfig,
    pub colors: ColorConfig,
    pub keybindings: KeybindingConfig,
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file is created with commented defaults; a missing
    /// explicit file is an error. Missing fields use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let config_path = Self::default_config_path()?;
                if !config_path.exists() {
                    Self::create_default_config(&config_path)?;
                    return Ok(Self::default());
                }
                Self::load_from(&config_path)
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate(path)?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/chireader/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("chireader").join("config.toml"))
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        };
        self.scraper
            .site()
            .map_err(|e| invalid(format!("scraper.base_url: {}", e.cause)))?;
        if !(0.0..=1.0).contains(&self.reader.prefetch_threshold) {
            return Err(invalid(format!(
                "reader.prefetch_threshold must be within 0.0..=1.0, got {}",
                self.reader.prefetch_threshold
            )));
        }
        if self.cache.chapter_capacity == 0 || self.cache.novel_capacity == 0 {
            return Err(invalid("cache capacities must be at least 1".to_string()));
        }
        Ok(())
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::info!("wrote default config to {}", path.display());
        Ok(())
    }

    fn default_config_content() -> String {
        r##"# chireader configuration
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# Keybindings can be specified as:
# - Single characters: "a", "A", "1"
# - Special keys: Enter, Tab, Backspace, Home, End, PageUp, PageDown,
#   Up, Down, Left, Right, Esc, Space, F1-F12
# - With modifiers: "Ctrl+c", "Shift+Tab", "Alt+Enter"

[scraper]
# Site root; links outside this host are never followed
base_url = "https://chireads.com"

# Request timeout in seconds
timeout_secs = 15

# Extra attempts after a network failure
max_retries = 2

# First retry delay in milliseconds, doubled on each attempt
backoff_base_ms = 500

[cache]
# Parsed chapters kept in memory
chapter_capacity = 20

# Novel pages kept in memory
novel_capacity = 8

[reader]
# Paragraphs laid out above and below the screen
overscan = 4

# Prefetch the next chapter once this share of the chapter has been reached
prefetch_threshold = 0.8

# UI refresh interval in milliseconds
tick_rate_ms = 100

[colors]
border = "Cyan"
title = "Yellow"
text = "White"
loading = "Cyan"
error = "LightRed"
status_fg = "White"
status_bg = "DarkGray"

[keybindings]
quit = ["q", "Ctrl+c"]
scroll_up = ["k", "Up"]
scroll_down = ["j", "Down"]
page_up = ["PageUp", "b"]
page_down = ["PageDown", "Space"]
top = ["g", "Home"]
next_chapter = ["n", "Right"]
prev_chapter = ["p", "Left"]
retry = ["r"]
open_in_browser = ["o"]
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config file at {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.colors.border, ratatui::style::Color::Cyan);
        assert_eq!(config.keybindings.quit, vec!["q", "Ctrl+c"]);
        assert_eq!(config.scraper.base_url, "https://chireads.com");
        assert_eq!(config.cache.chapter_capacity, 20);
        assert_eq!(config.reader.overscan, 4);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[colors]
border = "#FF0000"

[reader]
prefetch_threshold = 0.5
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.colors.border, ratatui::style::Color::Rgb(255, 0, 0));
        assert_eq!(config.colors.status_bg, ratatui::style::Color::DarkGray);
        assert_eq!(config.reader.prefetch_threshold, 0.5);
        assert_eq!(config.reader.tick_rate_ms, 100);
        assert_eq!(config.scraper.max_retries, 2);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.cache.novel_capacity, 8);
        assert_eq!(config.keybindings.next_chapter, vec!["n", "Right"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scraper]\nbase_url = \"http://127.0.0.1:8080\"\ntimeout_secs = 3").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.scraper.timeout_secs, 3);
        assert_eq!(config.scraper.site().unwrap().host(), "127.0.0.1");
    }

    #[test]
    fn test_load_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[reader]\nprefetch_threshold = 1.5").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("prefetch_threshold"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scraper]\nbase_url = \"not a url\"").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nchapter_capacity = 0").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("capacities"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[reader\noverscan = ").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_default_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chireader").join("config.toml");
        Config::create_default_config(&path).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.reader.prefetch_threshold, 0.8);
    }
}
