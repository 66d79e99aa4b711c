//! Editor settings loaded from `ddsedit.toml`.
//!
//! Every field has a default, so an empty or partial file is valid:
//!
//! ```toml
//! [parser]
//! display = "wide"
//!
//! [session]
//! debounce_ms = 500
//!
//! [keywords]
//! colors = ["BLU", "RED"]
//! ```

use crate::model::ScreenSize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name searched for by hosts.
pub const SETTINGS_FILE: &str = "ddsedit.toml";

/// Errors loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Settings file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or has wrongly typed values.
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Parser defaults.
    pub parser: ParserSettings,
    /// Document session behaviour.
    pub session: SessionSettings,
    /// Choices offered by the keyword workflows.
    pub keywords: KeywordSettings,
}

impl Settings {
    /// Parse settings from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read settings from a file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Read `ddsedit.toml` from `dir` if it exists, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, SettingsError> {
        let path = dir.join(SETTINGS_FILE);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading settings");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Display size assumed for files without a `DSPSIZ` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplaySize {
    /// 24×80.
    #[default]
    Standard,
    /// 27×132.
    Wide,
}

impl DisplaySize {
    /// The screen dimensions.
    pub fn screen(self) -> ScreenSize {
        match self {
            Self::Standard => ScreenSize::STANDARD,
            Self::Wide => ScreenSize::WIDE,
        }
    }
}

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParserSettings {
    /// Default display size.
    pub display: DisplaySize,
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Quiet period before a changed document is reparsed.
    pub debounce_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl SessionSettings {
    /// The debounce delay.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Keyword workflow choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSettings {
    /// Values offered for `COLOR(...)`.
    pub colors: Vec<String>,
    /// Values offered for `DSPATR(...)`.
    pub display_attributes: Vec<String>,
}

impl Default for KeywordSettings {
    fn default() -> Self {
        Self {
            colors: ["BLU", "GRN", "PNK", "RED", "TRQ", "WHT", "YLW"]
                .map(String::from)
                .to_vec(),
            display_attributes: ["HI", "RI", "UL", "BL", "CS", "ND", "PC"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_sections() {
        let settings = Settings::from_toml_str(
            r#"
[parser]
display = "wide"

[session]
debounce_ms = 50
"#,
        )
        .unwrap();
        assert_eq!(settings.parser.display.screen(), ScreenSize::WIDE);
        assert_eq!(settings.session.debounce(), Duration::from_millis(50));
        assert_eq!(settings.keywords.colors.len(), 7);
    }

    #[test]
    fn test_invalid_value() {
        let err = Settings::from_toml_str("[parser]\ndisplay = \"huge\"\n").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
