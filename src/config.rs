use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};
use crate::text::TextMode;

/// largest payload length accepted as sane when parsing a directory
pub const MAX_SANE_LENGTH: u64 = 1024 * 1024;

/// largest single directory field accepted when parsing
pub const MAX_FIELD_LENGTH: usize = 255;

/// largest numbered range that padding will fill
pub const MAX_PAD_ENTRIES: u64 = 65_536;

/// settings threaded through every codec and operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// how entry names and type tags are converted for display and lookup
    pub text_mode: TextMode,
    /// entry lengths above this are treated as corrupt
    pub max_sane_length: u64,
    /// directory fields above this fail with `FieldTooLong`
    pub max_field_length: usize,
}

impl Config {
    /// load config from a toml file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// same config with a different text mode
    pub fn with_text_mode(mut self, text_mode: TextMode) -> Self {
        self.text_mode = text_mode;
        self
    }

    /// is a declared entry length within sane bounds
    pub fn is_sane_length(&self, length: u64) -> bool {
        length <= self.max_sane_length
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            text_mode: TextMode::Convert,
            max_sane_length: MAX_SANE_LENGTH,
            max_field_length: MAX_FIELD_LENGTH,
        }
    }
}
