//! Front-end settings read from a TOML file
//!
//! ```toml
//! game = "games/pawn.mag"
//! seed = 1234
//! instruction_limit = 5000000
//! log_filter = "magnetic=info"
//! hints = "games/wonder.hnt"
//! status_line = true
//! save_dir = "saves"
//! ```

use crate::error::EmuError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub game: Option<PathBuf>,
    /// Fixed seed for reproducible sessions
    pub seed: Option<u32>,
    pub instruction_limit: Option<u64>,
    /// Used when RUST_LOG is not set
    pub log_filter: String,
    pub hints: Option<PathBuf>,
    pub status_line: bool,
    /// Where the terminal host keeps saved games
    pub save_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            game: None,
            seed: None,
            instruction_limit: None,
            log_filter: "warn".to_string(),
            hints: None,
            status_line: true,
            save_dir: None,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config, EmuError> {
        Ok(toml::from_str(text)?)
    }

    /// Load `path`, or the defaults when it does not exist
    pub fn load(path: &Path) -> Result<Config, EmuError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Config::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e.into()),
        }
    }
}
