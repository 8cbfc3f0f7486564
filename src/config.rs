//! Configuration to acknowledge user preferences as well as set defaults.
//!
//! Specifically, we try to find a linesector.toml, and if present we load settings from there.
//! This provides the variation index depth and the detail view wrapping width.

use facet::Facet;
use std::fs;
use std::path::Path;
use tracing::warn;

/// File looked up in the working directory.
pub const CONFIG_FILE: &str = "linesector.toml";

#[derive(Facet, Clone, Debug, PartialEq)]
/// User preferences loaded from linesector.toml or falling back to defaults.
pub struct Config {
    #[facet(default = 2)]
    /// Branch levels past the first rendered as a lettered index before game layout.
    pub variation_index_depth: u32,
    #[facet(default = 100)]
    /// Maximum line width for wrapping move text in the detail view.
    pub wrap_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variation_index_depth: 2,
            wrap_width: 100,
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from linesector.toml if present.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    #[must_use]
    /// Load configuration from `path`, falling back to defaults if it is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };
        match facet_toml::from_str::<Self>(&contents) {
            Ok(config) => config,
            Err(_) => {
                warn!(path = %path.display(), "ignoring invalid config");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
