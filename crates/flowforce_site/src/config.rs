// SPDX-License-Identifier: MIT OR Apache-2.0
//! Site configuration, stored as RON.

use flowforce_scroll::{IntroConfig, IntroError, ScrollConfig, ScrollError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current config format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Errors raised while loading or saving the site config
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid RON for this schema
    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// Serialization failed
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
    /// Written by a newer build
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },
    /// Scroll settings rejected
    #[error(transparent)]
    Scroll(#[from] ScrollError),
    /// Intro settings rejected
    #[error(transparent)]
    Intro(#[from] IntroError),
}

/// Site settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Format version
    pub version: u32,
    /// Site name, used in the log banner and as the default post author
    pub name: String,
    /// Smooth scroll settings
    pub scroll: ScrollConfig,
    /// Preloader settings
    pub intro: IntroConfig,
    /// Directory holding the blog posts
    pub content_dir: PathBuf,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            name: "FlowForce".to_string(),
            scroll: ScrollConfig::default(),
            intro: IntroConfig::default(),
            content_dir: PathBuf::from("content/blog"),
        }
    }
}

impl SiteConfig {
    /// Parse and validate a config from RON text
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = ron::from_str(text)?;
        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }
        config.scroll.validate()?;
        config.intro.validate()?;
        Ok(config)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::debug!("Loaded site config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Save to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        tracing::debug!("Saved site config to {}", path.display());
        Ok(())
    }
}
