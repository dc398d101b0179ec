//! Configuration - optional TOML file, CLI flags override it

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extension::ExtensionMetadata;
use crate::source::ManifestSource;
use crate::templates::{source_dir, TemplateLocator};
use crate::validation::ValidationPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// ```toml
/// source = "builtin"
/// strict_usage = true
///
/// [validation]
/// failure_mode = "warn"
/// max_recursion = 8
///
/// [extension]
/// publisher = "someone"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the template and output paths are resolved from
    pub base_dir: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub source: ManifestSource,
    pub strict_usage: bool,
    pub validation: ValidationPolicy,
    pub extension: ExtensionMetadata,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Locator rooted at `base_dir`, or at the shipped template directory.
    pub fn locator(&self) -> TemplateLocator {
        TemplateLocator::new(self.base_dir.clone().unwrap_or_else(source_dir))
    }

    pub fn template_path(&self, locator: &TemplateLocator) -> PathBuf {
        locator.template_path(self.template.as_deref())
    }

    pub fn output_path(&self, locator: &TemplateLocator) -> PathBuf {
        locator.output_path(self.output.as_deref())
    }
}
