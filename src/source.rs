//! Manifest Source
//!
//! Defines where the rendered document comes from so the pipeline does
//! not branch on loose flags.

use serde::{Deserialize, Serialize};

/// ManifestSource selects the producer of the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestSource {
    /// Template file with `{{ version }}` and `{{ nb_recurse }}` placeholders
    Template,
    /// Typed builder, no template file involved
    Builtin,
}

impl Default for ManifestSource {
    fn default() -> Self {
        Self::Template
    }
}

impl ManifestSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Builtin => "builtin",
        }
    }
}

impl std::fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
