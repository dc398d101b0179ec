//! Generation Pipeline - Single Entry Point
//!
//! generate MUST validate and parse before the output file is touched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::extension::{build_manifest, expand_regexs_schema, ExtensionMetadata};
use crate::hashing::{minify_json, sha256_hex};
use crate::source::ManifestSource;
use crate::templates::{Template, TemplateError, TemplateVars};
use crate::validation::{ValidationPolicy, ValidationResult, Validator};

/// Deepest `regexs` schema either source will nest
pub const MAX_DEPTH: u32 = 256;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Invalid recursion count '{value}': {source}")]
    InvalidRecursion {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Recursion count {0} is outside the supported range 0..={1}")]
    RecursionOutOfRange(i64, u32),

    #[error("Rendered manifest is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRequest {
    pub version: String,
    pub nb_recurse: i64,
    #[serde(default)]
    pub source: ManifestSource,
}

impl ManifestRequest {
    pub fn new(version: impl Into<String>, nb_recurse: i64) -> Self {
        Self {
            version: version.into(),
            nb_recurse,
            source: ManifestSource::Template,
        }
    }

    /// Build from the two raw command-line values.
    ///
    /// `nb_recurse` must parse as an integer; the version is taken verbatim.
    pub fn from_args(version: &str, nb_recurse: &str) -> Result<Self, GenerateError> {
        let depth = nb_recurse.trim().parse::<i64>().map_err(|source| GenerateError::InvalidRecursion {
            value: nb_recurse.to_string(),
            source,
        })?;
        Ok(Self::new(version, depth))
    }

    pub fn with_source(self, source: ManifestSource) -> Self {
        Self { source, ..self }
    }

    pub fn vars(&self) -> TemplateVars {
        TemplateVars::new(self.version.clone(), self.nb_recurse)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub output_path: PathBuf,
    pub source: ManifestSource,
    pub bytes: usize,
    pub sha256: String,
    pub validation: ValidationResult,
}

/// The generator - single entry point for producing the manifest
pub struct ManifestGenerator {
    template_path: PathBuf,
    output_path: PathBuf,
    validator: Validator,
    metadata: ExtensionMetadata,
}

impl ManifestGenerator {
    pub fn new(template_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            output_path: output_path.into(),
            validator: Validator::default(),
            metadata: ExtensionMetadata::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let locator = config.locator();
        Self::new(config.template_path(&locator), config.output_path(&locator))
            .with_policy(config.validation.clone())
            .with_metadata(config.extension.clone())
    }

    pub fn with_policy(self, policy: ValidationPolicy) -> Self {
        Self { validator: Validator::new(policy), ..self }
    }

    pub fn with_metadata(self, metadata: ExtensionMetadata) -> Self {
        Self { metadata, ..self }
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Render, check and write the minified manifest.
    ///
    /// Nothing is written unless the rendered text parses as JSON.
    pub fn generate(&self, request: &ManifestRequest) -> Result<GenerationReport, GenerateError> {
        let vars = request.vars();

        let validation = self.validator.validate(&vars);
        if !validation.valid {
            return Err(GenerateError::ValidationFailed(validation.summary()));
        }
        // Non-blocking; success stays silent at the default level
        for v in &validation.violations {
            tracing::info!(rule = %v.rule, "{}", v.message);
        }

        let depth = nesting_depth(vars.nb_recurse)?;
        let rendered = self.render(request.source, &vars, depth)?;
        tracing::debug!(source = %request.source, bytes = rendered.len(), "rendered manifest");

        let mut document: Value = serde_json::from_str(&rendered).map_err(GenerateError::MalformedJson)?;
        if !expand_regexs_schema(&mut document, depth) {
            tracing::debug!("manifest has no regexs setting, nothing to nest");
        }
        let minified = minify_json(&document)?;

        fs::write(&self.output_path, minified.as_bytes()).map_err(|source| GenerateError::Io {
            path: self.output_path.clone(),
            source,
        })?;

        let sha256 = sha256_hex(minified.as_bytes());
        tracing::info!(
            output = %self.output_path.display(),
            bytes = minified.len(),
            sha256 = %sha256,
            "wrote manifest"
        );

        Ok(GenerationReport {
            output_path: self.output_path.clone(),
            source: request.source,
            bytes: minified.len(),
            sha256,
            validation,
        })
    }

    /// Produce the unminified document text for `source`.
    pub fn render(&self, source: ManifestSource, vars: &TemplateVars, depth: u32) -> Result<String, GenerateError> {
        match source {
            ManifestSource::Template => {
                tracing::debug!(template = %self.template_path.display(), "loading template");
                let template = Template::load(&self.template_path)?;
                Ok(template.render(vars)?)
            }
            ManifestSource::Builtin => {
                let manifest = build_manifest(&self.metadata, &vars.version, depth);
                Ok(serde_json::to_string_pretty(&manifest)?)
            }
        }
    }
}

fn nesting_depth(nb_recurse: i64) -> Result<u32, GenerateError> {
    u32::try_from(nb_recurse)
        .ok()
        .filter(|d| *d <= MAX_DEPTH)
        .ok_or(GenerateError::RecursionOutOfRange(nb_recurse, MAX_DEPTH))
}
