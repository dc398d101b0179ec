//! Manifestgen Core - Package Manifest Generator
//!
//! Renders the highlight-regex `package.json` for a given version and
//! recursion depth, then writes it minified.
//!
//! # Guarantees
//! 1. Inputs are validated before anything is rendered
//! 2. Nothing is written unless the document parses as JSON
//! 3. Output carries no insignificant whitespace
//! 4. Same inputs, same bytes

pub mod config;
pub mod extension;
pub mod hashing;
pub mod pipeline;
pub mod source;
pub mod templates;
pub mod validation;

pub use config::{Config, ConfigError};
pub use extension::{build_manifest, ExtensionMetadata, PackageManifest};
pub use hashing::{minify_json, minify_str, sha256_hex};
pub use pipeline::{GenerateError, GenerationReport, ManifestGenerator, ManifestRequest};
pub use source::ManifestSource;
pub use templates::{Template, TemplateError, TemplateLocator, TemplateVars};
pub use validation::{FailureMode, ValidationPolicy, ValidationResult, ValidationViolation, ViolationSeverity};

/// Printed when the positional argument count is wrong
pub fn usage(program: &str) -> String {
    format!("usage: {} VERSION NB_RECURSE", program)
}
