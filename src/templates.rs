//! Template System - Two Named Placeholders
//!
//! Templates are plain text with `{{ version }}` and `{{ nb_recurse }}`
//! substitution points. There is no control flow.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TEMPLATE_NAME: &str = "package.json.tmpl";
pub const DEFAULT_OUTPUT_NAME: &str = "package.json";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unknown placeholder '{name}' on line {line}")]
    UnknownPlaceholder { name: String, line: usize },

    #[error("Unterminated placeholder on line {line}")]
    Unterminated { line: usize },
}

/// Values substituted into a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateVars {
    pub version: String,
    pub nb_recurse: i64,
}

impl TemplateVars {
    pub fn new(version: impl Into<String>, nb_recurse: i64) -> Self {
        Self { version: version.into(), nb_recurse }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "version" => Some(self.version.clone()),
            "nb_recurse" => Some(self.nb_recurse.to_string()),
            _ => None,
        }
    }
}

/// Directory the shipped template lives in, fixed when the crate is built.
///
/// Templates and output are resolved from here, never from the caller's
/// working directory.
pub fn source_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

/// Resolves the template and output paths against a base directory
#[derive(Debug, Clone)]
pub struct TemplateLocator {
    base_dir: PathBuf,
}

impl TemplateLocator {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Sibling of the generator: `<base>/package.json.tmpl`
    pub fn template_path(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(p) => p.to_path_buf(),
            None => self.base_dir.join(DEFAULT_TEMPLATE_NAME),
        }
    }

    /// One level above the generator: `<base>/../package.json`
    pub fn output_path(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(p) => p.to_path_buf(),
            None => self.base_dir.join("..").join(DEFAULT_OUTPUT_NAME),
        }
    }
}

/// A loaded template
#[derive(Debug, Clone)]
pub struct Template {
    pub path: PathBuf,
    pub text: String,
}

impl Template {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { path: PathBuf::new(), text: text.into() }
    }

    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self { path: path.to_path_buf(), text }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(TemplateError::NotFound(path.to_path_buf()))
            }
            Err(source) => Err(TemplateError::Read { path: path.to_path_buf(), source }),
        }
    }

    /// Substitute every placeholder.
    pub fn render(&self, vars: &TemplateVars) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.text.len());
        for (idx, line) in self.text.split_inclusive('\n').enumerate() {
            render_line(line, idx + 1, vars, &mut out)?;
        }
        Ok(out)
    }
}

fn render_line(line: &str, line_no: usize, vars: &TemplateVars, out: &mut String) -> Result<(), TemplateError> {
    let mut rest = line;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let end = tail.find("}}").ok_or(TemplateError::Unterminated { line: line_no })?;
        let name = tail[2..end].trim();
        let value = vars.lookup(name).ok_or_else(|| TemplateError::UnknownPlaceholder {
            name: name.to_string(),
            line: line_no,
        })?;
        out.push_str(&value);
        rest = &tail[end + 2..];
    }
    out.push_str(rest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_both_placeholders() {
        let t = Template::from_text(r#"{"version": "{{ version }}", "depth": {{nb_recurse}}}"#);
        let out = t.render(&TemplateVars::new("1.2.3", 5)).unwrap();
        assert_eq!(out, r#"{"version": "1.2.3", "depth": 5}"#);
    }

    #[test]
    fn repeated_placeholders() {
        let t = Template::from_text("{{ version }}-{{ version }}");
        assert_eq!(t.render(&TemplateVars::new("v", 0)).unwrap(), "v-v");
    }

    #[test]
    fn unknown_placeholder_is_error() {
        let t = Template::from_text("{\n\"a\": \"{{ publisher }}\"\n}");
        match t.render(&TemplateVars::new("1.0.0", 1)) {
            Err(TemplateError::UnknownPlaceholder { name, line }) => {
                assert_eq!(name, "publisher");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn unterminated_placeholder_is_error() {
        let t = Template::from_text("{\"v\": \"{{ version\"}");
        assert!(matches!(
            t.render(&TemplateVars::new("1.0.0", 1)),
            Err(TemplateError::Unterminated { line: 1 })
        ));
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let text = "{\n  \"name\": \"x\"\n}\n";
        let t = Template::from_text(text);
        assert_eq!(t.render(&TemplateVars::new("1", 1)).unwrap(), text);
    }

    #[test]
    fn missing_template_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.tmpl");
        match Template::load(&path) {
            Err(TemplateError::NotFound(p)) => assert_eq!(p, path),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn locator_uses_sibling_and_parent() {
        let locator = TemplateLocator::new("/opt/tool/scripts");
        assert_eq!(
            locator.template_path(None),
            PathBuf::from("/opt/tool/scripts/package.json.tmpl")
        );
        assert_eq!(
            locator.output_path(None),
            PathBuf::from("/opt/tool/scripts/../package.json")
        );
        let explicit = PathBuf::from("/tmp/out.json");
        assert_eq!(locator.output_path(Some(&explicit)), explicit);
    }

    #[test]
    fn shipped_template_is_found_by_default() {
        let locator = TemplateLocator::new(source_dir());
        let path = locator.template_path(None);
        assert!(path.is_file(), "missing {}", path.display());
        let rendered = Template::load(&path).unwrap().render(&TemplateVars::new("1.2.3", 5)).unwrap();
        assert!(rendered.contains("\"version\": \"1.2.3\""));
    }
}
