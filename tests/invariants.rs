//! Contract Invariant Tests
//!
//! These tests verify the guarantees of the generated manifest.

use std::fs;
use std::path::{Path, PathBuf};

use manifestgen_core::{
    GenerateError, ManifestGenerator, ManifestRequest, ManifestSource,
    hashing::{is_minified, minify_str},
    extension::{expand_regexs_schema, schema_depth, REGEXS_ITEMS_POINTER},
    templates::{Template, TemplateVars},
};
use serde_json::Value;

fn shipped_template() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates").join("package.json.tmpl")
}

fn create_generator(dir: &Path) -> ManifestGenerator {
    ManifestGenerator::new(shipped_template(), dir.join("package.json"))
}

fn read_output(generator: &ManifestGenerator) -> String {
    fs::read_to_string(generator.output_path()).unwrap()
}

#[test]
fn invariant_minification_is_lossless() {
    let dir = tempfile::tempdir().unwrap();
    let generator = create_generator(dir.path());

    for (version, depth) in [("1.2.3", 5), ("0.0.1", 0), ("2.0.0-beta.1", 3)] {
        generator.generate(&ManifestRequest::new(version, depth)).unwrap();

        let rendered = Template::load(&shipped_template())
            .unwrap()
            .render(&TemplateVars::new(version, depth))
            .unwrap();
        let mut expected: Value = serde_json::from_str(&rendered).unwrap();
        assert!(expand_regexs_schema(&mut expected, depth as u32));
        let actual: Value = serde_json::from_str(&read_output(&generator)).unwrap();

        assert_eq!(actual, expected);
        assert_eq!(actual["version"], version);
    }
}

#[test]
fn invariant_output_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let generator = create_generator(dir.path());
    let request = ManifestRequest::new("1.2.3", 5);

    let first = generator.generate(&request).unwrap();
    let bytes1 = fs::read(generator.output_path()).unwrap();
    let second = generator.generate(&request).unwrap();
    let bytes2 = fs::read(generator.output_path()).unwrap();

    assert_eq!(bytes1, bytes2);
    assert_eq!(first.sha256, second.sha256);
}

#[test]
fn invariant_output_is_already_compact() {
    let dir = tempfile::tempdir().unwrap();
    let generator = create_generator(dir.path());
    generator.generate(&ManifestRequest::new("1.2.3", 5)).unwrap();

    let written = read_output(&generator);
    assert_eq!(minify_str(&written).unwrap(), written);
}

#[test]
fn invariant_no_insignificant_whitespace() {
    let dir = tempfile::tempdir().unwrap();
    let generator = create_generator(dir.path());

    for source in [ManifestSource::Template, ManifestSource::Builtin] {
        generator
            .generate(&ManifestRequest::new("1.2.3", 2).with_source(source))
            .unwrap();
        let written = read_output(&generator);
        assert!(!written.contains("\", "));
        assert!(!written.contains("\": "));
        assert!(!written.contains('\n'));
        assert!(is_minified(&written));
    }
}

#[test]
fn invariant_nesting_follows_recursion() {
    let dir = tempfile::tempdir().unwrap();
    let generator = create_generator(dir.path());

    for source in [ManifestSource::Template, ManifestSource::Builtin] {
        for depth in [0, 1, 5] {
            let request = ManifestRequest::new("1.2.3", depth).with_source(source);
            generator.generate(&request).unwrap();

            let value: Value = serde_json::from_str(&read_output(&generator)).unwrap();
            let items = value.pointer(REGEXS_ITEMS_POINTER).unwrap();
            assert_eq!(i64::from(schema_depth(items)), depth, "{} source", source);
        }
    }
}

#[test]
fn invariant_sources_agree() {
    let dir = tempfile::tempdir().unwrap();
    let generator = create_generator(dir.path());

    for depth in [0, 2, 5] {
        generator
            .generate(&ManifestRequest::new("1.2.3", depth).with_source(ManifestSource::Template))
            .unwrap();
        let from_template = read_output(&generator);
        generator
            .generate(&ManifestRequest::new("1.2.3", depth).with_source(ManifestSource::Builtin))
            .unwrap();
        let from_builtin = read_output(&generator);

        assert_eq!(from_template, from_builtin);
    }
}

#[test]
fn invariant_declares_runtime_setting_keys() {
    let dir = tempfile::tempdir().unwrap();
    let generator = create_generator(dir.path());
    generator.generate(&ManifestRequest::new("1.2.3", 1)).unwrap();

    let value: Value = serde_json::from_str(&read_output(&generator)).unwrap();
    let properties = value["contributes"]["configuration"]["properties"].as_object().unwrap();
    let keys: Vec<_> = properties.keys().map(String::as_str).collect();
    assert_eq!(keys, ["highlight-regex.regexs", "highlight-regex.setTimeout"]);
}

#[test]
fn invariant_output_is_ascii() {
    let dir = tempfile::tempdir().unwrap();
    let generator = create_generator(dir.path());
    generator.generate(&ManifestRequest::new("1.2.3-\u{e9}t\u{e9}", 0)).unwrap();

    let written = read_output(&generator);
    assert!(written.is_ascii());
    assert!(written.contains(r#""version":"1.2.3-\u00e9t\u00e9""#));
    let value: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["version"], "1.2.3-\u{e9}t\u{e9}");
}

#[test]
fn invariant_unsafe_version_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let generator = create_generator(dir.path());
    fs::write(generator.output_path(), "previous").unwrap();

    let result = generator.generate(&ManifestRequest::new("1.2.3\", \"evil\": \"x", 1));
    assert!(matches!(result, Err(GenerateError::ValidationFailed(_))));
    assert!(result.unwrap_err().to_string().contains("json_safe_version"));
    assert_eq!(read_output(&generator), "previous");
}

#[test]
fn invariant_template_not_found_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("package.json.tmpl");
    let generator = ManifestGenerator::new(&missing, dir.path().join("package.json"));

    let result = generator.generate(&ManifestRequest::new("1.2.3", 1));
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Template not found"));
    assert!(!generator.output_path().exists());
}

#[test]
fn invariant_unwritable_output_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let generator = ManifestGenerator::new(
        shipped_template(),
        dir.path().join("missing-dir").join("package.json"),
    );

    let result = generator.generate(&ManifestRequest::new("1.2.3", 1));
    assert!(matches!(result, Err(GenerateError::Io { .. })));
}
