//! Builtin Manifest - Typed Extension Descriptor
//!
//! Builds the highlight-regex `package.json` without a template file. The
//! `regexs` setting schema nests one level per recursion step.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const CONFIG_SECTION: &str = "highlight-regex";
pub const DEFAULT_LIMIT: u64 = 50000;
pub const DEFAULT_FLAGS: &str = "gm";
pub const DEFAULT_SET_TIMEOUT: u64 = 200;
/// Setting key the extension runtime reads its regex list from
pub const NESTED_KEY: &str = "regexs";
pub const REGEXS_ITEMS_POINTER: &str = "/contributes/configuration/properties/highlight-regex.regexs/items";

/// Descriptor metadata that does not depend on the version or recursion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExtensionMetadata {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_publisher")]
    pub publisher: String,
    #[serde(default = "default_license")]
    pub license: String,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default = "default_vscode_engine")]
    pub vscode_engine: String,
    #[serde(default = "default_set_timeout")]
    pub set_timeout: u64,
}

fn default_name() -> String { CONFIG_SECTION.to_string() }
fn default_display_name() -> String { "Highlight regex".to_string() }
fn default_description() -> String { "Highlight text with regular expressions".to_string() }
fn default_publisher() -> String { "mblet".to_string() }
fn default_license() -> String { "MIT".to_string() }
fn default_vscode_engine() -> String { "^1.50.0".to_string() }
fn default_set_timeout() -> u64 { DEFAULT_SET_TIMEOUT }

impl Default for ExtensionMetadata {
    fn default() -> Self {
        Self {
            name: default_name(),
            display_name: default_display_name(),
            description: default_description(),
            publisher: default_publisher(),
            license: default_license(),
            repository: None,
            vscode_engine: default_vscode_engine(),
            set_timeout: default_set_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub version: String,
    pub publisher: String,
    pub license: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
    pub engines: Engines,
    pub categories: Vec<String>,
    pub activation_events: Vec<String>,
    pub main: String,
    pub contributes: Contributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engines {
    pub vscode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributes {
    pub configuration: Configuration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub title: String,
    pub properties: Map<String, Value>,
}

/// Build the full descriptor for `version` with a `nb_recurse` deep schema.
pub fn build_manifest(meta: &ExtensionMetadata, version: &str, nb_recurse: u32) -> PackageManifest {
    let mut properties = Map::new();
    properties.insert(
        format!("{}.{}", CONFIG_SECTION, NESTED_KEY),
        json!({
            "type": "array",
            "default": [],
            "description": format!("List of regexs with their decorations, nested up to {} levels", nb_recurse),
            "items": regex_item_schema(0, nb_recurse),
        }),
    );
    properties.insert(
        format!("{}.setTimeout", CONFIG_SECTION),
        json!({
            "type": "number",
            "default": meta.set_timeout,
            "description": "Delay in milliseconds before decorations are refreshed",
        }),
    );

    PackageManifest {
        name: meta.name.clone(),
        display_name: meta.display_name.clone(),
        description: meta.description.clone(),
        version: version.to_string(),
        publisher: meta.publisher.clone(),
        license: meta.license.clone(),
        repository: meta.repository.as_ref().map(|url| Repository {
            kind: "git".to_string(),
            url: url.clone(),
        }),
        engines: Engines { vscode: meta.vscode_engine.clone() },
        categories: vec!["Other".to_string()],
        activation_events: vec!["*".to_string()],
        main: "./extension.js".to_string(),
        contributes: Contributes {
            configuration: Configuration {
                title: meta.display_name.clone(),
                properties,
            },
        },
    }
}

/// Schema of one flat `regexs` entry, as the extension runtime reads it
pub fn base_item_schema() -> Value {
    let mut properties = Map::new();
    properties.insert("language".into(), json!({
        "type": "string",
        "default": "*",
        "description": "Language ids separated by '|', '*' for all",
    }));
    properties.insert("block".into(), json!({
        "type": "string",
        "description": "Regex selecting the blocks searched by 'regex'",
    }));
    properties.insert("blockFlag".into(), json!({ "type": "string", "default": DEFAULT_FLAGS }));
    properties.insert("blockLimit".into(), json!({ "type": "number", "default": DEFAULT_LIMIT }));
    properties.insert("regex".into(), json!({
        "type": "string",
        "description": "Regex whose capture groups are decorated",
    }));
    properties.insert("regexFlag".into(), json!({ "type": "string", "default": DEFAULT_FLAGS }));
    properties.insert("regexLimit".into(), json!({ "type": "number", "default": DEFAULT_LIMIT }));
    properties.insert("decorations".into(), json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "index": {
                    "type": "number",
                    "default": 0,
                    "description": "Capture group to decorate",
                },
            },
        },
    }));

    json!({
        "type": "object",
        "properties": properties,
    })
}

/// Schema of one `regexs` entry at `depth`.
///
/// Entries below the last level get their own `regexs` array, applied to
/// each match of the parent.
pub fn regex_item_schema(depth: u32, nb_recurse: u32) -> Value {
    nest_item_schema(&base_item_schema(), depth, nb_recurse)
}

fn nest_item_schema(base: &Value, depth: u32, nb_recurse: u32) -> Value {
    let mut item = base.clone();
    if depth < nb_recurse {
        if let Some(properties) = item.get_mut("properties").and_then(Value::as_object_mut) {
            properties.insert(NESTED_KEY.into(), json!({
                "type": "array",
                "description": "Regexs applied inside each match",
                "items": nest_item_schema(base, depth + 1, nb_recurse),
            }));
        }
    }
    item
}

/// Nest the `regexs` item schema of a parsed manifest `nb_recurse` levels deep.
///
/// Whatever nesting the document already carries is replaced, so templates
/// only describe the flat entry. Returns false when the document has no
/// `regexs` setting.
pub fn expand_regexs_schema(document: &mut Value, nb_recurse: u32) -> bool {
    let Some(items) = document.pointer_mut(REGEXS_ITEMS_POINTER) else {
        return false;
    };
    let mut base = items.clone();
    if let Some(properties) = base.get_mut("properties").and_then(Value::as_object_mut) {
        // rebuilt rather than removed so key order survives
        *properties = properties.iter()
            .filter(|(k, _)| k.as_str() != NESTED_KEY)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
    }
    *items = nest_item_schema(&base, 0, nb_recurse);
    true
}

/// How many nested `regexs` levels a regex item schema carries
pub fn schema_depth(item: &Value) -> u32 {
    match item.get("properties").and_then(|p| p.get(NESTED_KEY)).and_then(|r| r.get("items")) {
        Some(child) => 1 + schema_depth(child),
        None => 0,
    }
}
