//! Core types for UI schema generation.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OptionsError;

/// Reserved UI schema keys.
pub mod keys {
    pub const WIDGET: &str = "ui:widget";
    pub const FIELD_TYPE: &str = "ui:fieldType";
    pub const EMPTY_VALUE: &str = "ui:emptyValue";
    pub const ORDER: &str = "ui:order";
    pub const ARRAY_OPTIONS: &str = "ui:arrayOptions";
    pub const OPTIONS: &str = "ui:options";
    pub const TITLE: &str = "ui:title";
    pub const DESCRIPTION: &str = "ui:description";
    pub const HELP: &str = "ui:help";
    pub const READONLY: &str = "ui:readonly";
    pub const DISABLED: &str = "ui:disabled";
    pub const AUTOFOCUS: &str = "ui:autofocus";
    pub const ENUM_NAMES: &str = "ui:enumNames";
    pub const ENUM_DISABLED: &str = "ui:enumDisabled";
    pub const GLOBAL_OPTIONS: &str = "ui:globalOptions";
    pub const SUBMIT_BUTTON_OPTIONS: &str = "ui:submitButtonOptions";
    pub const ROOT_FIELD_ID: &str = "ui:rootFieldId";

    /// Prefix shared by every reserved key.
    pub const PREFIX: &str = "ui:";
    /// Wildcard entry in `ui:order`.
    pub const ORDER_WILDCARD: &str = "*";
    /// Array items sub-node.
    pub const ITEMS: &str = "items";
}

/// Composition keywords, in classification precedence order.
pub const COMPOSITION_KEYWORDS: &[&str] = &["anyOf", "allOf", "oneOf"];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Semantic field type stamped into `ui:fieldType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "anyOf")]
    AnyOf,
    #[serde(rename = "allOf")]
    AllOf,
    #[serde(rename = "oneOf")]
    OneOf,
    #[serde(rename = "enum")]
    Enum,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "array")]
    Array,
    #[serde(rename = "object")]
    Object,
    #[serde(rename = "unknown")]
    Unknown,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        FieldType::AnyOf,
        FieldType::AllOf,
        FieldType::OneOf,
        FieldType::Enum,
        FieldType::Number,
        FieldType::Bool,
        FieldType::String,
        FieldType::Array,
        FieldType::Object,
        FieldType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::AnyOf => "anyOf",
            FieldType::AllOf => "allOf",
            FieldType::OneOf => "oneOf",
            FieldType::Enum => "enum",
            FieldType::Number => "number",
            FieldType::Bool => "bool",
            FieldType::String => "string",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Unknown => "unknown",
        }
    }

    /// Parse a stamped `ui:fieldType` value.
    ///
    /// Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        FieldType::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composition keyword carried by a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Composition {
    AnyOf,
    AllOf,
    OneOf,
}

impl Composition {
    pub fn keyword(&self) -> &'static str {
        match self {
            Composition::AnyOf => "anyOf",
            Composition::AllOf => "allOf",
            Composition::OneOf => "oneOf",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "anyOf" => Some(Composition::AnyOf),
            "allOf" => Some(Composition::AllOf),
            "oneOf" => Some(Composition::OneOf),
            _ => None,
        }
    }
}

/// Shape of a schema node as seen by the generator.
///
/// Computed once per node by [`SchemaKind::of`](crate::classify) so the
/// generator dispatches on a tag instead of re-inspecting the JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    String,
    /// `number` or `integer`.
    Number,
    Boolean,
    Array,
    Object,
    /// No recognized primitive type but a composition keyword is present.
    Composition(Composition),
    /// No recognized primitive type but `enum` is present.
    Enum,
    Unknown,
}

/// One hop of a UI schema path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn is_index(&self) -> bool {
        matches!(self, PathSegment::Index(_))
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        PathSegment::Key(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        PathSegment::Key(s)
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        PathSegment::Index(i)
    }
}

/// Render a path as a JSON Pointer for messages.
pub fn pointer_string(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for seg in path {
        out.push('/');
        out.push_str(&seg.to_string().replace('~', "~0").replace('/', "~1"));
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Root-level global options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalOptions {
    /// Emit `ui:globalOptions.copyable` on the root node.
    pub copyable: bool,
}

/// Options for UI schema generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Write derived extras under `ui:options.<key>` instead of `ui:<key>`.
    pub use_ui_options_wrapper: bool,
    /// Widget per semantic type (`string`, `number`, `boolean`) or string `format`.
    pub default_widgets: BTreeMap<String, String>,
    pub global_options: GlobalOptions,
    /// Passed through to `ui:submitButtonOptions` on the root node.
    pub submit_button_options: Option<Value>,
    pub root_field_id: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        let default_widgets = [("string", "text"), ("number", "updown"), ("boolean", "checkbox")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            use_ui_options_wrapper: false,
            default_widgets,
            global_options: GlobalOptions::default(),
            submit_button_options: None,
            root_field_id: None,
        }
    }
}

impl GenerationOptions {
    /// Load options from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `OptionsError` if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| OptionsError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set the wrapped (`ui:options`) output mode.
    pub fn wrapped(mut self, wrapped: bool) -> Self {
        self.use_ui_options_wrapper = wrapped;
        self
    }

    /// Set the default widget for a semantic type or string format.
    pub fn widget(mut self, key: impl Into<String>, widget: impl Into<String>) -> Self {
        self.default_widgets.insert(key.into(), widget.into());
        self
    }

    pub fn copyable(mut self, copyable: bool) -> Self {
        self.global_options.copyable = copyable;
        self
    }

    pub fn root_field_id(mut self, id: impl Into<String>) -> Self {
        self.root_field_id = Some(id.into());
        self
    }

    pub fn submit_button_options(mut self, options: Value) -> Self {
        self.submit_button_options = Some(options);
        self
    }

    /// Default widget for a key, if configured.
    pub fn default_widget(&self, key: &str) -> Option<&str> {
        self.default_widgets.get(key).map(String::as_str)
    }
}

/// Which reference resolver runs before generation on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefMode {
    /// Inline `#/definitions/<name>` only, then drop `definitions`.
    #[default]
    Definitions,
    /// Inline every JSON-pointer `$ref`.
    All,
}

/// Options for the import pipeline.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub generation: GenerationOptions,
    pub refs: RefMode,
}

impl ImportOptions {
    pub fn new(generation: GenerationOptions) -> Self {
        Self {
            generation,
            refs: RefMode::default(),
        }
    }

    pub fn refs(mut self, refs: RefMode) -> Self {
        self.refs = refs;
        self
    }
}
