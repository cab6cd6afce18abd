//! UI Schema Generator
//!
//! Derives a react-jsonschema-form style UI schema from a JSON Schema and
//! keeps it in sync with human edits.
//!
//! The pipeline resolves `$ref`s, generates one UI node per schema node,
//! canonicalizes the result, and merges a previously edited UI schema
//! under the fresh one so customizations survive a schema change.
//!
//! # Example
//!
//! ```
//! use ui_schema::{generate, GenerationOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string", "title": "Full Name" },
//!         "age": { "type": "integer", "default": 18 },
//!         "tags": {
//!             "type": "array",
//!             "items": { "type": "string", "enum": ["a", "b"] }
//!         }
//!     }
//! });
//!
//! let ui = generate(&schema, &GenerationOptions::default());
//!
//! assert_eq!(ui["ui:order"], json!(["name", "age", "tags"]));
//! assert_eq!(ui["name"]["ui:widget"], "text");
//! assert_eq!(ui["name"]["ui:placeholder"], "Enter full name");
//! assert_eq!(ui["age"]["ui:emptyValue"], 18);
//! // Enum arrays become a single multi-select
//! assert_eq!(ui["tags"]["ui:fieldType"], "array");
//! assert_eq!(ui["tags"]["ui:enumNames"], json!(["A", "B"]));
//! ```
//!
//! # Field Types
//!
//! | `ui:fieldType` | Allowed widgets |
//! |----------------|-----------------|
//! | `string` | text, textarea, password, hidden, file, datetime, date, time |
//! | `number` | updown, text, hidden, range |
//! | `bool` | checkbox, hidden |
//! | `enum`, `array`, `anyOf`, `allOf`, `oneOf` | select, RadioWidget, CheckboxesWidget, hidden |
//! | `object`, `unknown` | hidden |
//!
//! # Import
//!
//! ```
//! use ui_schema::{ImportOptions, Session};
//! use serde_json::json;
//!
//! let mut session = Session::from_schema(json!({ "type": "object" }), ImportOptions::default()).unwrap();
//! session
//!     .import_str(r#"{
//!         "schema": { "type": "object", "properties": { "bio": { "type": "string" } } },
//!         "ui-schema": { "bio": { "ui:options": { "help": "Keep it short" } } }
//!     }"#)
//!     .unwrap();
//!
//! assert_eq!(session.ui_schema()["bio"]["ui:help"], "Keep it short");
//! assert_eq!(session.ui_schema()["bio"]["ui:widget"], "text");
//! ```

mod canonical;
mod catalog;
mod classify;
mod clean;
mod editor;
mod error;
mod generator;
mod loader;
mod merge;
pub mod path;
mod refs;
mod session;
mod types;

pub use canonical::{canonicalize, is_canonical, PRESENTATION_KEYS};
pub use catalog::{allowed_widgets, is_allowed, widget_defaults, WIDGET_DEFAULT_KEYS};
pub use classify::{classify, composition, effective_type};
pub use clean::{clean, is_empty_equivalent};
pub use editor::{change_widget, ordered_keys, widget_choices, EmptyValueKind};
pub use error::{ImportError, MergeError, OptionsError, ReferenceError, WidgetError};
pub use generator::{generate, generate_node};
pub use loader::{is_url, load_document, load_document_auto, load_document_str};
pub use merge::{child_keys, deep_merge, drop_stale_widgets, expand_orders, merge, prune_stale_fields};
pub use path::parse_path;
pub use refs::{contains_ref, navigate_pointer, resolve_all_refs, resolve_definitions};
pub use session::{
    export_document, generate_canonical, import_document, resolve_refs, ImportedDocument, Session,
    SCHEMA_KEY, UI_SCHEMA_KEY,
};
pub use types::{
    json_type_name, keys, pointer_string, Composition, FieldType, GenerationOptions, PathSegment,
    GlobalOptions, ImportOptions, RefMode, SchemaKind, COMPOSITION_KEYWORDS,
};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
