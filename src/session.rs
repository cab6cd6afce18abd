//! Import, export and editing of a live `{schema, ui-schema}` pair.

use serde_json::{json, Value};

use crate::canonical::canonicalize;
use crate::clean::clean;
use crate::editor;
use crate::error::{ImportError, ReferenceError, WidgetError};
use crate::generator::generate;
use crate::loader::load_document_str;
use crate::merge::{drop_stale_widgets, merge, prune_stale_fields};
use crate::path;
use crate::refs::{resolve_all_refs, resolve_definitions};
use crate::types::{ImportOptions, PathSegment, RefMode};

/// Top-level key holding the JSON Schema in an import/export document.
pub const SCHEMA_KEY: &str = "schema";
/// Top-level key holding the UI schema in an import/export document.
pub const UI_SCHEMA_KEY: &str = "ui-schema";

/// Result of the import pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDocument {
    /// The JSON Schema exactly as imported (refs not inlined).
    pub schema: Value,
    /// Canonical UI schema: the imported one merged under a regenerated one.
    pub ui_schema: Value,
}

/// Resolve refs according to `mode` ahead of generation.
///
/// # Errors
///
/// Returns `ReferenceError` if a `$ref` cannot be inlined.
pub fn resolve_refs(schema: &Value, mode: RefMode) -> Result<Value, ReferenceError> {
    match mode {
        RefMode::Definitions => resolve_definitions(schema),
        RefMode::All => resolve_all_refs(schema),
    }
}

/// Generate the canonical UI schema for a raw (unresolved) JSON Schema.
///
/// # Errors
///
/// Returns `ReferenceError` if a `$ref` cannot be inlined; no partial tree
/// is produced.
pub fn generate_canonical(schema: &Value, options: &ImportOptions) -> Result<Value, ReferenceError> {
    let resolved = resolve_refs(schema, options.refs)?;
    Ok(canonicalize(&generate(&resolved, &options.generation)))
}

/// Run the import pipeline on a parsed `{schema, ui-schema}` document.
///
/// The schema is ref-resolved and a fresh UI schema generated from it.
/// The imported UI schema is canonicalized, stripped of nodes for fields
/// the schema no longer has, and merged under the fresh one. Widgets the
/// fresh tree no longer backs are then dropped.
///
/// # Errors
///
/// Returns `ImportError::MissingField` if either top-level field is absent
/// or null, or the reference/merge error that aborted the pipeline.
pub fn import_document(document: &Value, options: &ImportOptions) -> Result<ImportedDocument, ImportError> {
    let field = |name: &'static str| {
        document
            .get(name)
            .filter(|v| !v.is_null())
            .ok_or(ImportError::MissingField { field: name })
    };
    let schema = field(SCHEMA_KEY)?;
    let existing = field(UI_SCHEMA_KEY)?;

    let generated = generate_canonical(schema, options)?;
    log::debug!("generated ui schema for import");

    let existing = prune_stale_fields(&canonicalize(existing), &generated);
    let ui_schema = drop_stale_widgets(&merge(&existing, &generated)?, &generated);

    Ok(ImportedDocument {
        schema: schema.clone(),
        ui_schema,
    })
}

/// Build the `{schema, ui-schema}` export document.
///
/// The UI schema is written uncleaned so a re-import keeps every setting.
pub fn export_document(schema: &Value, ui_schema: &Value) -> Value {
    json!({
        SCHEMA_KEY: schema,
        UI_SCHEMA_KEY: ui_schema,
    })
}

/// The live JSON Schema and UI schema of an editing session.
///
/// Imports replace both trees together or not at all. Edits go through
/// [`Session::set`] and [`Session::change_widget`], which swap in a new
/// tree rather than mutating the old one.
#[derive(Debug, Clone)]
pub struct Session {
    schema: Value,
    ui_schema: Value,
    options: ImportOptions,
}

impl Session {
    /// Start a session from an existing pair.
    pub fn new(schema: Value, ui_schema: Value, options: ImportOptions) -> Self {
        Self {
            schema,
            ui_schema,
            options,
        }
    }

    /// Start a session with a UI schema generated from `schema`.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceError` if a `$ref` cannot be inlined.
    pub fn from_schema(schema: Value, options: ImportOptions) -> Result<Self, ReferenceError> {
        let ui_schema = generate_canonical(&schema, &options)?;
        Ok(Self::new(schema, ui_schema, options))
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn ui_schema(&self) -> &Value {
        &self.ui_schema
    }

    /// Import a `{schema, ui-schema}` document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Parse` for malformed JSON or any error from
    /// [`import_document`]. The session is left unchanged on error.
    pub fn import_str(&mut self, text: &str) -> Result<(), ImportError> {
        let document = load_document_str(text)?;
        self.import_value(&document)
    }

    /// Import an already parsed document.
    ///
    /// # Errors
    ///
    /// See [`import_document`]. The session is left unchanged on error.
    pub fn import_value(&mut self, document: &Value) -> Result<(), ImportError> {
        let imported = import_document(document, &self.options)?;
        self.schema = imported.schema;
        self.ui_schema = imported.ui_schema;
        Ok(())
    }

    /// The `{schema, ui-schema}` document with the full UI schema.
    pub fn export(&self) -> Value {
        export_document(&self.schema, &self.ui_schema)
    }

    /// The cleaned UI schema handed to a form renderer.
    pub fn rendered(&self) -> Value {
        clean(&self.ui_schema)
    }

    /// Look up a value in the UI schema.
    pub fn get(&self, path: &[PathSegment]) -> Option<&Value> {
        path::get(&self.ui_schema, path)
    }

    /// Write (`Some`) or delete (`None`) a value in the UI schema.
    pub fn set(&mut self, path: &[PathSegment], value: Option<Value>) {
        self.ui_schema = path::set(&self.ui_schema, path, value);
    }

    /// Switch the widget of the node at `node_path`.
    ///
    /// # Errors
    ///
    /// See [`editor::change_widget`]. The session is left unchanged on error.
    pub fn change_widget(&mut self, node_path: &[PathSegment], widget: &str) -> Result<(), WidgetError> {
        self.ui_schema = editor::change_widget(&self.ui_schema, node_path, widget)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::parse_path;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "title": "Name" },
                "age": { "type": "integer", "default": 18 }
            }
        })
    }

    #[test]
    fn import_requires_both_fields() {
        let options = ImportOptions::default();
        let err = import_document(&json!({ "ui-schema": {} }), &options).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { field: "schema" }));

        let err = import_document(&json!({ "schema": {}, "ui-schema": null }), &options).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { field: "ui-schema" }));

        let err = import_document(&json!([1, 2]), &options).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { .. }));
    }

    #[test]
    fn import_keeps_customizations_generator_does_not_produce() {
        let document = json!({
            "schema": schema(),
            "ui-schema": {
                "name": { "ui:options": { "help": "Your legal name" }, "ui:widget": "textarea" }
            }
        });
        let imported = import_document(&document, &ImportOptions::default()).unwrap();
        let name = &imported.ui_schema["name"];
        assert_eq!(name["ui:help"], "Your legal name");
        // Generated values win conflicts
        assert_eq!(name["ui:widget"], "text");
        assert_eq!(imported.ui_schema["ui:order"], json!(["name", "age"]));
    }

    #[test]
    fn import_drops_removed_fields() {
        let document = json!({
            "schema": schema(),
            "ui-schema": { "ui:order": ["legacy", "name"], "legacy": { "ui:widget": "text" } }
        });
        let imported = import_document(&document, &ImportOptions::default()).unwrap();
        assert!(imported.ui_schema.get("legacy").is_none());
        assert_eq!(imported.ui_schema["ui:order"], json!(["name", "age"]));
    }

    #[test]
    fn failed_import_leaves_session_untouched() {
        let mut session = Session::from_schema(schema(), ImportOptions::default()).unwrap();
        let before = session.export();

        assert!(matches!(session.import_str("{not json"), Err(ImportError::Parse { .. })));
        assert!(matches!(
            session.import_str(r#"{"schema": {}}"#),
            Err(ImportError::MissingField { .. })
        ));
        let bad_ref = json!({
            "schema": { "definitions": {}, "properties": { "a": { "$ref": "#/definitions/x" } } },
            "ui-schema": {}
        });
        assert!(matches!(
            session.import_value(&bad_ref),
            Err(ImportError::Reference(ReferenceError::Unresolved { .. }))
        ));

        assert_eq!(session.export(), before);
    }

    #[test]
    fn set_and_rendered() {
        let mut session = Session::from_schema(schema(), ImportOptions::default()).unwrap();
        session.set(&parse_path("name/ui:help"), Some(json!("Required")));
        assert_eq!(session.get(&parse_path("name/ui:help")), Some(&json!("Required")));

        let rendered = session.rendered();
        assert!(rendered["name"].get("ui:fieldType").is_none());
        assert!(rendered["name"].get("ui:readonly").is_none());
        assert_eq!(rendered["name"]["ui:help"], "Required");

        session.set(&parse_path("name/ui:help"), None);
        assert_eq!(session.get(&parse_path("name/ui:help")), None);
    }

    #[test]
    fn change_widget_through_session() {
        let mut session = Session::from_schema(schema(), ImportOptions::default()).unwrap();
        session.change_widget(&parse_path("name"), "password").unwrap();
        assert_eq!(session.ui_schema()["name"]["ui:widget"], "password");
        assert!(session.change_widget(&parse_path("age"), "checkbox").is_err());
        assert_eq!(session.ui_schema()["age"]["ui:widget"], "updown");
    }

    #[test]
    fn ref_mode_all() {
        let schema = json!({
            "$defs": { "Name": { "type": "string" } },
            "type": "object",
            "properties": { "n": { "$ref": "#/$defs/Name" } }
        });
        let shallow = generate_canonical(&schema, &ImportOptions::default()).unwrap();
        assert!(shallow["n"].get("ui:widget").is_none());

        let options = ImportOptions::default().refs(RefMode::All);
        let full = generate_canonical(&schema, &options).unwrap();
        assert_eq!(full["n"]["ui:widget"], "text");
    }
}
