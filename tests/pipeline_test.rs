//! Integration tests for the generate / import / merge pipeline.

use serde_json::{json, Value};
use ui_schema::{
    canonicalize, clean, generate, generate_canonical, import_document, is_allowed, merge,
    parse_path, path, resolve_all_refs, resolve_definitions, FieldType, GenerationOptions,
    ImportError, ImportOptions, ReferenceError, Session,
};

fn person_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "age": { "type": "integer", "default": 18 }
        }
    })
}

/// A schema touching every generator branch.
fn rich_schema() -> Value {
    json!({
        "type": "object",
        "title": "Profile",
        "definitions": {
            "address": {
                "type": "object",
                "properties": {
                    "street": { "type": "string", "title": "Street" },
                    "zip": { "type": "integer" }
                }
            }
        },
        "properties": {
            "born": { "type": "string", "format": "date" },
            "avatar": { "type": "string", "format": "data-url" },
            "bio": { "type": "string", "minLength": 20 },
            "score": { "type": "number" },
            "active": { "type": "boolean", "default": true },
            "color": { "enum": ["red", "green"] },
            "tags": { "type": "array", "items": { "type": "string", "enum": ["a", "b"] } },
            "items": {
                "type": "array",
                "items": { "type": "object", "properties": { "qty": { "type": "integer" } } }
            },
            "choice": { "oneOf": [{ "type": "string", "title": "Text" }, { "type": "number" }] },
            "mixed": { "type": "string", "anyOf": [{ "minLength": 1 }] },
            "secret": { "type": "object", "hidden": true },
            "nothing": { "type": "null", "hidden": true },
            "extra": { "type": "object", "additionalProperties": true },
            "home": { "$ref": "#/definitions/address" }
        }
    })
}

fn rich_options() -> GenerationOptions {
    GenerationOptions::default()
        .widget("string", "textarea")
        .widget("date", "date")
        // Not legal for numbers; replaced by the catalog default
        .widget("number", "checkbox")
}

/// Visit every object node in a UI tree.
fn walk<'a>(node: &'a Value, path: String, visit: &mut dyn FnMut(&str, &'a serde_json::Map<String, Value>)) {
    match node {
        Value::Object(map) => {
            visit(&path, map);
            for (key, child) in map {
                walk(child, format!("{}/{}", path, key), visit);
            }
        }
        Value::Array(arr) => {
            for (i, child) in arr.iter().enumerate() {
                walk(child, format!("{}/{}", path, i), visit);
            }
        }
        _ => {}
    }
}

// === End-to-End Generation ===

mod end_to_end {
    use super::*;

    #[test]
    fn person_form() {
        let options = GenerationOptions::default()
            .widget("string", "text")
            .widget("number", "updown");
        let ui = generate(&person_schema(), &options);

        assert_eq!(ui["ui:order"], json!(["name", "age"]));
        assert_eq!(ui["name"]["ui:widget"], "text");
        assert_eq!(ui["name"]["ui:emptyValue"], "");
        assert_eq!(ui["age"]["ui:widget"], "updown");
        assert_eq!(ui["age"]["ui:emptyValue"], 18);
    }

    #[test]
    fn deterministic_output() {
        let schema = resolve_definitions(&rich_schema()).unwrap();
        let first = generate(&schema, &rich_options());
        let second = generate(&schema, &rich_options());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn rich_schema_shapes() {
        let schema = resolve_definitions(&rich_schema()).unwrap();
        let ui = generate(&schema, &rich_options());

        assert_eq!(ui["born"]["ui:widget"], "date");
        assert_eq!(ui["avatar"]["ui:widget"], "file");
        assert_eq!(ui["bio"]["ui:widget"], "textarea");
        assert_eq!(ui["bio"]["ui:rows"], 10);
        assert_eq!(ui["score"]["ui:widget"], "updown");
        assert_eq!(ui["active"]["ui:emptyValue"], true);
        assert_eq!(ui["color"]["ui:enumNames"], json!(["Red", "Green"]));
        assert_eq!(ui["items"]["items"]["ui:order"], json!(["qty"]));
        assert_eq!(ui["choice"]["oneOf"][0]["ui:title"], "Text");
        assert_eq!(ui["secret"]["ui:widget"], "hidden");
        assert_eq!(ui["extra"]["ui:duplicateKeySuffixSeparator"], "-");
        assert_eq!(ui["home"]["street"]["ui:placeholder"], "Enter street");
        assert_eq!(ui["home"]["ui:order"], json!(["street", "zip"]));
    }
}

// === Enum Arrays ===

mod enum_arrays {
    use super::*;

    #[test]
    fn flattened_onto_array_node() {
        let ui = generate(
            &json!({ "type": "array", "items": { "type": "string", "enum": ["x", "y"] } }),
            &GenerationOptions::default(),
        );
        assert_eq!(ui["ui:widget"], "select");
        assert_eq!(ui["ui:enumNames"], json!(["X", "Y"]));
        assert!(ui.get("items").is_none());
    }

    #[test]
    fn plain_items_stay_nested() {
        let ui = generate(
            &json!({ "type": "array", "items": { "type": "boolean" } }),
            &GenerationOptions::default(),
        );
        assert_eq!(ui["items"]["ui:widget"], "checkbox");
        assert!(ui.get("ui:enumNames").is_none());
    }
}

// === Widget / Field Type Coupling ===

mod field_type_coupling {
    use super::*;

    fn assert_coupled(ui: &Value) {
        let mut checked = 0;
        walk(ui, String::new(), &mut |path, node| {
            let widget = node.get("ui:widget").and_then(Value::as_str);
            let field_type = node.get("ui:fieldType").and_then(Value::as_str);
            match (widget, field_type) {
                (Some(widget), Some(field_type)) => {
                    let parsed = FieldType::parse(field_type)
                        .unwrap_or_else(|| panic!("unknown field type {} at {}", field_type, path));
                    assert!(
                        is_allowed(parsed, widget),
                        "widget {} not allowed for {} at {}",
                        widget,
                        field_type,
                        path
                    );
                    checked += 1;
                }
                (None, None) => {}
                other => panic!("widget and field type out of step at {}: {:?}", path, other),
            }
        });
        assert!(checked > 10);
    }

    #[test]
    fn flat_mode() {
        let schema = resolve_definitions(&rich_schema()).unwrap();
        assert_coupled(&generate(&schema, &rich_options()));
    }

    #[test]
    fn wrapped_mode() {
        let schema = resolve_definitions(&rich_schema()).unwrap();
        assert_coupled(&generate(&schema, &rich_options().wrapped(true)));
    }

    #[test]
    fn composition_and_null_types() {
        let schema = resolve_definitions(&rich_schema()).unwrap();
        let ui = generate(&schema, &rich_options());
        assert_eq!(ui["mixed"]["ui:fieldType"], "anyOf");
        assert_eq!(ui["mixed"]["ui:widget"], "select");
        assert_eq!(ui["nothing"]["ui:fieldType"], "unknown");
        assert_eq!(ui["nothing"]["ui:widget"], "hidden");
    }

    #[test]
    fn wrapped_and_flat_agree_once_canonical() {
        let schema = resolve_definitions(&rich_schema()).unwrap();
        let flat = canonicalize(&generate(&schema, &rich_options()));
        let wrapped = canonicalize(&generate(&schema, &rich_options().wrapped(true)));
        assert_eq!(flat, wrapped);
    }
}

// === Reference Resolution ===

mod references {
    use super::*;

    fn has_ref(value: &Value) -> bool {
        match value {
            Value::Object(map) => map.contains_key("$ref") || map.values().any(has_ref),
            Value::Array(arr) => arr.iter().any(has_ref),
            _ => false,
        }
    }

    #[test]
    fn definitions_fully_inlined() {
        let schema = json!({
            "definitions": {
                "leaf": { "type": "string" },
                "pair": {
                    "type": "object",
                    "properties": { "a": { "$ref": "#/definitions/leaf" } }
                }
            },
            "type": "array",
            "items": { "$ref": "#/definitions/pair" }
        });
        let resolved = resolve_definitions(&schema).unwrap();
        assert!(!has_ref(&resolved));
        assert!(resolved.get("definitions").is_none());
        assert_eq!(resolved["items"]["properties"]["a"], json!({ "type": "string" }));
    }

    #[test]
    fn general_resolver_overlays_siblings() {
        let schema = json!({
            "$defs": { "name": { "type": "string", "title": "Name", "maxLength": 10 } },
            "properties": { "alias": { "$ref": "#/$defs/name", "title": "Alias" } }
        });
        let resolved = resolve_all_refs(&schema).unwrap();
        assert_eq!(
            resolved["properties"]["alias"],
            json!({ "type": "string", "title": "Alias", "maxLength": 10 })
        );
    }

    #[test]
    fn cycles_rejected_by_both_resolvers() {
        let schema = json!({
            "definitions": {
                "node": {
                    "type": "object",
                    "properties": { "next": { "$ref": "#/definitions/node" } }
                }
            },
            "properties": { "head": { "$ref": "#/definitions/node" } }
        });
        assert!(matches!(
            resolve_definitions(&schema),
            Err(ReferenceError::Cyclic { .. })
        ));
        assert!(matches!(
            resolve_all_refs(&schema),
            Err(ReferenceError::Cyclic { .. })
        ));
    }

    #[test]
    fn missing_target_aborts_generation() {
        let schema = json!({
            "definitions": {},
            "properties": { "x": { "$ref": "#/definitions/gone" } }
        });
        let err = generate_canonical(&schema, &ImportOptions::default()).unwrap_err();
        assert_eq!(err.pointer(), "#/definitions/gone");
    }
}

// === Import / Export ===

mod import {
    use super::*;

    #[test]
    fn round_trip_without_edits() {
        let session = Session::from_schema(rich_schema(), ImportOptions::new(rich_options())).unwrap();
        let exported = session.export();

        let mut reimported = Session::new(json!({}), json!({}), ImportOptions::new(rich_options()));
        reimported.import_value(&exported).unwrap();

        assert_eq!(clean(reimported.ui_schema()), clean(session.ui_schema()));
        assert_eq!(reimported.schema(), &rich_schema());
    }

    #[test]
    fn round_trip_keeps_edits() {
        let mut session = Session::from_schema(person_schema(), ImportOptions::default()).unwrap();
        session.set(&parse_path("name/ui:help"), Some(json!("As on your passport")));
        session.set(&parse_path("ui:order"), Some(json!(["age", "*"])));
        let exported = session.export();

        let imported = import_document(&exported, &ImportOptions::default()).unwrap();
        assert_eq!(imported.ui_schema["name"]["ui:help"], "As on your passport");
        // Regenerated order wins over the edited one
        assert_eq!(imported.ui_schema["ui:order"], json!(["name", "age"]));
    }

    #[test]
    fn wrapped_edits_are_canonicalized() {
        let document = json!({
            "schema": person_schema(),
            "ui-schema": {
                "name": { "ui:options": { "help": "h", "placeholder": "Your name" } }
            }
        });
        let imported = import_document(&document, &ImportOptions::default()).unwrap();
        let name = &imported.ui_schema["name"];
        assert!(name.get("ui:options").is_none());
        assert_eq!(name["ui:help"], "h");
        // Generated placeholder is the high-priority side
        assert_eq!(name["ui:placeholder"], "Enter value");
    }

    #[test]
    fn new_schema_fields_appear() {
        let document = json!({
            "schema": person_schema(),
            "ui-schema": { "ui:order": ["name"], "name": { "ui:widget": "text" } }
        });
        let imported = import_document(&document, &ImportOptions::default()).unwrap();
        assert_eq!(imported.ui_schema["ui:order"], json!(["name", "age"]));
        assert_eq!(imported.ui_schema["age"]["ui:widget"], "updown");
    }

    #[test]
    fn enum_array_turned_plain_loses_its_widget() {
        let document = json!({
            "schema": {
                "type": "object",
                "properties": {
                    "tags": { "type": "array", "items": { "type": "string" } },
                    "o": { "type": "object", "properties": {} }
                }
            },
            "ui-schema": {
                "tags": { "ui:widget": "select", "ui:fieldType": "array", "ui:enumNames": ["X", "Y"] },
                "o": { "ui:widget": "textarea", "ui:help": "kept" }
            }
        });
        let imported = import_document(&document, &ImportOptions::default()).unwrap();
        let tags = &imported.ui_schema["tags"];
        assert!(tags.get("ui:widget").is_none());
        assert!(tags.get("ui:fieldType").is_none());
        assert!(tags.get("ui:enumNames").is_none());
        assert_eq!(tags["items"]["ui:widget"], "text");

        let o = &imported.ui_schema["o"];
        assert!(o.get("ui:widget").is_none());
        assert_eq!(o["ui:help"], "kept");

        walk(&imported.ui_schema, String::new(), &mut |path, node| {
            if let Some(widget) = node.get("ui:widget").and_then(Value::as_str) {
                let field_type = node
                    .get("ui:fieldType")
                    .and_then(Value::as_str)
                    .and_then(FieldType::parse)
                    .unwrap_or_else(|| panic!("widget without fieldType at {}", path));
                assert!(is_allowed(field_type, widget), "{} at {}", widget, path);
            }
        });
    }

    #[test]
    fn import_errors() {
        let options = ImportOptions::default();
        assert!(matches!(
            import_document(&json!({ "schema": person_schema() }), &options),
            Err(ImportError::MissingField { field: "ui-schema" })
        ));
        assert!(matches!(
            import_document(
                &json!({ "schema": person_schema(), "ui-schema": { "name": { "ui:order": 5 } } }),
                &options
            ),
            Err(ImportError::Merge(_))
        ));
    }
}

// === Merge ===

mod merging {
    use super::*;

    #[test]
    fn merge_with_itself_is_identity() {
        let ui = generate_canonical(&rich_schema(), &ImportOptions::new(rich_options())).unwrap();
        assert_eq!(merge(&ui, &ui).unwrap(), ui);
    }

    #[test]
    fn high_priority_wins_low_only_survives() {
        let low = json!({ "name": { "ui:widget": "textarea", "ui:help": "custom" } });
        let high = json!({ "name": { "ui:widget": "text" } });
        assert_eq!(
            merge(&low, &high).unwrap(),
            json!({ "name": { "ui:widget": "text", "ui:help": "custom" } })
        );
    }
}

// === Path Edits ===

mod path_edits {
    use super::*;

    #[test]
    fn delete_sequence_element() {
        let ui = json!({ "anyOf": [{ "ui:title": "a" }, { "ui:title": "b" }, { "ui:title": "c" }] });
        let updated = path::set(&ui, &parse_path("anyOf/1"), None);
        assert_eq!(
            updated["anyOf"],
            json!([{ "ui:title": "a" }, { "ui:title": "c" }])
        );
        // Caller's tree untouched
        assert_eq!(ui["anyOf"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn delete_missing_path_is_noop() {
        let ui = json!({ "name": { "ui:widget": "text" } });
        assert_eq!(path::set(&ui, &parse_path("address/street"), None), ui);
    }

    #[test]
    fn write_creates_intermediates() {
        let updated = path::set(&json!({}), &parse_path("address/street/ui:widget"), Some(json!("text")));
        assert_eq!(updated, json!({ "address": { "street": { "ui:widget": "text" } } }));
    }

    #[test]
    fn rendered_tree_is_clean() {
        let session = Session::from_schema(rich_schema(), ImportOptions::new(rich_options())).unwrap();
        let rendered = session.rendered();
        walk(&rendered, String::new(), &mut |path, node| {
            assert!(!node.contains_key("ui:fieldType"), "fieldType left at {}", path);
            for (key, value) in node {
                assert!(!ui_schema::is_empty_equivalent(value), "empty {} at {}", key, path);
            }
        });
        assert_eq!(clean(&rendered), rendered);
    }
}
