//! UI schema generation from a resolved JSON Schema.

use serde_json::{json, Map, Value};

use crate::catalog::{allowed_widgets, is_allowed, widget_defaults};
use crate::classify::classify;
use crate::types::{keys, pointer_string, FieldType, GenerationOptions, PathSegment, SchemaKind};

/// Composition keywords in the order their sub-node lists are written.
const COMPOSITION_OUTPUT_ORDER: &[&str] = &["anyOf", "oneOf", "allOf"];

/// Generate the UI schema for a root JSON Schema.
///
/// The schema must already be ref-resolved; a leftover `$ref` node is
/// treated as an untyped field. Output is deterministic for fixed inputs.
pub fn generate(schema: &Value, options: &GenerationOptions) -> Value {
    generate_node(schema, options, &[], true)
}

/// Generate the UI node for a schema located at `path`.
///
/// Root directives (`ui:globalOptions`, `ui:rootFieldId`,
/// `ui:submitButtonOptions`) are only written when `is_root` is set, and
/// `ui:readonly`/`ui:disabled` only when it is not.
pub fn generate_node(
    schema: &Value,
    options: &GenerationOptions,
    path: &[PathSegment],
    is_root: bool,
) -> Value {
    let generator = Generator { options };
    let mut path = path.to_vec();
    Value::Object(generator.node(schema, &mut path, is_root))
}

struct Generator<'a> {
    options: &'a GenerationOptions,
}

impl Generator<'_> {
    fn node(&self, schema: &Value, path: &mut Vec<PathSegment>, is_root: bool) -> Map<String, Value> {
        log::trace!("generating ui node for {}", pointer_string(path));
        let mut ui = Map::new();

        if is_root {
            self.root_directives(&mut ui);
        }

        match SchemaKind::of(schema) {
            SchemaKind::String => self.string_field(schema, &mut ui),
            SchemaKind::Number => self.number_field(&mut ui),
            SchemaKind::Boolean => {
                let widget = self.configured_widget(None, "boolean", FieldType::Bool);
                self.set_widget(&mut ui, &widget);
            }
            SchemaKind::Array => self.array_field(schema, &mut ui, path),
            SchemaKind::Object => self.object_field(schema, &mut ui, path),
            SchemaKind::Composition(_) => self.set_widget(&mut ui, "select"),
            SchemaKind::Enum | SchemaKind::Unknown => {}
        }

        self.common_properties(schema, &mut ui, is_root);

        if let Some(values) = schema.get("enum").and_then(Value::as_array) {
            self.enum_properties(schema, values, &mut ui);
        }

        if schema.get("hidden").is_some_and(truthy) {
            ui.insert(keys::WIDGET.into(), json!("hidden"));
        }

        for keyword in COMPOSITION_OUTPUT_ORDER {
            if let Some(subs) = schema.get(*keyword).and_then(Value::as_array) {
                let nodes = self.composition_nodes(keyword, subs, path);
                ui.insert((*keyword).to_string(), Value::Array(nodes));
            }
        }

        if ui.contains_key(keys::WIDGET) {
            stamp_field_type(schema, &mut ui, path);
        }

        ui
    }

    fn root_directives(&self, ui: &mut Map<String, Value>) {
        if self.options.global_options.copyable {
            ui.insert(keys::GLOBAL_OPTIONS.into(), json!({ "copyable": true }));
        }
        if let Some(id) = self.options.root_field_id.as_deref().filter(|id| !id.is_empty()) {
            ui.insert(keys::ROOT_FIELD_ID.into(), json!(id));
        }
        if let Some(submit) = &self.options.submit_button_options {
            ui.insert(keys::SUBMIT_BUTTON_OPTIONS.into(), submit.clone());
        }
    }

    /// Pick the configured widget for `format` (falling back to
    /// `type_key`), replacing it with the catalog's first entry when it is
    /// missing or not legal for `field_type`.
    fn configured_widget(&self, format: Option<&str>, type_key: &str, field_type: FieldType) -> String {
        let configured = format
            .and_then(|f| self.options.default_widget(f))
            .or_else(|| self.options.default_widget(type_key));
        match configured {
            Some(widget) if is_allowed(field_type, widget) => widget.to_string(),
            other => {
                let fallback = allowed_widgets(field_type)[0];
                if let Some(widget) = other {
                    log::warn!(
                        "default widget \"{}\" is not allowed for {}, using \"{}\"",
                        widget,
                        field_type,
                        fallback
                    );
                }
                fallback.to_string()
            }
        }
    }

    fn string_field(&self, schema: &Value, ui: &mut Map<String, Value>) {
        let format = schema.get("format").and_then(Value::as_str);
        let widget = if format == Some("data-url") {
            "file".to_string()
        } else {
            self.configured_widget(format, "string", FieldType::String)
        };
        self.set_widget(ui, &widget);

        if widget == "textarea" {
            self.put_option(ui, "rows", json!(textarea_rows(schema)));
        }

        if let Some(input_type) = schema.get("inputType").filter(|v| truthy(v)) {
            self.put_option(ui, "inputType", input_type.clone());
        }

        let title = schema
            .get("title")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);
        let placeholder = format!("Enter {}", title.as_deref().unwrap_or("value"));
        self.put_option(ui, "placeholder", json!(placeholder));

        let autofocus = schema.get("autofocus").and_then(Value::as_bool).unwrap_or(false);
        ui.insert(keys::AUTOFOCUS.into(), json!(autofocus));
    }

    fn number_field(&self, ui: &mut Map<String, Value>) {
        let widget = self.configured_widget(None, "number", FieldType::Number);
        self.set_widget(ui, &widget);
    }

    fn array_field(&self, schema: &Value, ui: &mut Map<String, Value>, path: &mut Vec<PathSegment>) {
        self.put_option(
            ui,
            "arrayOptions",
            json!({ "addable": true, "orderable": true, "removable": true }),
        );

        if let Some(items) = schema.get(keys::ITEMS).filter(|v| v.is_object()) {
            path.push(PathSegment::from(keys::ITEMS));
            let items_ui = self.node(items, path, false);
            path.pop();

            // An enum array is a single multi-select, not a widget per item.
            if items.get("enum").is_some_and(|v| !v.is_null()) {
                splice(ui, items_ui);
            } else {
                ui.insert(keys::ITEMS.into(), Value::Object(items_ui));
            }
        }

        if schema.get("filePreview").is_some_and(truthy) {
            self.put_option(ui, "filePreview", json!(true));
        }
    }

    fn object_field(&self, schema: &Value, ui: &mut Map<String, Value>, path: &mut Vec<PathSegment>) {
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            let order: Vec<Value> = properties.keys().map(|k| json!(k)).collect();
            ui.insert(keys::ORDER.into(), Value::Array(order));
            for (name, prop) in properties {
                path.push(PathSegment::from(name.as_str()));
                let child = self.node(prop, path, false);
                path.pop();
                ui.insert(name.clone(), Value::Object(child));
            }
        }

        if schema.get("additionalProperties").is_some_and(truthy) {
            let separator = schema
                .get("duplicateKeySuffixSeparator")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or("-");
            self.put_option(ui, "duplicateKeySuffixSeparator", json!(separator));
        }
    }

    fn common_properties(&self, schema: &Value, ui: &mut Map<String, Value>, is_root: bool) {
        if let Some(title) = schema.get("title").filter(|v| truthy(v)) {
            if self.options.use_ui_options_wrapper {
                self.put_option(ui, "title", title.clone());
            } else {
                ui.insert(keys::TITLE.into(), title.clone());
            }
        }
        if let Some(description) = schema.get("description").filter(|v| truthy(v)) {
            ui.insert(keys::DESCRIPTION.into(), description.clone());
        }
        if !is_root {
            let flag = |key: &str| schema.get(key).and_then(Value::as_bool).unwrap_or(false);
            ui.insert(keys::READONLY.into(), json!(flag("readOnly")));
            ui.insert(keys::DISABLED.into(), json!(flag("disabled")));
        }
        if let Some(help) = schema.get("help").filter(|v| truthy(v)) {
            ui.insert(keys::HELP.into(), help.clone());
        }
    }

    fn enum_properties(&self, schema: &Value, values: &[Value], ui: &mut Map<String, Value>) {
        let names = match schema.get("enumNames") {
            Some(names @ Value::Array(_)) => names.clone(),
            _ => Value::Array(
                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| match v {
                        Value::String(s) => json!(capitalize(s)),
                        _ => json!(format!("Enum {}", i + 1)),
                    })
                    .collect(),
            ),
        };
        ui.insert(keys::ENUM_NAMES.into(), names);
        self.set_widget(ui, "select");

        if let Some(disabled) = schema.get("enumDisabled").filter(|v| truthy(v)) {
            ui.insert(keys::ENUM_DISABLED.into(), disabled.clone());
        }
    }

    fn composition_nodes(&self, keyword: &str, subs: &[Value], path: &mut Vec<PathSegment>) -> Vec<Value> {
        subs.iter()
            .enumerate()
            .map(|(i, sub)| {
                path.push(PathSegment::from(keyword));
                path.push(PathSegment::from(i));
                let mut node = self.node(sub, path, false);
                path.pop();
                path.pop();

                for (ui_key, schema_key) in [(keys::TITLE, "title"), (keys::DESCRIPTION, "description")] {
                    if !node.get(ui_key).is_some_and(truthy) {
                        let text = sub.get(schema_key).and_then(Value::as_str).unwrap_or("");
                        node.insert(ui_key.into(), json!(text));
                    }
                }
                Value::Object(node)
            })
            .collect()
    }

    fn set_widget(&self, ui: &mut Map<String, Value>, widget: &str) {
        ui.insert(keys::WIDGET.into(), json!(widget));
        for (key, value) in widget_defaults(widget) {
            if !self.has_option(ui, key) {
                self.put_option(ui, key, value);
            }
        }
    }

    /// Write a derived extra as `ui:<key>` or `ui:options.<key>`.
    fn put_option(&self, ui: &mut Map<String, Value>, key: &str, value: Value) {
        if self.options.use_ui_options_wrapper {
            let bag = ui
                .entry(keys::OPTIONS)
                .or_insert_with(|| Value::Object(Map::new()));
            if !bag.is_object() {
                *bag = Value::Object(Map::new());
            }
            if let Value::Object(bag) = bag {
                bag.insert(key.to_string(), value);
            }
        } else {
            ui.insert(format!("{}{}", keys::PREFIX, key), value);
        }
    }

    fn has_option(&self, ui: &Map<String, Value>, key: &str) -> bool {
        if self.options.use_ui_options_wrapper {
            ui.get(keys::OPTIONS).and_then(|bag| bag.get(key)).is_some()
        } else {
            ui.contains_key(&format!("{}{}", keys::PREFIX, key))
        }
    }
}

/// Stamp `ui:fieldType` and `ui:emptyValue` on a node carrying a widget.
///
/// A widget that is not legal for the field type is replaced by the
/// catalog's first entry for that type.
fn stamp_field_type(schema: &Value, ui: &mut Map<String, Value>, path: &[PathSegment]) {
    let field_type = classify(schema);
    let widget = ui.get(keys::WIDGET).and_then(Value::as_str).unwrap_or_default();
    if !is_allowed(field_type, widget) {
        let fallback = allowed_widgets(field_type)[0];
        log::warn!(
            "widget \"{}\" at {} is not allowed for {}, using \"{}\"",
            widget,
            pointer_string(path),
            field_type,
            fallback
        );
        ui.insert(keys::WIDGET.into(), json!(fallback));
    }
    ui.insert(keys::FIELD_TYPE.into(), json!(field_type.as_str()));
    let empty = match schema.get("default") {
        Some(Value::Null) | None => json!(""),
        Some(default) => default.clone(),
    };
    ui.insert(keys::EMPTY_VALUE.into(), empty);
}

/// Copy an items node's keys onto its array node. `ui:options` bags merge.
fn splice(ui: &mut Map<String, Value>, items_ui: Map<String, Value>) {
    for (key, value) in items_ui {
        if key == keys::OPTIONS {
            if let (Some(Value::Object(existing)), Value::Object(incoming)) = (ui.get_mut(&key), &value) {
                existing.extend(incoming.clone());
                continue;
            }
        }
        ui.insert(key, value);
    }
}

fn textarea_rows(schema: &Value) -> u64 {
    if let Some(rows) = schema.get("rows").and_then(Value::as_u64).filter(|r| *r > 0) {
        return rows;
    }
    let min_length = schema.get("minLength").and_then(Value::as_u64).filter(|n| *n > 0);
    let max_length = schema.get("maxLength").and_then(Value::as_u64).filter(|n| *n > 0);
    if min_length.is_some() || max_length.is_some() {
        min_length.unwrap_or(3).clamp(3, 10)
    } else {
        5
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Loose truthiness for optional schema hints (`hidden`, `help`, ...).
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
