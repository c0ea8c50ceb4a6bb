//! Rewriting generated JSON schemas for strict structured outputs.
//!
//! Strict mode requires:
//! 1. `additionalProperties: false` on every object schema
//! 2. every property listed in `required`, even nullable ones
//! 3. fully inlined schemas (no `$ref`)
//! 4. no `format` on non-string types (schemars emits `double`, `int64`, ...)

use serde_json::{Map, Value};

/// Rewrite a `schemars` schema so a strict structured-output endpoint accepts it.
pub fn to_strict_schema(schema: &Value) -> Value {
    let mut value = schema.clone();

    close_objects(&mut value);
    inline_refs(&mut value);
    strip_numeric_formats(&mut value);

    if let Value::Object(map) = &mut value {
        map.remove("definitions");
        map.remove("$schema");
    }

    value
}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if is_type(map, "object") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));

                let keys = match map.get("properties") {
                    Some(Value::Object(props)) => Some(
                        props
                            .keys()
                            .map(|k| Value::String(k.clone()))
                            .collect::<Vec<_>>(),
                    ),
                    _ => None,
                };
                if let Some(keys) = keys {
                    map.insert("required".to_string(), Value::Array(keys));
                }
            }

            for (_, v) in map.iter_mut() {
                close_objects(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

fn inline_refs(value: &mut Value) {
    let definitions = match value {
        Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };

    if let Some(definitions) = definitions {
        inline_refs_with(value, &definitions);
    }
}

fn inline_refs_with(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|path| path.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(mut inlined) = target {
                inline_refs_with(&mut inlined, definitions);
                *value = inlined;
                return;
            }

            for (_, v) in map.iter_mut() {
                inline_refs_with(v, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs_with(item, definitions);
            }
        }
        _ => {}
    }
}

fn strip_numeric_formats(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("format").is_some_and(Value::is_string) && !is_type(map, "string") {
                map.remove("format");
            }
            for (_, v) in map.iter_mut() {
                strip_numeric_formats(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_numeric_formats),
        _ => {}
    }
}

/// `type` is either a name or a list of names (`["number", "null"]`).
fn is_type(map: &Map<String, Value>, name: &str) -> bool {
    match map.get("type") {
        Some(Value::String(t)) => t == name,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(name)),
        _ => false,
    }
}
