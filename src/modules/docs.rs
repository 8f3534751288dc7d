//! Building blocks for module OpenAPI fragments.

use serde_json::{json, Map, Value};
use utoipa::ToSchema;

/// `(name, schema)` for a type deriving [`ToSchema`].
pub(crate) fn schema<T: ToSchema>() -> (String, Value) {
    let schema = serde_json::to_value(T::schema()).unwrap_or(Value::Null);
    (T::name().into_owned(), schema)
}

pub(crate) fn schemas(entries: impl IntoIterator<Item = (String, Value)>) -> Value {
    Value::Object(entries.into_iter().collect::<Map<_, _>>())
}

pub(crate) fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

pub(crate) fn json_body(name: &str) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema_ref(name) } }
    })
}

pub(crate) fn ok(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

pub(crate) fn array_of(name: &str) -> Value {
    json!({ "type": "array", "items": schema_ref(name) })
}

pub(crate) fn error(description: &str) -> Value {
    ok(description, schema_ref("ErrorResponse"))
}

pub(crate) fn no_content(description: &str) -> Value {
    json!({ "description": description })
}

pub(crate) fn path_param(name: &str, kind: &str) -> Value {
    json!({
        "name": name,
        "in": "path",
        "required": true,
        "schema": { "type": kind }
    })
}

pub(crate) fn keyword_param() -> Value {
    json!({
        "name": "keyword",
        "in": "query",
        "required": false,
        "description": "Matched against title, author and genre, ignoring case",
        "schema": { "type": "string" }
    })
}
