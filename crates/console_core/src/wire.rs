use serde_json::Value;

/// Removes the `{"type": ..., "value": ...}` envelopes the backend wraps
/// around every field of a richly-typed response.
///
/// An object is treated as an envelope exactly when it carries both a
/// `type` and a `value` key; it is replaced by its stripped `value`, which
/// drops sibling metadata such as `age`. All other objects and arrays are
/// stripped element by element, scalars pass through unchanged.
pub fn strip_type_info(value: Value) -> Value {
    match value {
        Value::Object(mut fields) => {
            if fields.contains_key("type") && fields.contains_key("value") {
                let inner = fields.remove("value").unwrap_or(Value::Null);
                strip_type_info(inner)
            } else {
                Value::Object(
                    fields
                        .into_iter()
                        .map(|(key, field)| (key, strip_type_info(field)))
                        .collect(),
                )
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(strip_type_info).collect()),
        other => other,
    }
}
