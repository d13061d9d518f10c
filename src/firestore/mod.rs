pub mod auth;
pub mod client;

use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// One delivery from the document store: every document in the watched set.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub name: String,
    pub fields: Map<String, Value>,
}

impl Snapshot {
    pub fn single(document: Document) -> Self {
        Self {
            documents: vec![document],
        }
    }
}

/// REST representation of a Firestore document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDocument {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub update_time: Option<String>,
}

impl RawDocument {
    pub fn into_document(self) -> Document {
        let fields = self
            .fields
            .into_iter()
            .map(|(key, value)| (key, decode_value(&value)))
            .collect();
        Document {
            name: self.name,
            fields,
        }
    }
}

/// Convert a Firestore typed value (`{"stringValue": "on"}`) into plain JSON.
pub fn decode_value(typed: &Value) -> Value {
    let Some((kind, inner)) = typed.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };

    match kind.as_str() {
        "stringValue" | "booleanValue" | "timestampValue" | "referenceValue" => inner.clone(),
        "nullValue" => Value::Null,
        // int64 travels as a decimal string
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .unwrap_or(Value::Null),
            other => other.clone(),
        },
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "mapValue" => {
            let fields: Map<String, Value> = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(k, v)| (k.clone(), decode_value(v)))
                        .collect()
                })
                .unwrap_or_default();
            Value::Object(fields)
        }
        "arrayValue" => {
            let values: Vec<Value> = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default();
            Value::Array(values)
        }
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_scalar_values() {
        assert_eq!(decode_value(&json!({"stringValue": "On"})), json!("On"));
        assert_eq!(decode_value(&json!({"booleanValue": true})), json!(true));
        assert_eq!(decode_value(&json!({"integerValue": "42"})), json!(42));
        assert_eq!(decode_value(&json!({"doubleValue": 21.5})), json!(21.5));
        assert_eq!(decode_value(&json!({"nullValue": null})), Value::Null);
        assert_eq!(
            decode_value(&json!({"timestampValue": "2024-01-01T00:00:00Z"})),
            json!("2024-01-01T00:00:00Z")
        );
        assert_eq!(decode_value(&json!({"geoPointValue": {"latitude": 1.0}})), Value::Null);
    }

    #[test]
    fn decodes_nested_values() {
        let typed = json!({
            "mapValue": {"fields": {
                "lines": {"arrayValue": {"values": [
                    {"stringValue": "a"},
                    {"integerValue": "2"}
                ]}},
                "empty": {"arrayValue": {}}
            }}
        });
        assert_eq!(decode_value(&typed), json!({"lines": ["a", 2], "empty": []}));
    }

    #[test]
    fn raw_document_flattens_fields() {
        let raw: RawDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/houses/demo",
            "fields": {
                "fan": {"stringValue": "on"},
                "door": {"stringValue": "close"},
                "ledTextDisplay": {"stringValue": "Hi"}
            },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-02T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(raw.update_time.as_deref(), Some("2024-01-02T00:00:00Z"));

        let doc = raw.into_document();
        assert_eq!(doc.fields.get("fan"), Some(&json!("on")));
        assert_eq!(doc.fields.get("ledTextDisplay"), Some(&json!("Hi")));
    }

    #[test]
    fn document_without_fields_is_empty() {
        let raw: RawDocument = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert!(raw.into_document().fields.is_empty());
    }
}
