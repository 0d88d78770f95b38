//! Structural checks and type coercion for incoming records.
//!
//! Coercion only repairs representation (a numeric string for an `int`
//! field becomes a number). It never enforces enum membership or ranges.

use serde_json::{Number, Value};
use sync_core::{FieldType, ObjectSchema, Record};

use super::error::RecordError;

/// Name of a JSON value's kind, for diagnostics.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Display form of a record's identity, `?` when absent.
pub(crate) fn identity_label(record: &Record, id_field: &str) -> String {
    match record.get(id_field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "?".to_string(),
    }
}

/// Check the record's structure and coerce declared fields in place.
pub(crate) fn normalize_record(record: &mut Record, schema: &ObjectSchema) -> Result<(), RecordError> {
    if record.is_empty() {
        return Err(RecordError::Empty);
    }

    match record.get(&schema.id_field) {
        None | Some(Value::Null) => {
            return Err(RecordError::MissingIdentity {
                field: schema.id_field.clone(),
            })
        }
        Some(Value::String(s)) if s.is_empty() => {
            return Err(RecordError::MissingIdentity {
                field: schema.id_field.clone(),
            })
        }
        Some(Value::String(_)) | Some(Value::Number(_)) => {}
        Some(other) => {
            return Err(RecordError::InvalidIdentity {
                field: schema.id_field.clone(),
                found: value_kind(other),
            })
        }
    }

    for attribute in &schema.attributes {
        let Some(value) = record.get_mut(&attribute.property_id) else {
            continue;
        };
        match coerce(value, &attribute.property_type) {
            Ok(Some(coerced)) => *value = coerced,
            Ok(None) => {}
            Err(found) => {
                return Err(RecordError::TypeMismatch {
                    field: attribute.property_id.clone(),
                    expected: attribute.property_type.clone(),
                    found,
                })
            }
        }
    }

    Ok(())
}

/// Coerce one value to its declared type.
///
/// `Ok(None)` keeps the value as is, `Ok(Some(_))` replaces it, and `Err`
/// carries the kind of the incompatible value.
fn coerce(value: &Value, field_type: &FieldType) -> Result<Option<Value>, &'static str> {
    if value.is_null() {
        return Ok(None);
    }

    match field_type {
        FieldType::SingleChar | FieldType::LongChar => match value {
            Value::String(_) => Ok(None),
            Value::Number(n) => Ok(Some(Value::String(n.to_string()))),
            Value::Bool(b) => Ok(Some(Value::String(b.to_string()))),
            other => Err(value_kind(other)),
        },
        FieldType::Int => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(None),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(|i| Some(Value::Number(i.into())))
                .map_err(|_| "string"),
            other => Err(value_kind(other)),
        },
        FieldType::Float => match value {
            Value::Number(_) => Ok(None),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(|n| Some(Value::Number(n)))
                .ok_or("string"),
            other => Err(value_kind(other)),
        },
        FieldType::Bool => match value {
            Value::Bool(_) => Ok(None),
            Value::String(s) if s == "true" => Ok(Some(Value::Bool(true))),
            Value::String(s) if s == "false" => Ok(Some(Value::Bool(false))),
            other => Err(value_kind(other)),
        },
        FieldType::Enum => match value {
            Value::String(_) => Ok(None),
            Value::Number(n) => Ok(Some(Value::String(n.to_string()))),
            other => Err(value_kind(other)),
        },
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sync_core::AttributeSchema;

    fn host_schema() -> ObjectSchema {
        ObjectSchema::new(
            "host",
            "bk_host_id",
            vec![
                AttributeSchema::new("bk_host_name", FieldType::SingleChar),
                AttributeSchema::new("bk_cpu", FieldType::Int),
                AttributeSchema::new("bk_mem", FieldType::Float),
                AttributeSchema::new("bk_is_vm", FieldType::Bool),
                AttributeSchema::new("bk_state", FieldType::Enum),
                AttributeSchema::new("operator", FieldType::User),
            ],
        )
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_coercion_repairs_representation() {
        let mut rec = record(json!({
            "bk_host_id": 7,
            "bk_host_name": 1001,
            "bk_cpu": " 16 ",
            "bk_mem": "31.5",
            "bk_is_vm": "false",
            "bk_state": 2,
            "operator": ["alice"],
        }));

        normalize_record(&mut rec, &host_schema()).unwrap();

        assert_eq!(rec["bk_host_name"], json!("1001"));
        assert_eq!(rec["bk_cpu"], json!(16));
        assert_eq!(rec["bk_mem"], json!(31.5));
        assert_eq!(rec["bk_is_vm"], json!(false));
        assert_eq!(rec["bk_state"], json!("2"));
        assert_eq!(rec["operator"], json!(["alice"]));
    }

    #[test]
    fn test_nulls_and_unknown_fields_pass() {
        let mut rec = record(json!({
            "bk_host_id": "h-1",
            "bk_cpu": null,
            "extra": {"nested": true},
        }));
        normalize_record(&mut rec, &host_schema()).unwrap();
        assert_eq!(rec["bk_cpu"], Value::Null);
    }

    #[test]
    fn test_type_mismatch() {
        let cases = [
            (json!({"bk_host_id": 1, "bk_cpu": "sixteen"}), "bk_cpu", "string"),
            (json!({"bk_host_id": 1, "bk_cpu": 1.5}), "bk_cpu", "float"),
            (json!({"bk_host_id": 1, "bk_is_vm": 1}), "bk_is_vm", "integer"),
            (json!({"bk_host_id": 1, "bk_host_name": {"a": 1}}), "bk_host_name", "object"),
            (json!({"bk_host_id": 1, "bk_mem": "lots"}), "bk_mem", "string"),
        ];

        for (value, field_name, kind) in cases {
            let err = normalize_record(&mut record(value), &host_schema()).unwrap_err();
            assert!(
                matches!(err, RecordError::TypeMismatch { ref field, found, .. } if field == field_name && found == kind),
                "unexpected error for {field_name}: {err}"
            );
        }
    }

    #[test]
    fn test_identity_checks() {
        let schema = host_schema();

        let err = normalize_record(&mut Record::new(), &schema).unwrap_err();
        assert!(matches!(err, RecordError::Empty));

        let err = normalize_record(&mut record(json!({"bk_cpu": 1})), &schema).unwrap_err();
        assert!(matches!(err, RecordError::MissingIdentity { .. }));

        let err = normalize_record(&mut record(json!({"bk_host_id": ""})), &schema).unwrap_err();
        assert!(matches!(err, RecordError::MissingIdentity { .. }));

        let err = normalize_record(&mut record(json!({"bk_host_id": [1]})), &schema).unwrap_err();
        assert!(matches!(err, RecordError::InvalidIdentity { found: "array", .. }));
    }

    #[test]
    fn test_identity_label() {
        assert_eq!(identity_label(&record(json!({"id": 3})), "id"), "3");
        assert_eq!(identity_label(&record(json!({"id": "h"})), "id"), "h");
        assert_eq!(identity_label(&record(json!({"id": null})), "id"), "?");
        assert_eq!(identity_label(&Record::new(), "id"), "?");
    }
}
