//! BSON boundary conversions.
//!
//! Schema metadata and records read through a MongoDB driver arrive as
//! [`bson::Bson`] values. This module classifies them into the same
//! [`RawOption`] and [`Record`] shapes the JSON path produces, so nothing
//! downstream needs to know which driver shape it was handed.

use crate::option::{OptionFields, RawElement, RawOption};
use crate::values::Record;
use bson::{Bson, Document};

impl OptionFields for Document {
    fn string_field(&self, key: &str) -> String {
        self.get_str(key).unwrap_or_default().to_string()
    }

    fn bool_field(&self, key: &str) -> bool {
        self.get_bool(key).unwrap_or(false)
    }
}

impl From<Bson> for RawElement {
    fn from(value: Bson) -> Self {
        match value {
            Bson::Document(doc) => Self::Document(doc),
            other => Self::Other(other.into_relaxed_extjson()),
        }
    }
}

impl From<Bson> for RawOption {
    fn from(value: Bson) -> Self {
        match value {
            Bson::Null | Bson::Undefined => Self::Null,
            Bson::String(s) => Self::Text(s),
            Bson::Array(items) => Self::Sequence(items.into_iter().map(RawElement::from).collect()),
            Bson::Document(doc) => Self::Document(doc),
            other => Self::Unsupported(other.into_relaxed_extjson()),
        }
    }
}

/// Convert a driver-native document into a record.
///
/// Values use relaxed extended JSON, so ObjectIds become `{"$oid": ...}`
/// and dates become `{"$date": ...}`.
pub fn record_from_document(doc: Document) -> Record {
    doc.into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::parse_int_option;
    use crate::values::IntOption;
    use bson::doc;
    use serde_json::json;

    #[test]
    fn test_bson_classification() {
        assert_eq!(RawOption::from(Bson::Null), RawOption::Null);
        assert_eq!(
            RawOption::from(Bson::String("x".to_string())),
            RawOption::Text("x".to_string())
        );
        assert!(matches!(
            RawOption::from(Bson::Document(doc! { "min": "1" })),
            RawOption::Document(_)
        ));
        assert!(matches!(
            RawOption::from(Bson::Int32(3)),
            RawOption::Unsupported(_)
        ));
    }

    #[test]
    fn test_bson_array_elements() {
        let raw = RawOption::from(Bson::Array(vec![
            Bson::Document(doc! { "id": "a" }),
            Bson::Int64(1),
        ]));

        let RawOption::Sequence(items) = raw else {
            panic!("expected a sequence");
        };
        assert!(matches!(items[0], RawElement::Document(_)));
        assert_eq!(items[1], RawElement::Other(json!(1)));
    }

    #[test]
    fn test_document_string_fields_ignore_wrong_types() {
        let doc = doc! { "min": 1, "max": "9" };
        assert_eq!(
            parse_int_option(&RawOption::Document(doc)),
            IntOption::new("", "9")
        );
    }

    #[test]
    fn test_record_from_document() {
        let record = record_from_document(doc! {
            "bk_inst_name": "host-1",
            "bk_cpu": 8_i32,
            "bk_enabled": true,
            "tags": ["a", "b"],
        });

        assert_eq!(record["bk_inst_name"], json!("host-1"));
        assert_eq!(record["bk_cpu"], json!(8));
        assert_eq!(record["bk_enabled"], json!(true));
        assert_eq!(record["tags"], json!(["a", "b"]));
    }
}
