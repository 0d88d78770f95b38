//! Option payload decoding.
//!
//! An attribute's `option` payload arrives in several encodings depending on
//! the call path: already typed, as a JSON-encoded string, as a generic
//! decoded map/sequence, or as a driver-native BSON document. The payload is
//! classified once into [`RawOption`] at the boundary, and each encoding kind
//! has its own decode arm in [`OptionCodec`].
//!
//! Decoding is lenient by default. Option payloads are advisory metadata, so
//! a malformed enum definition degrades to "no choices" and is reported only
//! through a `tracing` event. [`EnumDecodePolicy::Strict`] turns that case
//! into an [`OptionError`] instead.

use crate::values::{EnumOption, EnumVal, IntOption};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;
use std::collections::HashMap;

/// Error type for option decoding.
#[derive(Debug, thiserror::Error)]
pub enum OptionError {
    /// The enum option string is not a JSON list of choices
    #[error("Malformed enum option {raw:?}: {source}")]
    MalformedEnum {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw option payload, classified by encoding kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RawOption {
    /// No payload
    #[default]
    Null,

    /// String payload, usually JSON-encoded
    Text(String),

    /// Already decoded enum choices
    Enum(EnumOption),

    /// Generic sequence of untyped elements
    Sequence(Vec<RawElement>),

    /// Generic string-keyed mapping
    Mapping(serde_json::Map<String, Value>),

    /// Driver-native mapping
    Document(bson::Document),

    /// Any other shape (numbers, booleans)
    Unsupported(Value),
}

/// Element of a generic [`RawOption::Sequence`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawElement {
    /// String-keyed JSON map
    Map(serde_json::Map<String, Value>),

    /// Driver-native document
    Document(bson::Document),

    /// Anything else; ignored by the decoders
    Other(Value),
}

impl From<Value> for RawElement {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Map(map),
            other => Self::Other(other),
        }
    }
}

impl From<RawElement> for Value {
    fn from(element: RawElement) -> Self {
        match element {
            RawElement::Map(map) => Value::Object(map),
            RawElement::Document(doc) => bson::Bson::Document(doc).into_relaxed_extjson(),
            RawElement::Other(value) => value,
        }
    }
}

impl From<Value> for RawOption {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(RawElement::from).collect()),
            Value::Object(map) => Self::Mapping(map),
            other => Self::Unsupported(other),
        }
    }
}

impl From<RawOption> for Value {
    fn from(option: RawOption) -> Self {
        match option {
            RawOption::Null => Value::Null,
            RawOption::Text(s) => Value::String(s),
            RawOption::Enum(values) => Value::Array(
                values
                    .0
                    .into_iter()
                    .map(|val| {
                        serde_json::json!({
                            "id": val.id,
                            "name": val.name,
                            "type": val.val_type,
                            "is_default": val.is_default,
                        })
                    })
                    .collect(),
            ),
            RawOption::Sequence(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            RawOption::Mapping(map) => Value::Object(map),
            RawOption::Document(doc) => bson::Bson::Document(doc).into_relaxed_extjson(),
            RawOption::Unsupported(value) => value,
        }
    }
}

impl From<EnumOption> for RawOption {
    fn from(values: EnumOption) -> Self {
        Self::Enum(values)
    }
}

impl From<&str> for RawOption {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl RawOption {
    /// Nil or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// Read access shared by every string-keyed element encoding.
///
/// Missing or wrong-typed string fields read as `""`, bool fields as `false`.
pub(crate) trait OptionFields {
    fn string_field(&self, key: &str) -> String;
    fn bool_field(&self, key: &str) -> bool;

    fn to_enum_val(&self) -> EnumVal {
        EnumVal {
            id: self.string_field("id"),
            name: self.string_field("name"),
            val_type: self.string_field("type"),
            is_default: self.bool_field("is_default"),
        }
    }
}

impl OptionFields for serde_json::Map<String, Value> {
    fn string_field(&self, key: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn bool_field(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// What to do with an enum option string that is not valid JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumDecodePolicy {
    /// Log the failure and treat the option as having no choices
    #[default]
    Lenient,

    /// Return [`OptionError::MalformedEnum`]
    Strict,
}

impl std::str::FromStr for EnumDecodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            _ => Err(format!(
                "Invalid enum decode policy: '{s}'. Expected 'lenient' or 'strict'"
            )),
        }
    }
}

/// Decoder for option payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionCodec {
    policy: EnumDecodePolicy,
}

impl OptionCodec {
    pub fn new(policy: EnumDecodePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> EnumDecodePolicy {
        self.policy
    }

    /// Decode an enum option payload.
    ///
    /// Only a malformed JSON string under [`EnumDecodePolicy::Strict`] can
    /// fail. Every other unrecognized shape decodes to an empty option.
    pub fn parse_enum_option(&self, raw: &RawOption) -> Result<EnumOption, OptionError> {
        if raw.is_blank() {
            return Ok(EnumOption::default());
        }

        match raw {
            RawOption::Enum(values) => Ok(values.clone()),
            RawOption::Text(s) => self.decode_enum_text(s),
            RawOption::Sequence(items) => Ok(decode_enum_sequence(items)),
            _ => Ok(EnumOption::default()),
        }
    }

    fn decode_enum_text(&self, s: &str) -> Result<EnumOption, OptionError> {
        match serde_json::from_str::<Option<EnumOption>>(s) {
            Ok(values) => Ok(values.unwrap_or_default()),
            Err(source) => match self.policy {
                EnumDecodePolicy::Lenient => {
                    tracing::warn!(
                        error = %source,
                        raw = s,
                        "Malformed enum option, treating it as having no choices"
                    );
                    Ok(EnumOption::default())
                }
                EnumDecodePolicy::Strict => Err(OptionError::MalformedEnum {
                    raw: s.to_string(),
                    source,
                }),
            },
        }
    }
}

fn decode_enum_sequence(items: &[RawElement]) -> EnumOption {
    items
        .iter()
        .filter_map(|item| match item {
            RawElement::Map(map) => Some(map.to_enum_val()),
            RawElement::Document(doc) => Some(doc.to_enum_val()),
            RawElement::Other(_) => None,
        })
        .collect::<Vec<_>>()
        .into()
}

/// Decode an enum option payload, lenient on malformed input.
pub fn parse_enum_option(raw: &RawOption) -> EnumOption {
    OptionCodec::default()
        .parse_enum_option(raw)
        .unwrap_or_default()
}

/// Decode an integer range option payload. Never fails.
///
/// For string payloads the bounds keep the literal text found in the JSON,
/// with string literals unquoted. Malformed JSON yields empty bounds.
pub fn parse_int_option(raw: &RawOption) -> IntOption {
    if raw.is_blank() {
        return IntOption::default();
    }

    match raw {
        RawOption::Text(s) => decode_int_text(s),
        RawOption::Mapping(map) => IntOption {
            min: map.string_field("min"),
            max: map.string_field("max"),
        },
        RawOption::Document(doc) => IntOption {
            min: doc.string_field("min"),
            max: doc.string_field("max"),
        },
        _ => IntOption::default(),
    }
}

fn decode_int_text(s: &str) -> IntOption {
    let fields: HashMap<String, Box<RawValue>> = match serde_json::from_str(s) {
        Ok(fields) => fields,
        Err(e) => {
            tracing::debug!(error = %e, raw = s, "Int option is not a JSON object");
            return IntOption::default();
        }
    };

    IntOption {
        min: literal_text(fields.get("min")),
        max: literal_text(fields.get("max")),
    }
}

fn literal_text(raw: Option<&Box<RawValue>>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let text = raw.get().trim();
    if text.starts_with('"') {
        serde_json::from_str::<String>(text).unwrap_or_default()
    } else if text == "null" {
        String::new()
    } else {
        text.to_string()
    }
}
