//! Record and option value representations.
//!
//! Records are loosely typed JSON maps. Option payloads decode into the
//! strongly typed [`EnumOption`] and [`IntOption`] defined here.

use serde::{Deserialize, Serialize};

/// A single record: field identifier to arbitrary JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// One choice of an enum attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumVal {
    /// Choice identifier, the value stored in records
    #[serde(default)]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Type tag of the choice
    #[serde(default, rename = "type")]
    pub val_type: String,

    /// Whether this choice is the attribute's default
    #[serde(default)]
    pub is_default: bool,
}

impl EnumVal {
    /// Create a non-default choice.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            val_type: "text".to_string(),
            is_default: false,
        }
    }

    /// Mark this choice as the default.
    pub fn default_choice(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Ordered list of enum choices.
///
/// Nothing enforces a single default; [`EnumOption::get_default`] resolves
/// ties by taking the first flagged entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumOption(pub Vec<EnumVal>);

impl EnumOption {
    /// First entry flagged as default, in sequence order.
    pub fn get_default(&self) -> Option<&EnumVal> {
        self.0.iter().find(|val| val.is_default)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnumVal> {
        self.0.iter()
    }
}

impl From<Vec<EnumVal>> for EnumOption {
    fn from(values: Vec<EnumVal>) -> Self {
        Self(values)
    }
}

/// Integer range bounds.
///
/// Bounds are the literal text from the option payload and are never parsed,
/// so `"1.50"` stays `"1.50"`. An empty string means the bound is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntOption {
    #[serde(default)]
    pub min: String,
    #[serde(default)]
    pub max: String,
}

impl IntOption {
    pub fn new(min: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Both bounds absent.
    pub fn is_unbounded(&self) -> bool {
        self.min.is_empty() && self.max.is_empty()
    }
}
