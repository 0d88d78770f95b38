//! Declared field types for attribute schemas.
//!
//! This module defines `FieldType`, the closed set of property types a record
//! type can declare, plus an open fallback for type names this crate does not
//! know about. The wire name of every type round-trips exactly.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declared type of an attribute.
///
/// # YAML Format
///
/// Types are always plain strings:
/// ```yaml
/// property_type: singlechar
/// property_type: enum
/// property_type: objuser
/// ```
///
/// Unrecognized names are kept verbatim in [`FieldType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Short text
    SingleChar,

    /// Long text
    LongChar,

    /// Integer
    Int,

    /// Floating point number
    Float,

    /// Enumeration with a list of choices in the option payload
    Enum,

    /// Calendar date
    Date,

    /// Time of day
    Time,

    /// Reference to one or more users
    User,

    /// Association with many instances of another object
    MultiAsst,

    /// IANA timezone name
    TimeZone,

    /// Boolean
    Bool,

    /// Any type name not covered above
    Other(String),
}

impl FieldType {
    /// The wire name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SingleChar => "singlechar",
            Self::LongChar => "longchar",
            Self::Int => "int",
            Self::Float => "float",
            Self::Enum => "enum",
            Self::Date => "date",
            Self::Time => "time",
            Self::User => "objuser",
            Self::MultiAsst => "multiasst",
            Self::TimeZone => "timezone",
            Self::Bool => "bool",
            Self::Other(name) => name,
        }
    }

    /// Resolve a wire name. Never fails; unknown names become [`FieldType::Other`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "singlechar" => Self::SingleChar,
            "longchar" => Self::LongChar,
            "int" => Self::Int,
            "float" => Self::Float,
            "enum" => Self::Enum,
            "date" => Self::Date,
            "time" => Self::Time,
            "objuser" => Self::User,
            "multiasst" => Self::MultiAsst,
            "timezone" => Self::TimeZone,
            "bool" => Self::Bool,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether values of this type are stored as text.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::SingleChar | Self::LongChar)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;

        struct FieldTypeVisitor;

        impl Visitor<'_> for FieldTypeVisitor {
            type Value = FieldType;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a field type name")
            }

            fn visit_str<E>(self, value: &str) -> Result<FieldType, E>
            where
                E: serde::de::Error,
            {
                Ok(FieldType::from_name(value))
            }
        }

        deserializer.deserialize_str(FieldTypeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_roundtrip() {
        let all = [
            FieldType::SingleChar,
            FieldType::LongChar,
            FieldType::Int,
            FieldType::Float,
            FieldType::Enum,
            FieldType::Date,
            FieldType::Time,
            FieldType::User,
            FieldType::MultiAsst,
            FieldType::TimeZone,
            FieldType::Bool,
        ];
        for field_type in all {
            assert_eq!(FieldType::from_name(field_type.as_str()), field_type);
        }
    }

    #[test]
    fn test_unknown_name_is_preserved() {
        let field_type = FieldType::from_name("organization");
        assert_eq!(field_type, FieldType::Other("organization".to_string()));
        assert_eq!(field_type.to_string(), "organization");
    }

    #[test]
    fn test_yaml_serde() {
        let parsed: Vec<FieldType> = serde_yaml::from_str("[objuser, bool, list]").unwrap();
        assert_eq!(
            parsed,
            vec![
                FieldType::User,
                FieldType::Bool,
                FieldType::Other("list".to_string())
            ]
        );

        let yaml = serde_yaml::to_string(&FieldType::MultiAsst).unwrap();
        assert_eq!(yaml.trim(), "multiasst");
    }
}
