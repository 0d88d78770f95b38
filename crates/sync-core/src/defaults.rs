//! Default-value injection for records.
//!
//! Defaults are type-class policy: every attribute of a given declared type
//! gets the same placeholder, except enums, which use their default choice
//! when one is flagged. The policy per type lives in a [`DefaultTable`].

use crate::option::{OptionCodec, OptionError};
use crate::schema::AttributeSchema;
use crate::types::FieldType;
use crate::values::Record;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Structural field linking a record to its children. Never defaulted.
pub const CHILD_FIELD: &str = "bk_childid";

/// Structural field linking a record to its parent. Never defaulted.
pub const PARENT_FIELD: &str = "bk_parentid";

/// Whether a field id is one of the structural linkage fields.
pub fn is_structural_field(property_id: &str) -> bool {
    property_id == CHILD_FIELD || property_id == PARENT_FIELD
}

/// Error type for default-filling.
#[derive(Debug, thiserror::Error)]
pub enum DefaultsError {
    #[error("Invalid option for enum property '{property_id}': {source}")]
    InvalidEnumOption {
        property_id: String,
        #[source]
        source: OptionError,
    },
}

/// Placeholder chosen for a missing attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultPolicy {
    /// `""`
    EmptyString,
    /// `null`
    Null,
    /// `false`
    False,
    /// The id of the enum's first default choice, or `null`
    EnumDefault,
}

/// Lookup table from declared type to default policy.
///
/// Types missing from the table fall back to [`DefaultPolicy::Null`].
#[derive(Debug, Clone)]
pub struct DefaultTable {
    policies: HashMap<FieldType, DefaultPolicy>,
}

impl Default for DefaultTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl DefaultTable {
    /// The standard policy for every built-in type.
    pub fn standard() -> Self {
        use DefaultPolicy::*;

        let policies = [
            (FieldType::SingleChar, EmptyString),
            (FieldType::LongChar, EmptyString),
            (FieldType::Int, Null),
            (FieldType::Float, Null),
            (FieldType::Enum, EnumDefault),
            (FieldType::Date, Null),
            (FieldType::Time, Null),
            (FieldType::User, Null),
            (FieldType::MultiAsst, Null),
            (FieldType::TimeZone, Null),
            (FieldType::Bool, False),
        ]
        .into_iter()
        .collect();

        Self { policies }
    }

    /// Override the policy for one type.
    pub fn with(mut self, field_type: FieldType, policy: DefaultPolicy) -> Self {
        self.policies.insert(field_type, policy);
        self
    }

    pub fn policy_for(&self, field_type: &FieldType) -> DefaultPolicy {
        self.policies
            .get(field_type)
            .copied()
            .unwrap_or(DefaultPolicy::Null)
    }
}

/// Fields injected by one [`DefaultValueFiller::fill_missing_fields`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Property ids that received a default, in schema order
    pub filled: Vec<String>,
}

/// Injects type-appropriate defaults for attributes absent from a record.
#[derive(Debug, Clone, Default)]
pub struct DefaultValueFiller {
    codec: OptionCodec,
    table: DefaultTable,
}

impl DefaultValueFiller {
    pub fn new(codec: OptionCodec, table: DefaultTable) -> Self {
        Self { codec, table }
    }

    pub fn with_codec(codec: OptionCodec) -> Self {
        Self::new(codec, DefaultTable::standard())
    }

    /// Ensure every declared attribute is present in `record`.
    ///
    /// Keys already in the record are never touched, even when their value is
    /// null or empty. Structural linkage fields and `ignore_fields` are skipped.
    /// Fails only when the codec's strict policy rejects an enum option.
    pub fn fill_missing_fields(
        &self,
        record: &mut Record,
        attributes: &[AttributeSchema],
        ignore_fields: &[String],
    ) -> Result<FillReport, DefaultsError> {
        let ignores: HashSet<&str> = ignore_fields.iter().map(String::as_str).collect();
        let mut report = FillReport::default();

        for attribute in attributes {
            let property_id = attribute.property_id.as_str();
            if is_structural_field(property_id) || ignores.contains(property_id) {
                continue;
            }
            if record.contains_key(property_id) {
                continue;
            }

            let value = self.default_for(attribute)?;
            tracing::trace!(property_id, value = %value, "Filled missing field");
            record.insert(property_id.to_string(), value);
            report.filled.push(property_id.to_string());
        }

        Ok(report)
    }

    /// The default value for one attribute.
    pub fn default_for(&self, attribute: &AttributeSchema) -> Result<Value, DefaultsError> {
        let value = match self.table.policy_for(&attribute.property_type) {
            DefaultPolicy::EmptyString => Value::String(String::new()),
            DefaultPolicy::Null => Value::Null,
            DefaultPolicy::False => Value::Bool(false),
            DefaultPolicy::EnumDefault => {
                let choices = self
                    .codec
                    .parse_enum_option(&attribute.option)
                    .map_err(|source| DefaultsError::InvalidEnumOption {
                        property_id: attribute.property_id.clone(),
                        source,
                    })?;
                choices
                    .get_default()
                    .map(|choice| Value::String(choice.id.clone()))
                    .unwrap_or(Value::Null)
            }
        };
        Ok(value)
    }
}
