//! Attribute schema definitions.
//!
//! ## Type Hierarchy
//!
//! - `AttributeSchema` - One declared field: identifier, type, option payload
//! - `ObjectSchema` - Ordered attributes of one record type plus its identity field
//! - `SchemaCatalog` - Collection of object schemas, loaded from YAML
//!
//! Schemas are defined externally and are read-only here.

use crate::option::RawOption;
use crate::types::FieldType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read schema file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Object not found in catalog
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Same property declared twice in one object
    #[error("Property '{property}' declared more than once in object '{object}'")]
    DuplicateProperty { object: String, property: String },
}

// ============================================================================
// Schema Types
// ============================================================================

/// One field declared by a record type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeSchema {
    /// Field identifier, unique within an object
    #[serde(rename = "bk_property_id")]
    pub property_id: String,

    /// Display name
    #[serde(rename = "bk_property_name", default)]
    pub property_name: String,

    /// Declared type
    #[serde(rename = "bk_property_type")]
    pub property_type: FieldType,

    /// Type-specific option payload (enum choices, integer range)
    #[serde(default)]
    pub option: RawOption,

    /// Informational only, never enforced
    #[serde(rename = "isrequired", default)]
    pub is_required: bool,
}

impl AttributeSchema {
    /// Create an attribute without an option payload.
    pub fn new(property_id: impl Into<String>, property_type: FieldType) -> Self {
        let property_id = property_id.into();
        Self {
            property_name: property_id.clone(),
            property_id,
            property_type,
            option: RawOption::Null,
            is_required: false,
        }
    }

    /// Attach an option payload.
    pub fn with_option(mut self, option: impl Into<RawOption>) -> Self {
        self.option = option.into();
        self
    }
}

fn default_id_field() -> String {
    "id".to_string()
}

/// Attribute schema of one record type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectSchema {
    /// Object (record type) name, also the storage target
    pub name: String,

    /// Field that identifies a record of this type
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Declared attributes, in schema order
    #[serde(default)]
    pub attributes: Vec<AttributeSchema>,
}

impl ObjectSchema {
    pub fn new(
        name: impl Into<String>,
        id_field: impl Into<String>,
        attributes: Vec<AttributeSchema>,
    ) -> Self {
        Self {
            name: name.into(),
            id_field: id_field.into(),
            attributes,
        }
    }

    /// Get an attribute by property id.
    pub fn get_attribute(&self, property_id: &str) -> Option<&AttributeSchema> {
        self.attributes
            .iter()
            .find(|a| a.property_id == property_id)
    }

    /// All property ids in schema order.
    pub fn property_ids(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .map(|a| a.property_id.as_str())
            .collect()
    }

    fn check_unique(&self) -> Result<(), SchemaError> {
        let mut seen = std::collections::HashSet::new();
        for attribute in &self.attributes {
            if !seen.insert(attribute.property_id.as_str()) {
                return Err(SchemaError::DuplicateProperty {
                    object: self.name.clone(),
                    property: attribute.property_id.clone(),
                });
            }
        }
        Ok(())
    }
}

fn default_version() -> u32 {
    1
}

/// Collection of object schemas.
///
/// Loaded from a YAML file:
///
/// ```yaml
/// version: 1
/// objects:
///   - name: host
///     id_field: bk_host_id
///     attributes:
///       - bk_property_id: bk_host_name
///         bk_property_type: singlechar
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCatalog {
    /// Catalog version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Object definitions
    pub objects: Vec<ObjectSchema>,

    /// Cached object lookup (not serialized)
    #[serde(skip)]
    object_map: HashMap<String, usize>,
}

impl SchemaCatalog {
    /// Create a catalog from a list of object schemas.
    pub fn new(objects: Vec<ObjectSchema>) -> Result<Self, SchemaError> {
        let mut catalog = Self {
            version: default_version(),
            objects,
            object_map: HashMap::new(),
        };
        catalog.build_object_map()?;
        Ok(catalog)
    }

    /// Load a catalog from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a catalog from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let mut catalog: SchemaCatalog = serde_yaml::from_str(yaml)?;
        catalog.build_object_map()?;
        Ok(catalog)
    }

    fn build_object_map(&mut self) -> Result<(), SchemaError> {
        for object in &self.objects {
            object.check_unique()?;
        }
        self.object_map = self
            .objects
            .iter()
            .enumerate()
            .map(|(idx, object)| (object.name.clone(), idx))
            .collect();
        Ok(())
    }

    /// Get an object schema by name.
    pub fn get_object(&self, name: &str) -> Option<&ObjectSchema> {
        self.object_map
            .get(name)
            .and_then(|&idx| self.objects.get(idx))
    }

    /// Get an object schema by name, or fail.
    pub fn require_object(&self, name: &str) -> Result<&ObjectSchema, SchemaError> {
        self.get_object(name)
            .ok_or_else(|| SchemaError::ObjectNotFound(name.to_string()))
    }

    /// All object names in the catalog.
    pub fn object_names(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::parse_enum_option;

    const SAMPLE_CATALOG: &str = r#"
version: 1

objects:
  - name: host
    id_field: bk_host_id
    attributes:
      - bk_property_id: bk_host_name
        bk_property_type: singlechar

      - bk_property_id: bk_cpu
        bk_property_type: int
        option: '{"min":"1","max":"256"}'

      - bk_property_id: bk_state
        bk_property_type: enum
        option:
          - id: running
            name: Running
            type: text
            is_default: true
          - id: stopped
            name: Stopped
            type: text

      - bk_property_id: operator
        bk_property_type: objuser

  - name: module
    attributes:
      - bk_property_id: bk_module_name
        bk_property_type: singlechar
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = SchemaCatalog::from_yaml(SAMPLE_CATALOG).unwrap();

        assert_eq!(catalog.version, 1);
        assert_eq!(catalog.object_names(), vec!["host", "module"]);

        let host = catalog.get_object("host").unwrap();
        assert_eq!(host.id_field, "bk_host_id");
        assert_eq!(
            host.property_ids(),
            vec!["bk_host_name", "bk_cpu", "bk_state", "operator"]
        );
        assert_eq!(
            host.get_attribute("operator").unwrap().property_type,
            FieldType::User
        );
    }

    #[test]
    fn test_default_id_field() {
        let catalog = SchemaCatalog::from_yaml(SAMPLE_CATALOG).unwrap();
        assert_eq!(catalog.get_object("module").unwrap().id_field, "id");
    }

    #[test]
    fn test_yaml_enum_option_decodes() {
        let catalog = SchemaCatalog::from_yaml(SAMPLE_CATALOG).unwrap();
        let state = catalog
            .get_object("host")
            .and_then(|h| h.get_attribute("bk_state"))
            .unwrap();

        let choices = parse_enum_option(&state.option);
        assert_eq!(choices.len(), 2);
        assert_eq!(choices.get_default().map(|v| v.id.as_str()), Some("running"));
    }

    #[test]
    fn test_object_not_found() {
        let catalog = SchemaCatalog::from_yaml(SAMPLE_CATALOG).unwrap();
        let result = catalog.require_object("switch");
        assert!(matches!(result, Err(SchemaError::ObjectNotFound(_))));
    }

    #[test]
    fn test_duplicate_property_rejected() {
        let yaml = r#"
objects:
  - name: host
    attributes:
      - bk_property_id: ip
        bk_property_type: singlechar
      - bk_property_id: ip
        bk_property_type: longchar
"#;
        let result = SchemaCatalog::from_yaml(yaml);
        assert!(matches!(
            result,
            Err(SchemaError::DuplicateProperty { .. })
        ));
    }

    #[test]
    fn test_catalog_new_builds_lookup() {
        let catalog = SchemaCatalog::new(vec![ObjectSchema::new(
            "switch",
            "bk_switch_id",
            vec![AttributeSchema::new("bk_vendor", FieldType::SingleChar)],
        )])
        .unwrap();

        assert!(catalog.get_object("switch").is_some());
        assert!(catalog.get_object("host").is_none());
    }
}
