//! IDL document elements
//!
//! An IDL document is an ordered JSON array of tagged elements. Each element is
//! decoded into a [`SchemaElement`]; unknown `type` tags decode to
//! [`SchemaElement::Unknown`] and are ignored by the schema model.

use serde::{Deserialize, Deserializer, Serialize};

/// Names of the built-in primitive types
pub const PRIMITIVE_TYPES: [&str; 4] = ["string", "int", "float", "bool"];

/// One tagged element of an IDL document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaElement {
    Comment(CommentElement),
    Meta(MetaElement),
    Interface(InterfaceSpec),
    Struct(StructSpec),
    Enum(EnumSpec),
    /// Element type this version does not understand
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentElement {
    #[serde(default)]
    pub value: String,
}

/// Raw `meta` element as it appears in the document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaElement {
    #[serde(default)]
    pub barrister_version: String,
    #[serde(default)]
    pub date_generated: i64,
    #[serde(default)]
    pub checksum: String,
}

/// A declared type expression attached to a parameter, return value or struct member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub comment: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            optional: false,
            is_array: false,
            comment: String::new(),
        }
    }

    /// Mark the field optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark the field as an array of its declared type
    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// The same field describing a single array element
    pub fn element(&self) -> FieldSpec {
        FieldSpec {
            is_array: false,
            comment: String::new(),
            ..self.clone()
        }
    }

    pub fn is_primitive(&self) -> bool {
        PRIMITIVE_TYPES.contains(&self.declared_type.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    pub name: String,
    #[serde(default)]
    pub params: Vec<FieldSpec>,
    pub returns: FieldSpec,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    pub name: String,
    #[serde(rename = "functions", default)]
    pub operations: Vec<OperationSpec>,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructSpec {
    pub name: String,
    #[serde(
        rename = "extends",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<String>,
    #[serde(rename = "fields", default)]
    pub own_fields: Vec<FieldSpec>,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub value: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumSpec {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValue>,
    #[serde(default)]
    pub comment: String,
}

// "extends": "" means no parent
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}
