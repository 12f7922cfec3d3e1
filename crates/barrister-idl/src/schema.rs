//! Indexed schema registries built from an IDL element list

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::element::{EnumValue, FieldSpec, OperationSpec, SchemaElement, StructSpec};
use crate::error::SchemaError;

/// Document metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub schema_version: String,
    /// Generation time in nanoseconds since the Unix epoch
    pub generated_at_nanos: i64,
    pub checksum: String,
}

impl Meta {
    pub fn generated_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.generated_at_nanos)
    }
}

/// A struct definition together with its resolved inherited field set
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub spec: StructSpec,
    effective_fields: Vec<FieldSpec>,
}

impl StructDef {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Own fields plus every inherited field, ancestors first
    pub fn effective_fields(&self) -> &[FieldSpec] {
        &self.effective_fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.effective_fields.iter().find(|f| f.name == name)
    }
}

/// A loaded IDL document
///
/// Immutable once loaded. The raw element list is kept verbatim for
/// introspection alongside the typed registries.
#[derive(Debug, Clone)]
pub struct Schema {
    elements: Vec<Value>,
    meta: Option<Meta>,
    interfaces: Vec<String>,
    interface_ops: HashMap<String, Vec<OperationSpec>>,
    operations: HashMap<String, OperationSpec>,
    structs: HashMap<String, StructDef>,
    enums: HashMap<String, Vec<EnumValue>>,
}

impl Schema {
    /// Build the registries from an ordered element list
    pub fn load(elements: Vec<Value>) -> Result<Self, SchemaError> {
        let mut meta = None;
        let mut interfaces = Vec::new();
        let mut interface_ops = HashMap::new();
        let mut operations = HashMap::new();
        let mut raw_structs: HashMap<String, StructSpec> = HashMap::new();
        let mut enums = HashMap::new();

        for (index, raw) in elements.iter().enumerate() {
            let element = serde_json::from_value::<SchemaElement>(raw.clone())
                .map_err(|source| SchemaError::InvalidElement { index, source })?;

            match element {
                SchemaElement::Comment(_) => {}
                SchemaElement::Meta(m) => {
                    meta = Some(Meta {
                        schema_version: m.barrister_version,
                        // documents carry milliseconds
                        generated_at_nanos: m.date_generated.saturating_mul(1_000_000),
                        checksum: m.checksum,
                    });
                }
                SchemaElement::Interface(iface) => {
                    for op in &iface.operations {
                        operations.insert(format!("{}.{}", iface.name, op.name), op.clone());
                    }
                    if !interface_ops.contains_key(&iface.name) {
                        interfaces.push(iface.name.clone());
                    }
                    interface_ops.insert(iface.name, iface.operations);
                }
                SchemaElement::Struct(spec) => {
                    raw_structs.insert(spec.name.clone(), spec);
                }
                SchemaElement::Enum(spec) => {
                    enums.insert(spec.name, spec.values);
                }
                SchemaElement::Unknown => {
                    warn!(
                        "Ignoring IDL element {} with unknown type {:?}",
                        index,
                        raw.get("type")
                    );
                }
            }
        }

        let mut structs = HashMap::with_capacity(raw_structs.len());
        for (name, spec) in &raw_structs {
            let mut chain = Vec::new();
            let effective_fields = resolve_fields(&raw_structs, name, &mut chain)?;
            structs.insert(
                name.clone(),
                StructDef {
                    spec: spec.clone(),
                    effective_fields,
                },
            );
        }

        debug!(
            "Loaded IDL: {} interfaces, {} operations, {} structs, {} enums",
            interfaces.len(),
            operations.len(),
            structs.len(),
            enums.len()
        );

        Ok(Self {
            elements,
            meta,
            interfaces,
            interface_ops,
            operations,
            structs,
            enums,
        })
    }

    /// Parse an IDL document from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, SchemaError> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Array(elements) => Self::load(elements),
            _ => Err(SchemaError::NotAnArray),
        }
    }

    /// Read and parse an IDL document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_json(&bytes)
    }

    /// Build a schema from typed elements
    pub fn from_elements(elements: Vec<SchemaElement>) -> Result<Self, SchemaError> {
        let raw = elements
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Self::load(raw)
    }

    /// The element list exactly as loaded
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    /// Interface names in declaration order
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn interface(&self, name: &str) -> Option<&[OperationSpec]> {
        self.interface_ops.get(name).map(Vec::as_slice)
    }

    /// Look up an operation by its qualified `Interface.operation` name
    pub fn operation(&self, method: &str) -> Option<&OperationSpec> {
        self.operations.get(method)
    }

    pub fn struct_def(&self, name: &str) -> Option<&StructDef> {
        self.structs.get(name)
    }

    pub fn enum_values(&self, name: &str) -> Option<&[EnumValue]> {
        self.enums.get(name).map(Vec::as_slice)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    pub fn is_struct(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    /// Whether `literal` is declared on enum `name`
    pub fn enum_contains(&self, name: &str, literal: &str) -> bool {
        self.enums
            .get(name)
            .is_some_and(|values| values.iter().any(|v| v.value == literal))
    }
}

/// Resolve the parent's effective fields first, then overlay own fields by name.
/// An overriding field keeps its ancestor's position.
fn resolve_fields(
    structs: &HashMap<String, StructSpec>,
    name: &str,
    chain: &mut Vec<String>,
) -> Result<Vec<FieldSpec>, SchemaError> {
    if chain.iter().any(|n| n == name) {
        chain.push(name.to_string());
        return Err(SchemaError::CyclicInheritance {
            chain: std::mem::take(chain),
        });
    }
    let Some(spec) = structs.get(name) else {
        return Ok(Vec::new());
    };
    chain.push(name.to_string());

    let mut fields = match &spec.parent {
        Some(parent) if structs.contains_key(parent) => resolve_fields(structs, parent, chain)?,
        Some(parent) => {
            warn!("Struct {} extends unknown struct {}", name, parent);
            Vec::new()
        }
        None => Vec::new(),
    };

    for own in &spec.own_fields {
        match fields.iter_mut().find(|f| f.name == own.name) {
            Some(slot) => *slot = own.clone(),
            None => fields.push(own.clone()),
        }
    }

    chain.pop();
    Ok(fields)
}
