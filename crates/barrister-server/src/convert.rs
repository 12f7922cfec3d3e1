//! Conversion engine: binds untyped wire values to target shapes under the schema
//!
//! Output is a normalized [`Value`] tree: integers are integral numbers, struct
//! objects are keyed by target slot names and carry defaults for slots the
//! wire value left unset. Typed values are then obtained with
//! `serde_json::from_value`.

use barrister_idl::{FieldSpec, Schema};
use serde_json::{Map, Number, Value};

use crate::error::TypeError;
use crate::shape::{Primitive, StructShape, TargetShape};

/// Walks a value against a `(FieldSpec, TargetShape)` pair
#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    schema: &'a Schema,
    strict: bool,
}

impl<'a> Converter<'a> {
    /// Per-call converter; values already in native form pass straight through
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            strict: false,
        }
    }

    /// Converter that walks and validates every value
    pub fn strict(schema: &'a Schema) -> Self {
        Self {
            schema,
            strict: true,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn convert(
        &self,
        field: &FieldSpec,
        shape: &TargetShape,
        value: &Value,
        path: &str,
    ) -> Result<Value, TypeError> {
        if !self.strict && is_native(field, shape, value) {
            return Ok(value.clone());
        }

        if value.is_null() {
            return match shape {
                TargetShape::Optional(_) if field.optional => Ok(Value::Null),
                TargetShape::Optional(_) => Err(TypeError::new(path, "null not allowed")),
                _ => Err(TypeError::new(path, "cannot bind null to non-optional shape")),
            };
        }

        match shape {
            TargetShape::Optional(inner) => self.convert(field, inner, value, path),
            TargetShape::Primitive(kind) => self.convert_primitive(field, *kind, value, path),
            TargetShape::Array(inner) => match value {
                Value::Array(items) => self.convert_array(field, inner, items, path),
                _ => Err(unable(value, shape, path)),
            },
            TargetShape::Struct(target) => match value {
                Value::Object(map) => self.convert_struct(field, target, map, path),
                _ => Err(unable(value, shape, path)),
            },
        }
    }

    fn convert_primitive(
        &self,
        field: &FieldSpec,
        kind: Primitive,
        value: &Value,
        path: &str,
    ) -> Result<Value, TypeError> {
        let converted = match kind {
            Primitive::String => {
                let Some(s) = value.as_str() else {
                    return Err(unable(value, &TargetShape::Primitive(kind), path));
                };
                if let Some(literals) = self.schema.enum_values(&field.declared_type) {
                    if literals.iter().any(|v| v.value == s) {
                        return Ok(value.clone());
                    }
                    let names: Vec<&str> = literals.iter().map(|v| v.value.as_str()).collect();
                    return Err(TypeError::new(
                        path,
                        format!("value {} not in enum values: [{}]", s, names.join(", ")),
                    ));
                }
                value.clone()
            }
            Primitive::Int => match integral(value).and_then(|i| i32::try_from(i).ok()) {
                Some(i) => Value::from(i),
                None => return Err(unable(value, &TargetShape::Primitive(kind), path)),
            },
            Primitive::Int64 => match integral(value) {
                Some(i) => Value::from(i),
                None => return Err(unable(value, &TargetShape::Primitive(kind), path)),
            },
            Primitive::Float32 | Primitive::Float64 => {
                match value.as_f64().and_then(Number::from_f64) {
                    Some(n) => Value::Number(n),
                    None => return Err(unable(value, &TargetShape::Primitive(kind), path)),
                }
            }
            Primitive::Bool => match value {
                Value::Bool(_) => value.clone(),
                _ => return Err(unable(value, &TargetShape::Primitive(kind), path)),
            },
        };

        let family = kind.idl_type();
        if field.declared_type != family {
            return Err(TypeError::new(
                path,
                format!(
                    "type mismatch: expected {} got {}",
                    field.declared_type, family
                ),
            ));
        }
        Ok(converted)
    }

    fn convert_array(
        &self,
        field: &FieldSpec,
        inner: &TargetShape,
        items: &[Value],
        path: &str,
    ) -> Result<Value, TypeError> {
        let element = field.element();
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.convert(&element, inner, item, &format!("{}[{}]", path, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn convert_struct(
        &self,
        field: &FieldSpec,
        target: &StructShape,
        map: &Map<String, Value>,
        path: &str,
    ) -> Result<Value, TypeError> {
        let def = self.schema.struct_def(&field.declared_type).ok_or_else(|| {
            TypeError::new(
                path,
                format!("struct not found in schema: {}", field.declared_type),
            )
        })?;

        let mut out = target.default_map();
        for member in def.effective_fields() {
            let Some((slot, slot_shape)) = target.find_slot(&member.name) else {
                return Err(TypeError::new(
                    path,
                    format!(
                        "struct shape {} is missing required field {}",
                        target.name, member.name
                    ),
                ));
            };

            match map.get(&member.name) {
                Some(raw) => {
                    let converted = self.convert(
                        member,
                        &slot_shape,
                        raw,
                        &format!("{}.{}", path, member.name),
                    )?;
                    out.insert(slot.to_string(), converted);
                }
                None if member.optional => {}
                None => {
                    return Err(TypeError::new(
                        path,
                        format!(
                            "{} value is missing required field {}",
                            def.name(),
                            member.name
                        ),
                    ));
                }
            }
        }
        Ok(Value::Object(out))
    }
}

/// Value already has the exact native form of a primitive slot
fn is_native(field: &FieldSpec, shape: &TargetShape, value: &Value) -> bool {
    let TargetShape::Primitive(kind) = shape else {
        return false;
    };
    if field.is_array || field.declared_type != kind.idl_type() {
        return false;
    }
    match kind {
        Primitive::String => value.is_string(),
        Primitive::Int => value.as_i64().is_some_and(|i| i32::try_from(i).is_ok()),
        Primitive::Int64 => value.is_i64(),
        Primitive::Float32 | Primitive::Float64 => value.is_f64(),
        Primitive::Bool => value.is_boolean(),
    }
}

/// Integer value of a number, accepting floats with no fractional part
fn integral(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn kind_of(value: &Value) -> &'static str {
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

fn unable(value: &Value, shape: &TargetShape, path: &str) -> TypeError {
    TypeError::new(
        path,
        format!("unable to convert {} to {}", kind_of(value), shape),
    )
}

/// Synthesize a deterministic sample value for a field
///
/// Used to probe handler shapes at registration time. Struct recursion is cut
/// by emitting empty arrays and omitting optional members on re-entry.
pub fn test_value(schema: &Schema, field: &FieldSpec) -> Result<Value, TypeError> {
    let mut visiting = Vec::new();
    sample(schema, field, &mut visiting)?.ok_or_else(|| unsatisfiable(field))
}

fn unsatisfiable(field: &FieldSpec) -> TypeError {
    TypeError::new(
        field.name.as_str(),
        format!("recursive struct {} has no finite value", field.declared_type),
    )
}

fn sample(
    schema: &Schema,
    field: &FieldSpec,
    visiting: &mut Vec<String>,
) -> Result<Option<Value>, TypeError> {
    let recursive = visiting.iter().any(|n| *n == field.declared_type);

    if field.is_array {
        if recursive {
            return Ok(Some(Value::Array(Vec::new())));
        }
        return Ok(sample(schema, &field.element(), visiting)?.map(|v| Value::Array(vec![v])));
    }

    match field.declared_type.as_str() {
        "string" => return Ok(Some(Value::from("testval"))),
        "int" => return Ok(Some(Value::from(99i64))),
        "float" => return Ok(Some(Value::from(10.3))),
        "bool" => return Ok(Some(Value::Bool(true))),
        _ => {}
    }

    if let Some(def) = schema.struct_def(&field.declared_type) {
        if recursive {
            return Ok(None);
        }
        visiting.push(field.declared_type.clone());
        let mut map = Map::new();
        for member in def.effective_fields() {
            match sample(schema, member, visiting)? {
                Some(v) => {
                    map.insert(member.name.clone(), v);
                }
                None if member.optional => {}
                None => return Err(unsatisfiable(member)),
            }
        }
        visiting.pop();
        return Ok(Some(Value::Object(map)));
    }

    if let Some(first) = schema.enum_values(&field.declared_type).and_then(|v| v.first()) {
        return Ok(Some(Value::from(first.value.as_str())));
    }

    Err(TypeError::new(
        field.name.as_str(),
        format!("unable to create test value for type {}", field.declared_type),
    ))
}
