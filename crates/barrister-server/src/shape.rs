//! Target shapes: what an operation's Rust signature expects to receive
//!
//! Shapes are built once per operation when a handler is bound and walked by
//! the conversion engine instead of inspecting types at call time.

use std::fmt;

use serde_json::{Map, Value};

/// Primitive slot kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    /// 32-bit integer; wider values are rejected
    Int,
    Int64,
    Float32,
    Float64,
    Bool,
}

impl Primitive {
    /// The IDL primitive type this kind binds to
    pub fn idl_type(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Int | Primitive::Int64 => "int",
            Primitive::Float32 | Primitive::Float64 => "float",
            Primitive::Bool => "bool",
        }
    }
}

/// Lazily built shape of a struct slot; allows self-referential structs
pub type ShapeFn = fn() -> TargetShape;

/// A named set of `(slot name, shape)` pairs
#[derive(Debug, Clone)]
pub struct StructShape {
    pub name: String,
    slots: Vec<(String, ShapeFn)>,
}

impl StructShape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: Vec::new(),
        }
    }

    /// Add a slot whose shape is taken from `T`
    pub fn field<T: Shaped>(self, name: impl Into<String>) -> Self {
        self.slot(name, T::shape)
    }

    pub fn slot(mut self, name: impl Into<String>, shape: ShapeFn) -> Self {
        self.slots.push((name.into(), shape));
        self
    }

    pub fn build(self) -> TargetShape {
        TargetShape::Struct(self)
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(name, _)| name.as_str())
    }

    /// Find the slot for a schema field name: exact match first, then with
    /// the first letter capitalized
    pub fn find_slot(&self, field_name: &str) -> Option<(&str, TargetShape)> {
        let capitalized = capitalize(field_name);
        self.slots
            .iter()
            .find(|(name, _)| name == field_name)
            .or_else(|| self.slots.iter().find(|(name, _)| *name == capitalized))
            .map(|(name, shape)| (name.as_str(), shape()))
    }

    /// Object holding every slot's default value
    pub fn default_map(&self) -> Map<String, Value> {
        self.slots
            .iter()
            .map(|(name, shape)| (name.clone(), shape().default_value()))
            .collect()
    }
}

/// What a handler's parameter or return type looks like
#[derive(Debug, Clone)]
pub enum TargetShape {
    Primitive(Primitive),
    Optional(Box<TargetShape>),
    Array(Box<TargetShape>),
    Struct(StructShape),
}

impl TargetShape {
    pub fn string() -> Self {
        TargetShape::Primitive(Primitive::String)
    }

    pub fn int() -> Self {
        TargetShape::Primitive(Primitive::Int)
    }

    pub fn int64() -> Self {
        TargetShape::Primitive(Primitive::Int64)
    }

    pub fn float() -> Self {
        TargetShape::Primitive(Primitive::Float64)
    }

    pub fn bool() -> Self {
        TargetShape::Primitive(Primitive::Bool)
    }

    pub fn optional(self) -> Self {
        TargetShape::Optional(Box::new(self))
    }

    pub fn array(self) -> Self {
        TargetShape::Array(Box::new(self))
    }

    /// Start a struct shape
    pub fn structure(name: impl Into<String>) -> StructShape {
        StructShape::new(name)
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TargetShape::Optional(_))
    }

    /// Value a slot takes when the wire value leaves it unset
    pub fn default_value(&self) -> Value {
        match self {
            TargetShape::Primitive(Primitive::String) => Value::String(String::new()),
            TargetShape::Primitive(Primitive::Int | Primitive::Int64) => Value::from(0),
            TargetShape::Primitive(Primitive::Float32 | Primitive::Float64) => Value::from(0.0),
            TargetShape::Primitive(Primitive::Bool) => Value::Bool(false),
            TargetShape::Optional(_) => Value::Null,
            TargetShape::Array(_) => Value::Array(Vec::new()),
            TargetShape::Struct(s) => Value::Object(s.default_map()),
        }
    }
}

impl fmt::Display for TargetShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetShape::Primitive(p) => {
                let name = match p {
                    Primitive::String => "string",
                    Primitive::Int => "i32",
                    Primitive::Int64 => "i64",
                    Primitive::Float32 => "f32",
                    Primitive::Float64 => "f64",
                    Primitive::Bool => "bool",
                };
                f.write_str(name)
            }
            TargetShape::Optional(inner) => write!(f, "Option<{}>", inner),
            TargetShape::Array(inner) => write!(f, "Vec<{}>", inner),
            TargetShape::Struct(s) => f.write_str(&s.name),
        }
    }
}

/// Types that can describe their own target shape
///
/// Implemented for the primitive types, `Option`, `Vec` and `Box`. Structs
/// bound to IDL structs implement it with [`TargetShape::structure`]:
///
/// ```rust
/// use barrister_server::{Shaped, TargetShape};
///
/// #[derive(serde::Deserialize)]
/// struct Person {
///     name: String,
///     email: Option<String>,
/// }
///
/// impl Shaped for Person {
///     fn shape() -> TargetShape {
///         TargetShape::structure("Person")
///             .field::<String>("name")
///             .field::<Option<String>>("email")
///             .build()
///     }
/// }
/// ```
pub trait Shaped {
    fn shape() -> TargetShape;
}

macro_rules! impl_primitive_shape {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Shaped for $ty {
                fn shape() -> TargetShape {
                    TargetShape::Primitive(Primitive::$kind)
                }
            }
        )*
    };
}

impl_primitive_shape! {
    String => String,
    i32 => Int,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    bool => Bool,
}

impl<T: Shaped> Shaped for Option<T> {
    fn shape() -> TargetShape {
        T::shape().optional()
    }
}

impl<T: Shaped> Shaped for Vec<T> {
    fn shape() -> TargetShape {
        T::shape().array()
    }
}

impl<T: Shaped> Shaped for Box<T> {
    fn shape() -> TargetShape {
        T::shape()
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
