//! The canonical type tree, serialized exactly like a modern Anchor IDL type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IdlError;

/// Scalar type names shared by every dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    U64,
    I64,
    F64,
    U128,
    I128,
    U256,
    I256,
    Bytes,
    String,
    #[serde(alias = "publicKey")]
    Pubkey,
}

impl Primitive {
    pub const ALL: [Primitive; 18] = [
        Primitive::Bool,
        Primitive::U8,
        Primitive::I8,
        Primitive::U16,
        Primitive::I16,
        Primitive::U32,
        Primitive::I32,
        Primitive::F32,
        Primitive::U64,
        Primitive::I64,
        Primitive::F64,
        Primitive::U128,
        Primitive::I128,
        Primitive::U256,
        Primitive::I256,
        Primitive::Bytes,
        Primitive::String,
        Primitive::Pubkey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::U8 => "u8",
            Primitive::I8 => "i8",
            Primitive::U16 => "u16",
            Primitive::I16 => "i16",
            Primitive::U32 => "u32",
            Primitive::I32 => "i32",
            Primitive::F32 => "f32",
            Primitive::U64 => "u64",
            Primitive::I64 => "i64",
            Primitive::F64 => "f64",
            Primitive::U128 => "u128",
            Primitive::I128 => "i128",
            Primitive::U256 => "u256",
            Primitive::I256 => "i256",
            Primitive::Bytes => "bytes",
            Primitive::String => "string",
            Primitive::Pubkey => "pubkey",
        }
    }

    /// Byte width and signedness of the integer types.
    pub fn integer_layout(&self) -> Option<(usize, bool)> {
        Some(match self {
            Primitive::U8 => (1, false),
            Primitive::I8 => (1, true),
            Primitive::U16 => (2, false),
            Primitive::I16 => (2, true),
            Primitive::U32 => (4, false),
            Primitive::I32 => (4, true),
            Primitive::U64 => (8, false),
            Primitive::I64 => (8, true),
            Primitive::U128 => (16, false),
            Primitive::I128 => (16, true),
            Primitive::U256 => (32, false),
            Primitive::I256 => (32, true),
            _ => return None,
        })
    }

    pub fn is_integer(&self) -> bool {
        self.integer_layout().is_some()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Primitive::F32 | Primitive::F64)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Primitive {
    type Err = IdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "publicKey" {
            return Ok(Primitive::Pubkey);
        }
        Primitive::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| IdlError::UnsupportedPrimitive(s.to_string()))
    }
}

/// A type as it appears in a modern Anchor IDL.
///
/// Shapes outside the closed set are kept in [IdlType::Unknown] so that a
/// descriptor always parses; consumers decide whether that is fatal.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdlType {
    Option(Box<IdlType>),
    COption(Box<IdlType>),
    Vec(Box<IdlType>),
    Array(Box<IdlType>, IdlArrayLen),
    Defined {
        name: String,
        #[serde(default)]
        generics: Vec<IdlGenericArg>,
    },
    Generic(String),
    #[serde(untagged)]
    Primitive(Primitive),
    #[serde(untagged)]
    Unknown(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdlArrayLen {
    Generic(String),
    #[serde(untagged)]
    Value(usize),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IdlGenericArg {
    Type {
        #[serde(rename = "type")]
        ty: IdlType,
    },
    Const {
        value: String,
    },
}

impl IdlType {
    pub fn defined(name: impl Into<String>) -> Self {
        IdlType::Defined {
            name: name.into(),
            generics: vec![],
        }
    }

    pub fn array(ty: IdlType, len: usize) -> Self {
        IdlType::Array(Box::new(ty), IdlArrayLen::Value(len))
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            IdlType::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Strips `option`/`coption` wrappers.
    pub fn unwrap_optional(&self) -> (&IdlType, bool) {
        match self {
            IdlType::Option(inner) | IdlType::COption(inner) => (inner.unwrap_optional().0, true),
            ty => (ty, false),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<Primitive> for IdlType {
    fn from(p: Primitive) -> Self {
        IdlType::Primitive(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primitives_serialize_as_bare_strings() {
        for p in Primitive::ALL {
            let ty = IdlType::Primitive(p);
            assert_eq!(ty.to_value(), json!(p.as_str()));
            let back: IdlType = serde_json::from_value(json!(p.as_str())).unwrap();
            assert_eq!(back, ty);
        }
    }

    #[test]
    fn legacy_public_key_name_is_accepted() {
        let ty: IdlType = serde_json::from_value(json!("publicKey")).unwrap();
        assert_eq!(ty, IdlType::Primitive(Primitive::Pubkey));
        assert_eq!(ty.to_value(), json!("pubkey"));
    }

    #[test]
    fn composite_shapes_follow_anchor_json() {
        let raw = json!({
            "vec": {
                "option": {
                    "array": [{ "defined": { "name": "Point", "generics": [] } }, 4]
                }
            }
        });
        let ty: IdlType = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(
            ty,
            IdlType::Vec(Box::new(IdlType::Option(Box::new(IdlType::array(
                IdlType::defined("Point"),
                4
            )))))
        );
        assert_eq!(ty.to_value(), raw);
    }

    #[test]
    fn generic_array_length() {
        let ty: IdlType = serde_json::from_value(json!({ "array": ["u8", { "generic": "N" }] })).unwrap();
        assert_eq!(
            ty,
            IdlType::Array(
                Box::new(Primitive::U8.into()),
                IdlArrayLen::Generic("N".to_string())
            )
        );
    }

    #[test]
    fn unknown_shapes_are_preserved() {
        let raw = json!({ "hashMap": ["string", "u8"] });
        let ty: IdlType = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(ty, IdlType::Unknown(raw));
    }

    #[test]
    fn parses_primitive_names() {
        assert_eq!("publicKey".parse::<Primitive>().unwrap(), Primitive::Pubkey);
        assert_eq!("i128".parse::<Primitive>().unwrap(), Primitive::I128);
        let err = "u512".parse::<Primitive>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported primitive type: u512");
    }

    #[test]
    fn coption_key_is_lowercase() {
        let ty = IdlType::COption(Box::new(Primitive::U64.into()));
        assert_eq!(ty.to_value(), json!({ "coption": "u64" }));
    }
}
