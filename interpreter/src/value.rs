//! Coerced argument values and their borsh encoding.

use std::io::Write;

use anyhow::{anyhow, Context};
use borsh::BorshSerialize;
use serde_json::Value;
use solana_explorer_idl::{IdlArrayLen, IdlType, Primitive};
use solana_sdk::pubkey::Pubkey;

/// A form value after coercion against its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// The absent sentinel: empty strings and nulls coerce to this.
    Null,
    Bool(bool),
    Unsigned(u128),
    Signed(i128),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Pubkey(Pubkey),
    Array(Vec<TypedValue>),
    /// Passed through without interpretation.
    Raw(Value),
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    fn as_u128(&self) -> Option<u128> {
        match self {
            TypedValue::Unsigned(v) => Some(*v),
            TypedValue::Signed(v) => u128::try_from(*v).ok(),
            _ => None,
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            TypedValue::Signed(v) => Some(*v),
            TypedValue::Unsigned(v) => i128::try_from(*v).ok(),
            _ => None,
        }
    }

    /// The string a PDA seed would be built from, if this value can feed one.
    pub fn seed_input(&self) -> Option<String> {
        match self {
            TypedValue::Unsigned(v) => Some(v.to_string()),
            TypedValue::Signed(v) => Some(v.to_string()),
            TypedValue::String(s) => Some(s.clone()),
            TypedValue::Bytes(b) => String::from_utf8(b.clone()).ok(),
            TypedValue::Pubkey(p) => Some(p.to_string()),
            TypedValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

fn serialize_unsigned_int<T, W>(value: &TypedValue, raw_data: &mut W, name: &str) -> anyhow::Result<()>
where
    T: TryFrom<u128> + BorshSerialize,
    W: Write,
{
    let v = value
        .as_u128()
        .with_context(|| format!("Failed to read value as {name}"))?;
    let field = T::try_from(v)
        .map_err(|_| anyhow!("integer out of bounds for {name}: {v}"))?;
    field.serialize(raw_data)?;
    Ok(())
}

fn serialize_signed_int<T, W>(value: &TypedValue, raw_data: &mut W, name: &str) -> anyhow::Result<()>
where
    T: TryFrom<i128> + BorshSerialize,
    W: Write,
{
    let v = value
        .as_i128()
        .with_context(|| format!("Failed to read value as {name}"))?;
    let field = T::try_from(v)
        .map_err(|_| anyhow!("integer out of bounds for {name}: {v}"))?;
    field.serialize(raw_data)?;
    Ok(())
}

fn serialize_primitive<W: Write>(
    value: &TypedValue,
    primitive: Primitive,
    raw_data: &mut W,
) -> anyhow::Result<()> {
    match primitive {
        Primitive::Bool => match value {
            TypedValue::Bool(b) => b.serialize(raw_data)?,
            _ => return Err(anyhow!("Failed to read value as bool")),
        },
        Primitive::U8 => serialize_unsigned_int::<u8, _>(value, raw_data, "u8")?,
        Primitive::U16 => serialize_unsigned_int::<u16, _>(value, raw_data, "u16")?,
        Primitive::U32 => serialize_unsigned_int::<u32, _>(value, raw_data, "u32")?,
        Primitive::U64 => serialize_unsigned_int::<u64, _>(value, raw_data, "u64")?,
        Primitive::U128 => serialize_unsigned_int::<u128, _>(value, raw_data, "u128")?,
        Primitive::I8 => serialize_signed_int::<i8, _>(value, raw_data, "i8")?,
        Primitive::I16 => serialize_signed_int::<i16, _>(value, raw_data, "i16")?,
        Primitive::I32 => serialize_signed_int::<i32, _>(value, raw_data, "i32")?,
        Primitive::I64 => serialize_signed_int::<i64, _>(value, raw_data, "i64")?,
        Primitive::I128 => serialize_signed_int::<i128, _>(value, raw_data, "i128")?,
        Primitive::U256 | Primitive::I256 => {
            return Err(anyhow!("{primitive} arguments are not supported"))
        }
        Primitive::F32 => match value {
            TypedValue::Float(f) if f.abs() > f32::MAX as f64 => {
                return Err(anyhow!("float out of bounds for f32: {f}"))
            }
            TypedValue::Float(f) => (*f as f32).serialize(raw_data)?,
            _ => return Err(anyhow!("Failed to read value as f32")),
        },
        Primitive::F64 => match value {
            TypedValue::Float(f) => f.serialize(raw_data)?,
            _ => return Err(anyhow!("Failed to read value as f64")),
        },
        Primitive::String => match value {
            TypedValue::String(s) => s.serialize(raw_data)?,
            _ => return Err(anyhow!("Failed to read value as string")),
        },
        Primitive::Bytes => match value {
            TypedValue::Bytes(b) => b.serialize(raw_data)?,
            TypedValue::String(s) => s.as_bytes().to_vec().serialize(raw_data)?,
            _ => return Err(anyhow!("Failed to read value as bytes")),
        },
        Primitive::Pubkey => match value {
            TypedValue::Pubkey(p) => p.to_bytes().serialize(raw_data)?,
            _ => return Err(anyhow!("Failed to read value as pubkey")),
        },
    }
    Ok(())
}

/// Writes the borsh encoding of `value` as `idl_type`.
///
/// `defined` values are forwarded verbatim, so they must already be encoded.
pub fn serialize_typed_value<W: Write>(
    value: &TypedValue,
    idl_type: &IdlType,
    raw_data: &mut W,
) -> anyhow::Result<()> {
    match idl_type {
        IdlType::Primitive(primitive) => serialize_primitive(value, *primitive, raw_data)?,
        IdlType::Option(inner) => {
            if value.is_null() {
                0u8.serialize(raw_data)?;
            } else {
                1u8.serialize(raw_data)?;
                serialize_typed_value(value, inner, raw_data)?;
            }
        }
        IdlType::COption(inner) => {
            if value.is_null() {
                0u32.serialize(raw_data)?;
            } else {
                1u32.serialize(raw_data)?;
                serialize_typed_value(value, inner, raw_data)?;
            }
        }
        IdlType::Vec(inner) => {
            let arr = match value {
                TypedValue::Array(arr) => arr,
                _ => return Err(anyhow!("Failed to read value as array")),
            };
            let len = u32::try_from(arr.len())
                .map_err(|_| anyhow!("vector too long: {}", arr.len()))?;
            len.serialize(raw_data)?;
            for item in arr {
                serialize_typed_value(item, inner, raw_data)?;
            }
        }
        IdlType::Array(inner, len) => {
            let arr = match value {
                TypedValue::Array(arr) => arr,
                _ => return Err(anyhow!("Failed to read value as array")),
            };
            if let IdlArrayLen::Value(len) = len {
                if arr.len() != *len {
                    log::debug!("fixed array expects {len} items, got {}", arr.len());
                }
            }
            for item in arr {
                serialize_typed_value(item, inner, raw_data)?;
            }
        }
        IdlType::Defined { name, .. } => match value {
            TypedValue::Bytes(bytes) => raw_data.write_all(bytes)?,
            _ => return Err(anyhow!("Failed to read value as encoded {name}")),
        },
        IdlType::Generic(name) => return Err(anyhow!("unresolved generic type {name}")),
        IdlType::Unknown(raw) => return Err(anyhow!("unsupported type {raw}")),
    }
    Ok(())
}
