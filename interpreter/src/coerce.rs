//! Conversion of raw form values into typed instruction arguments and accounts.

use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::Value;
use solana_explorer_idl::dialect::modern::{
    IdlInstruction, IdlInstructionAccount, IdlInstructionAccountItem,
};
use solana_explorer_idl::{IdlArrayLen, IdlType, Primitive};
use solana_sdk::pubkey::Pubkey;

use crate::array_input::parse_array_input;
use crate::error::{InterpreterError, Result};
use crate::value::TypedValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoerceOptions {
    pub enforce_fixed_array_len: bool,
}

fn is_absent(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn integer_text(raw: &Value) -> anyhow::Result<String> {
    match raw {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
        other => Err(anyhow!("expected an integer, got {other}")),
    }
}

fn convert_primitive(raw: &Value, primitive: Primitive) -> anyhow::Result<TypedValue> {
    Ok(match primitive {
        Primitive::Bool => match raw {
            Value::Bool(b) => TypedValue::Bool(*b),
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => TypedValue::Bool(true),
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => TypedValue::Bool(false),
            other => return Err(anyhow!("expected a boolean, got {other}")),
        },
        Primitive::U256 | Primitive::I256 => TypedValue::Raw(raw.clone()),
        p if p.is_integer() => {
            let text = integer_text(raw)?;
            match p.integer_layout() {
                Some((_, true)) => TypedValue::Signed(
                    i128::from_str(&text).with_context(|| format!("invalid {p}: {text}"))?,
                ),
                _ => TypedValue::Unsigned(
                    u128::from_str(&text).with_context(|| format!("invalid {p}: {text}"))?,
                ),
            }
        }
        Primitive::F32 | Primitive::F64 => {
            let f = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => f64::from_str(s.trim()).ok(),
                _ => None,
            }
            .with_context(|| format!("expected a number, got {raw}"))?;
            if !f.is_finite() {
                return Err(anyhow!("non-finite {primitive}: {f}"));
            }
            if primitive == Primitive::F32 && f.abs() > f32::MAX as f64 {
                return Err(anyhow!("{f} does not fit in f32"));
            }
            TypedValue::Float(f)
        }
        Primitive::String => match raw {
            Value::String(s) => TypedValue::String(s.clone()),
            other => TypedValue::String(other.to_string()),
        },
        Primitive::Bytes => TypedValue::Bytes(to_bytes(raw)?),
        Primitive::Pubkey => {
            let s = raw
                .as_str()
                .with_context(|| format!("expected a base58 address, got {raw}"))?;
            TypedValue::Pubkey(
                Pubkey::from_str(s.trim()).with_context(|| format!("invalid address: {s}"))?,
            )
        }
        _ => TypedValue::Raw(raw.clone()),
    })
}

fn to_bytes(raw: &Value) -> anyhow::Result<Vec<u8>> {
    match raw {
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .with_context(|| format!("invalid byte {item}"))
            })
            .collect(),
        other => Err(anyhow!("expected bytes, got {other}")),
    }
}

/// Coerces one raw form value against its declared type.
///
/// `null` and the empty string always become [TypedValue::Null].
pub fn convert_argument(
    raw: &Value,
    idl_type: &IdlType,
    options: &CoerceOptions,
) -> anyhow::Result<TypedValue> {
    if is_absent(raw) {
        return Ok(TypedValue::Null);
    }
    match idl_type {
        IdlType::Primitive(primitive) => convert_primitive(raw, *primitive),
        IdlType::Option(inner) | IdlType::COption(inner) => convert_argument(raw, inner, options),
        IdlType::Vec(inner) => {
            let items = parse_array_input(raw)?;
            convert_items(&items, inner, options)
        }
        IdlType::Array(inner, len) => {
            let items = parse_array_input(raw)?;
            if let (true, IdlArrayLen::Value(len)) = (options.enforce_fixed_array_len, len) {
                if items.len() != *len {
                    return Err(anyhow!("expected {len} items, got {}", items.len()));
                }
            }
            convert_items(&items, inner, options)
        }
        IdlType::Defined { .. } => Ok(TypedValue::Bytes(to_bytes(raw)?)),
        IdlType::Generic(_) | IdlType::Unknown(_) => Ok(TypedValue::Raw(raw.clone())),
    }
}

fn convert_items(
    items: &[Value],
    inner: &IdlType,
    options: &CoerceOptions,
) -> anyhow::Result<TypedValue> {
    items
        .iter()
        .map(|item| convert_argument(item, inner, options))
        .collect::<anyhow::Result<Vec<_>>>()
        .map(TypedValue::Array)
}

/// Coerces positional raw arguments against an instruction's declared arguments.
///
/// Supplying more values than declared arguments is an error. Supplying fewer
/// is not; trailing arguments are left unconverted.
pub fn convert_arguments(
    instruction: &IdlInstruction,
    raw_args: &[Value],
    options: &CoerceOptions,
) -> Result<Vec<TypedValue>> {
    raw_args
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let def = instruction
                .args
                .get(index)
                .ok_or(InterpreterError::ArgumentIndexNotFound(index))?;
            convert_argument(raw, &def.ty, options).map_err(|e| {
                log::debug!("argument {} of {}: {e:#}", def.name, instruction.name);
                InterpreterError::ArgumentConversion {
                    argument: def.name.clone(),
                    instruction: instruction.name.clone(),
                }
            })
        })
        .collect()
}

/// Looks up an account by name, or by `<group>.<account>` inside a nested group.
pub fn find_account<'a>(
    instruction: &'a IdlInstruction,
    key: &str,
) -> Option<&'a IdlInstructionAccount> {
    fn walk<'a>(
        items: &'a [IdlInstructionAccountItem],
        mut parts: std::str::Split<'_, char>,
    ) -> Option<&'a IdlInstructionAccount> {
        let name = parts.next()?;
        match items.iter().find(|item| item.name() == name)? {
            IdlInstructionAccountItem::Single(account) => match parts.next() {
                None => Some(account),
                Some(_) => None,
            },
            IdlInstructionAccountItem::Composite(group) => walk(&group.accounts, parts),
        }
    }
    walk(&instruction.accounts, key.split('.'))
}

/// Parses account addresses keyed by account name.
///
/// Empty values map to `None` for optional accounts and are dropped otherwise.
pub fn convert_accounts(
    instruction: &IdlInstruction,
    raw_accounts: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, Option<Pubkey>>> {
    let mut accounts = BTreeMap::new();
    for (key, raw) in raw_accounts {
        let meta = find_account(instruction, key).ok_or_else(|| {
            InterpreterError::AccountNotFound {
                account: key.clone(),
                instruction: instruction.name.clone(),
            }
        })?;
        if raw.is_empty() {
            if meta.optional {
                accounts.insert(key.clone(), None);
            }
            continue;
        }
        let pubkey = Pubkey::from_str(raw.trim()).map_err(|e| {
            log::debug!("account {key} of {}: {e}", instruction.name);
            InterpreterError::AccountConversion {
                account: meta.name.clone(),
                instruction: instruction.name.clone(),
            }
        })?;
        accounts.insert(key.clone(), Some(pubkey));
    }
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn options() -> CoerceOptions {
        CoerceOptions::default()
    }

    fn ty(value: Value) -> IdlType {
        serde_json::from_value(value).unwrap()
    }

    fn instruction() -> IdlInstruction {
        serde_json::from_value(json!({
            "name": "vote",
            "accounts": [
                {"name": "voter", "signer": true},
                {"name": "referrer", "optional": true},
                {"name": "poll", "accounts": [{"name": "state", "writable": true}]}
            ],
            "args": [
                {"name": "pollId", "type": "u64"},
                {"name": "memo", "type": {"option": "string"}}
            ]
        }))
        .unwrap()
    }

    #[test_case(json!("42"), json!({"option": "u64"}), TypedValue::Unsigned(42) ; "optional integer")]
    #[test_case(json!(""), json!({"option": "u64"}), TypedValue::Null ; "empty optional")]
    #[test_case(json!(null), json!("u8"), TypedValue::Null ; "null is absent")]
    #[test_case(json!("-7"), json!("i16"), TypedValue::Signed(-7) ; "signed")]
    #[test_case(json!("TRUE"), json!("bool"), TypedValue::Bool(true) ; "bool any case")]
    #[test_case(json!("1.5"), json!("f32"), TypedValue::Float(1.5) ; "float")]
    #[test_case(json!("hi"), json!("bytes"), TypedValue::Bytes(b"hi".to_vec()) ; "bytes from text")]
    #[test_case(json!("abc"), json!({"defined": {"name": "Custom"}}), TypedValue::Bytes(b"abc".to_vec()) ; "defined forwarded")]
    fn converts_scalars(raw: Value, declared: Value, expected: TypedValue) {
        assert_eq!(convert_argument(&raw, &ty(declared), &options()).unwrap(), expected);
    }

    #[test]
    fn converts_vectors_element_wise() {
        let value = convert_argument(&json!("1, 2"), &ty(json!({"vec": "u8"})), &options()).unwrap();
        assert_eq!(
            value,
            TypedValue::Array(vec![TypedValue::Unsigned(1), TypedValue::Unsigned(2)])
        );
        let keys = convert_argument(
            &json!(r#"["11111111111111111111111111111111"]"#),
            &ty(json!({"vec": "pubkey"})),
            &options(),
        )
        .unwrap();
        assert_eq!(keys, TypedValue::Array(vec![TypedValue::Pubkey(Pubkey::default())]));
    }

    #[test]
    fn fixed_array_length_is_optional() {
        let declared = ty(json!({"array": ["u8", 3]}));
        assert!(convert_argument(&json!("1,2"), &declared, &options()).is_ok());
        let strict = CoerceOptions {
            enforce_fixed_array_len: true,
        };
        assert!(convert_argument(&json!("1,2"), &declared, &strict).is_err());
    }

    #[test_case(json!("abc"), json!("u64") ; "not a number")]
    #[test_case(json!("-1"), json!("u8") ; "negative unsigned")]
    #[test_case(json!("maybe"), json!("bool") ; "not a bool")]
    #[test_case(json!("xyz"), json!("pubkey") ; "bad address")]
    #[test_case(json!("NaN"), json!("f64") ; "nan")]
    #[test_case(json!("1e300"), json!("f32") ; "too large for f32")]
    fn rejects_malformed_scalars(raw: Value, declared: Value) {
        assert!(convert_argument(&raw, &ty(declared), &options()).is_err());
    }

    #[test]
    fn argument_count_is_strict_only_upwards() {
        let ix = instruction();
        let err = convert_arguments(&ix, &[json!("1"), json!(""), json!("x")], &options()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Argument at index 2 not found in instruction definition"
        );
        let args = convert_arguments(&ix, &[json!("1")], &options()).unwrap();
        assert_eq!(args, vec![TypedValue::Unsigned(1)]);
    }

    #[test]
    fn conversion_errors_name_argument_and_instruction() {
        let err = convert_arguments(&instruction(), &[json!("one")], &options()).unwrap_err();
        assert_eq!(err.to_string(), r#"Could not convert "pollId" argument for "vote""#);
    }

    #[test]
    fn maps_accounts() {
        let ix = instruction();
        let raw = BTreeMap::from([
            ("voter".to_string(), Pubkey::default().to_string()),
            ("referrer".to_string(), String::new()),
            ("poll.state".to_string(), Pubkey::default().to_string()),
        ]);
        let accounts = convert_accounts(&ix, &raw).unwrap();
        assert_eq!(accounts.get("voter"), Some(&Some(Pubkey::default())));
        assert_eq!(accounts.get("referrer"), Some(&None));
        assert_eq!(accounts.get("poll.state"), Some(&Some(Pubkey::default())));
    }

    #[test]
    fn account_errors() {
        let ix = instruction();
        let unknown = BTreeMap::from([("poll".to_string(), "x".to_string())]);
        assert!(matches!(
            convert_accounts(&ix, &unknown),
            Err(InterpreterError::AccountNotFound { .. })
        ));
        let invalid = BTreeMap::from([("voter".to_string(), "not-a-key".to_string())]);
        assert_eq!(
            convert_accounts(&ix, &invalid).unwrap_err().to_string(),
            r#"Could not convert "voter" argument for "vote""#
        );
        let empty_required = BTreeMap::from([("voter".to_string(), String::new())]);
        assert!(convert_accounts(&ix, &empty_required).unwrap().is_empty());
    }
}
