use std::str::FromStr;

use heck::MixedCase;
use serde::Serialize;
use serde_json::{Map, Value};
use solana_explorer_idl::dialect::modern::IdlSeed;
use solana_explorer_idl::Primitive;
use solana_sdk::pubkey::Pubkey;

use crate::form::value_as_string;

/// An argument an instruction declares, reduced to what seeds need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdaArgument {
    pub name: String,
    /// `None` for anything that is not a scalar.
    pub ty: Option<Primitive>,
}

/// One seed as reported to the user, resolved or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedInfo {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdaDerivationResult {
    /// Base58 address, present only when every seed resolved.
    pub generated: Option<String>,
    pub seeds: Vec<SeedInfo>,
}

/// Live form values for one instruction.
#[derive(Debug, Clone, Copy)]
pub struct SeedInputs<'a> {
    pub args: Option<&'a Map<String, Value>>,
    pub accounts: Option<&'a Map<String, Value>>,
    pub arg_defs: &'a [PdaArgument],
}

struct ProcessedSeed {
    buffer: Option<Vec<u8>>,
    info: SeedInfo,
}

impl ProcessedSeed {
    fn unresolved(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            buffer: None,
            info: SeedInfo {
                name: name.into(),
                value,
            },
        }
    }
}

/// Exact key first, then the camel-cased one.
fn lookup<'a>(record: Option<&'a Map<String, Value>>, path: &str, camel_path: &str) -> Option<&'a Value> {
    let record = record?;
    record.get(path).or_else(|| record.get(camel_path))
}

fn integer_seed(text: &str, width: usize, signed: bool) -> Option<Vec<u8>> {
    if width > 16 {
        return None;
    }
    let text = text.trim();
    let bytes = if signed {
        let v = i128::from_str(text).ok()?;
        let bits = (width * 8) as u32;
        if bits < 128 {
            let bound = 1i128 << (bits - 1);
            if v < -bound || v >= bound {
                return None;
            }
        }
        v.to_le_bytes()
    } else {
        let v = u128::from_str(text).ok()?;
        if width < 16 && v >> (width * 8) != 0 {
            return None;
        }
        v.to_le_bytes()
    };
    Some(bytes[..width].to_vec())
}

fn arg_seed_bytes(value: &str, ty: Option<Primitive>) -> Option<Vec<u8>> {
    let ty = ty?;
    if let Some((width, signed)) = ty.integer_layout() {
        return integer_seed(value, width, signed);
    }
    match ty {
        Primitive::String | Primitive::Bytes => Some(value.as_bytes().to_vec()),
        _ => None,
    }
}

fn process_seed(seed: &IdlSeed, inputs: &SeedInputs) -> ProcessedSeed {
    match seed {
        IdlSeed::Const { value } if value.is_empty() => ProcessedSeed::unresolved("const", None),
        IdlSeed::Const { value } => {
            let hex = format!("0x{}", hex::encode(value));
            ProcessedSeed {
                buffer: Some(value.clone()),
                info: SeedInfo {
                    name: hex.clone(),
                    value: Some(hex),
                },
            }
        }
        IdlSeed::Arg { path } if path.is_empty() => ProcessedSeed::unresolved("arg", None),
        IdlSeed::Arg { path } => {
            let camel_path = path.to_mixed_case();
            let value = lookup(inputs.args, path, &camel_path)
                .and_then(value_as_string)
                .filter(|v| !v.is_empty());
            let value = match value {
                Some(value) => value,
                None => return ProcessedSeed::unresolved(camel_path, None),
            };
            let def = inputs
                .arg_defs
                .iter()
                .find(|a| a.name == *path)
                .or_else(|| inputs.arg_defs.iter().find(|a| a.name.to_mixed_case() == camel_path));
            let buffer = def.and_then(|def| arg_seed_bytes(&value, def.ty));
            if buffer.is_none() {
                log::debug!("arg seed {path} = {value} did not resolve");
            }
            ProcessedSeed {
                buffer,
                info: SeedInfo {
                    name: camel_path,
                    value: Some(value),
                },
            }
        }
        IdlSeed::Account { path, .. } => {
            let camel_path = path.to_mixed_case();
            let value = match lookup(inputs.accounts, path, &camel_path).and_then(Value::as_str) {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => return ProcessedSeed::unresolved(camel_path, None),
            };
            let buffer = Pubkey::from_str(value.trim()).ok().map(|k| k.to_bytes().to_vec());
            if buffer.is_none() {
                log::debug!("account seed {path} = {value} is not an address");
            }
            ProcessedSeed {
                buffer,
                info: SeedInfo {
                    name: camel_path,
                    value: Some(value),
                },
            }
        }
    }
}

/// Resolves every seed rule in order.
///
/// The buffers are returned only when all rules resolved; the info list always
/// has one entry per rule.
pub fn build_seeds_with_info(
    seeds: &[IdlSeed],
    inputs: &SeedInputs,
) -> (Option<Vec<Vec<u8>>>, Vec<SeedInfo>) {
    let processed: Vec<_> = seeds.iter().map(|seed| process_seed(seed, inputs)).collect();
    let mut buffers = Some(Vec::with_capacity(processed.len()));
    let mut info = Vec::with_capacity(processed.len());
    for seed in processed {
        buffers = match (buffers, seed.buffer) {
            (Some(mut acc), Some(buffer)) => {
                acc.push(buffer);
                Some(acc)
            }
            _ => None,
        };
        info.push(seed.info);
    }
    (buffers, info)
}

/// Derives the program address for a list of seed rules.
pub fn derive(program_id: &Pubkey, seeds: &[IdlSeed], inputs: &SeedInputs) -> PdaDerivationResult {
    let (buffers, seeds) = build_seeds_with_info(seeds, inputs);
    let generated = buffers.and_then(|buffers| {
        let refs: Vec<&[u8]> = buffers.iter().map(Vec::as_slice).collect();
        Pubkey::try_find_program_address(&refs, program_id).map(|(address, _)| address.to_string())
    });
    PdaDerivationResult { generated, seeds }
}
