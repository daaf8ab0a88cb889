//! Legacy to modern conversion.
//!
//! Three converter flavors share one walk over [LegacyType] and differ only in
//! how they treat tuples:
//! - [ConverterFlavor::Display] turns a tuple into a synthetic `tuple[T]`
//!   defined type whose generics list each element type.
//! - [ConverterFlavor::Execution] turns a tuple into `array(first, 2)`, and a
//!   `(u8,[u8;N])` leaf name into `array(u8, N + 1)`.
//! - [ConverterFlavor::Reference] rejects every tuple.

use std::collections::{BTreeSet, VecDeque};

use serde_json::{json, Value};

use crate::dialect::legacy::{
    LegacyAccountItem, LegacyArrayLen, LegacyEnumFields, LegacyField, LegacyIdl, LegacySeed,
    LegacyType, LegacyTypeArg, LegacyTypeDef, LegacyTypeDefTy,
};
use crate::dialect::modern::{
    Idl, IdlAccount, IdlConst, IdlDefinedFields, IdlEnumVariant, IdlErrorCode, IdlEvent, IdlField,
    IdlInstruction, IdlInstructionAccount, IdlInstructionAccountItem, IdlInstructionAccounts,
    IdlMetadata, IdlPda, IdlSeed, IdlTypeDef, IdlTypeDefBody, IdlTypeDefTy,
};
use crate::discriminator::{account_discriminator, event_discriminator, ix_discriminator};
use crate::error::{IdlError, Result};
use crate::types::{IdlArrayLen, IdlGenericArg, IdlType, Primitive};

pub mod tuple;

pub use tuple::{is_leaf_tuple_u8, parse_homogeneous_tuple, parse_leaf_tuple};

/// Arity assumed for tuples by the execution converter.
pub const EXECUTION_TUPLE_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterFlavor {
    Display,
    Execution,
    Reference,
}

/// Converts one legacy type into the canonical tree.
pub fn convert_type(flavor: ConverterFlavor, ty: &LegacyType) -> Result<IdlType> {
    Ok(match ty {
        LegacyType::Primitive(p) => IdlType::Primitive(*p),
        LegacyType::Defined(name) => {
            if flavor == ConverterFlavor::Execution && is_leaf_tuple_u8(name) {
                IdlType::array(Primitive::U8.into(), parse_leaf_tuple(name)? + 1)
            } else {
                IdlType::defined(name.clone())
            }
        }
        LegacyType::DefinedWithTypeArgs { name, args } => IdlType::Defined {
            name: name.clone(),
            generics: args
                .iter()
                .map(|arg| convert_type_arg(flavor, arg))
                .collect::<Result<_>>()?,
        },
        LegacyType::Option(inner) => IdlType::Option(Box::new(convert_type(flavor, inner)?)),
        LegacyType::COption(inner) => IdlType::COption(Box::new(convert_type(flavor, inner)?)),
        LegacyType::Vec(inner) => IdlType::Vec(Box::new(convert_type(flavor, inner)?)),
        LegacyType::Array(inner, len) => IdlType::Array(
            Box::new(convert_type(flavor, inner)?),
            match len {
                LegacyArrayLen::Value(n) => IdlArrayLen::Value(*n),
                LegacyArrayLen::Generic { generic } => IdlArrayLen::Generic(generic.clone()),
            },
        ),
        LegacyType::GenericLenArray(inner, generic) => IdlType::Array(
            Box::new(convert_type(flavor, inner)?),
            IdlArrayLen::Generic(generic.clone()),
        ),
        LegacyType::Generic(name) => IdlType::Generic(name.clone()),
        LegacyType::Tuple(items) => convert_tuple(flavor, ty, items)?,
        LegacyType::Unknown(raw) => return Err(IdlError::UnsupportedType(raw.clone())),
    })
}

fn convert_tuple(flavor: ConverterFlavor, ty: &LegacyType, items: &[LegacyType]) -> Result<IdlType> {
    let Some(first) = items.first() else {
        return Err(IdlError::unsupported(ty));
    };
    match flavor {
        ConverterFlavor::Reference => Err(IdlError::unsupported(ty)),
        ConverterFlavor::Display => Ok(IdlType::Defined {
            name: format!("tuple[{}]", raw_type_name(first)),
            generics: items
                .iter()
                .map(|item| convert_type(flavor, item).map(|ty| IdlGenericArg::Type { ty }))
                .collect::<Result<_>>()?,
        }),
        ConverterFlavor::Execution => Ok(IdlType::array(
            convert_type(flavor, first)?,
            EXECUTION_TUPLE_LEN,
        )),
    }
}

fn raw_type_name(ty: &LegacyType) -> String {
    match ty {
        LegacyType::Primitive(p) => p.to_string(),
        LegacyType::Defined(name) => name.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

fn convert_type_arg(flavor: ConverterFlavor, arg: &LegacyTypeArg) -> Result<IdlGenericArg> {
    Ok(match arg {
        LegacyTypeArg::Generic(name) => IdlGenericArg::Type {
            ty: IdlType::Generic(name.clone()),
        },
        LegacyTypeArg::Value(value) => IdlGenericArg::Const {
            value: value.clone(),
        },
        LegacyTypeArg::Type(ty) => IdlGenericArg::Type {
            ty: convert_type(flavor, ty)?,
        },
    })
}

/// Parses `descriptor` as a legacy IDL and converts it.
pub fn convert_instruction_set(
    flavor: ConverterFlavor,
    descriptor: &Value,
    program_address_fallback: Option<&str>,
) -> Result<Idl> {
    let legacy: LegacyIdl = serde_json::from_value(descriptor.clone())?;
    convert_legacy_idl(flavor, &legacy, program_address_fallback)
}

/// Converts a whole legacy descriptor into the modern shape.
pub fn convert_legacy_idl(
    flavor: ConverterFlavor,
    legacy: &LegacyIdl,
    program_address_fallback: Option<&str>,
) -> Result<Idl> {
    let address = legacy
        .metadata_address()
        .or(program_address_fallback)
        .ok_or(IdlError::MissingProgramAddress)?
        .to_string();

    let instructions = legacy
        .instructions
        .iter()
        .map(|ix| {
            Ok(IdlInstruction {
                name: ix.name.clone(),
                docs: ix.docs.clone(),
                discriminator: ix_discriminator(&ix.name).to_vec(),
                accounts: ix.accounts.iter().map(convert_account_item).collect(),
                args: convert_fields(flavor, &ix.args)?,
                returns: ix
                    .returns
                    .as_ref()
                    .map(|ty| convert_type(flavor, ty))
                    .transpose()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut types = vec![];
    for account in &legacy.accounts {
        types.push(convert_type_def(flavor, account)?);
    }
    for event in &legacy.events {
        let fields = event
            .fields
            .iter()
            .map(|f| {
                Ok(IdlField {
                    name: f.name.clone(),
                    docs: vec![],
                    ty: convert_type(flavor, &f.ty)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        types.push(IdlTypeDef {
            name: event.name.clone(),
            docs: vec![],
            serialization: None,
            repr: None,
            generics: vec![],
            ty: IdlTypeDefBody::Known(IdlTypeDefTy::Struct {
                fields: non_empty_named(fields),
            }),
        });
    }
    for ty in &legacy.types {
        types.push(convert_type_def(flavor, ty)?);
    }

    Ok(Idl {
        address,
        metadata: IdlMetadata {
            name: legacy.name.clone(),
            version: legacy.version.clone(),
            ..Default::default()
        },
        docs: legacy.docs.clone(),
        instructions,
        accounts: legacy
            .accounts
            .iter()
            .map(|a| IdlAccount {
                name: a.name.clone(),
                discriminator: account_discriminator(&a.name).to_vec(),
            })
            .collect(),
        events: legacy
            .events
            .iter()
            .map(|e| IdlEvent {
                name: e.name.clone(),
                discriminator: event_discriminator(&e.name).to_vec(),
            })
            .collect(),
        errors: legacy
            .errors
            .iter()
            .map(|e| IdlErrorCode {
                code: e.code,
                name: e.name.clone(),
                msg: e.msg.clone(),
            })
            .collect(),
        types,
        constants: legacy
            .constants
            .iter()
            .map(|c| {
                Ok(IdlConst {
                    name: c.name.clone(),
                    docs: vec![],
                    ty: convert_type(flavor, &c.ty)?,
                    value: c.value.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?,
    })
}

fn convert_fields(flavor: ConverterFlavor, fields: &[LegacyField]) -> Result<Vec<IdlField>> {
    fields
        .iter()
        .map(|f| {
            Ok(IdlField {
                name: f.name.clone(),
                docs: f.docs.clone(),
                ty: convert_type(flavor, &f.ty)?,
            })
        })
        .collect()
}

fn non_empty_named(fields: Vec<IdlField>) -> Option<IdlDefinedFields> {
    if fields.is_empty() {
        None
    } else {
        Some(IdlDefinedFields::Named(fields))
    }
}

fn convert_type_def(flavor: ConverterFlavor, def: &LegacyTypeDef) -> Result<IdlTypeDef> {
    let ty = match &def.ty {
        LegacyTypeDefTy::Struct { fields } => IdlTypeDefTy::Struct {
            fields: non_empty_named(convert_fields(flavor, fields)?),
        },
        LegacyTypeDefTy::Enum { variants } => IdlTypeDefTy::Enum {
            variants: variants
                .iter()
                .map(|v| {
                    Ok(IdlEnumVariant {
                        name: v.name.clone(),
                        fields: match &v.fields {
                            None => None,
                            Some(LegacyEnumFields::Named(fields)) => {
                                Some(IdlDefinedFields::Named(convert_fields(flavor, fields)?))
                            }
                            Some(LegacyEnumFields::Tuple(types)) => Some(IdlDefinedFields::Tuple(
                                types
                                    .iter()
                                    .map(|t| convert_type(flavor, t))
                                    .collect::<Result<_>>()?,
                            )),
                        },
                    })
                })
                .collect::<Result<_>>()?,
        },
        LegacyTypeDefTy::Alias { value } => IdlTypeDefTy::Type {
            alias: convert_type(flavor, value)?,
        },
    };
    Ok(IdlTypeDef {
        name: def.name.clone(),
        docs: def.docs.clone(),
        serialization: None,
        repr: None,
        generics: def
            .generics
            .iter()
            .map(|g| json!({ "kind": "type", "name": g }))
            .collect(),
        ty: IdlTypeDefBody::Known(ty),
    })
}

fn convert_account_item(item: &LegacyAccountItem) -> IdlInstructionAccountItem {
    match item {
        LegacyAccountItem::Composite(group) => {
            IdlInstructionAccountItem::Composite(IdlInstructionAccounts {
                name: group.name.clone(),
                accounts: group.accounts.iter().map(convert_account_item).collect(),
            })
        }
        LegacyAccountItem::Single(account) => {
            IdlInstructionAccountItem::Single(IdlInstructionAccount {
                name: account.name.clone(),
                docs: account.docs.clone(),
                writable: account.is_mut,
                signer: account.is_signer,
                optional: account.is_optional.unwrap_or(false),
                address: None,
                pda: account.pda.as_ref().map(|pda| IdlPda {
                    seeds: pda.seeds.iter().map(convert_seed).collect(),
                    program: pda.program_id.as_ref().map(convert_seed),
                }),
                relations: account.relations.clone(),
            })
        }
    }
}

fn convert_seed(seed: &LegacySeed) -> IdlSeed {
    match seed {
        LegacySeed::Const { ty, value } => IdlSeed::Const {
            value: const_seed_bytes(ty, value),
        },
        LegacySeed::Arg { path, .. } => IdlSeed::Arg { path: path.clone() },
        LegacySeed::Account { path, account, .. } => IdlSeed::Account {
            path: path.clone(),
            account: account.clone(),
        },
    }
}

/// Constant seed bytes. An unencodable constant becomes empty, which the
/// derivation engine reports as unresolved.
fn const_seed_bytes(ty: &LegacyType, value: &Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.as_bytes().to_vec(),
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect::<Option<Vec<u8>>>()
            .unwrap_or_default(),
        Value::Number(n) => {
            let width = match ty {
                LegacyType::Primitive(p) => p.integer_layout().map(|(w, _)| w),
                _ => None,
            };
            match (width, n.as_i64()) {
                (Some(width), Some(n)) if width <= 16 => {
                    (n as i128).to_le_bytes()[..width].to_vec()
                }
                _ => {
                    log::debug!("cannot encode constant seed {value} as {ty:?}");
                    vec![]
                }
            }
        }
        _ => {
            log::debug!("cannot encode constant seed {value}");
            vec![]
        }
    }
}

/// Drops type definitions that nothing in the descriptor references.
pub fn remove_unused_types(mut idl: Idl) -> Idl {
    let mut roots: Vec<&IdlType> = vec![];
    for ix in &idl.instructions {
        roots.extend(ix.args.iter().map(|a| &a.ty));
        roots.extend(ix.returns.iter());
    }
    roots.extend(idl.constants.iter().map(|c| &c.ty));

    let mut used: BTreeSet<String> = idl
        .accounts
        .iter()
        .map(|a| a.name.clone())
        .chain(idl.events.iter().map(|e| e.name.clone()))
        .collect();
    let mut queue: VecDeque<String> = used.iter().cloned().collect();
    for ty in roots {
        collect_defined(ty, &mut |name| {
            if used.insert(name.to_string()) {
                queue.push_back(name.to_string());
            }
        });
    }

    while let Some(name) = queue.pop_front() {
        let Some(def) = idl.types.iter().find(|t| t.name == name) else {
            continue;
        };
        for ty in type_def_refs(def) {
            collect_defined(ty, &mut |name| {
                if used.insert(name.to_string()) {
                    queue.push_back(name.to_string());
                }
            });
        }
    }

    idl.types.retain(|t| used.contains(&t.name));
    idl
}

fn type_def_refs(def: &IdlTypeDef) -> Vec<&IdlType> {
    fn fields_refs(fields: &IdlDefinedFields) -> Vec<&IdlType> {
        match fields {
            IdlDefinedFields::Named(fields) => fields.iter().map(|f| &f.ty).collect(),
            IdlDefinedFields::Tuple(types) => types.iter().collect(),
        }
    }
    match &def.ty {
        IdlTypeDefBody::Known(IdlTypeDefTy::Struct { fields }) => {
            fields.as_ref().map(fields_refs).unwrap_or_default()
        }
        IdlTypeDefBody::Known(IdlTypeDefTy::Enum { variants }) => variants
            .iter()
            .filter_map(|v| v.fields.as_ref())
            .flat_map(fields_refs)
            .collect(),
        IdlTypeDefBody::Known(IdlTypeDefTy::Type { alias }) => vec![alias],
        IdlTypeDefBody::Unknown(_) => vec![],
    }
}

fn collect_defined(ty: &IdlType, found: &mut impl FnMut(&str)) {
    match ty {
        IdlType::Option(inner) | IdlType::COption(inner) | IdlType::Vec(inner) => {
            collect_defined(inner, found)
        }
        IdlType::Array(inner, _) => collect_defined(inner, found),
        IdlType::Defined { name, generics } => {
            found(name);
            for generic in generics {
                if let IdlGenericArg::Type { ty } = generic {
                    collect_defined(ty, found);
                }
            }
        }
        IdlType::Generic(_) | IdlType::Primitive(_) | IdlType::Unknown(_) => {}
    }
}
