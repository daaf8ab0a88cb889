//! Rendering of modern anchor descriptors.

use std::collections::{BTreeSet, HashMap};

use heck::MixedCase;
use serde_json::{Map, Value};

use super::{
    ArgField, ConstantData, ErrorData, FieldType, FormatError, FormattedIdl, InstructionAccountData,
    InstructionAccountItem, InstructionData, NestedInstructionAccountsData, PdaData, StructField,
    TypeData,
};
use crate::dialect::modern::{
    Idl, IdlDefinedFields, IdlInstruction, IdlInstructionAccount, IdlInstructionAccountItem,
    IdlSeed, IdlTypeDef, IdlTypeDefBody, IdlTypeDefTy,
};
use crate::types::{IdlArrayLen, IdlType};

/// Display string for a type, e.g. `vec(option(u64))` or `array(u8, 32)`.
pub fn format_type(ty: &IdlType) -> String {
    match ty {
        IdlType::Primitive(p) => p.to_string(),
        IdlType::Defined { name, .. } => name.clone(),
        IdlType::Array(inner, len) => {
            let len = match len {
                IdlArrayLen::Value(n) => n.to_string(),
                IdlArrayLen::Generic(name) => name.clone(),
            };
            format!("array({}, {})", format_type(inner), len)
        }
        IdlType::Vec(inner) => format!("vec({})", format_type(inner)),
        IdlType::Option(inner) => format!("option({})", format_type(inner)),
        IdlType::COption(inner) => format!("coption({})", format_type(inner)),
        IdlType::Generic(_) | IdlType::Unknown(_) => ty.to_value().to_string(),
    }
}

fn struct_fields(fields: &IdlDefinedFields) -> Vec<StructField> {
    match fields {
        IdlDefinedFields::Named(fields) => fields
            .iter()
            .map(|f| StructField {
                name: Some(f.name.to_mixed_case()),
                docs: f.docs.clone(),
                ty: format_type(&f.ty),
            })
            .collect(),
        IdlDefinedFields::Tuple(types) => types
            .iter()
            .map(|ty| StructField {
                name: None,
                docs: vec![],
                ty: format_type(ty),
            })
            .collect(),
    }
}

/// Describes a type definition body. A struct without fields has no
/// description.
pub fn format_type_def(body: &IdlTypeDefBody) -> Option<FieldType> {
    match body {
        IdlTypeDefBody::Known(IdlTypeDefTy::Struct { fields }) => {
            fields.as_ref().map(|fields| FieldType::Struct {
                fields: struct_fields(fields),
            })
        }
        IdlTypeDefBody::Known(IdlTypeDefTy::Enum { variants }) => Some(FieldType::Enum {
            variants: variants
                .iter()
                .map(|variant| {
                    let fields = variant.fields.as_ref().map(struct_fields).unwrap_or_default();
                    if fields.is_empty() {
                        return variant.name.clone();
                    }
                    if fields[0].name.is_none() {
                        let types: Vec<_> = fields.into_iter().map(|f| f.ty).collect();
                        return format!("{} [{}]", variant.name, types.join(", "));
                    }
                    let named: Map<String, Value> = fields
                        .into_iter()
                        .filter_map(|f| f.name.map(|name| (name, Value::String(f.ty))))
                        .collect();
                    format!("{} {}", variant.name, Value::Object(named))
                })
                .collect(),
        }),
        IdlTypeDefBody::Known(IdlTypeDefTy::Type { alias }) => {
            Some(FieldType::alias(format_type(alias)))
        }
        IdlTypeDefBody::Unknown(raw) => Some(FieldType::Unknown {
            ty: raw.to_string(),
        }),
    }
}

/// `JSON.parse`-like: valid JSON becomes a value, anything else stays a string.
pub fn safe_json_parse(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn account_data(account: &IdlInstructionAccount) -> InstructionAccountData {
    InstructionAccountData {
        docs: account.docs.clone(),
        name: account.name.to_mixed_case(),
        writable: account.writable,
        signer: account.signer,
        optional: account.optional,
        pda: account.pda.is_some(),
    }
}

fn group_members(items: &[IdlInstructionAccountItem]) -> Vec<&IdlInstructionAccount> {
    items
        .iter()
        .flat_map(|item| match item {
            IdlInstructionAccountItem::Single(account) => vec![account],
            IdlInstructionAccountItem::Composite(group) => group_members(&group.accounts),
        })
        .collect()
}

fn instruction_data(ix: &IdlInstruction) -> InstructionData {
    InstructionData {
        docs: ix.docs.clone(),
        name: ix.name.to_mixed_case(),
        accounts: ix
            .accounts
            .iter()
            .map(|item| match item {
                IdlInstructionAccountItem::Single(account) => {
                    InstructionAccountItem::Single(account_data(account))
                }
                IdlInstructionAccountItem::Composite(group) => {
                    InstructionAccountItem::Group(NestedInstructionAccountsData {
                        docs: ix.docs.clone(),
                        name: group.name.to_mixed_case(),
                        accounts: group_members(&group.accounts)
                            .into_iter()
                            .map(account_data)
                            .collect(),
                    })
                }
            })
            .collect(),
        args: ix
            .args
            .iter()
            .map(|arg| ArgField {
                docs: arg.docs.clone(),
                name: arg.name.to_mixed_case(),
                ty: format_type(&arg.ty),
                raw_type: Some(arg.ty.clone()),
            })
            .collect(),
    }
}

/// PDA-bearing accounts across all instructions, one per account name. A later
/// declaration replaces an earlier one but keeps its position.
fn unique_pda_accounts(instructions: &[IdlInstruction]) -> Vec<&IdlInstructionAccount> {
    let mut order: Vec<&str> = vec![];
    let mut by_name: HashMap<&str, &IdlInstructionAccount> = HashMap::new();
    for account in instructions.iter().flat_map(|ix| ix.flattened_accounts()) {
        if account.pda.is_none() {
            continue;
        }
        if by_name.insert(&account.name, account).is_none() {
            order.push(&account.name);
        }
    }
    order.into_iter().filter_map(|name| by_name.get(name).copied()).collect()
}

fn seed_data(seed: &IdlSeed, idl: &Idl) -> FieldType {
    match seed {
        IdlSeed::Const { value } => FieldType::named(vec![], hex::encode(value), "seed"),
        IdlSeed::Arg { path } => {
            let arg_type = idl
                .instructions
                .iter()
                .find_map(|ix| ix.args.iter().find(|arg| &arg.name == path))
                .map(|arg| format_type(&arg.ty));
            let ty = match arg_type {
                Some(ty) => format!("arg: {ty}"),
                None => "arg".to_string(),
            };
            FieldType::named(vec![], path.clone(), ty)
        }
        IdlSeed::Account { path, .. } => FieldType::named(vec![], path.clone(), "pubkey"),
    }
}

fn type_data(def: &IdlTypeDef) -> TypeData {
    TypeData {
        docs: def.docs.clone(),
        name: def.name.clone(),
        field_type: format_type_def(&def.ty),
    }
}

/// Renders a modern descriptor. Accounts without a matching type definition and
/// type definitions of an unknown kind are reported, and still rendered.
pub fn format_anchor_idl(idl: &Idl) -> (FormattedIdl, Vec<FormatError>) {
    let types: HashMap<&str, &IdlTypeDef> =
        idl.types.iter().map(|t| (t.name.as_str(), t)).collect();
    let hidden: BTreeSet<&str> = idl
        .accounts
        .iter()
        .map(|a| a.name.as_str())
        .chain(idl.events.iter().map(|e| e.name.as_str()))
        .collect();
    let mut errors = vec![];

    let accounts: Vec<TypeData> = idl
        .accounts
        .iter()
        .map(|account| match types.get(account.name.as_str()) {
            Some(def) => {
                if let IdlTypeDefBody::Unknown(_) = def.ty {
                    errors.push(FormatError::new("unknown account type kind", def));
                }
                type_data(def)
            }
            None => {
                errors.push(FormatError::new("account type definition not found", account));
                TypeData {
                    docs: vec![],
                    name: account.name.clone(),
                    field_type: Some(FieldType::Unknown {
                        ty: "unknown".to_string(),
                    }),
                }
            }
        })
        .collect();

    let formatted = FormattedIdl {
        instructions: idl.instructions.iter().map(instruction_data).collect(),
        accounts,
        types: idl
            .types
            .iter()
            .filter(|t| !hidden.contains(t.name.as_str()))
            .map(type_data)
            .collect(),
        errors: idl
            .errors
            .iter()
            .map(|e| ErrorData {
                code: e.code.to_string(),
                name: e.name.clone(),
                message: e.msg.clone().unwrap_or_default(),
            })
            .collect(),
        constants: idl
            .constants
            .iter()
            .map(|c| ConstantData {
                docs: c.docs.clone(),
                name: c.name.clone(),
                ty: format_type(&c.ty),
                value: safe_json_parse(&c.value),
            })
            .collect(),
        events: idl
            .events
            .iter()
            .map(|event| TypeData {
                docs: vec![],
                name: event.name.clone(),
                field_type: types.get(event.name.as_str()).and_then(|def| format_type_def(&def.ty)),
            })
            .collect(),
        pdas: unique_pda_accounts(&idl.instructions)
            .into_iter()
            .map(|account| PdaData {
                docs: vec![],
                name: account.name.to_mixed_case(),
                seeds: account
                    .pda
                    .iter()
                    .flat_map(|pda| pda.seeds.iter().map(|seed| seed_data(seed, idl)))
                    .collect(),
            })
            .collect(),
    };
    (formatted, errors)
}
