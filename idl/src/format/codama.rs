//! Rendering of codama root nodes.

use std::collections::HashMap;

use serde_json::{json, Value};

use super::{
    ArgField, ErrorData, FieldType, FormatError, FormattedIdl, InstructionAccountData,
    InstructionAccountItem, InstructionData, PdaData, StructField, TypeData,
};
use crate::dialect::codama::{
    EnumVariantNode, InstructionAccountNode, InstructionNode, KnownEnumVariantNode,
    KnownPdaSeedNode, KnownTypeNode, PdaNode, PdaRef, PdaSeedNode, PdaValueNode, RootNode,
    TypeNode,
};

fn variants(variants: &[EnumVariantNode]) -> Vec<String> {
    variants
        .iter()
        .map(|variant| match variant {
            EnumVariantNode::Known(KnownEnumVariantNode::EnumStructVariantTypeNode {
                name,
                fields,
            }) => format!("{} {}", name, format_type_node(fields)),
            EnumVariantNode::Known(KnownEnumVariantNode::EnumTupleVariantTypeNode {
                name,
                tuple,
            }) => format!("{} {}", name, format_type_node(tuple)),
            other => other.name(),
        })
        .collect()
}

fn joined<'a>(nodes: impl IntoIterator<Item = &'a TypeNode>) -> String {
    nodes
        .into_iter()
        .map(format_type_node)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Display string for a codama type node.
pub fn format_type_node(node: &TypeNode) -> String {
    let known = match node {
        TypeNode::Known(known) => known,
        TypeNode::Other(raw) => return raw.to_string(),
    };
    match known {
        KnownTypeNode::AmountTypeNode {
            decimals,
            unit,
            number,
        } => match unit {
            Some(unit) => format!("amount({} {} decimals[{}])", format_type_node(number), unit, decimals),
            None => format!("amount({} decimals[{}])", format_type_node(number), decimals),
        },
        KnownTypeNode::BooleanTypeNode {} => "bool".to_string(),
        KnownTypeNode::BytesTypeNode {} => "bytes".to_string(),
        KnownTypeNode::ArrayTypeNode { item, count } => match count.fixed() {
            Some(n) => format!("array({}, {})", format_type_node(item), n),
            None => format!("vec({})", format_type_node(item)),
        },
        KnownTypeNode::DateTimeTypeNode { number } => format!("dateTime({})", format_type_node(number)),
        KnownTypeNode::DefinedTypeLinkNode { name, program } => match program {
            Some(program) => format!("{} ({})", name, program.name),
            None => name.clone(),
        },
        KnownTypeNode::EnumTypeNode { variants: v } => variants(v).join(" | "),
        KnownTypeNode::FixedSizeTypeNode { ty, size } => format!("array({},{})", format_type_node(ty), size),
        KnownTypeNode::MapTypeNode { key, value } => {
            format!("map({}, {})", format_type_node(key), format_type_node(value))
        }
        KnownTypeNode::NumberTypeNode { format } => format.clone(),
        KnownTypeNode::OptionTypeNode { item } => format!("option({})", format_type_node(item)),
        KnownTypeNode::PostOffsetTypeNode { ty } => format!("postOffset({})", format_type_node(ty)),
        KnownTypeNode::PreOffsetTypeNode { ty } => format!("preOffset({})", format_type_node(ty)),
        KnownTypeNode::PublicKeyTypeNode {} => "pubkey".to_string(),
        KnownTypeNode::RemainderOptionTypeNode { item } => {
            format!("remainderOption({})", format_type_node(item))
        }
        KnownTypeNode::SetTypeNode { item } => format!("set({})", format_type_node(item)),
        KnownTypeNode::SizePrefixTypeNode { ty } => format!("sizePrefix({})", format_type_node(ty)),
        KnownTypeNode::SolAmountTypeNode { number } => format!("solAmount({})", format_type_node(number)),
        KnownTypeNode::StringTypeNode { encoding } => format!("string:{encoding}"),
        KnownTypeNode::StructTypeNode { fields } => joined(fields.iter().map(|f| &f.ty)),
        KnownTypeNode::TupleTypeNode { items } => joined(items),
        KnownTypeNode::ZeroableOptionTypeNode { item } => format!("zeroOption({})", format_type_node(item)),
    }
}

fn str_field<'a>(node: &'a Value, key: &str) -> &'a str {
    node.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn items(node: &Value, key: &str) -> Vec<String> {
    node.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(format_value_node).collect())
        .unwrap_or_default()
}

/// Display string for a codama value node, kept as raw JSON.
pub fn format_value_node(node: &Value) -> String {
    match str_field(node, "kind") {
        "arrayValueNode" => format!("array({})", items(node, "items").join(", ")),
        "bytesValueNode" => str_field(node, "data").to_string(),
        "booleanValueNode" => node.get("boolean").unwrap_or(&Value::Null).to_string(),
        "constantValueNode" => {
            let value = node.get("value").map(format_value_node).unwrap_or_default();
            let ty = node
                .get("type")
                .and_then(|ty| serde_json::from_value::<TypeNode>(ty.clone()).ok())
                .map(|ty| format_type_node(&ty))
                .unwrap_or_default();
            format!("{value}: {ty}")
        }
        "mapValueNode" => {
            let entries: Vec<Value> = node
                .get("entries")
                .and_then(Value::as_array)
                .map(|entries| {
                    entries
                        .iter()
                        .map(|entry| {
                            json!({
                                "key": entry.get("key").map(format_value_node).unwrap_or_default(),
                                "value": entry.get("value").map(format_value_node).unwrap_or_default(),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            Value::Array(entries).to_string()
        }
        "noneValueNode" => "none".to_string(),
        "enumValueNode" => str_field(node, "variant").to_string(),
        "numberValueNode" => node.get("number").unwrap_or(&Value::Null).to_string(),
        "publicKeyValueNode" => str_field(node, "publicKey").to_string(),
        "setValueNode" => items(node, "items").join(", "),
        "someValueNode" => node.get("value").map(format_value_node).unwrap_or_default(),
        "stringValueNode" => str_field(node, "string").to_string(),
        "structValueNode" => {
            let fields: Vec<Value> = node
                .get("fields")
                .and_then(Value::as_array)
                .map(|fields| {
                    fields
                        .iter()
                        .map(|field| {
                            json!({
                                "name": str_field(field, "name"),
                                "value": field.get("value").map(format_value_node).unwrap_or_default(),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            Value::Array(fields).to_string()
        }
        "tupleValueNode" => format!("tuple({})", items(node, "items").join(", ")),
        _ => node.to_string(),
    }
}

fn describe_type_node(node: &TypeNode, errors: &mut Vec<FormatError>) -> FieldType {
    match node {
        TypeNode::Known(KnownTypeNode::StructTypeNode { fields }) => FieldType::Struct {
            fields: fields
                .iter()
                .map(|field| StructField {
                    name: Some(field.name.clone()),
                    docs: vec![],
                    ty: format_type_node(&field.ty),
                })
                .collect(),
        },
        TypeNode::Known(KnownTypeNode::EnumTypeNode { variants: v }) => FieldType::Enum {
            variants: variants(v),
        },
        TypeNode::Other(raw) => {
            errors.push(FormatError::new("unknown codama type node", raw));
            FieldType::alias(format_type_node(node))
        }
        _ => FieldType::alias(format_type_node(node)),
    }
}

fn account_data(account: &InstructionAccountNode) -> InstructionAccountData {
    InstructionAccountData {
        docs: account.docs.clone(),
        name: account.name.clone(),
        writable: account.is_writable,
        signer: account.is_signer(),
        optional: account.is_optional,
        pda: account.is_pda(),
    }
}

fn instruction_data(ix: &InstructionNode) -> InstructionData {
    InstructionData {
        docs: ix.docs.clone(),
        name: ix.name.clone(),
        accounts: ix
            .accounts
            .iter()
            .map(|account| InstructionAccountItem::Single(account_data(account)))
            .collect(),
        args: ix
            .arguments
            .iter()
            .map(|arg| ArgField {
                docs: arg.docs.clone(),
                name: arg.name.clone(),
                ty: format_type_node(&arg.ty),
                raw_type: None,
            })
            .collect(),
    }
}

/// PDA defaults across all instructions, first one wins. Conditional defaults
/// are keyed by PDA name, plain ones by account name.
fn unique_pda_values(instructions: &[InstructionNode]) -> Vec<PdaValueNode> {
    let mut seen: Vec<String> = vec![];
    let mut unique = vec![];
    for account in instructions.iter().flat_map(|ix| &ix.accounts) {
        let defaults = account.pda_defaults();
        let conditional = account
            .default_value
            .as_ref()
            .and_then(|d| d.get("kind"))
            .and_then(Value::as_str)
            == Some("conditionalValueNode");
        for default in defaults {
            let key = if conditional {
                default.pda.name().to_string()
            } else {
                account.name.clone()
            };
            if !seen.contains(&key) {
                seen.push(key);
                unique.push(default);
            }
        }
    }
    unique
}

fn seed_data(seed: &PdaSeedNode) -> FieldType {
    match seed {
        PdaSeedNode::Known(KnownPdaSeedNode::VariablePdaSeedNode { name, docs, ty }) => {
            FieldType::named(docs.clone(), name.clone(), format_type_node(ty))
        }
        PdaSeedNode::Known(KnownPdaSeedNode::ConstantPdaSeedNode { ty, value }) => {
            let name = if str_field(value, "kind") == "programIdValueNode" {
                "programId".to_string()
            } else {
                format_value_node(value)
            };
            FieldType::named(vec![], name, format_type_node(ty))
        }
        PdaSeedNode::Other(raw) => {
            let ty = raw
                .get("type")
                .and_then(|ty| serde_json::from_value::<TypeNode>(ty.clone()).ok())
                .map(|ty| format_type_node(&ty))
                .unwrap_or_default();
            FieldType::named(vec![], "seed kind not supported", ty)
        }
    }
}

fn seeds_of(pda: &PdaNode) -> Vec<FieldType> {
    pda.seeds.iter().map(seed_data).collect()
}

/// Renders a codama root node. Codama has no constants and no events.
pub fn format_codama_idl(root: &RootNode) -> (FormattedIdl, Vec<FormatError>) {
    let program = &root.program;
    let linked: HashMap<&str, &PdaNode> = program.pdas.iter().map(|p| (p.name.as_str(), p)).collect();
    let mut errors = vec![];

    let accounts: Vec<TypeData> = program
        .accounts
        .iter()
        .map(|account| TypeData {
            docs: account.docs.clone(),
            name: account.name.clone(),
            field_type: Some(describe_type_node(&account.data, &mut errors)),
        })
        .collect();
    let types: Vec<TypeData> = program
        .defined_types
        .iter()
        .map(|def| TypeData {
            docs: def.docs.clone(),
            name: def.name.clone(),
            field_type: Some(describe_type_node(&def.ty, &mut errors)),
        })
        .collect();

    let formatted = FormattedIdl {
        instructions: program.instructions.iter().map(instruction_data).collect(),
        accounts,
        types,
        errors: program
            .errors
            .iter()
            .map(|e| ErrorData {
                code: e.code.to_string(),
                name: e.name.clone(),
                message: e.message.clone(),
            })
            .collect(),
        constants: vec![],
        events: vec![],
        pdas: unique_pda_values(&program.instructions)
            .iter()
            .map(|value| {
                let linked_pda = linked.get(value.pda.name()).copied();
                PdaData {
                    docs: linked_pda.map(|p| p.docs.clone()).unwrap_or_default(),
                    name: value.pda.name().to_string(),
                    seeds: match &value.pda {
                        PdaRef::PdaLinkNode { .. } => linked_pda.map(seeds_of).unwrap_or_default(),
                        PdaRef::PdaNode(node) => seeds_of(node),
                    },
                }
            })
            .collect(),
    };
    (formatted, errors)
}
