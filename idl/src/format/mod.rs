//! Human-readable rendering of a descriptor.
//!
//! [format_display_idl] and [format_serde_idl] normalize any anchor-family
//! descriptor into a modern [Idl]; [format_idl] renders the result, or a codama
//! root node, into a [FormattedIdl].

use serde::Serialize;
use serde_json::Value;

use crate::convert::{convert_instruction_set, remove_unused_types, ConverterFlavor};
use crate::dialect::codama::RootNode;
use crate::dialect::modern::Idl;
use crate::dialect::{detect_dialect, DialectTag, MODERN_SPEC};
use crate::error::{IdlError, Result};
use crate::types::IdlType;

pub mod anchor;
pub mod codama;

pub use anchor::{format_anchor_idl, format_type, format_type_def};
pub use codama::{format_codama_idl, format_type_node};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormattedIdl {
    pub instructions: Vec<InstructionData>,
    pub accounts: Vec<TypeData>,
    pub types: Vec<TypeData>,
    pub errors: Vec<ErrorData>,
    pub constants: Vec<ConstantData>,
    pub events: Vec<TypeData>,
    pub pdas: Vec<PdaData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructionData {
    pub docs: Vec<String>,
    pub name: String,
    pub accounts: Vec<InstructionAccountItem>,
    pub args: Vec<ArgField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InstructionAccountItem {
    Group(NestedInstructionAccountsData),
    Single(InstructionAccountData),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedInstructionAccountsData {
    pub docs: Vec<String>,
    pub name: String,
    pub accounts: Vec<InstructionAccountData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstructionAccountData {
    pub docs: Vec<String>,
    pub name: String,
    pub writable: bool,
    pub signer: bool,
    pub optional: bool,
    pub pda: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgField {
    pub docs: Vec<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_type: Option<IdlType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorData {
    pub code: String,
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstantData {
    pub docs: Vec<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub value: Value,
}

/// Accounts, events and types all render the same way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeData {
    pub docs: Vec<String>,
    pub name: String,
    pub field_type: Option<FieldType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdaData {
    pub docs: Vec<String>,
    pub name: String,
    pub seeds: Vec<FieldType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldType {
    Struct {
        fields: Vec<StructField>,
    },
    Enum {
        variants: Vec<String>,
    },
    Type {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        docs: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(rename = "type")]
        ty: String,
    },
    Unknown {
        #[serde(rename = "type")]
        ty: String,
    },
}

impl FieldType {
    pub fn alias(ty: impl Into<String>) -> Self {
        FieldType::Type {
            docs: vec![],
            name: None,
            ty: ty.into(),
        }
    }

    pub fn named(docs: Vec<String>, name: impl Into<String>, ty: impl Into<String>) -> Self {
        FieldType::Type {
            docs,
            name: Some(name.into()),
            ty: ty.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(rename = "type")]
    pub ty: String,
}

/// A node that could not be rendered faithfully. Collected, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatError {
    pub message: String,
    pub node: Value,
}

impl FormatError {
    pub(crate) fn new(message: impl Into<String>, node: impl Serialize) -> Self {
        let error = FormatError {
            message: message.into(),
            node: serde_json::to_value(node).unwrap_or(Value::Null),
        };
        log::warn!("formatting error: {}: {}", error.message, error.node);
        error
    }
}

type Formatter = fn(&Value, Option<&str>) -> Result<Idl>;

fn modern(descriptor: &Value, address: Option<&str>) -> Result<Idl> {
    let mut idl: Idl = serde_json::from_value(descriptor.clone())?;
    if idl.address.is_empty() {
        idl.address = address
            .ok_or(IdlError::MissingProgramAddress)?
            .to_string();
    }
    Ok(idl)
}

fn legacy_display(descriptor: &Value, address: Option<&str>) -> Result<Idl> {
    convert_instruction_set(ConverterFlavor::Display, descriptor, address).map(remove_unused_types)
}

fn legacy_execution(descriptor: &Value, address: Option<&str>) -> Result<Idl> {
    convert_instruction_set(ConverterFlavor::Execution, descriptor, address).map(remove_unused_types)
}

fn display_formatter(tag: &DialectTag) -> Option<Formatter> {
    match tag {
        DialectTag::Spec(spec) if spec == MODERN_SPEC => Some(modern),
        DialectTag::Legacy | DialectTag::LegacyShank => Some(legacy_display),
        _ => None,
    }
}

fn serde_formatter(tag: &DialectTag) -> Option<Formatter> {
    match tag {
        DialectTag::Spec(spec) if spec == MODERN_SPEC => Some(modern),
        DialectTag::Legacy | DialectTag::LegacyShank => Some(legacy_execution),
        _ => None,
    }
}

fn run(
    lookup: fn(&DialectTag) -> Option<Formatter>,
    descriptor: &Value,
    program_address: Option<&str>,
) -> Result<Idl> {
    let tag = detect_dialect(descriptor);
    let formatter = lookup(&tag).ok_or_else(|| IdlError::SpecNotSupported(tag.to_string()))?;
    formatter(descriptor, program_address)
}

/// Normalizes a descriptor for display. Legacy tuples become `tuple[T]` types.
pub fn format_display_idl(descriptor: &Value, program_address: Option<&str>) -> Result<Idl> {
    run(display_formatter, descriptor, program_address)
}

/// Normalizes a descriptor for serialization. Legacy tuples become fixed arrays.
pub fn format_serde_idl(descriptor: &Value, program_address: Option<&str>) -> Result<Idl> {
    run(serde_formatter, descriptor, program_address)
}

/// Renders any supported descriptor, collecting soft failures.
pub fn format_idl(
    descriptor: &Value,
    program_address: Option<&str>,
) -> Result<(FormattedIdl, Vec<FormatError>)> {
    if detect_dialect(descriptor) == DialectTag::Codama {
        let root: RootNode = serde_json::from_value(descriptor.clone())?;
        return Ok(format_codama_idl(&root));
    }
    let idl = format_display_idl(descriptor, program_address)?;
    Ok(format_anchor_idl(&idl))
}
