//! Legacy Anchor IDL (before `spec` 0.1.0), also emitted by shank.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Primitive;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyIdl {
    pub version: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<LegacyConst>,
    pub instructions: Vec<LegacyInstruction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<LegacyTypeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<LegacyTypeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<LegacyEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<LegacyErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl LegacyIdl {
    /// `metadata.address`, else a top-level `address`.
    pub fn metadata_address(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("address"))
            .and_then(Value::as_str)
            .or(self.address.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyConst {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: LegacyType,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyInstruction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    pub accounts: Vec<LegacyAccountItem>,
    pub args: Vec<LegacyField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<LegacyType>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LegacyAccountItem {
    Composite(LegacyAccounts),
    Single(LegacyAccount),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyAccounts {
    pub name: String,
    pub accounts: Vec<LegacyAccountItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAccount {
    pub name: String,
    #[serde(default)]
    pub is_mut: bool,
    #[serde(default)]
    pub is_signer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pda: Option<LegacyPda>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyPda {
    pub seeds: Vec<LegacySeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<LegacySeed>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LegacySeed {
    Const {
        #[serde(rename = "type")]
        ty: LegacyType,
        value: Value,
    },
    Arg {
        #[serde(rename = "type")]
        ty: LegacyType,
        path: String,
    },
    Account {
        #[serde(rename = "type")]
        ty: LegacyType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account: Option<String>,
        path: String,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(rename = "type")]
    pub ty: LegacyType,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyTypeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<String>,
    #[serde(rename = "type")]
    pub ty: LegacyTypeDefTy,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LegacyTypeDefTy {
    Struct {
        #[serde(default)]
        fields: Vec<LegacyField>,
    },
    Enum {
        variants: Vec<LegacyEnumVariant>,
    },
    Alias {
        value: LegacyType,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyEnumVariant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<LegacyEnumFields>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LegacyEnumFields {
    Named(Vec<LegacyField>),
    Tuple(Vec<LegacyType>),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyEvent {
    pub name: String,
    pub fields: Vec<LegacyEventField>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyEventField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: LegacyType,
    #[serde(default)]
    pub index: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LegacyErrorCode {
    pub code: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

/// A legacy type. `publicKey` parses as [Primitive::Pubkey].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LegacyType {
    Defined(String),
    DefinedWithTypeArgs {
        name: String,
        args: Vec<LegacyTypeArg>,
    },
    Option(Box<LegacyType>),
    #[serde(rename = "coption")]
    COption(Box<LegacyType>),
    Vec(Box<LegacyType>),
    Array(Box<LegacyType>, LegacyArrayLen),
    GenericLenArray(Box<LegacyType>, String),
    Generic(String),
    Tuple(Vec<LegacyType>),
    #[serde(untagged)]
    Primitive(Primitive),
    #[serde(untagged)]
    Unknown(Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LegacyArrayLen {
    Value(usize),
    Generic { generic: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyTypeArg {
    Generic(String),
    Value(String),
    Type(LegacyType),
}
