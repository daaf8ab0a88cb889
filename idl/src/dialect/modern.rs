//! Modern Anchor IDL (`metadata.spec` 0.1.0, Anchor 0.30 and later).

use std::fs;
use std::path::Path;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::IdlType;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Idl {
    /// Empty when the descriptor leaves it to a fallback address.
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub metadata: IdlMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    pub instructions: Vec<IdlInstruction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<IdlAccount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<IdlEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<IdlErrorCode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<IdlTypeDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<IdlConst>,
}

impl Idl {
    pub fn from_file(p: impl AsRef<Path>) -> anyhow::Result<Self> {
        let idl = fs::read_to_string(&p)?;
        serde_json::from_str(&idl)
            .map_err(|e| anyhow!("Could not deserialize IDL {}: {e}", p.as_ref().display()))
    }

    pub fn find_instruction(&self, name: &str) -> Option<&IdlInstruction> {
        self.instructions.iter().find(|ix| ix.name == name)
    }

    pub fn find_type_def(&self, name: &str) -> Option<&IdlTypeDef> {
        self.types.iter().find(|ty| ty.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct IdlMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdlInstruction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(default)]
    pub discriminator: Vec<u8>,
    pub accounts: Vec<IdlInstructionAccountItem>,
    pub args: Vec<IdlField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<IdlType>,
}

impl IdlInstruction {
    /// Top-level accounts only; nested groups are skipped.
    pub fn single_accounts(&self) -> impl Iterator<Item = &IdlInstructionAccount> {
        self.accounts.iter().filter_map(|item| match item {
            IdlInstructionAccountItem::Single(account) => Some(account),
            IdlInstructionAccountItem::Composite(_) => None,
        })
    }

    /// Every account in declaration order, nested groups flattened.
    pub fn flattened_accounts(&self) -> Vec<&IdlInstructionAccount> {
        fn walk<'a>(items: &'a [IdlInstructionAccountItem], out: &mut Vec<&'a IdlInstructionAccount>) {
            for item in items {
                match item {
                    IdlInstructionAccountItem::Single(account) => out.push(account),
                    IdlInstructionAccountItem::Composite(group) => walk(&group.accounts, out),
                }
            }
        }
        let mut out = vec![];
        walk(&self.accounts, &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IdlInstructionAccountItem {
    Composite(IdlInstructionAccounts),
    Single(IdlInstructionAccount),
}

impl IdlInstructionAccountItem {
    pub fn name(&self) -> &str {
        match self {
            IdlInstructionAccountItem::Composite(group) => &group.name,
            IdlInstructionAccountItem::Single(account) => &account.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdlInstructionAccounts {
    pub name: String,
    pub accounts: Vec<IdlInstructionAccountItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct IdlInstructionAccount {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub writable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub signer: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pda: Option<IdlPda>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdlPda {
    pub seeds: Vec<IdlSeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<IdlSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IdlSeed {
    Const {
        value: Vec<u8>,
    },
    Arg {
        path: String,
    },
    Account {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdlField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(rename = "type")]
    pub ty: IdlType,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdlAccount {
    pub name: String,
    pub discriminator: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdlEvent {
    pub name: String,
    pub discriminator: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdlConst {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(rename = "type")]
    pub ty: IdlType,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdlErrorCode {
    pub code: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdlTypeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repr: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<Value>,
    #[serde(rename = "type")]
    pub ty: IdlTypeDefBody,
}

/// A type definition body. Kinds this crate does not know are kept raw.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IdlTypeDefBody {
    Known(IdlTypeDefTy),
    Unknown(Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IdlTypeDefTy {
    Struct {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fields: Option<IdlDefinedFields>,
    },
    Enum {
        variants: Vec<IdlEnumVariant>,
    },
    Type {
        alias: IdlType,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdlEnumVariant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<IdlDefinedFields>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IdlDefinedFields {
    Named(Vec<IdlField>),
    Tuple(Vec<IdlType>),
}
