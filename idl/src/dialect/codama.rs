//! Codama root nodes (`standard: "codama"`).
//!
//! Only the nodes needed for display formatting are modeled. Unknown node
//! kinds are kept as raw JSON so a descriptor always parses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootNode {
    pub standard: String,
    pub version: String,
    pub program: ProgramNode,
    #[serde(default)]
    pub additional_programs: Vec<ProgramNode>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramNode {
    pub name: String,
    pub public_key: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub docs: Vec<String>,
    #[serde(default)]
    pub accounts: Vec<AccountNode>,
    #[serde(default)]
    pub instructions: Vec<InstructionNode>,
    #[serde(default)]
    pub defined_types: Vec<DefinedTypeNode>,
    #[serde(default)]
    pub pdas: Vec<PdaNode>,
    #[serde(default)]
    pub errors: Vec<ErrorNode>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountNode {
    pub name: String,
    #[serde(default)]
    pub docs: Vec<String>,
    pub data: TypeNode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstructionNode {
    pub name: String,
    #[serde(default)]
    pub docs: Vec<String>,
    #[serde(default)]
    pub accounts: Vec<InstructionAccountNode>,
    #[serde(default)]
    pub arguments: Vec<InstructionArgumentNode>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionAccountNode {
    pub name: String,
    #[serde(default)]
    pub docs: Vec<String>,
    #[serde(default)]
    pub is_writable: bool,
    /// `true`, `false` or `"either"`.
    #[serde(default)]
    pub is_signer: Value,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub default_value: Option<Value>,
}

impl InstructionAccountNode {
    pub fn is_signer(&self) -> bool {
        match &self.is_signer {
            Value::Bool(b) => *b,
            Value::String(s) => s == "either",
            _ => false,
        }
    }

    /// PDA default values, including both branches of a conditional default.
    pub fn pda_defaults(&self) -> Vec<PdaValueNode> {
        let Some(default) = &self.default_value else {
            return vec![];
        };
        match default.get("kind").and_then(Value::as_str) {
            Some("pdaValueNode") => PdaValueNode::parse(default).into_iter().collect(),
            Some("conditionalValueNode") => ["ifTrue", "ifFalse"]
                .iter()
                .filter_map(|branch| default.get(*branch))
                .filter_map(PdaValueNode::parse)
                .collect(),
            _ => vec![],
        }
    }

    pub fn is_pda(&self) -> bool {
        !self.pda_defaults().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstructionArgumentNode {
    pub name: String,
    #[serde(default)]
    pub docs: Vec<String>,
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefinedTypeNode {
    pub name: String,
    #[serde(default)]
    pub docs: Vec<String>,
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorNode {
    pub code: u32,
    pub name: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PdaNode {
    pub name: String,
    #[serde(default)]
    pub docs: Vec<String>,
    #[serde(default)]
    pub seeds: Vec<PdaSeedNode>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PdaValueNode {
    pub pda: PdaRef,
}

impl PdaValueNode {
    fn parse(value: &Value) -> Option<Self> {
        if value.get("kind").and_then(Value::as_str) != Some("pdaValueNode") {
            return None;
        }
        serde_json::from_value(value.clone())
            .map_err(|e| log::debug!("skipping malformed pdaValueNode: {e}"))
            .ok()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PdaRef {
    PdaLinkNode { name: String },
    PdaNode(PdaNode),
}

impl PdaRef {
    pub fn name(&self) -> &str {
        match self {
            PdaRef::PdaLinkNode { name } => name,
            PdaRef::PdaNode(node) => &node.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PdaSeedNode {
    Known(KnownPdaSeedNode),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum KnownPdaSeedNode {
    ConstantPdaSeedNode {
        #[serde(rename = "type")]
        ty: TypeNode,
        value: Value,
    },
    VariablePdaSeedNode {
        name: String,
        #[serde(default)]
        docs: Vec<String>,
        #[serde(rename = "type")]
        ty: TypeNode,
    },
}

/// Any codama type node.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TypeNode {
    Known(KnownTypeNode),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum KnownTypeNode {
    #[serde(rename_all = "camelCase")]
    AmountTypeNode {
        decimals: u32,
        #[serde(default)]
        unit: Option<String>,
        number: Box<TypeNode>,
    },
    BooleanTypeNode {},
    BytesTypeNode {},
    ArrayTypeNode {
        item: Box<TypeNode>,
        count: CountNode,
    },
    DateTimeTypeNode {
        number: Box<TypeNode>,
    },
    DefinedTypeLinkNode {
        name: String,
        #[serde(default)]
        program: Option<ProgramLinkNode>,
    },
    EnumTypeNode {
        variants: Vec<EnumVariantNode>,
    },
    FixedSizeTypeNode {
        #[serde(rename = "type")]
        ty: Box<TypeNode>,
        size: u64,
    },
    MapTypeNode {
        key: Box<TypeNode>,
        value: Box<TypeNode>,
    },
    NumberTypeNode {
        format: String,
    },
    OptionTypeNode {
        item: Box<TypeNode>,
    },
    PostOffsetTypeNode {
        #[serde(rename = "type")]
        ty: Box<TypeNode>,
    },
    PreOffsetTypeNode {
        #[serde(rename = "type")]
        ty: Box<TypeNode>,
    },
    PublicKeyTypeNode {},
    RemainderOptionTypeNode {
        item: Box<TypeNode>,
    },
    SetTypeNode {
        item: Box<TypeNode>,
    },
    SizePrefixTypeNode {
        #[serde(rename = "type")]
        ty: Box<TypeNode>,
    },
    SolAmountTypeNode {
        number: Box<TypeNode>,
    },
    StringTypeNode {
        encoding: String,
    },
    StructTypeNode {
        fields: Vec<StructFieldTypeNode>,
    },
    TupleTypeNode {
        items: Vec<TypeNode>,
    },
    ZeroableOptionTypeNode {
        item: Box<TypeNode>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProgramLinkNode {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CountNode {
    pub kind: String,
    #[serde(default)]
    pub value: Option<u64>,
}

impl CountNode {
    pub fn fixed(&self) -> Option<u64> {
        if self.kind == "fixedCountNode" {
            self.value
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StructFieldTypeNode {
    pub name: String,
    #[serde(default)]
    pub docs: Vec<String>,
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EnumVariantNode {
    Known(KnownEnumVariantNode),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum KnownEnumVariantNode {
    EnumEmptyVariantTypeNode {
        name: String,
    },
    EnumUnitVariantTypeNode {
        name: String,
    },
    EnumStructVariantTypeNode {
        name: String,
        #[serde(rename = "struct")]
        fields: TypeNode,
    },
    EnumTupleVariantTypeNode {
        name: String,
        tuple: TypeNode,
    },
}

impl EnumVariantNode {
    pub fn name(&self) -> String {
        match self {
            EnumVariantNode::Known(
                KnownEnumVariantNode::EnumEmptyVariantTypeNode { name }
                | KnownEnumVariantNode::EnumUnitVariantTypeNode { name }
                | KnownEnumVariantNode::EnumStructVariantTypeNode { name, .. }
                | KnownEnumVariantNode::EnumTupleVariantTypeNode { name, .. },
            ) => name.clone(),
            EnumVariantNode::Other(raw) => raw
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_and_unknown_type_nodes() {
        let node: TypeNode = serde_json::from_value(json!({
            "kind": "arrayTypeNode",
            "item": {"kind": "numberTypeNode", "format": "u8", "endian": "le"},
            "count": {"kind": "fixedCountNode", "value": 32}
        }))
        .unwrap();
        match node {
            TypeNode::Known(KnownTypeNode::ArrayTypeNode { count, .. }) => {
                assert_eq!(count.fixed(), Some(32))
            }
            other => panic!("unexpected {other:?}"),
        }

        let node: TypeNode =
            serde_json::from_value(json!({"kind": "sentinelTypeNode", "sentinel": {}})).unwrap();
        assert!(matches!(node, TypeNode::Other(_)));
    }

    #[test]
    fn detects_pda_defaults() {
        let account: InstructionAccountNode = serde_json::from_value(json!({
            "name": "vault",
            "isWritable": true,
            "isSigner": false,
            "defaultValue": {
                "kind": "conditionalValueNode",
                "condition": {"kind": "booleanValueNode", "boolean": true},
                "ifTrue": {"kind": "pdaValueNode", "pda": {"kind": "pdaLinkNode", "name": "a"}},
                "ifFalse": {"kind": "pdaValueNode", "pda": {"kind": "pdaNode", "name": "b", "seeds": []}}
            }
        }))
        .unwrap();
        let names: Vec<_> = account
            .pda_defaults()
            .iter()
            .map(|d| d.pda.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);

        let signer: InstructionAccountNode = serde_json::from_value(json!({
            "name": "payer",
            "isSigner": true,
            "defaultValue": {"kind": "signerValueNode"}
        }))
        .unwrap();
        assert!(!signer.is_pda());
        assert!(signer.is_signer());
    }
}
