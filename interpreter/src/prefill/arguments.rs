use std::str::FromStr;

use solana_explorer_idl::format::InstructionData;
use solana_explorer_idl::{IdlType, Primitive};
use solana_sdk::pubkey::Pubkey;

use crate::form::{FieldPath, FormState};
use crate::prefill::{FieldFill, PrefillDependency};

fn primitive_default(primitive: Primitive) -> String {
    match primitive {
        Primitive::Bool => "false".to_string(),
        Primitive::F32 | Primitive::F64 => "1.0".to_string(),
        Primitive::String => "default".to_string(),
        Primitive::Bytes => "data".to_string(),
        Primitive::Pubkey => Pubkey::default().to_string(),
        _ => "1".to_string(),
    }
}

/// A placeholder value for an argument of the given type, or `""` when
/// there is no sensible one.
pub fn default_argument_value(idl_type: &IdlType) -> String {
    match idl_type {
        IdlType::Primitive(primitive) => primitive_default(*primitive),
        IdlType::Vec(inner)
        | IdlType::Option(inner)
        | IdlType::COption(inner)
        | IdlType::Array(inner, _) => default_argument_value(inner),
        _ => String::new(),
    }
}

/// Fills empty argument fields with a type-appropriate placeholder.
pub struct ArgumentDefaultsPrefill {
    instruction: String,
    defaults: Vec<(FieldPath, String)>,
}

impl ArgumentDefaultsPrefill {
    pub fn new(instruction: &InstructionData) -> Self {
        let defaults = instruction
            .args
            .iter()
            .filter_map(|arg| {
                let value = match &arg.raw_type {
                    Some(ty) => default_argument_value(ty),
                    None => Primitive::from_str(&arg.ty)
                        .map(primitive_default)
                        .unwrap_or_default(),
                };
                if value.is_empty() {
                    return None;
                }
                Some((FieldPath::argument(&instruction.name, &arg.name), value))
            })
            .collect();
        Self {
            instruction: instruction.name.clone(),
            defaults,
        }
    }
}

impl PrefillDependency for ArgumentDefaultsPrefill {
    fn id(&self) -> &str {
        "argument-defaults"
    }

    fn current_value(&self) -> Option<String> {
        Some(self.instruction.clone())
    }

    fn fill(&self, form: &FormState) -> Vec<FieldFill> {
        self.defaults
            .iter()
            .filter(|(path, _)| form.get(path).map_or(true, |v| v.is_empty()))
            .map(|(path, value)| FieldFill {
                path: path.clone(),
                value: value.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!("bool"), "false")]
    #[test_case(json!("u256"), "1")]
    #[test_case(json!("i8"), "1")]
    #[test_case(json!("f64"), "1.0")]
    #[test_case(json!("string"), "default")]
    #[test_case(json!("bytes"), "data")]
    #[test_case(json!("pubkey"), "11111111111111111111111111111111")]
    #[test_case(json!({"vec": {"option": "u16"}}), "1")]
    #[test_case(json!({"array": ["bool", 4]}), "false")]
    #[test_case(json!({"defined": {"name": "Config"}}), "")]
    fn defaults_per_type(ty: serde_json::Value, expected: &str) {
        let ty: IdlType = serde_json::from_value(ty).unwrap();
        assert_eq!(default_argument_value(&ty), expected);
    }
}
