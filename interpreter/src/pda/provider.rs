use std::str::FromStr;

use heck::MixedCase;
use serde_json::Value;
use solana_explorer_idl::dialect::modern::{IdlInstruction, IdlPda};
use solana_sdk::pubkey::Pubkey;

use crate::pda::seeds::PdaArgument;

/// A top-level instruction account and its seed rules, if it is a PDA.
#[derive(Debug, Clone, PartialEq)]
pub struct PdaAccount {
    pub name: String,
    pub pda: Option<IdlPda>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdaInstruction {
    pub name: String,
    pub accounts: Vec<PdaAccount>,
    pub args: Vec<PdaArgument>,
}

/// Reads program addresses and seed rules out of one descriptor dialect.
pub trait PdaProvider: Send + Sync {
    fn name(&self) -> &str;

    fn can_handle(&self, idl: &Value) -> bool;

    fn program_id(&self, idl: &Value) -> Option<Pubkey>;

    /// Finds an instruction by its camel-cased name.
    fn find_instruction(&self, idl: &Value, instruction_name: &str) -> Option<PdaInstruction>;
}

/// Modern anchor descriptors, including legacy ones already normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorPdaProvider;

impl PdaProvider for AnchorPdaProvider {
    fn name(&self) -> &str {
        "anchor"
    }

    fn can_handle(&self, idl: &Value) -> bool {
        idl.get("instructions").is_some() && idl.get("address").is_some()
    }

    fn program_id(&self, idl: &Value) -> Option<Pubkey> {
        let address = idl.get("address")?.as_str()?;
        Pubkey::from_str(address)
            .map_err(|e| log::debug!("invalid program address {address}: {e}"))
            .ok()
    }

    fn find_instruction(&self, idl: &Value, instruction_name: &str) -> Option<PdaInstruction> {
        let raw = idl.get("instructions")?.as_array()?.iter().find(|ix| {
            ix.get("name")
                .and_then(Value::as_str)
                .map_or(false, |name| name.to_mixed_case() == instruction_name)
        })?;
        let ix: IdlInstruction = serde_json::from_value(raw.clone())
            .map_err(|e| log::debug!("instruction {instruction_name} does not parse: {e}"))
            .ok()?;
        Some(PdaInstruction {
            name: ix.name.clone(),
            accounts: ix
                .single_accounts()
                .map(|account| PdaAccount {
                    name: account.name.clone(),
                    pda: account.pda.clone(),
                })
                .collect(),
            args: ix
                .args
                .iter()
                .map(|arg| PdaArgument {
                    name: arg.name.clone(),
                    ty: arg.ty.as_primitive(),
                })
                .collect(),
        })
    }
}
