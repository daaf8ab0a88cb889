use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::Value;
use solana_explorer_idl::format_serde_idl;
use solana_program::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

use crate::coerce::{convert_accounts, convert_arguments, CoerceOptions};
use crate::config::{ExplorerConfig, ProgramContext};
use crate::error::{InterpreterError, Result};
use crate::interpreter::IdlInterpreter;
use crate::program::{AnchorProgram, UnifiedProgram};

pub const ANCHOR_INTERPRETER: &str = "anchor";

/// Anchor descriptors, modern or legacy once normalized for serialization.
#[derive(Debug, Clone, Default)]
pub struct AnchorInterpreter {
    options: CoerceOptions,
}

impl AnchorInterpreter {
    pub fn new(config: &ExplorerConfig) -> Self {
        Self {
            options: CoerceOptions {
                enforce_fixed_array_len: config.enforce_fixed_array_len,
            },
        }
    }
}

impl IdlInterpreter for AnchorInterpreter {
    fn name(&self) -> &str {
        ANCHOR_INTERPRETER
    }

    fn can_handle(&self, idl: &Value) -> bool {
        let metadata = idl.get("metadata");
        let versioned = ["version", "spec"]
            .iter()
            .any(|key| metadata.and_then(|m| m.get(*key)).map_or(false, Value::is_string));
        idl.get("address").map_or(false, Value::is_string)
            && versioned
            && idl.get("instructions").map_or(false, Value::is_array)
    }

    fn create_program(
        &self,
        context: ProgramContext,
        program_id: &str,
        idl: &Value,
    ) -> Result<Box<dyn UnifiedProgram>> {
        let address = Pubkey::from_str(program_id)
            .map_err(|_| InterpreterError::InvalidProgramId(program_id.to_string()))?;
        let idl = format_serde_idl(idl, Some(program_id))?;
        Ok(Box::new(AnchorProgram::new(context, address, idl)))
    }

    fn create_instruction(
        &self,
        program: &dyn UnifiedProgram,
        instruction_name: &str,
        accounts: &BTreeMap<String, String>,
        args: &[Value],
    ) -> Result<Instruction> {
        let instruction = program
            .idl()
            .find_instruction(instruction_name)
            .ok_or_else(|| InterpreterError::InstructionNotFound(instruction_name.to_string()))?;
        let args = convert_arguments(instruction, args, &self.options)?;
        let accounts = convert_accounts(instruction, accounts)?;
        program.build_instruction(instruction_name, &accounts, &args)
    }
}
