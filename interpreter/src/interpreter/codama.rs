use std::collections::BTreeMap;

use serde_json::Value;
use solana_explorer_idl::{detect_spec, DialectTag};
use solana_program::instruction::Instruction;

use crate::config::ProgramContext;
use crate::error::{InterpreterError, Result};
use crate::interpreter::IdlInterpreter;
use crate::program::UnifiedProgram;

pub const CODAMA_INTERPRETER: &str = "codama";

const NOT_SUPPORTED: &str = "Codama IDL format is not yet supported for interactive features.";

/// Recognizes codama descriptors so they are not mistaken for anchor ones.
/// Building programs from them is not supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodamaInterpreter;

impl IdlInterpreter for CodamaInterpreter {
    fn name(&self) -> &str {
        CODAMA_INTERPRETER
    }

    fn can_handle(&self, idl: &Value) -> bool {
        detect_spec(idl) == DialectTag::Codama
    }

    fn create_program(
        &self,
        _context: ProgramContext,
        _program_id: &str,
        _idl: &Value,
    ) -> Result<Box<dyn UnifiedProgram>> {
        Err(InterpreterError::Unsupported(NOT_SUPPORTED.to_string()))
    }

    fn create_instruction(
        &self,
        _program: &dyn UnifiedProgram,
        _instruction_name: &str,
        _accounts: &BTreeMap<String, String>,
        _args: &[Value],
    ) -> Result<Instruction> {
        Err(InterpreterError::Unsupported(NOT_SUPPORTED.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn handles_only_codama() {
        assert!(CodamaInterpreter.can_handle(&json!({"standard": "codama", "version": "1.0.0"})));
        assert!(!CodamaInterpreter.can_handle(&json!({"standard": "other"})));
        assert!(!CodamaInterpreter.can_handle(&json!("codama")));
    }

    #[test]
    fn program_creation_is_unsupported() {
        let err = CodamaInterpreter
            .create_program(ProgramContext::new("l"), "x", &json!({}))
            .unwrap_err();
        assert_eq!(err.to_string(), NOT_SUPPORTED);
    }
}
