//! Dialect-specific interpreters and the executor that picks between them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use solana_program::instruction::Instruction;

use crate::config::{ExplorerConfig, ProgramContext};
use crate::error::{InterpreterError, Result};
use crate::form::value_as_string;
use crate::program::UnifiedProgram;

pub mod anchor;
pub mod codama;

pub use anchor::AnchorInterpreter;
pub use codama::CodamaInterpreter;

pub trait IdlInterpreter: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// A structural check. Never fails.
    fn can_handle(&self, idl: &Value) -> bool;

    fn create_program(
        &self,
        context: ProgramContext,
        program_id: &str,
        idl: &Value,
    ) -> Result<Box<dyn UnifiedProgram>>;

    fn create_instruction(
        &self,
        program: &dyn UnifiedProgram,
        instruction_name: &str,
        accounts: &BTreeMap<String, String>,
        args: &[Value],
    ) -> Result<Instruction>;
}

/// Interpreters in detection order.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug)]
pub struct IdlExecutor {
    interpreters: Vec<Arc<dyn IdlInterpreter>>,
}

impl Default for IdlExecutor {
    fn default() -> Self {
        Self::new(&ExplorerConfig::default())
    }
}

impl IdlExecutor {
    /// Codama first, then anchor.
    pub fn new(config: &ExplorerConfig) -> Self {
        let mut executor = Self::empty();
        executor.register_interpreter(Arc::new(CodamaInterpreter));
        executor.register_interpreter(Arc::new(AnchorInterpreter::new(config)));
        executor
    }

    pub fn empty() -> Self {
        Self {
            interpreters: vec![],
        }
    }

    /// Registering a name twice replaces the earlier interpreter in place.
    pub fn register_interpreter(&mut self, interpreter: Arc<dyn IdlInterpreter>) {
        match self
            .interpreters
            .iter_mut()
            .find(|i| i.name() == interpreter.name())
        {
            Some(existing) => *existing = interpreter,
            None => self.interpreters.push(interpreter),
        }
    }

    pub fn interpreters(&self) -> impl Iterator<Item = &Arc<dyn IdlInterpreter>> {
        self.interpreters.iter()
    }

    pub fn get_interpreter(&self, name: &str) -> Option<Arc<dyn IdlInterpreter>> {
        self.interpreters.iter().find(|i| i.name() == name).cloned()
    }

    pub fn detect_interpreter(&self, idl: &Value) -> Option<Arc<dyn IdlInterpreter>> {
        self.interpreters.iter().find(|i| i.can_handle(idl)).cloned()
    }

    pub fn select_interpreter(
        &self,
        idl: &Value,
        interpreter_name: Option<&str>,
    ) -> Result<Arc<dyn IdlInterpreter>> {
        match interpreter_name {
            Some(name) => self
                .get_interpreter(name)
                .ok_or_else(|| InterpreterError::InterpreterNotFound(name.to_string())),
            None => self
                .detect_interpreter(idl)
                .ok_or(InterpreterError::NoInterpreterFound),
        }
    }

    /// Binds a descriptor to a program. A wallet is required.
    pub fn initialize_program(
        &self,
        idl: &Value,
        program_id: &str,
        context: ProgramContext,
        interpreter_name: Option<&str>,
    ) -> Result<Box<dyn UnifiedProgram>> {
        let interpreter = self.select_interpreter(idl, interpreter_name)?;
        if context.wallet.is_none() {
            return Err(InterpreterError::WalletNotProvided);
        }
        log::debug!("initializing {program_id} with {} interpreter", interpreter.name());
        interpreter.create_program(context, program_id, idl)
    }

    pub fn get_instruction(
        &self,
        program: &dyn UnifiedProgram,
        instruction_name: &str,
        accounts: &BTreeMap<String, String>,
        args: &[Value],
        idl: &Value,
        interpreter_name: Option<&str>,
    ) -> Result<Instruction> {
        let interpreter = self.select_interpreter(idl, interpreter_name)?;
        interpreter.create_instruction(program, instruction_name, accounts, args)
    }
}

fn split_field<'a>(key: &'a str, instruction_name: &str) -> Result<&'a str> {
    match key.split_once('.') {
        Some((name, field)) if name == instruction_name => Ok(field),
        _ => Err(InterpreterError::PopulateMismatch(instruction_name.to_string())),
    }
}

/// Turns `<ix>.<account>` keyed form values into account inputs.
///
/// Nested accounts keep their `<group>.<account>` key.
pub fn populate_accounts(
    data: &Map<String, Value>,
    instruction_name: &str,
) -> Result<BTreeMap<String, String>> {
    data.iter()
        .map(|(key, value)| {
            let field = split_field(key, instruction_name)?;
            Ok((field.to_string(), value_as_string(value).unwrap_or_default()))
        })
        .collect()
}

/// Turns `<ix>.<argument>` keyed form values into positional arguments.
pub fn populate_arguments(data: &Map<String, Value>, instruction_name: &str) -> Result<Vec<Value>> {
    data.iter()
        .map(|(key, value)| {
            split_field(key, instruction_name)?;
            Ok(value.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solana_sdk::signature::Keypair;

    #[derive(Debug)]
    struct Named(&'static str, bool);

    impl IdlInterpreter for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn can_handle(&self, _: &Value) -> bool {
            self.1
        }

        fn create_program(&self, _: ProgramContext, _: &str, _: &Value) -> Result<Box<dyn UnifiedProgram>> {
            Err(InterpreterError::Unsupported(self.0.to_string()))
        }

        fn create_instruction(
            &self,
            _: &dyn UnifiedProgram,
            _: &str,
            _: &BTreeMap<String, String>,
            _: &[Value],
        ) -> Result<Instruction> {
            Err(InterpreterError::Unsupported(self.0.to_string()))
        }
    }

    fn modern() -> Value {
        json!({
            "address": "11111111111111111111111111111111",
            "metadata": {"name": "p", "version": "0.1.0", "spec": "0.1.0"},
            "instructions": []
        })
    }

    #[test]
    fn defaults_detect_by_shape() {
        let executor = IdlExecutor::default();
        let names: Vec<_> = executor.interpreters().map(|i| i.name().to_string()).collect();
        assert_eq!(names, vec!["codama", "anchor"]);
        assert_eq!(executor.detect_interpreter(&modern()).unwrap().name(), "anchor");
        let codama = json!({"standard": "codama", "version": "1.0.0"});
        assert_eq!(executor.detect_interpreter(&codama).unwrap().name(), "codama");
        assert!(executor.detect_interpreter(&json!({})).is_none());
    }

    #[test]
    fn selection_errors() {
        let executor = IdlExecutor::default();
        let err = executor.select_interpreter(&modern(), Some("shank")).unwrap_err();
        assert_eq!(err.to_string(), r#"Interpreter "shank" not found"#);
        let err = executor.select_interpreter(&json!({}), None).unwrap_err();
        assert_eq!(err.to_string(), "No suitable interpreter found for the provided IDL");
    }

    #[test]
    fn registering_same_name_replaces_in_place() {
        let mut executor = IdlExecutor::default();
        executor.register_interpreter(Arc::new(Named("codama", true)));
        executor.register_interpreter(Arc::new(Named("custom", true)));
        let names: Vec<_> = executor.interpreters().map(|i| i.name().to_string()).collect();
        assert_eq!(names, vec!["codama", "anchor", "custom"]);
        assert!(executor.detect_interpreter(&json!({})).unwrap().name() == "codama");
    }

    #[test]
    fn initialize_requires_wallet_after_selection() {
        let executor = IdlExecutor::default();
        let err = executor
            .initialize_program(&json!({}), "x", ProgramContext::new("l"), None)
            .unwrap_err();
        assert!(matches!(err, InterpreterError::NoInterpreterFound));

        let err = executor
            .initialize_program(&modern(), "11111111111111111111111111111111", ProgramContext::new("l"), None)
            .unwrap_err();
        assert!(matches!(err, InterpreterError::WalletNotProvided));

        let context = ProgramContext::new("l").with_wallet(Arc::new(Keypair::new()));
        let program = executor
            .initialize_program(&modern(), "11111111111111111111111111111111", context, None)
            .unwrap();
        assert_eq!(program.program_id().to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn populates_from_dotted_keys() {
        let data = json!({"vote.voter": "abc", "vote.poll.state": "def"});
        let accounts = populate_accounts(data.as_object().unwrap(), "vote").unwrap();
        assert_eq!(accounts["voter"], "abc");
        assert_eq!(accounts["poll.state"], "def");

        let args = json!({"vote.pollId": "1", "vote.memo": ""});
        assert_eq!(
            populate_arguments(args.as_object().unwrap(), "vote").unwrap(),
            vec![json!("1"), json!("")]
        );

        let err = populate_arguments(args.as_object().unwrap(), "close").unwrap_err();
        assert_eq!(err.to_string(), "Could not populate data for close");
    }
}
