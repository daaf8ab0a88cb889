//! Interactive execution of Solana program IDLs.
//!
//! Raw form values are coerced against a normalized descriptor, PDA accounts
//! are derived from the values entered so far, and an interpreter chosen by
//! descriptor shape turns everything into an [Instruction].
//!
//! [Instruction]: solana_program::instruction::Instruction

pub mod array_input;
pub mod coerce;
pub mod config;
pub mod error;
pub mod form;
pub mod interpreter;
pub mod pda;
pub mod prefill;
pub mod program;
pub mod value;

pub use array_input::parse_array_input;
pub use coerce::{convert_accounts, convert_argument, convert_arguments, CoerceOptions};
pub use config::{normalize_to_url_if_moniker, ExplorerConfig, ProgramContext, SharedSigner};
pub use error::{InterpreterError, Result};
pub use form::{FieldPath, FormState};
pub use interpreter::{
    populate_accounts, populate_arguments, AnchorInterpreter, CodamaInterpreter, IdlExecutor,
    IdlInterpreter,
};
pub use pda::{PdaDerivationResult, PdaProviderRegistry, SeedInfo};
pub use program::{AnchorProgram, UnifiedProgram};
pub use value::TypedValue;
