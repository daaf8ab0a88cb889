use solana_explorer_idl::IdlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error("Interpreter \"{0}\" not found")]
    InterpreterNotFound(String),
    #[error("No suitable interpreter found for the provided IDL")]
    NoInterpreterFound,
    #[error("Wallet is not provided")]
    WalletNotProvided,
    #[error("Instruction definition not found for \"{0}\"")]
    InstructionNotFound(String),
    #[error("Argument at index {0} not found in instruction definition")]
    ArgumentIndexNotFound(usize),
    #[error("Could not convert \"{argument}\" argument for \"{instruction}\"")]
    ArgumentConversion {
        argument: String,
        instruction: String,
    },
    #[error("Account with key {account} not found in instruction definition for \"{instruction}\"")]
    AccountNotFound {
        account: String,
        instruction: String,
    },
    #[error("Could not convert \"{account}\" argument for \"{instruction}\"")]
    AccountConversion {
        account: String,
        instruction: String,
    },
    #[error("Account \"{account}\" is required by \"{instruction}\" but was not provided")]
    MissingAccount {
        account: String,
        instruction: String,
    },
    #[error("Invalid program address: {0}")]
    InvalidProgramId(String),
    #[error("Invalid JSON array: {0}")]
    InvalidJsonArray(String),
    #[error("Could not populate data for {0}")]
    PopulateMismatch(String),
    #[error("{0}")]
    Unsupported(String),
    #[error("Could not serialize instruction data: {0}")]
    Serialization(String),
    #[error(transparent)]
    Idl(#[from] IdlError),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, InterpreterError>;
