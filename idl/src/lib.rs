//! Parsing, normalization and display formatting of Solana program IDLs.
//!
//! Three historical descriptor dialects are supported: legacy Anchor
//! (including the shank flavor), modern Anchor (`spec` 0.1.0) and codama.
//! Legacy descriptors are converted into the modern shape, which is the
//! canonical form every other stage works with.

pub mod convert;
pub mod dialect;
pub mod discriminator;
pub mod error;
pub mod format;
pub mod types;

pub use convert::{convert_instruction_set, convert_legacy_idl, remove_unused_types, ConverterFlavor};
pub use dialect::modern::Idl;
pub use dialect::{
    detect_dialect, detect_spec, idl_version, is_interactive_supported, read_descriptor, DialectTag,
};
pub use format::{format_display_idl, format_idl, format_serde_idl, FormatError, FormattedIdl};
pub use error::{IdlError, Result};
pub use types::{IdlArrayLen, IdlGenericArg, IdlType, Primitive};
