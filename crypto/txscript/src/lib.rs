pub mod envelope;
pub mod opcodes;
pub mod parse;
pub mod script_builder;
pub mod script_class;
pub mod standard;

pub use script_class::ScriptClass;
pub use standard::*;

use thiserror::Error;

/// Highest script public key version this layer knows how to interpret.
pub const MAX_SCRIPT_PUBLIC_KEY_VERSION: u16 = 0;

/// Maximum number of bytes a single pushed data element may occupy.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Maximum total length of a canonical script.
pub const MAX_SCRIPTS_SIZE: usize = 10_000;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum TxScriptError {
    #[error("unsupported script public key format")]
    PubKeyFormat,
}
