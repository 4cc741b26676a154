use kastle_addresses::AddressError;
use kastle_txscript::{script_builder::Error as ScriptBuilderError, TxScriptError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("invalid public key of {actual} bytes (expected {expected})")]
    InvalidPublicKey { expected: usize, actual: usize },

    #[error("invalid public key prefix byte {0:#04x} (expected 0x02, 0x03 or 0x04)")]
    InvalidPublicKeyPrefix(u8),

    #[error("invalid amount {actual} sompi (allowed range {min}..={max})")]
    InvalidAmount { min: u64, max: u64, actual: u64 },

    #[error("invalid fee {actual} sompi (allowed range {min}..={max})")]
    InvalidFee { min: u64, max: u64, actual: u64 },

    #[error("non-standard sighash type {0:#04x}")]
    InvalidSighashType(u8),

    #[error("insufficient funds: {required} sompi required, {available} sompi available")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("cryptographic error: {0}")]
    Cryptographic(String),

    #[error("network error: {message}")]
    Network { message: String, status_code: Option<u16> },

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("script builder error: {0}")]
    ScriptBuilder(#[from] ScriptBuilderError),

    #[error("script error: {0}")]
    Script(#[from] TxScriptError),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<secp256k1::Error> for Error {
    fn from(err: secp256k1::Error) -> Self {
        Self::Cryptographic(err.to_string())
    }
}
