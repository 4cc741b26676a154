//! Transaction construction for environments that hold a derived public key
//! but no private key material. The builder assembles unsigned Kaspa
//! transactions and KRC20 commit/reveal pairs, the sighash layer produces the
//! exact digests an external signing oracle must sign, and the signer module
//! installs the returned signatures as final signature scripts.

pub mod config;
pub mod error;
pub mod krc20;
pub mod result;
pub mod rpc;
pub mod signer;
pub mod tx;
pub mod utils;
pub mod utxo;
pub mod wallet;

pub use result::Result;

pub mod prelude {
    pub use crate::config::{Config, NetworkId};
    pub use crate::error::Error;
    pub use crate::krc20::{CommitRevealPair, Krc20Builder, Operation};
    pub use crate::result::Result;
    pub use crate::rpc::{ApiClient, SubmitTransactionRequest};
    pub use crate::signer::{DerivationPath, SignatureOracle};
    pub use crate::tx::{PaymentOutput, TransactionBuilder};
    pub use crate::utxo::Utxo;
    pub use crate::wallet::Wallet;
    pub use kastle_addresses::{Address, Prefix as AddressPrefix, Version as AddressVersion};
    pub use kastle_consensus_core::tx::SignableTransaction;
}
