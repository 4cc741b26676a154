use kastle_addresses::Prefix;
use kastle_consensus_core::constants::SOMPI_PER_KASPA;
use serde::{Deserialize, Serialize};

use crate::tx::fees::DEFAULT_FEE_RATE;

/// Network the library constructs transactions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Mainnet,
    Testnet,
}

impl NetworkId {
    pub fn address_prefix(&self) -> Prefix {
        match self {
            NetworkId::Mainnet => Prefix::Mainnet,
            NetworkId::Testnet => Prefix::Testnet,
        }
    }
}

/// Hard ceiling applied to network fees unless the caller configures one.
pub const DEFAULT_MAX_FEE: u64 = SOMPI_PER_KASPA;

/// Explicit construction-time configuration. No global state: every builder
/// borrows one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Identifier of the oracle-side key this service signs with.
    pub key_name: String,
    /// Host of the REST node used by the injected [`crate::rpc::ApiClient`].
    pub api_host: String,
    pub network: NetworkId,
    /// Upper bound on the network fee of any built transaction, in sompi.
    pub max_fee: u64,
    /// Fee rate applied when the caller does not supply a fee, in sompi per
    /// estimated byte.
    pub default_fee_rate: u64,
}

impl Config {
    pub fn new(key_name: impl Into<String>, api_host: impl Into<String>, network: NetworkId) -> Self {
        Self {
            key_name: key_name.into(),
            api_host: api_host.into(),
            network,
            max_fee: DEFAULT_MAX_FEE,
            default_fee_rate: DEFAULT_FEE_RATE,
        }
    }
}
