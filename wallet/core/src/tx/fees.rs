use kastle_consensus_core::constants::MAX_SOMPI;

use crate::error::Error;
use crate::result::Result;

/// Fee rate applied when the caller supplies none, in sompi per estimated byte.
pub const DEFAULT_FEE_RATE: u64 = 1000;

/// Floor below which no transaction is relayed, in sompi.
pub const MINIMUM_FEE: u64 = 1000;

/// Outputs below this amount are not worth carrying; the residual is burned
/// into the fee instead.
pub const DUST_THRESHOLD: u64 = 1000;

/// Serialized-size estimate used for fee calculation. Inputs dominate through
/// their signature scripts; outputs carry a script public key; the constant
/// covers the fixed header fields.
pub fn estimate_transaction_size(inputs: usize, outputs: usize) -> u64 {
    inputs as u64 * 150 + outputs as u64 * 35 + 10
}

pub fn estimate_fee(inputs: usize, outputs: usize, fee_rate: u64) -> u64 {
    estimate_transaction_size(inputs, outputs) * fee_rate
}

/// Enforces the static fee policy: at least the relay floor, at most the
/// configured ceiling.
pub fn check_fee(fee: u64, max_fee: u64) -> Result<()> {
    let max = max_fee.min(MAX_SOMPI);
    if fee < MINIMUM_FEE || fee > max {
        return Err(Error::InvalidFee { min: MINIMUM_FEE, max, actual: fee });
    }
    Ok(())
}
