use kastle_addresses::{Address, Version};
use kastle_consensus_core::constants::{MAX_SOMPI, SOMPI_PER_KASPA};

use crate::config::NetworkId;
use crate::error::Error;
use crate::result::Result;
use crate::tx::fees::DUST_THRESHOLD;

pub fn kaspa_to_sompi(kaspa: u64) -> u64 {
    kaspa * SOMPI_PER_KASPA
}

pub fn sompi_to_kaspa_string(sompi: u64) -> String {
    format!("{}.{:08}", sompi / SOMPI_PER_KASPA, sompi % SOMPI_PER_KASPA)
}

/// Rejects amounts a transaction output must never carry: zero, dust and
/// anything beyond the supply cap.
pub fn validate_amount(amount: u64) -> Result<()> {
    if amount < DUST_THRESHOLD || amount > MAX_SOMPI {
        return Err(Error::InvalidAmount { min: DUST_THRESHOLD, max: MAX_SOMPI, actual: amount });
    }
    Ok(())
}

/// Checks a caller-supplied public key: 32 bytes for Schnorr, 33 bytes with a
/// 0x02/0x03/0x04 prefix for ECDSA.
pub fn validate_public_key(public_key: &[u8], ecdsa: bool) -> Result<()> {
    let expected = if ecdsa { 33 } else { 32 };
    if public_key.len() != expected {
        return Err(Error::InvalidPublicKey { expected, actual: public_key.len() });
    }
    if ecdsa && !matches!(public_key[0], 0x02 | 0x03 | 0x04) {
        return Err(Error::InvalidPublicKeyPrefix(public_key[0]));
    }
    Ok(())
}

/// Derives the address owned by `public_key` on `network`.
pub fn address_from_public_key(network: NetworkId, public_key: &[u8], ecdsa: bool) -> Result<Address> {
    validate_public_key(public_key, ecdsa)?;
    let version = if ecdsa { Version::PubKeyECDSA } else { Version::PubKey };
    Ok(Address::new(network.address_prefix(), version, public_key)?)
}
