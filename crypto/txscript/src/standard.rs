use crate::{
    opcodes::codes::{OpBlake2b, OpCheckSig, OpCheckSigECDSA, OpData32, OpData33, OpEqual},
    script_builder::{Result as ScriptBuilderResult, ScriptBuilder},
    script_class::ScriptClass,
    TxScriptError,
};
use blake2b_simd::Params;
use kastle_addresses::{Address, Prefix, Version};
use kastle_consensus_core::tx::{ScriptPublicKey, ScriptVec};
use smallvec::SmallVec;
use std::iter::once;

/// Creates a new script to pay a transaction output to a 32-byte pubkey.
fn pay_to_pub_key(address_payload: &[u8]) -> ScriptVec {
    assert_eq!(address_payload.len(), 32);
    SmallVec::from_iter(once(OpData32).chain(address_payload.iter().copied()).chain(once(OpCheckSig)))
}

/// Creates a new script to pay a transaction output to a 33-byte ECDSA pubkey.
fn pay_to_pub_key_ecdsa(address_payload: &[u8]) -> ScriptVec {
    assert_eq!(address_payload.len(), 33);
    SmallVec::from_iter(once(OpData33).chain(address_payload.iter().copied()).chain(once(OpCheckSigECDSA)))
}

/// Creates a new script to pay a transaction output to a script hash.
/// It is expected that the input is a valid hash.
fn pay_to_script_hash(script_hash: &[u8]) -> ScriptVec {
    assert_eq!(script_hash.len(), 32);
    SmallVec::from_iter([OpBlake2b, OpData32].iter().copied().chain(script_hash.iter().copied()).chain(once(OpEqual)))
}

/// Creates a new script to pay a transaction output to the specified address.
pub fn pay_to_address_script(address: &Address) -> ScriptPublicKey {
    let script = match address.version {
        Version::PubKey => pay_to_pub_key(address.payload.as_slice()),
        Version::PubKeyECDSA => pay_to_pub_key_ecdsa(address.payload.as_slice()),
        Version::ScriptHash => pay_to_script_hash(address.payload.as_slice()),
    };
    ScriptPublicKey::new(ScriptClass::from(address.version).version(), script)
}

/// Computes the BLAKE2B-256 digest a P2SH script public key commits to.
pub fn script_hash(redeem_script: &[u8]) -> [u8; 32] {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(Params::new().hash_length(32).to_state().update(redeem_script).finalize().as_bytes());
    hash
}

/// Takes a script and returns an equivalent pay-to-script-hash script
pub fn pay_to_script_hash_script(redeem_script: &[u8]) -> ScriptPublicKey {
    let script = pay_to_script_hash(&script_hash(redeem_script));
    ScriptPublicKey::new(ScriptClass::ScriptHash.version(), script)
}

/// Generates the signature script that spends a pay-to-script-hash output:
/// exactly two pushes, the signature (with its hashtype byte already
/// appended) and the revealed redeem script.
pub fn pay_to_script_hash_signature_script(redeem_script: Vec<u8>, signature: Vec<u8>) -> ScriptBuilderResult<Vec<u8>> {
    ScriptBuilder::new().add_data(&signature).add_data(&redeem_script).drain()
}

/// Returns the address encoded in a script public key.
///
/// Only works for the standard script classes; anything else fails with
/// [`TxScriptError::PubKeyFormat`].
pub fn extract_script_pub_key_address(script_public_key: &ScriptPublicKey, prefix: Prefix) -> Result<Address, TxScriptError> {
    let class = ScriptClass::from_script(script_public_key);
    if script_public_key.version() > class.version() {
        return Err(TxScriptError::PubKeyFormat);
    }
    let script = script_public_key.script();
    let address = match class {
        ScriptClass::NonStandard => return Err(TxScriptError::PubKeyFormat),
        ScriptClass::PubKey => Address::new(prefix, Version::PubKey, &script[1..33]),
        ScriptClass::PubKeyECDSA => Address::new(prefix, Version::PubKeyECDSA, &script[1..34]),
        ScriptClass::ScriptHash => Address::new(prefix, Version::ScriptHash, &script[2..34]),
    };
    // The slices above match the class payload lengths by construction.
    address.map_err(|_| TxScriptError::PubKeyFormat)
}
