use kastle_consensus_core::hashing::sighash::{
    calc_ecdsa_signature_hash, calc_schnorr_signature_hash, SigHashReusedValuesUnsync,
};
use kastle_consensus_core::hashing::sighash_type::SigHashType;
use kastle_consensus_core::tx::SignableTransaction;
use kastle_txscript::script_builder::ScriptBuilder;
use kastle_txscript::{pay_to_script_hash_script, pay_to_script_hash_signature_script, ScriptClass};

use crate::error::Error;
use crate::result::Result;

/// Key-derivation path handed to the oracle alongside each digest. On the
/// wire every component is a 4-byte little-endian unsigned integer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    pub fn new(components: Vec<u32>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    pub fn to_wire(&self) -> Vec<[u8; 4]> {
        self.0.iter().map(|component| component.to_le_bytes()).collect()
    }
}

/// The external signing oracle. The library never sees key material; it
/// forwards 32-byte digests and installs whatever signatures come back.
pub trait SignatureOracle {
    /// Produces a 64-byte raw `(r ‖ s)` ECDSA signature over secp256k1.
    fn sign_ecdsa(&self, digest: [u8; 32], path: &DerivationPath) -> Result<[u8; 64]>;

    /// Produces a 64-byte Schnorr signature.
    fn sign_schnorr(&self, digest: [u8; 32], path: &DerivationPath) -> Result<[u8; 64]>;
}

/// DER-encodes a raw `(r ‖ s)` signature, normalizing `s` to the low half of
/// the group order first so the encoding is non-malleable.
pub fn ecdsa_signature_to_der(raw: &[u8; 64]) -> Result<Vec<u8>> {
    let mut signature = secp256k1::ecdsa::Signature::from_compact(raw)?;
    signature.normalize_s();
    Ok(signature.serialize_der().to_vec())
}

/// Parses the sighash-type byte, rejecting non-standard combinations.
pub fn sighash_type_from_u8(value: u8) -> Result<SigHashType> {
    SigHashType::from_u8(value).ok_or(Error::InvalidSighashType(value))
}

/// Signs every pay-to-pubkey input of `mutable_tx` through the oracle and
/// installs the signature scripts. The digest algorithm follows the spent
/// script: Schnorr for 32-byte keys, ECDSA (DER, low-S) for 33-byte keys.
/// Pay-to-script-hash inputs need their redeem script and go through
/// [`sign_script_hash_input`] instead.
pub fn sign_transaction(
    mutable_tx: &mut SignableTransaction,
    oracle: &impl SignatureOracle,
    path: &DerivationPath,
    hash_type: SigHashType,
) -> Result<()> {
    let reused_values = SigHashReusedValuesUnsync::new();
    for index in 0..mutable_tx.tx.inputs.len() {
        let entry = mutable_tx.entries[index]
            .as_ref()
            .ok_or_else(|| Error::InvalidTransaction(format!("input {index} has no populated UTXO entry")))?;
        let signature_script = match ScriptClass::from_script(&entry.script_public_key) {
            ScriptClass::PubKey => {
                let digest = calc_schnorr_signature_hash(&mutable_tx.as_verifiable(), index, hash_type, &reused_values);
                let signature = oracle.sign_schnorr(digest.as_bytes(), path)?;
                push_signature(&signature, hash_type)?
            }
            ScriptClass::PubKeyECDSA => {
                let digest = calc_ecdsa_signature_hash(&mutable_tx.as_verifiable(), index, hash_type, &reused_values);
                let signature = ecdsa_signature_to_der(&oracle.sign_ecdsa(digest.as_bytes(), path)?)?;
                push_signature(&signature, hash_type)?
            }
            ScriptClass::ScriptHash => {
                return Err(Error::InvalidTransaction(format!(
                    "input {index} spends a script hash; sign it with its redeem script"
                )))
            }
            ScriptClass::NonStandard => {
                return Err(Error::InvalidTransaction(format!("input {index} spends a non-standard script")))
            }
        };
        mutable_tx.tx.inputs[index].signature_script = signature_script;
    }
    Ok(())
}

/// Signs a single pay-to-script-hash input and installs the two-push
/// signature script `push(sig ‖ hashtype) push(redeem_script)`. The `ecdsa`
/// flag must match the signature-check opcode inside the redeem script.
///
/// The digest is computed against the P2SH script public key stored in the
/// input's UTXO entry, never against the redeem script.
pub fn sign_script_hash_input(
    mutable_tx: &mut SignableTransaction,
    index: usize,
    redeem_script: &[u8],
    ecdsa: bool,
    oracle: &impl SignatureOracle,
    path: &DerivationPath,
    hash_type: SigHashType,
) -> Result<()> {
    let entry = mutable_tx.entries[index]
        .as_ref()
        .ok_or_else(|| Error::InvalidTransaction(format!("input {index} has no populated UTXO entry")))?;
    if entry.script_public_key != pay_to_script_hash_script(redeem_script) {
        return Err(Error::InvalidTransaction(format!(
            "input {index} does not spend the commitment of the supplied redeem script"
        )));
    }

    let reused_values = SigHashReusedValuesUnsync::new();
    let mut signature = if ecdsa {
        let digest = calc_ecdsa_signature_hash(&mutable_tx.as_verifiable(), index, hash_type, &reused_values);
        ecdsa_signature_to_der(&oracle.sign_ecdsa(digest.as_bytes(), path)?)?
    } else {
        let digest = calc_schnorr_signature_hash(&mutable_tx.as_verifiable(), index, hash_type, &reused_values);
        oracle.sign_schnorr(digest.as_bytes(), path)?.to_vec()
    };
    signature.push(hash_type.to_u8());
    mutable_tx.tx.inputs[index].signature_script = pay_to_script_hash_signature_script(redeem_script.to_vec(), signature)?;
    Ok(())
}

fn push_signature(signature: &[u8], hash_type: SigHashType) -> Result<Vec<u8>> {
    let mut signature_and_type = signature.to_vec();
    signature_and_type.push(hash_type.to_u8());
    Ok(ScriptBuilder::new().add_data(&signature_and_type).drain()?)
}
