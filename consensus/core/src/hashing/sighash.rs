use arc_swap::ArcSwapOption;
use kastle_hashes::{Hash, Hasher, HasherBase, TransactionSigningHash, TransactionSigningHashECDSA, ZERO_HASH};
use std::cell::Cell;
use std::sync::Arc;

use crate::{
    subnets::SUBNETWORK_ID_NATIVE,
    tx::{ScriptPublicKey, Transaction, TransactionOutpoint, TransactionOutput, VerifiableTransaction},
};

use super::{sighash_type::SigHashType, HasherExtensions};

/// A write-once digest slot for one shared sub-hash of a signing session.
#[derive(Default)]
struct CachedHash(Cell<Option<Hash>>);

impl CachedHash {
    fn get_or_init(&self, compute: impl Fn() -> Hash) -> Hash {
        self.0.get().unwrap_or_else(|| {
            let hash = compute();
            self.0.set(Some(hash));
            hash
        })
    }
}

/// Lock-free counterpart of [`CachedHash`]. Racing writers may compute the
/// digest twice; both arrive at the same value.
#[derive(Default)]
struct SharedCachedHash(ArcSwapOption<Hash>);

impl SharedCachedHash {
    fn get_or_init(&self, compute: impl Fn() -> Hash) -> Hash {
        if let Some(value) = self.0.load().as_ref() {
            return **value;
        }
        let hash = compute();
        self.0.rcu(|_| Arc::new(hash));
        hash
    }
}

/// Holds all fields used in the calculation of a transaction's sig_hash which are
/// the same for all transaction inputs.
/// Reuse of such values prevents the quadratic hashing problem.
pub trait SigHashReusedValues {
    fn previous_outputs_hash(&self, set: impl Fn() -> Hash) -> Hash;
    fn sequences_hash(&self, set: impl Fn() -> Hash) -> Hash;
    fn sig_op_counts_hash(&self, set: impl Fn() -> Hash) -> Hash;
    fn outputs_hash(&self, set: impl Fn() -> Hash) -> Hash;
}

/// Single-threaded reused-values cache, scoped to one signing session.
#[derive(Default)]
pub struct SigHashReusedValuesUnsync {
    previous_outputs_hash: CachedHash,
    sequences_hash: CachedHash,
    sig_op_counts_hash: CachedHash,
    outputs_hash: CachedHash,
}

impl SigHashReusedValuesUnsync {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Thread-safe reused-values cache. Inputs of one transaction may be signed
/// from multiple threads against a shared instance.
#[derive(Default)]
pub struct SigHashReusedValuesSync {
    previous_outputs_hash: SharedCachedHash,
    sequences_hash: SharedCachedHash,
    sig_op_counts_hash: SharedCachedHash,
    outputs_hash: SharedCachedHash,
}

impl SigHashReusedValuesSync {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SigHashReusedValues for SigHashReusedValuesUnsync {
    fn previous_outputs_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.previous_outputs_hash.get_or_init(set)
    }

    fn sequences_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.sequences_hash.get_or_init(set)
    }

    fn sig_op_counts_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.sig_op_counts_hash.get_or_init(set)
    }

    fn outputs_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.outputs_hash.get_or_init(set)
    }
}

impl SigHashReusedValues for SigHashReusedValuesSync {
    fn previous_outputs_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.previous_outputs_hash.get_or_init(set)
    }

    fn sequences_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.sequences_hash.get_or_init(set)
    }

    fn sig_op_counts_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.sig_op_counts_hash.get_or_init(set)
    }

    fn outputs_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.outputs_hash.get_or_init(set)
    }
}

impl<T: SigHashReusedValues> SigHashReusedValues for Arc<T> {
    fn previous_outputs_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.as_ref().previous_outputs_hash(set)
    }

    fn sequences_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.as_ref().sequences_hash(set)
    }

    fn sig_op_counts_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.as_ref().sig_op_counts_hash(set)
    }

    fn outputs_hash(&self, set: impl Fn() -> Hash) -> Hash {
        self.as_ref().outputs_hash(set)
    }
}

pub fn previous_outputs_hash(tx: &Transaction, hash_type: SigHashType, reused_values: &impl SigHashReusedValues) -> Hash {
    if hash_type.is_sighash_anyone_can_pay() {
        return ZERO_HASH;
    }
    let hash = || {
        let mut hasher = TransactionSigningHash::new();
        for input in tx.inputs.iter() {
            hasher.update(input.previous_outpoint.transaction_id.as_bytes());
            hasher.write_u32(input.previous_outpoint.index);
        }
        hasher.finalize()
    };
    reused_values.previous_outputs_hash(hash)
}

pub fn sequences_hash(tx: &Transaction, hash_type: SigHashType, reused_values: &impl SigHashReusedValues) -> Hash {
    if hash_type.is_sighash_single() || hash_type.is_sighash_anyone_can_pay() || hash_type.is_sighash_none() {
        return ZERO_HASH;
    }
    let hash = || {
        let mut hasher = TransactionSigningHash::new();
        for input in tx.inputs.iter() {
            hasher.write_u64(input.sequence);
        }
        hasher.finalize()
    };
    reused_values.sequences_hash(hash)
}

pub fn sig_op_counts_hash(tx: &Transaction, hash_type: SigHashType, reused_values: &impl SigHashReusedValues) -> Hash {
    if hash_type.is_sighash_anyone_can_pay() {
        return ZERO_HASH;
    }

    let hash = || {
        let mut hasher = TransactionSigningHash::new();
        for input in tx.inputs.iter() {
            hasher.write_u8(input.sig_op_count);
        }
        hasher.finalize()
    };
    reused_values.sig_op_counts_hash(hash)
}

pub fn payload_hash(tx: &Transaction) -> Hash {
    if tx.subnetwork_id == SUBNETWORK_ID_NATIVE {
        return ZERO_HASH;
    }

    let mut hasher = TransactionSigningHash::new();
    hasher.write_var_bytes(&tx.payload);
    hasher.finalize()
}

pub fn outputs_hash(tx: &Transaction, hash_type: SigHashType, reused_values: &impl SigHashReusedValues, input_index: usize) -> Hash {
    if hash_type.is_sighash_none() {
        return ZERO_HASH;
    }

    if hash_type.is_sighash_single() {
        // If the relevant output exists - return its hash, otherwise return zero-hash
        if input_index >= tx.outputs.len() {
            return ZERO_HASH;
        }

        let mut hasher = TransactionSigningHash::new();
        hash_output(&mut hasher, &tx.outputs[input_index]);
        return hasher.finalize();
    }
    let hash = || {
        let mut hasher = TransactionSigningHash::new();
        for output in tx.outputs.iter() {
            hash_output(&mut hasher, output);
        }
        hasher.finalize()
    };
    // Otherwise, return hash of all outputs. Re-use hash if available.
    reused_values.outputs_hash(hash)
}

pub fn hash_outpoint(hasher: &mut impl Hasher, outpoint: TransactionOutpoint) {
    hasher.update(outpoint.transaction_id);
    hasher.write_u32(outpoint.index);
}

pub fn hash_output(hasher: &mut impl Hasher, output: &TransactionOutput) {
    hasher.write_u64(output.value);
    hash_script_public_key(hasher, &output.script_public_key);
}

pub fn hash_script_public_key(hasher: &mut impl Hasher, script_public_key: &ScriptPublicKey) {
    hasher.write_u16(script_public_key.version());
    hasher.write_var_bytes(script_public_key.script());
}

/// Computes the 32-byte digest a Schnorr signer commits to for input
/// `input_index`. The spent UTXO's script public key enters the pre-image
/// verbatim; for a pay-to-script-hash spend that is the P2SH script public
/// key, never the redeem script.
pub fn calc_schnorr_signature_hash(
    verifiable_tx: &impl VerifiableTransaction,
    input_index: usize,
    hash_type: SigHashType,
    reused_values: &impl SigHashReusedValues,
) -> Hash {
    let (input, utxo) = verifiable_tx.populated_input(input_index);
    let tx = verifiable_tx.tx();
    let mut hasher = TransactionSigningHash::new();
    hasher
        .write_u16(tx.version)
        .update(previous_outputs_hash(tx, hash_type, reused_values))
        .update(sequences_hash(tx, hash_type, reused_values))
        .update(sig_op_counts_hash(tx, hash_type, reused_values));
    hash_outpoint(&mut hasher, input.previous_outpoint);
    hash_script_public_key(&mut hasher, &utxo.script_public_key);
    hasher
        .write_u64(utxo.amount)
        .write_u64(input.sequence)
        .write_u8(input.sig_op_count)
        .update(outputs_hash(tx, hash_type, reused_values, input_index))
        .write_u64(tx.lock_time)
        .update(&tx.subnetwork_id)
        .write_u64(tx.gas)
        .update(payload_hash(tx))
        .write_u8(hash_type.to_u8());
    hasher.finalize()
}

/// The ECDSA digest is the Schnorr digest re-hashed under the ECDSA domain.
pub fn calc_ecdsa_signature_hash(
    tx: &impl VerifiableTransaction,
    input_index: usize,
    hash_type: SigHashType,
    reused_values: &impl SigHashReusedValues,
) -> Hash {
    let hash = calc_schnorr_signature_hash(tx, input_index, hash_type, reused_values);
    let mut hasher = TransactionSigningHashECDSA::new();
    hasher.update(hash);
    hasher.finalize()
}
