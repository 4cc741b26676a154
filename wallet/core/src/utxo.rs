use itertools::Itertools;

use kastle_addresses::Address;
use kastle_consensus_core::tx::{ScriptPublicKey, TransactionOutpoint, UtxoEntry};

use crate::error::Error;
use crate::result::Result;

/// A spendable output as fetched from the REST node, together with the
/// address it pays to. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub outpoint: TransactionOutpoint,
    pub amount: u64,
    pub script_public_key: ScriptPublicKey,
    pub block_daa_score: u64,
    pub is_coinbase: bool,
    pub address: Address,
}

impl Utxo {
    /// The consensus-level entry used when populating a signing session.
    pub fn entry(&self) -> UtxoEntry {
        UtxoEntry::new(self.amount, self.script_public_key.clone(), self.block_daa_score, self.is_coinbase)
    }
}

/// A selected set of inputs covering some target amount.
#[derive(Debug, Clone)]
pub struct Selection {
    pub utxos: Vec<Utxo>,
    pub total: u64,
}

/// Sorts descending by amount; ties break ascending by `(transaction_id,
/// index)` so selection is deterministic for any input order.
pub fn sort_utxos(utxos: Vec<Utxo>) -> Vec<Utxo> {
    utxos
        .into_iter()
        .sorted_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.outpoint.cmp(&b.outpoint)))
        .collect()
}

/// Greedy accumulation over the sorted set until `target` is covered.
pub fn select_utxos(utxos: &[Utxo], target: u64) -> Result<Selection> {
    let mut selected = Vec::new();
    let mut total = 0u64;
    for utxo in sort_utxos(utxos.to_vec()) {
        if total >= target {
            break;
        }
        total += utxo.amount;
        selected.push(utxo);
    }
    if total < target {
        return Err(Error::InsufficientFunds { required: target, available: total });
    }
    Ok(Selection { utxos: selected, total })
}

/// Fast path for callers that need exactly one input: returns the largest
/// UTXO when it alone covers `target`.
pub fn select_single_utxo(utxos: &[Utxo], target: u64) -> Result<Utxo> {
    let largest = utxos
        .iter()
        .max_by(|a, b| a.amount.cmp(&b.amount).then_with(|| b.outpoint.cmp(&a.outpoint)))
        .ok_or(Error::InsufficientFunds { required: target, available: 0 })?;
    if largest.amount < target {
        return Err(Error::InsufficientFunds { required: target, available: largest.amount });
    }
    Ok(largest.clone())
}
