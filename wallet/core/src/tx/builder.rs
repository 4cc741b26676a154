use log::debug;

use kastle_consensus_core::constants::{MAX_TX_IN_SEQUENCE_NUM, TX_VERSION};
use kastle_consensus_core::subnets::SUBNETWORK_ID_NATIVE;
use kastle_consensus_core::tx::{
    ScriptPublicKey, SignableTransaction, Transaction, TransactionInput, TransactionOutput,
};
use kastle_txscript::pay_to_address_script;
use kastle_addresses::Address;

use crate::config::Config;
use crate::error::Error;
use crate::result::Result;
use crate::tx::fees::{check_fee, estimate_fee, DUST_THRESHOLD};
use crate::tx::payment::PaymentOutput;
use crate::utxo::{select_utxos, sort_utxos, Selection, Utxo};
use crate::utils::validate_amount;

/// Assembles unsigned transactions: selects coins, synthesizes outputs,
/// applies the fee and dust policy and populates the signing session with
/// the spent entries. Construction never signs; signing is a separate pass
/// through [`crate::signer`].
pub struct TransactionBuilder<'a> {
    config: &'a Config,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Builds a payment of `recipient.amount` to `recipient.address`, the
    /// change returning to `change_address`. When `fee` is `None` it is
    /// estimated at the configured rate.
    pub fn build_payment(
        &self,
        utxos: &[Utxo],
        recipient: &PaymentOutput,
        change_address: &Address,
        fee: Option<u64>,
    ) -> Result<SignableTransaction> {
        self.build_to_script(utxos, pay_to_address_script(&recipient.address), recipient.amount, change_address, fee)
    }

    /// Builds a payment of `amount` to an explicit script public key. This is
    /// the path KRC20 commitments take, paying into a P2SH script that no
    /// address was derived for.
    pub fn build_to_script(
        &self,
        utxos: &[Utxo],
        script_public_key: ScriptPublicKey,
        amount: u64,
        change_address: &Address,
        fee: Option<u64>,
    ) -> Result<SignableTransaction> {
        validate_amount(amount)?;
        let (selection, fee) = self.select_with_fee(utxos, amount, fee)?;
        check_fee(fee, self.config.max_fee)?;

        let mut outputs = vec![TransactionOutput::new(amount, script_public_key)];
        let change = selection.total - amount - fee;
        if change >= DUST_THRESHOLD {
            outputs.push(TransactionOutput::new(change, pay_to_address_script(change_address)));
        } else if change > 0 {
            debug!("change of {change} sompi is below the dust threshold, burning it into the fee");
        }

        Ok(self.assemble(&selection.utxos, outputs, selection.total))
    }

    /// Spends every supplied UTXO to `recipient`, minus the fee. Used for
    /// consolidation and as the shape of reveal spends.
    pub fn build_sweep(&self, utxos: &[Utxo], recipient: &Address, fee: Option<u64>) -> Result<SignableTransaction> {
        if utxos.is_empty() {
            return Err(Error::InsufficientFunds { required: DUST_THRESHOLD, available: 0 });
        }
        let sorted = sort_utxos(utxos.to_vec());
        let total: u64 = sorted.iter().map(|utxo| utxo.amount).sum();
        let fee = fee.unwrap_or_else(|| estimate_fee(sorted.len(), 1, self.config.default_fee_rate));
        check_fee(fee, self.config.max_fee)?;

        let amount = total
            .checked_sub(fee)
            .filter(|amount| *amount >= DUST_THRESHOLD)
            .ok_or(Error::InsufficientFunds { required: fee + DUST_THRESHOLD, available: total })?;

        let outputs = vec![TransactionOutput::new(amount, pay_to_address_script(recipient))];
        Ok(self.assemble(&sorted, outputs, total))
    }

    /// Selects coins for `amount` plus the fee, re-estimating the fee as the
    /// input count grows until the selection is stable.
    fn select_with_fee(&self, utxos: &[Utxo], amount: u64, fee: Option<u64>) -> Result<(Selection, u64)> {
        let mut input_count = 1usize;
        loop {
            let current_fee = fee.unwrap_or_else(|| estimate_fee(input_count, 2, self.config.default_fee_rate));
            let required = amount.checked_add(current_fee).ok_or(Error::InvalidAmount {
                min: DUST_THRESHOLD,
                max: kastle_consensus_core::constants::MAX_SOMPI,
                actual: amount,
            })?;
            let selection = select_utxos(utxos, required)?;
            if fee.is_some() || selection.utxos.len() <= input_count {
                debug!("selected {} inputs totalling {} sompi for {} + {} fee", selection.utxos.len(), selection.total, amount, current_fee);
                return Ok((selection, current_fee));
            }
            input_count = selection.utxos.len();
        }
    }

    fn assemble(&self, utxos: &[Utxo], outputs: Vec<TransactionOutput>, total_in: u64) -> SignableTransaction {
        let inputs = utxos
            .iter()
            .map(|utxo| TransactionInput::new(utxo.outpoint, Vec::new(), MAX_TX_IN_SEQUENCE_NUM, 1))
            .collect();
        let tx = Transaction::new(TX_VERSION, inputs, outputs, 0, SUBNETWORK_ID_NATIVE, 0, Vec::new());
        let total_out: u64 = tx.outputs.iter().map(|output| output.value).sum();
        let mut signable = SignableTransaction::with_entries(tx, utxos.iter().map(Utxo::entry).collect());
        signable.calculated_fee = Some(total_in - total_out);
        signable
    }
}
