//! KRC20 commit/reveal assembly. The commit transaction pays into a P2SH
//! script committing to a redeem script that carries the operation JSON in a
//! data envelope; the reveal spends that output, exposing the envelope to
//! the indexer. Only the redeem script needs to survive between the two.

pub mod operations;

pub use operations::{Operation, KRC20_PROTOCOL_ID};

use log::debug;

use kastle_consensus_core::constants::{MAX_SOMPI, MAX_TX_IN_SEQUENCE_NUM, TX_VERSION};
use kastle_consensus_core::subnets::SUBNETWORK_ID_NATIVE;
use kastle_consensus_core::tx::{
    ScriptPublicKey, SignableTransaction, Transaction, TransactionInput, TransactionOutput,
};
use kastle_txscript::envelope::{data_envelope, envelope_redeem_script, KASPLEX_PROTOCOL};
use kastle_txscript::{pay_to_address_script, pay_to_script_hash_script, script_hash};
use kastle_addresses::Address;

use crate::config::Config;
use crate::error::Error;
use crate::result::Result;
use crate::tx::builder::TransactionBuilder;
use crate::tx::fees::{check_fee, estimate_fee, DUST_THRESHOLD};
use crate::utils::validate_public_key;
use crate::utxo::Utxo;

/// Default amount deposited into the commitment output, in sompi. Deploys
/// and mints need more: the reveal pays its protocol fee out of this value.
pub const DEFAULT_COMMIT_AMOUNT: u64 = 10_000;

/// Smallest commitment the builder accepts, in sompi.
pub const MIN_COMMIT_AMOUNT: u64 = 1_000;

/// Everything produced by commit construction. The redeem script is the one
/// artifact that must be persisted until the reveal is built; the rest can
/// be re-derived from it.
#[derive(Debug, Clone)]
pub struct CommitRevealPair {
    /// The unsigned commit transaction, ready for the signing pass.
    pub commit: SignableTransaction,
    /// Redeem script revealed when the commitment is spent.
    pub redeem_script: Vec<u8>,
    /// BLAKE2B-256 of the redeem script.
    pub script_hash: [u8; 32],
    /// The P2SH script public key the commit output pays to.
    pub p2sh_script_public_key: ScriptPublicKey,
}

pub struct Krc20Builder<'a> {
    config: &'a Config,
}

impl<'a> Krc20Builder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Builds the commit transaction for `operation`: renders the operation
    /// JSON, wraps it in a Kasplex envelope behind `public_key`'s signature
    /// check, and pays `commit_amount` into the resulting P2SH script.
    ///
    /// For deploys and mints, `commit_amount` must also cover the protocol
    /// fee the reveal will pay (1000 KAS and 1 KAS respectively).
    pub fn build_commit(
        &self,
        operation: &Operation,
        public_key: &[u8],
        ecdsa: bool,
        utxos: &[Utxo],
        change_address: &Address,
        commit_amount: Option<u64>,
        fee: Option<u64>,
    ) -> Result<CommitRevealPair> {
        validate_public_key(public_key, ecdsa)?;
        let amount = commit_amount.unwrap_or(operation.reveal_protocol_fee() + DEFAULT_COMMIT_AMOUNT);
        if amount < MIN_COMMIT_AMOUNT || amount > MAX_SOMPI {
            return Err(Error::InvalidAmount { min: MIN_COMMIT_AMOUNT, max: MAX_SOMPI, actual: amount });
        }

        let json = operation.to_json()?;
        debug!("committing {} operation: {json}", operation.op_name());
        let envelope = data_envelope(KASPLEX_PROTOCOL, &[], json.as_bytes())?;
        let redeem_script = envelope_redeem_script(public_key, &envelope, ecdsa)?;
        let p2sh_script_public_key = pay_to_script_hash_script(&redeem_script);

        let commit = TransactionBuilder::new(self.config).build_to_script(
            utxos,
            p2sh_script_public_key.clone(),
            amount,
            change_address,
            fee,
        )?;

        Ok(CommitRevealPair {
            commit,
            script_hash: script_hash(&redeem_script),
            redeem_script,
            p2sh_script_public_key,
        })
    }

    /// Builds the reveal transaction spending the confirmed commitment UTXO.
    /// The protocol fee of `operation` and the network fee are deducted from
    /// the commitment; the remainder goes to `recipient`.
    ///
    /// The UTXO entry installed for the input carries the P2SH script public
    /// key, which is what the sighash pre-image must consume; the redeem
    /// script only appears in the signature script, installed by
    /// [`crate::signer::sign_script_hash_input`].
    pub fn build_reveal(
        &self,
        operation: &Operation,
        p2sh_utxo: &Utxo,
        redeem_script: &[u8],
        recipient: &Address,
        network_fee: Option<u64>,
    ) -> Result<SignableTransaction> {
        if p2sh_utxo.script_public_key != pay_to_script_hash_script(redeem_script) {
            return Err(Error::InvalidTransaction(
                "the UTXO being revealed does not commit to the supplied redeem script".to_string(),
            ));
        }

        let network_fee = network_fee.unwrap_or_else(|| estimate_fee(1, 1, self.config.default_fee_rate));
        check_fee(network_fee, self.config.max_fee)?;
        let protocol_fee = operation.reveal_protocol_fee();
        let required = protocol_fee + network_fee + DUST_THRESHOLD;
        let amount = p2sh_utxo
            .amount
            .checked_sub(protocol_fee + network_fee)
            .filter(|amount| *amount >= DUST_THRESHOLD)
            .ok_or(Error::InsufficientFunds { required, available: p2sh_utxo.amount })?;

        let input = TransactionInput::new(p2sh_utxo.outpoint, Vec::new(), MAX_TX_IN_SEQUENCE_NUM, 1);
        let output = TransactionOutput::new(amount, pay_to_address_script(recipient));
        let tx = Transaction::new(TX_VERSION, vec![input], vec![output], 0, SUBNETWORK_ID_NATIVE, 0, Vec::new());

        let mut signable = SignableTransaction::with_entries(tx, vec![p2sh_utxo.entry()]);
        signable.calculated_fee = Some(protocol_fee + network_fee);
        Ok(signable)
    }
}
