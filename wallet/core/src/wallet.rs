//! The orchestration layer tying the injected transport and signing oracle
//! to the builders: fetch UTXOs, construct, sign, broadcast. Each method is
//! one complete round of the send or commit/reveal flow; all state lives in
//! the returned values.

use log::debug;

use kastle_addresses::Address;
use kastle_consensus_core::hashing::sighash_type::SIG_HASH_ALL;
use kastle_txscript::extract_script_pub_key_address;

use crate::config::Config;
use crate::error::Error;
use crate::krc20::{CommitRevealPair, Krc20Builder, Operation};
use crate::result::Result;
use crate::rpc::ApiClient;
use crate::signer::{sign_script_hash_input, sign_transaction, DerivationPath, SignatureOracle};
use crate::tx::{PaymentOutput, TransactionBuilder};
use crate::utils::address_from_public_key;

/// A keyless wallet: it owns a public key, a transport and an oracle, and
/// never any secret.
pub struct Wallet<'a, C, O> {
    config: &'a Config,
    client: C,
    oracle: O,
    path: DerivationPath,
    public_key: Vec<u8>,
    ecdsa: bool,
}

impl<'a, C, O> std::fmt::Debug for Wallet<'a, C, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet").finish_non_exhaustive()
    }
}

impl<'a, C: ApiClient, O: SignatureOracle> Wallet<'a, C, O> {
    pub fn new(config: &'a Config, client: C, oracle: O, path: DerivationPath, public_key: Vec<u8>, ecdsa: bool) -> Result<Self> {
        // Fail on malformed keys here rather than at first use.
        address_from_public_key(config.network, &public_key, ecdsa)?;
        Ok(Self { config, client, oracle, path, public_key, ecdsa })
    }

    /// The address this wallet spends from and receives change to.
    pub fn address(&self) -> Address {
        address_from_public_key(self.config.network, &self.public_key, self.ecdsa)
            .expect("the public key was validated at construction")
    }

    /// Builds, signs and broadcasts a plain payment. Returns the broadcast
    /// transaction id.
    pub fn send(&self, recipient: &PaymentOutput, fee: Option<u64>) -> Result<String> {
        let from = self.address();
        let utxos = self.client.get_utxos(&from)?;
        let mut signable = TransactionBuilder::new(self.config).build_payment(&utxos, recipient, &from, fee)?;
        sign_transaction(&mut signable, &self.oracle, &self.path, SIG_HASH_ALL)?;
        let txid = self.client.submit_transaction(&(&signable.tx).into())?;
        debug!("broadcast payment {txid}");
        Ok(txid)
    }

    /// Builds, signs and broadcasts the commit half of a KRC20 operation.
    /// The returned pair's redeem script must be persisted by the caller;
    /// the reveal cannot be reconstructed without it.
    pub fn commit_operation(
        &self,
        operation: &Operation,
        commit_amount: Option<u64>,
        fee: Option<u64>,
    ) -> Result<(String, CommitRevealPair)> {
        let from = self.address();
        let utxos = self.client.get_utxos(&from)?;
        let mut pair = Krc20Builder::new(self.config).build_commit(
            operation,
            &self.public_key,
            self.ecdsa,
            &utxos,
            &from,
            commit_amount,
            fee,
        )?;
        sign_transaction(&mut pair.commit, &self.oracle, &self.path, SIG_HASH_ALL)?;
        let txid = self.client.submit_transaction(&(&pair.commit.tx).into())?;
        debug!("broadcast {} commit {txid}", operation.op_name());
        Ok((txid, pair))
    }

    /// Once the commitment has confirmed, fetches the P2SH UTXO it created,
    /// builds and signs the reveal, and broadcasts it. The remainder of the
    /// commitment (after protocol and network fees) goes to `recipient`.
    pub fn reveal_operation(
        &self,
        operation: &Operation,
        pair: &CommitRevealPair,
        recipient: &Address,
        network_fee: Option<u64>,
    ) -> Result<String> {
        // The commitment output is addressable: its script hash is the
        // payload of a version-8 address, which is what the node indexes.
        let p2sh_address =
            extract_script_pub_key_address(&pair.p2sh_script_public_key, self.config.network.address_prefix())?;
        let p2sh_utxo = self
            .client
            .get_utxos(&p2sh_address)?
            .into_iter()
            .find(|utxo| utxo.script_public_key == pair.p2sh_script_public_key)
            .ok_or_else(|| {
                Error::InvalidTransaction("the commitment UTXO is not spendable yet or was already revealed".to_string())
            })?;

        let mut reveal =
            Krc20Builder::new(self.config).build_reveal(operation, &p2sh_utxo, &pair.redeem_script, recipient, network_fee)?;
        sign_script_hash_input(&mut reveal, 0, &pair.redeem_script, self.ecdsa, &self.oracle, &self.path, SIG_HASH_ALL)?;
        let txid = self.client.submit_transaction(&(&reveal.tx).into())?;
        debug!("broadcast {} reveal {txid}", operation.op_name());
        Ok(txid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkId;
    use crate::rpc::SubmitTransactionRequest;
    use crate::utxo::Utxo;
    use kastle_consensus_core::tx::{Transaction, TransactionId, TransactionOutpoint};
    use kastle_txscript::parse::is_push_only;
    use secp256k1::{Keypair, Message, Secp256k1};
    use std::cell::RefCell;

    struct TestOracle {
        secp: Secp256k1<secp256k1::All>,
        keypair: Keypair,
    }

    impl TestOracle {
        fn new(seed: u8) -> Self {
            let secp = Secp256k1::new();
            let keypair = Keypair::from_seckey_slice(&secp, &[seed; 32]).unwrap();
            Self { secp, keypair }
        }

        fn schnorr_public_key(&self) -> [u8; 32] {
            self.keypair.x_only_public_key().0.serialize()
        }
    }

    impl SignatureOracle for TestOracle {
        fn sign_ecdsa(&self, digest: [u8; 32], _path: &DerivationPath) -> Result<[u8; 64]> {
            Ok(self.secp.sign_ecdsa(&Message::from_digest(digest), &self.keypair.secret_key()).serialize_compact())
        }

        fn sign_schnorr(&self, digest: [u8; 32], _path: &DerivationPath) -> Result<[u8; 64]> {
            Ok(*self.secp.sign_schnorr(&Message::from_digest(digest), &self.keypair).as_ref())
        }
    }

    /// Serves canned UTXOs per address and records every submission,
    /// "confirming" each submitted transaction's outputs as new UTXOs.
    struct MockApiClient {
        state: RefCell<MockState>,
    }

    struct MockState {
        utxos: Vec<Utxo>,
        submitted: Vec<Transaction>,
    }

    impl MockApiClient {
        fn new(utxos: Vec<Utxo>) -> Self {
            Self { state: RefCell::new(MockState { utxos, submitted: Vec::new() }) }
        }

        fn submitted_count(&self) -> usize {
            self.state.borrow().submitted.len()
        }
    }

    impl ApiClient for &MockApiClient {
        fn get_utxos(&self, address: &Address) -> Result<Vec<Utxo>> {
            Ok(self.state.borrow().utxos.iter().filter(|utxo| &utxo.address == address).cloned().collect())
        }

        fn submit_transaction(&self, request: &SubmitTransactionRequest) -> Result<String> {
            // Every signature script must be installed and push-only.
            for input in &request.transaction.inputs {
                assert!(!input.signature_script.is_empty());
                let mut script = vec![0u8; input.signature_script.len() / 2];
                faster_hex::hex_decode(input.signature_script.as_bytes(), &mut script).unwrap();
                assert!(is_push_only(&script), "signature script must be push-only");
            }

            // Synthesize a confirmed view of the submitted outputs so
            // follow-up fetches (e.g. the reveal's P2SH lookup) see them.
            let mut state = self.state.borrow_mut();
            let submitted_id = TransactionId::from_u64(state.submitted.len() as u64 + 1000);
            for (index, output) in request.transaction.outputs.iter().enumerate() {
                let mut script = vec![0u8; output.script_public_key.script_public_key.len() / 2];
                faster_hex::hex_decode(output.script_public_key.script_public_key.as_bytes(), &mut script).unwrap();
                let script_public_key =
                    kastle_consensus_core::tx::ScriptPublicKey::from_vec(output.script_public_key.version, script);
                let address =
                    extract_script_pub_key_address(&script_public_key, kastle_addresses::Prefix::Testnet).unwrap();
                state.utxos.push(Utxo {
                    outpoint: TransactionOutpoint::new(submitted_id, index as u32),
                    amount: output.amount,
                    script_public_key,
                    block_daa_score: 100,
                    is_coinbase: false,
                    address,
                });
            }
            state.submitted.push(Transaction::default());
            Ok(submitted_id.to_string())
        }
    }

    fn funding_utxo(amount: u64, address: &Address) -> Utxo {
        Utxo {
            outpoint: TransactionOutpoint::new(TransactionId::from_u64(1), 0),
            amount,
            script_public_key: kastle_txscript::pay_to_address_script(address),
            block_daa_score: 5,
            is_coinbase: false,
            address: address.clone(),
        }
    }

    #[test]
    fn test_send_flow() {
        let config = Config::new("main-key", "api.example.org", NetworkId::Testnet);
        let oracle = TestOracle::new(0x41);
        let public_key = oracle.schnorr_public_key().to_vec();
        let owner = address_from_public_key(config.network, &public_key, false).unwrap();
        let recipient = address_from_public_key(config.network, &TestOracle::new(0x42).schnorr_public_key(), false).unwrap();

        let client = MockApiClient::new(vec![funding_utxo(5_000_000_000, &owner)]);
        let wallet = Wallet::new(&config, &client, oracle, DerivationPath::default(), public_key, false).unwrap();
        assert_eq!(wallet.address(), owner);

        let txid = wallet.send(&PaymentOutput::new(recipient, 1_000_000_000), Some(20_000)).unwrap();
        assert!(!txid.is_empty());
        assert_eq!(client.submitted_count(), 1);
    }

    #[test]
    fn test_commit_reveal_flow() {
        let config = Config::new("main-key", "api.example.org", NetworkId::Testnet);
        let oracle = TestOracle::new(0x43);
        let public_key = oracle.schnorr_public_key().to_vec();
        let owner = address_from_public_key(config.network, &public_key, false).unwrap();

        let client = MockApiClient::new(vec![funding_utxo(5_000_000_000, &owner)]);
        let wallet = Wallet::new(&config, &client, oracle, DerivationPath::default(), public_key, false).unwrap();

        let operation = Operation::Mint { tick: "KASP".to_string(), to: None };
        let (commit_txid, pair) = wallet.commit_operation(&operation, None, Some(10_000)).unwrap();
        assert!(!commit_txid.is_empty());

        // The mock confirmed the commitment outputs, so the reveal can run.
        let reveal_txid = wallet.reveal_operation(&operation, &pair, &owner, Some(5_000)).unwrap();
        assert!(!reveal_txid.is_empty());
        assert_eq!(client.submitted_count(), 2);
    }

    #[test]
    fn test_wallet_rejects_bad_public_key() {
        let config = Config::new("main-key", "api.example.org", NetworkId::Testnet);
        let oracle = TestOracle::new(0x44);
        let client = MockApiClient::new(vec![]);
        let err = Wallet::new(&config, &client, oracle, DerivationPath::default(), vec![0xAA; 31], false).unwrap_err();
        assert_eq!(err, Error::InvalidPublicKey { expected: 32, actual: 31 });
    }
}
