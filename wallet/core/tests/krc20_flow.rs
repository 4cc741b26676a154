//! Full KRC20 commit/reveal round: commit funds a P2SH commitment carrying
//! the envelope, the reveal spends it with `push(sig ‖ hashtype)
//! push(redeem_script)`, and every digest is signed against the P2SH script
//! public key.

use secp256k1::{Keypair, Message, Secp256k1, XOnlyPublicKey};

use kastle_consensus_core::hashing::sighash::{
    calc_ecdsa_signature_hash, calc_schnorr_signature_hash, SigHashReusedValuesUnsync,
};
use kastle_consensus_core::hashing::sighash_type::SIG_HASH_ALL;
use kastle_consensus_core::tx::TransactionOutpoint;
use kastle_txscript::opcodes::codes::OpPushData1;
use kastle_wallet_core::krc20::{CommitRevealPair, Krc20Builder, Operation};
use kastle_wallet_core::prelude::*;
use kastle_wallet_core::signer::{sign_script_hash_input, sign_transaction, DerivationPath, SignatureOracle};
use kastle_wallet_core::utils::address_from_public_key;
use kastle_wallet_core::utxo::Utxo;

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

    fn ecdsa_public_key(&self) -> [u8; 33] {
        self.keypair.public_key().serialize()
    }
}

impl SignatureOracle for TestOracle {
    fn sign_ecdsa(&self, digest: [u8; 32], _path: &DerivationPath) -> Result<[u8; 64]> {
        let message = Message::from_digest(digest);
        Ok(self.secp.sign_ecdsa(&message, &self.keypair.secret_key()).serialize_compact())
    }

    fn sign_schnorr(&self, digest: [u8; 32], _path: &DerivationPath) -> Result<[u8; 64]> {
        let message = Message::from_digest(digest);
        Ok(*self.secp.sign_schnorr(&message, &self.keypair).as_ref())
    }
}

fn funding_utxo(amount: u64, address: &Address) -> Utxo {
    Utxo {
        outpoint: TransactionOutpoint::new("ee".repeat(32).parse().unwrap(), 0),
        amount,
        script_public_key: kastle_txscript::pay_to_address_script(address),
        block_daa_score: 5,
        is_coinbase: false,
        address: address.clone(),
    }
}

/// Lifts the confirmed commitment output into the UTXO the reveal spends,
/// the way a follow-up fetch from the node would.
fn p2sh_utxo_from_commit(pair: &CommitRevealPair, owner: &Address) -> Utxo {
    Utxo {
        outpoint: TransactionOutpoint::new(pair.commit.tx.id(), 0),
        amount: pair.commit.tx.outputs[0].value,
        script_public_key: pair.commit.tx.outputs[0].script_public_key.clone(),
        block_daa_score: 6,
        is_coinbase: false,
        address: owner.clone(),
    }
}

#[test]
fn test_mint_commit_reveal_schnorr() {
    let config = Config::new("main-key", "api.example.org", NetworkId::Testnet);
    let oracle = TestOracle::new(0x31);
    let owner = address_from_public_key(config.network, &oracle.schnorr_public_key(), false).unwrap();
    let path = DerivationPath::new(vec![44, 111111, 0]);

    let operation = Operation::Mint { tick: "ICWIN".to_string(), to: None };
    let utxos = vec![funding_utxo(5 * 100_000_000, &owner)];

    // Commit: P2PK funding input, P2SH commitment output, change back.
    let builder = Krc20Builder::new(&config);
    let mut pair =
        builder.build_commit(&operation, &oracle.schnorr_public_key(), false, &utxos, &owner, None, Some(10_000)).unwrap();
    sign_transaction(&mut pair.commit, &oracle, &path, SIG_HASH_ALL).unwrap();
    assert!(!pair.commit.tx.inputs[0].signature_script.is_empty());

    // Reveal: spends the commitment, paying the 1 KAS mint fee plus the
    // network fee out of it.
    let p2sh_utxo = p2sh_utxo_from_commit(&pair, &owner);
    let mut reveal = builder.build_reveal(&operation, &p2sh_utxo, &pair.redeem_script, &owner, Some(5_000)).unwrap();
    assert_eq!(reveal.tx.outputs[0].value, p2sh_utxo.amount - 100_000_000 - 5_000);

    sign_script_hash_input(&mut reveal, 0, &pair.redeem_script, false, &oracle, &path, SIG_HASH_ALL).unwrap();

    // Signature script layout: push(sig ‖ 0x01) push(redeem_script).
    let script = reveal.tx.inputs[0].signature_script.clone();
    assert_eq!(script[0], 65);
    assert_eq!(script[65], SIG_HASH_ALL.to_u8());
    assert_eq!(script[66], OpPushData1);
    assert_eq!(script[67] as usize, pair.redeem_script.len());
    assert_eq!(&script[68..], pair.redeem_script.as_slice());

    // The digest the oracle signed was computed against the P2SH script
    // public key sitting in the entry.
    assert_eq!(reveal.entries[0].as_ref().unwrap().script_public_key, pair.p2sh_script_public_key);
    let reused_values = SigHashReusedValuesUnsync::new();
    let digest = calc_schnorr_signature_hash(&reveal.as_verifiable(), 0, SIG_HASH_ALL, &reused_values);
    let signature = secp256k1::schnorr::Signature::from_slice(&script[1..65]).unwrap();
    let pubkey = XOnlyPublicKey::from_slice(&oracle.schnorr_public_key()).unwrap();
    Secp256k1::new()
        .verify_schnorr(&signature, &Message::from_digest(digest.as_bytes()), &pubkey)
        .expect("reveal signature must verify against the P2SH-keyed digest");
}

#[test]
fn test_transfer_commit_reveal_ecdsa() {
    let config = Config::new("main-key", "api.example.org", NetworkId::Mainnet);
    let oracle = TestOracle::new(0x32);
    let owner = address_from_public_key(config.network, &oracle.ecdsa_public_key(), true).unwrap();
    let recipient = address_from_public_key(config.network, &TestOracle::new(0x33).ecdsa_public_key(), true).unwrap();
    let path = DerivationPath::default();

    let operation = Operation::Transfer { tick: "KASP".to_string(), amount: 42, to: recipient.clone() };
    let utxos = vec![funding_utxo(2 * 100_000_000, &owner)];

    let builder = Krc20Builder::new(&config);
    let mut pair = builder
        .build_commit(&operation, &oracle.ecdsa_public_key(), true, &utxos, &owner, Some(50_000), Some(10_000))
        .unwrap();
    sign_transaction(&mut pair.commit, &oracle, &path, SIG_HASH_ALL).unwrap();

    let p2sh_utxo = p2sh_utxo_from_commit(&pair, &owner);
    let mut reveal = builder.build_reveal(&operation, &p2sh_utxo, &pair.redeem_script, &recipient, Some(5_000)).unwrap();
    // Transfers owe no protocol fee, only the network fee.
    assert_eq!(reveal.tx.outputs[0].value, 50_000 - 5_000);

    sign_script_hash_input(&mut reveal, 0, &pair.redeem_script, true, &oracle, &path, SIG_HASH_ALL).unwrap();

    // First push is the DER signature plus hashtype, second the redeem script.
    let script = reveal.tx.inputs[0].signature_script.clone();
    let sig_push_len = script[0] as usize;
    assert_eq!(script[sig_push_len], SIG_HASH_ALL.to_u8());
    let der = &script[1..sig_push_len];

    let reused_values = SigHashReusedValuesUnsync::new();
    let digest = calc_ecdsa_signature_hash(&reveal.as_verifiable(), 0, SIG_HASH_ALL, &reused_values);
    let signature = secp256k1::ecdsa::Signature::from_der(der).unwrap();
    Secp256k1::new()
        .verify_ecdsa(&Message::from_digest(digest.as_bytes()), &signature, &oracle.keypair.public_key())
        .expect("ECDSA reveal signature must verify");

    // The redeem push follows immediately after the signature push.
    assert_eq!(script[sig_push_len + 1], OpPushData1);
    assert_eq!(script[sig_push_len + 2] as usize, pair.redeem_script.len());
    assert_eq!(&script[sig_push_len + 3..], pair.redeem_script.as_slice());
}

#[test]
fn test_deploy_reveal_pays_protocol_fee() {
    let config = Config::new("main-key", "api.example.org", NetworkId::Testnet);
    let oracle = TestOracle::new(0x34);
    let owner = address_from_public_key(config.network, &oracle.schnorr_public_key(), false).unwrap();

    let operation = Operation::Deploy {
        tick: "ICWIN".to_string(),
        max: 2_100_000_000_000_000,
        lim: 100_000_000_000,
        dec: Some(8),
        pre: None,
        to: None,
    };
    // Funding must cover the 1000 KAS deploy fee carried by the commitment.
    let utxos = vec![funding_utxo(1_100 * 100_000_000, &owner)];

    let builder = Krc20Builder::new(&config);
    let pair = builder.build_commit(&operation, &oracle.schnorr_public_key(), false, &utxos, &owner, None, Some(10_000)).unwrap();
    assert_eq!(pair.commit.tx.outputs[0].value, 1_000 * 100_000_000 + 10_000);

    let p2sh_utxo = p2sh_utxo_from_commit(&pair, &owner);
    let reveal = builder.build_reveal(&operation, &p2sh_utxo, &pair.redeem_script, &owner, Some(5_000)).unwrap();
    assert_eq!(reveal.tx.outputs[0].value, p2sh_utxo.amount - 1_000 * 100_000_000 - 5_000);
    assert_eq!(reveal.calculated_fee, Some(1_000 * 100_000_000 + 5_000));
}
