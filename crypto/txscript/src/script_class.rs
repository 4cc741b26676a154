use crate::{opcodes::codes::*, MAX_SCRIPT_PUBLIC_KEY_VERSION};
use kastle_addresses::Version;
use kastle_consensus_core::tx::ScriptPublicKey;

/// Standard script public key shapes the construction layer recognizes.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ScriptClass {
    /// Any script shape this layer does not stand behind.
    NonStandard,
    /// Pay to a 32-byte Schnorr public key.
    PubKey,
    /// Pay to a 33-byte ECDSA public key.
    PubKeyECDSA,
    /// Pay to a 32-byte BLAKE2B script hash.
    ScriptHash,
}

impl ScriptClass {
    pub fn from_script(script_public_key: &ScriptPublicKey) -> Self {
        let script = script_public_key.script();
        if Self::is_pay_to_pubkey(script) {
            Self::PubKey
        } else if Self::is_pay_to_pubkey_ecdsa(script) {
            Self::PubKeyECDSA
        } else if Self::is_pay_to_script_hash(script) {
            Self::ScriptHash
        } else {
            Self::NonStandard
        }
    }

    /// `OpData32 <32-byte pubkey> OpCheckSig`
    fn is_pay_to_pubkey(script: &[u8]) -> bool {
        script.len() == 34 && script[0] == OpData32 && script[33] == OpCheckSig
    }

    /// `OpData33 <33-byte pubkey> OpCheckSigECDSA`
    fn is_pay_to_pubkey_ecdsa(script: &[u8]) -> bool {
        script.len() == 35 && script[0] == OpData33 && script[34] == OpCheckSigECDSA
    }

    /// `OpBlake2b OpData32 <32-byte hash> OpEqual`
    fn is_pay_to_script_hash(script: &[u8]) -> bool {
        script.len() == 35 && script[0] == OpBlake2b && script[1] == OpData32 && script[34] == OpEqual
    }

    /// Highest script public key version valid for this class.
    pub const fn version(&self) -> u16 {
        MAX_SCRIPT_PUBLIC_KEY_VERSION
    }
}

impl From<Version> for ScriptClass {
    fn from(version: Version) -> Self {
        match version {
            Version::PubKey => ScriptClass::PubKey,
            Version::PubKeyECDSA => ScriptClass::PubKeyECDSA,
            Version::ScriptHash => ScriptClass::ScriptHash,
        }
    }
}
