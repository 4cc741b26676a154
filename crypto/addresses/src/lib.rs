use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use thiserror::Error;

mod bech32;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("invalid address prefix {0:?}")]
    BadPrefix(String),

    #[error("invalid address character {0:?}")]
    BadChar(char),

    #[error("address checksum is invalid")]
    BadChecksum,

    #[error("address body carries non-zero padding bits")]
    BadPadding,

    #[error("unknown address version {0}")]
    BadVersion(u8),

    #[error("invalid payload length {actual} for {version:?} address (expected {expected})")]
    BadPayloadLength { version: Version, expected: usize, actual: usize },
}

/// The network portion of an address, rendered before the `:` separator.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Prefix {
    Mainnet,
    Testnet,
}

impl Prefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prefix::Mainnet => "kaspa",
            Prefix::Testnet => "kaspatest",
        }
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Prefix {
    type Error = AddressError;

    fn try_from(prefix: &str) -> Result<Self, Self::Error> {
        match prefix {
            "kaspa" => Ok(Prefix::Mainnet),
            "kaspatest" => Ok(Prefix::Testnet),
            _ => Err(AddressError::BadPrefix(prefix.to_string())),
        }
    }
}

/// Address version byte, discriminating the script kind the payload stands for.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[repr(u8)]
pub enum Version {
    /// P2PK with a 32-byte x-only Schnorr public key payload.
    PubKey = 0,
    /// P2PK with a 33-byte compressed ECDSA public key payload.
    PubKeyECDSA = 1,
    /// P2SH with a 32-byte script-hash payload.
    ScriptHash = 8,
}

impl Version {
    pub const fn payload_len(self) -> usize {
        match self {
            Version::PubKey => 32,
            Version::PubKeyECDSA => 33,
            Version::ScriptHash => 32,
        }
    }
}

impl TryFrom<u8> for Version {
    type Error = AddressError;

    fn try_from(version: u8) -> Result<Self, Self::Error> {
        match version {
            0 => Ok(Version::PubKey),
            1 => Ok(Version::PubKeyECDSA),
            8 => Ok(Version::ScriptHash),
            other => Err(AddressError::BadVersion(other)),
        }
    }
}

/// A decoded Kaspa address: network prefix, version byte and raw payload.
#[derive(PartialEq, Eq, Clone, Debug, Hash)]
pub struct Address {
    pub prefix: Prefix,
    pub version: Version,
    pub payload: Vec<u8>,
}

impl Address {
    /// Builds an address, enforcing the payload length dictated by `version`.
    pub fn new(prefix: Prefix, version: Version, payload: &[u8]) -> Result<Self, AddressError> {
        if payload.len() != version.payload_len() {
            return Err(AddressError::BadPayloadLength { version, expected: version.payload_len(), actual: payload.len() });
        }
        Ok(Self { prefix, version, payload: payload.to_vec() })
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.prefix, bech32::encode_payload(self.prefix, self.version as u8, &self.payload))
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(AddressError::Empty);
        }
        match value.split_once(':') {
            Some((prefix, body)) => {
                let prefix = prefix.try_into()?;
                let (version, payload) = bech32::decode_payload(prefix, body)?;
                Address::new(prefix, Version::try_from(version)?, &payload)
            }
            None => Err(AddressError::BadPrefix(value.to_string())),
        }
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().try_into()
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Address::try_from(s.as_ref()).map_err(serde::de::Error::custom)
    }
}
