//! Canonical KRC20 operation JSON. Indexers match these payloads
//! byte-for-byte: fixed key order, no whitespace, every value a string.
//! Tickers keep their casing except for `list` and `send`, which the
//! indexer expects lowercased.

use serde::Serialize;

use kastle_addresses::Address;
use kastle_consensus_core::constants::SOMPI_PER_KASPA;

use crate::result::Result;

/// The `p` field of every KRC20 operation.
pub const KRC20_PROTOCOL_ID: &str = "krc-20";

/// A KRC20 operation, prior to JSON rendering. Amount-like fields are plain
/// integers here; rendering turns them into the decimal strings the indexer
/// expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Mint-mode deploy: open minting of `lim` per mint up to `max`.
    Deploy { tick: String, max: u64, lim: u64, dec: Option<u8>, pre: Option<u64>, to: Option<Address> },
    /// Issue-mode deploy: supply is issued explicitly by the deployer.
    DeployIssue { name: String, max: u64, dec: Option<u8>, pre: Option<u64>, to: Option<Address> },
    Mint { tick: String, to: Option<Address> },
    Transfer { tick: String, amount: u64, to: Address },
    Burn { tick: String, amount: u64 },
    List { tick: String, amount: u64 },
    Send { tick: String },
    Issue { ca: String, amount: u64, to: Option<Address> },
}

#[derive(Serialize)]
struct DeployJson<'a> {
    p: &'static str,
    op: &'static str,
    tick: &'a str,
    max: String,
    lim: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<String>,
}

#[derive(Serialize)]
struct DeployIssueJson<'a> {
    p: &'static str,
    op: &'static str,
    #[serde(rename = "mod")]
    mode: &'static str,
    name: &'a str,
    max: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<String>,
}

#[derive(Serialize)]
struct MintJson<'a> {
    p: &'static str,
    op: &'static str,
    tick: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<String>,
}

#[derive(Serialize)]
struct TransferJson<'a> {
    p: &'static str,
    op: &'static str,
    tick: &'a str,
    amt: String,
    to: String,
}

#[derive(Serialize)]
struct AmountOnlyJson<'a> {
    p: &'static str,
    op: &'static str,
    tick: &'a str,
    amt: String,
}

#[derive(Serialize)]
struct SendJson<'a> {
    p: &'static str,
    op: &'static str,
    tick: &'a str,
}

#[derive(Serialize)]
struct IssueJson<'a> {
    p: &'static str,
    op: &'static str,
    ca: &'a str,
    amt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<String>,
}

impl Operation {
    pub fn op_name(&self) -> &'static str {
        match self {
            Operation::Deploy { .. } | Operation::DeployIssue { .. } => "deploy",
            Operation::Mint { .. } => "mint",
            Operation::Transfer { .. } => "transfer",
            Operation::Burn { .. } => "burn",
            Operation::List { .. } => "list",
            Operation::Send { .. } => "send",
            Operation::Issue { .. } => "issue",
        }
    }

    /// Protocol-mandated fee the reveal transaction must pay on top of the
    /// network fee: 1000 KAS for deploys, 1 KAS for mints, nothing else.
    pub fn reveal_protocol_fee(&self) -> u64 {
        match self {
            Operation::Deploy { .. } | Operation::DeployIssue { .. } => 1000 * SOMPI_PER_KASPA,
            Operation::Mint { .. } => SOMPI_PER_KASPA,
            _ => 0,
        }
    }

    /// Renders the canonical operation JSON carried inside the envelope.
    pub fn to_json(&self) -> Result<String> {
        let json = match self {
            Operation::Deploy { tick, max, lim, dec, pre, to } => serde_json::to_string(&DeployJson {
                p: KRC20_PROTOCOL_ID,
                op: self.op_name(),
                tick,
                max: max.to_string(),
                lim: lim.to_string(),
                dec: dec.map(|dec| dec.to_string()),
                pre: pre.map(|pre| pre.to_string()),
                to: to.as_ref().map(Address::to_string),
            })?,
            Operation::DeployIssue { name, max, dec, pre, to } => serde_json::to_string(&DeployIssueJson {
                p: KRC20_PROTOCOL_ID,
                op: self.op_name(),
                mode: "issue",
                name,
                max: max.to_string(),
                dec: dec.map(|dec| dec.to_string()),
                pre: pre.map(|pre| pre.to_string()),
                to: to.as_ref().map(Address::to_string),
            })?,
            Operation::Mint { tick, to } => serde_json::to_string(&MintJson {
                p: KRC20_PROTOCOL_ID,
                op: self.op_name(),
                tick,
                to: to.as_ref().map(Address::to_string),
            })?,
            Operation::Transfer { tick, amount, to } => serde_json::to_string(&TransferJson {
                p: KRC20_PROTOCOL_ID,
                op: self.op_name(),
                tick,
                amt: amount.to_string(),
                to: to.to_string(),
            })?,
            Operation::Burn { tick, amount } => serde_json::to_string(&AmountOnlyJson {
                p: KRC20_PROTOCOL_ID,
                op: self.op_name(),
                tick,
                amt: amount.to_string(),
            })?,
            Operation::List { tick, amount } => serde_json::to_string(&AmountOnlyJson {
                p: KRC20_PROTOCOL_ID,
                op: self.op_name(),
                tick: &tick.to_lowercase(),
                amt: amount.to_string(),
            })?,
            Operation::Send { tick } => serde_json::to_string(&SendJson {
                p: KRC20_PROTOCOL_ID,
                op: self.op_name(),
                tick: &tick.to_lowercase(),
            })?,
            Operation::Issue { ca, amount, to } => serde_json::to_string(&IssueJson {
                p: KRC20_PROTOCOL_ID,
                op: self.op_name(),
                ca,
                amt: amount.to_string(),
                to: to.as_ref().map(Address::to_string),
            })?,
        };
        Ok(json)
    }
}
