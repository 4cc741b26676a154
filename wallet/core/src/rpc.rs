//! REST wire forms. The transport itself is an injected collaborator; this
//! module pins the exact JSON shapes it exchanges: the submit-transaction
//! body (field order significant), the lenient UTXO response decoding and
//! the broadcast-response id extraction.

use serde::{Deserialize, Serialize};

use kastle_addresses::Address;
use kastle_consensus_core::tx::{ScriptPublicKey, Transaction, TransactionId, TransactionOutpoint};

use crate::error::Error;
use crate::result::Result;
use crate::utxo::Utxo;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcOutpoint {
    pub transaction_id: String,
    pub index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransactionInput {
    pub previous_outpoint: RpcOutpoint,
    pub signature_script: String,
    pub sequence: u64,
    pub sig_op_count: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcScriptPublicKey {
    pub version: u16,
    pub script_public_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransactionOutput {
    pub amount: u64,
    pub script_public_key: RpcScriptPublicKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub version: u16,
    pub inputs: Vec<RpcTransactionInput>,
    pub outputs: Vec<RpcTransactionOutput>,
    pub lock_time: u64,
    pub subnetwork_id: String,
    pub gas: u64,
    pub payload: String,
}

/// Body of `POST /transactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTransactionRequest {
    pub transaction: RpcTransaction,
}

impl From<&Transaction> for RpcTransaction {
    fn from(tx: &Transaction) -> Self {
        RpcTransaction {
            version: tx.version,
            inputs: tx
                .inputs
                .iter()
                .map(|input| RpcTransactionInput {
                    previous_outpoint: RpcOutpoint {
                        transaction_id: input.previous_outpoint.transaction_id.to_string(),
                        index: input.previous_outpoint.index,
                    },
                    signature_script: faster_hex::hex_string(&input.signature_script),
                    sequence: input.sequence,
                    sig_op_count: input.sig_op_count,
                })
                .collect(),
            outputs: tx
                .outputs
                .iter()
                .map(|output| RpcTransactionOutput {
                    amount: output.value,
                    script_public_key: RpcScriptPublicKey {
                        version: output.script_public_key.version(),
                        script_public_key: faster_hex::hex_string(output.script_public_key.script()),
                    },
                })
                .collect(),
            lock_time: tx.lock_time,
            subnetwork_id: tx.subnetwork_id.to_string(),
            gas: tx.gas,
            payload: faster_hex::hex_string(&tx.payload),
        }
    }
}

impl From<&Transaction> for SubmitTransactionRequest {
    fn from(tx: &Transaction) -> Self {
        Self { transaction: tx.into() }
    }
}

/// The transport this library expects the host to inject. Implementations
/// own connection management, retries and authentication; the library owns
/// the wire shapes.
pub trait ApiClient {
    /// `GET /addresses/{address}/utxos`, decoded via [`parse_utxos_response`].
    fn get_utxos(&self, address: &Address) -> Result<Vec<Utxo>>;

    /// `POST /transactions`, returning the broadcast transaction id as
    /// extracted by [`extract_transaction_id`].
    fn submit_transaction(&self, request: &SubmitTransactionRequest) -> Result<String>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UtxoResponseEntry {
    outpoint: UtxoResponseOutpoint,
    utxo_entry: UtxoResponseUtxoEntry,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UtxoResponseOutpoint {
    transaction_id: String,
    index: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UtxoResponseUtxoEntry {
    amount: serde_json::Value,
    script_public_key: UtxoResponseScriptPublicKey,
    #[serde(default)]
    block_daa_score: Option<serde_json::Value>,
    #[serde(default)]
    is_coinbase: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UtxoResponseScriptPublicKey {
    #[serde(default)]
    version: u16,
    script_public_key: String,
}

/// Nodes render amounts as a string, as a single-element string array or as
/// a bare number; anything else is rejected.
fn parse_amount(value: &serde_json::Value) -> Result<u64> {
    match value {
        serde_json::Value::String(s) => {
            s.parse::<u64>().map_err(|_| Error::Internal(format!("unparsable amount string {s:?}")))
        }
        serde_json::Value::Array(items) => match items.as_slice() {
            [serde_json::Value::String(s)] => {
                s.parse::<u64>().map_err(|_| Error::Internal(format!("unparsable amount string {s:?}")))
            }
            _ => Err(Error::Internal("amount array must hold exactly one string".to_string())),
        },
        serde_json::Value::Number(n) => n.as_u64().ok_or_else(|| Error::Internal(format!("non-u64 amount {n}"))),
        other => Err(Error::Internal(format!("unsupported amount shape {other}"))),
    }
}

/// Decodes a UTXO REST response for `address`.
pub fn parse_utxos_response(body: &str, address: &Address) -> Result<Vec<Utxo>> {
    let entries: Vec<UtxoResponseEntry> = serde_json::from_str(body)?;
    entries
        .into_iter()
        .map(|entry| {
            let transaction_id = entry
                .outpoint
                .transaction_id
                .parse::<TransactionId>()
                .map_err(|err| Error::Internal(format!("invalid transaction id in utxo response: {err}")))?;
            let mut script = vec![0u8; entry.utxo_entry.script_public_key.script_public_key.len() / 2];
            faster_hex::hex_decode(entry.utxo_entry.script_public_key.script_public_key.as_bytes(), &mut script)
                .map_err(|err| Error::Internal(format!("invalid script hex in utxo response: {err}")))?;
            let block_daa_score = match &entry.utxo_entry.block_daa_score {
                Some(value) => parse_amount(value)?,
                None => 0,
            };
            Ok(Utxo {
                outpoint: TransactionOutpoint::new(transaction_id, entry.outpoint.index),
                amount: parse_amount(&entry.utxo_entry.amount)?,
                script_public_key: ScriptPublicKey::from_vec(entry.utxo_entry.script_public_key.version, script),
                block_daa_score,
                is_coinbase: entry.utxo_entry.is_coinbase,
                address: address.clone(),
            })
        })
        .collect()
}

/// Pulls the broadcast transaction id out of a 200 response body; nodes name
/// the field `transactionId`, `txid` or `id`.
pub fn extract_transaction_id(body: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    ["transactionId", "txid", "id"]
        .iter()
        .find_map(|key| value.get(key).and_then(|id| id.as_str()))
        .map(str::to_string)
        .ok_or(Error::Network { message: "broadcast response carries no transaction id".to_string(), status_code: None })
}
