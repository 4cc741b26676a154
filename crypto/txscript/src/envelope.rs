//! Data envelopes: script fragments of the form `OpFalse OpIf … OpEndIf`
//! whose body is never executed but stays visible to off-chain indexers.
//! The body layout is the one the Kasplex indexer parses: a pushed protocol
//! tag, a literal `OpTrue` marking the metadata slot, a pushed metadata
//! element, a literal `Op0` marking the content slot, and the content
//! itself, pushed in chunks when it exceeds a single script element.

use crate::{
    opcodes::codes::{Op0, OpCheckSig, OpCheckSigECDSA, OpEndIf, OpFalse, OpIf, OpTrue},
    script_builder::{Result as ScriptBuilderResult, ScriptBuilder},
    MAX_SCRIPT_ELEMENT_SIZE,
};

/// Protocol tag under which KRC20 operations are enveloped.
pub const KASPLEX_PROTOCOL: &[u8] = b"kasplex";

/// Splits `data` into pushable chunks of at most [`MAX_SCRIPT_ELEMENT_SIZE`]
/// bytes. Empty data yields a single empty chunk so that it still becomes an
/// explicit (empty) push.
pub fn chunk_data(data: &[u8]) -> Box<dyn Iterator<Item = &[u8]> + '_> {
    if data.is_empty() {
        Box::new(std::iter::once(data))
    } else {
        Box::new(data.chunks(MAX_SCRIPT_ELEMENT_SIZE))
    }
}

/// Assembles the envelope fragment for `content` under `protocol` with the
/// given (possibly empty) metadata element.
///
/// The two marker opcodes are literal single bytes, not wrapped pushes; the
/// indexer matches on them verbatim.
pub fn data_envelope(protocol: &[u8], metadata: &[u8], content: &[u8]) -> ScriptBuilderResult<Vec<u8>> {
    let mut builder = ScriptBuilder::new();
    builder.add_op(OpFalse).add_op(OpIf).add_data(protocol).add_op(OpTrue).add_data(metadata).add_op(Op0);
    for chunk in chunk_data(content) {
        builder.add_data(chunk);
    }
    builder.add_op(OpEndIf);
    builder.drain()
}

/// Composes the redeem script revealed when spending an envelope commitment:
/// `push(pubkey) OpCheckSig[ECDSA] <envelope>`. The envelope rides behind the
/// signature check and is never executed.
pub fn envelope_redeem_script(pubkey: &[u8], envelope: &[u8], ecdsa: bool) -> ScriptBuilderResult<Vec<u8>> {
    let mut builder = ScriptBuilder::new();
    builder.add_data(pubkey).add_op(if ecdsa { OpCheckSigECDSA } else { OpCheckSig }).add_ops(envelope);
    builder.drain()
}
