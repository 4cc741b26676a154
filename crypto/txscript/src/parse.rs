//! Minimal script reader for the construction layer: walks a serialized
//! script opcode by opcode, materializing the data each push carries. It
//! exists so signature scripts and envelopes can be checked and their
//! pushes recovered; it is not an execution engine.

use crate::opcodes::codes::*;
use thiserror::Error;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum Error {
    #[error("script ends in the middle of a push expecting {expected} more bytes")]
    TruncatedPush { expected: usize },

    #[error("script ends in the middle of a push length prefix")]
    TruncatedLengthPrefix,
}

/// One decoded script element: the opcode and the data it pushes (empty for
/// non-push opcodes).
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ScriptElement<'a> {
    pub opcode: u8,
    pub data: &'a [u8],
}

/// Iterates over the elements of a serialized script.
pub struct ScriptIter<'a> {
    script: &'a [u8],
    cursor: usize,
}

impl<'a> ScriptIter<'a> {
    pub fn new(script: &'a [u8]) -> Self {
        Self { script, cursor: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.script.len() - self.cursor < len {
            return Err(Error::TruncatedPush { expected: len - (self.script.len() - self.cursor) });
        }
        let data = &self.script[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(data)
    }

    fn take_length(&mut self, len_bytes: usize) -> Result<usize, Error> {
        let bytes = self.take(len_bytes).map_err(|_| Error::TruncatedLengthPrefix)?;
        Ok(bytes.iter().rev().fold(0usize, |acc, &byte| (acc << 8) | byte as usize))
    }
}

impl<'a> Iterator for ScriptIter<'a> {
    type Item = Result<ScriptElement<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.script.len() {
            return None;
        }
        let opcode = self.script[self.cursor];
        self.cursor += 1;

        let element = match opcode {
            OpData1..=OpData75 => self.take(opcode as usize).map(|data| ScriptElement { opcode, data }),
            OpPushData1 => self.take_length(1).and_then(|len| self.take(len)).map(|data| ScriptElement { opcode, data }),
            OpPushData2 => self.take_length(2).and_then(|len| self.take(len)).map(|data| ScriptElement { opcode, data }),
            OpPushData4 => self.take_length(4).and_then(|len| self.take(len)).map(|data| ScriptElement { opcode, data }),
            _ => Ok(ScriptElement { opcode, data: &[] }),
        };
        Some(element)
    }
}

/// True when every element of the script is a push: data pushes, the small
/// integer opcodes, `Op1Negate` and the empty push. Signature scripts must
/// satisfy this.
pub fn is_push_only(script: &[u8]) -> bool {
    // Everything at or below Op16 carries no execution cost and counts as a push.
    ScriptIter::new(script).all(|element| match element {
        Ok(element) => element.opcode <= Op16,
        Err(_) => false,
    })
}

/// Recovers the concatenated data of every push in the script, undoing the
/// chunking applied to oversized elements. Small-integer opcodes contribute
/// their one-byte value.
pub fn gather_pushed_data(script: &[u8]) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();
    for element in ScriptIter::new(script) {
        let element = element?;
        match element.opcode {
            Op0 => {}
            OpTrue..=Op16 => data.push(element.opcode - OpTrue + 1),
            Op1Negate => data.push(0x81),
            _ => data.extend_from_slice(element.data),
        }
    }
    Ok(data)
}
