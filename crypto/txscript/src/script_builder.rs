use crate::{opcodes::codes::*, MAX_SCRIPTS_SIZE, MAX_SCRIPT_ELEMENT_SIZE};
use std::iter::once;
use thiserror::Error;

/// Default capacity of the backing vector; covers the vast majority of
/// scripts without reallocation.
const DEFAULT_SCRIPT_ALLOC: usize = 512;

#[derive(Error, PartialEq, Eq, Debug, Clone, Copy)]
pub enum Error {
    #[error("adding an opcode would exceed the maximum allowed canonical script length of {MAX_SCRIPTS_SIZE}")]
    OpCodeRejected,

    #[error("adding opcodes would exceed the maximum allowed canonical script length of {MAX_SCRIPTS_SIZE}")]
    OpCodesRejected,

    #[error("adding {0} bytes of data would exceed the maximum allowed canonical script length of {MAX_SCRIPTS_SIZE}")]
    DataRejected(usize),

    #[error("adding a data element of {0} bytes exceed the maximum allowed script element size of {MAX_SCRIPT_ELEMENT_SIZE}")]
    ElementExceedsMaxSize(usize),

    #[error("adding an integer would exceed the maximum allowed canonical script length of {MAX_SCRIPTS_SIZE}")]
    IntegerRejected,
}

pub type Result<T> = std::result::Result<T, Error>;

/// ScriptBuilder assembles custom scripts from opcodes and data pushes while
/// keeping the canonical push encoding. It does not check that the script
/// will execute; it does guarantee that nothing exceeding the script engine
/// size limits can be built, since such a script could never run.
///
/// Errors latch: once an operation is rejected the builder keeps the script
/// unmodified and reports the error when the script is extracted.
///
/// ```
/// use kastle_txscript::opcodes::codes::*;
/// use kastle_txscript::script_builder::{Result, ScriptBuilder};
/// fn anyone_can_spend() -> Result<Vec<u8>> {
///     ScriptBuilder::new().add_op(OpTrue).drain()
/// }
/// ```
pub struct ScriptBuilder {
    script: Vec<u8>,
    error: Option<Error>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self { script: Vec::with_capacity(DEFAULT_SCRIPT_ALLOC), error: None }
    }

    pub fn script(&self) -> Result<&[u8]> {
        match self.error {
            None => Ok(&self.script),
            Some(ref err) => Err(*err),
        }
    }

    /// Extracts the accumulated script, leaving the builder empty and reusable.
    pub fn drain(&mut self) -> Result<Vec<u8>> {
        match self.error.take() {
            None => Ok(std::mem::take(&mut self.script)),
            Some(err) => {
                self.script = vec![];
                Err(err)
            }
        }
    }

    #[inline(always)]
    fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Appends a single opcode, unless doing so would exceed [`MAX_SCRIPTS_SIZE`].
    pub fn add_op(&mut self, opcode: u8) -> &mut Self {
        if self.has_error() {
            return self;
        }

        if self.script.len() >= MAX_SCRIPTS_SIZE {
            self.error = Some(Error::OpCodeRejected);
            return self;
        }

        self.script.push(opcode);
        self
    }

    /// Appends a raw run of opcode bytes, unless the result would exceed
    /// [`MAX_SCRIPTS_SIZE`].
    pub fn add_ops(&mut self, opcodes: &[u8]) -> &mut Self {
        if self.has_error() {
            return self;
        }

        if self.script.len() + opcodes.len() > MAX_SCRIPTS_SIZE {
            self.error = Some(Error::OpCodesRejected);
            return self;
        }

        self.script.extend_from_slice(opcodes);
        self
    }

    /// Returns the number of bytes the canonical encoding of `data` will occupy.
    pub fn canonical_data_size(data: &[u8]) -> usize {
        let data_len = data.len();

        // Values representable by a small-integer opcode collapse to one byte.
        if data_len == 0 || (data_len == 1 && (data[0] <= 16 || data[0] == 0x81)) {
            return 1;
        }

        data_len
            + if data_len < OpPushData1 as usize {
                1
            } else if data_len <= 0xff {
                2
            } else if data_len <= 0xffff {
                3
            } else {
                5
            }
    }

    /// Appends `data` with the smallest possible push encoding. No size limits
    /// are enforced here; callers go through [`ScriptBuilder::add_data`].
    fn add_raw_data(&mut self, data: &[u8]) -> &mut Self {
        let data_len = data.len();

        // Single-byte values with a dedicated opcode are encoded as that opcode.
        if data_len == 0 || data_len == 1 && data[0] == 0 {
            self.script.push(Op0);
            return self;
        } else if data_len == 1 && data[0] <= 16 {
            self.script.push((Op1 - 1) + data[0]);
            return self;
        } else if data_len == 1 && data[0] == 0x81 {
            self.script.push(Op1Negate);
            return self;
        }

        if data_len < OpPushData1 as usize {
            self.script.push(OpData1 - 1 + data_len as u8);
        } else if data_len <= 0xff {
            self.script.extend(once(OpPushData1).chain(once(data_len as u8)));
        } else if data_len <= 0xffff {
            self.script.extend(once(OpPushData2).chain((data_len as u16).to_le_bytes()));
        } else {
            self.script.extend(once(OpPushData4).chain((data_len as u32).to_le_bytes()));
        }

        self.script.extend(data);
        self
    }

    /// Appends `data` without the canonical element/script size checks.
    /// Only exists so tests can construct deliberately oversized scripts.
    #[cfg(test)]
    pub fn add_data_unchecked(&mut self, data: &[u8]) -> &mut Self {
        if self.has_error() {
            return self;
        }

        self.add_raw_data(data)
    }

    /// Appends `data` using the smallest canonical push encoding.
    ///
    /// An empty buffer becomes a push of the empty element (Op0 = OpFalse).
    /// Pushes of more than [`MAX_SCRIPT_ELEMENT_SIZE`] bytes, and pushes that
    /// would grow the script past [`MAX_SCRIPTS_SIZE`], leave the script
    /// unmodified and latch an error.
    pub fn add_data(&mut self, data: &[u8]) -> &mut Self {
        if self.has_error() {
            return self;
        }

        let data_size = Self::canonical_data_size(data);
        if self.script.len() + data_size > MAX_SCRIPTS_SIZE {
            self.error = Some(Error::DataRejected(data_size));
            return self;
        }

        let data_len = data.len();
        if data_len > MAX_SCRIPT_ELEMENT_SIZE {
            self.error = Some(Error::ElementExceedsMaxSize(data_len));
            return self;
        }

        self.add_raw_data(data)
    }

    /// Appends the minimal script-number encoding of `val`.
    pub fn add_i64(&mut self, val: i64) -> &mut Self {
        if self.has_error() {
            return self;
        }

        if self.script.len() + 1 > MAX_SCRIPTS_SIZE {
            self.error = Some(Error::IntegerRejected);
            return self;
        }

        // Fast path for values with a dedicated opcode.
        if val == 0 {
            self.script.push(Op0);
            return self;
        }
        if val == -1 || (1..=16).contains(&val) {
            self.script.push(((Op1 as i64 - 1) + val) as u8);
            return self;
        }

        self.add_data(&serialize_script_num(val))
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal little-endian script-number encoding: the sign lives in the high
/// bit of the last byte, with an extra zero byte appended when the magnitude
/// already occupies it.
fn serialize_script_num(val: i64) -> Vec<u8> {
    if val == 0 {
        return vec![];
    }

    let negative = val < 0;
    let mut abs = val.unsigned_abs();
    let mut result = Vec::with_capacity(9);
    while abs > 0 {
        result.push((abs & 0xff) as u8);
        abs >>= 8;
    }

    let last = result.last_mut().expect("val is non-zero");
    if *last & 0x80 != 0 {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        *last |= 0x80;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::iter::{once, repeat};

    #[test]
    fn test_add_op() {
        struct Test {
            name: &'static str,
            opcodes: Vec<u8>,
            expected: Vec<u8>,
        }

        let tests = vec![
            Test { name: "push OP_FALSE", opcodes: vec![OpFalse], expected: vec![OpFalse] },
            Test { name: "push OP_TRUE", opcodes: vec![OpTrue], expected: vec![OpTrue] },
            Test { name: "push OP_1 OP_2", opcodes: vec![Op1, Op2], expected: vec![Op1, Op2] },
            Test { name: "push OP_BLAKE2B OP_EQUAL", opcodes: vec![OpBlake2b, OpEqual], expected: vec![OpBlake2b, OpEqual] },
        ];

        for test in tests.iter() {
            let mut builder = ScriptBuilder::new();
            test.opcodes.iter().for_each(|opcode| {
                builder.add_op(*opcode);
            });
            let result = builder.script().expect("the script is canonical");
            assert_eq!(result, &test.expected, "{} wrong result using add_op", test.name);
        }

        for test in tests.iter() {
            let mut builder = ScriptBuilder::new();
            let result = builder.add_ops(&test.opcodes).script().expect("the script is canonical");
            assert_eq!(result, &test.expected, "{} wrong result using add_ops", test.name);
        }
    }

    #[test]
    fn test_add_i64() {
        struct Test {
            name: &'static str,
            val: i64,
            expected: Vec<u8>,
        }

        let tests = vec![
            Test { name: "push -1", val: -1, expected: vec![Op1Negate] },
            Test { name: "push small int 0", val: 0, expected: vec![Op0] },
            Test { name: "push small int 1", val: 1, expected: vec![Op1] },
            Test { name: "push small int 16", val: 16, expected: vec![Op16] },
            Test { name: "push 17", val: 17, expected: vec![OpData1, 0x11] },
            Test { name: "push 65", val: 65, expected: vec![OpData1, 0x41] },
            Test { name: "push 127", val: 127, expected: vec![OpData1, 0x7f] },
            Test { name: "push 128", val: 128, expected: vec![OpData2, 0x80, 0] },
            Test { name: "push 255", val: 255, expected: vec![OpData2, 0xff, 0] },
            Test { name: "push 256", val: 256, expected: vec![OpData2, 0, 0x01] },
            Test { name: "push 32767", val: 32767, expected: vec![OpData2, 0xff, 0x7f] },
            Test { name: "push 32768", val: 32768, expected: vec![OpData3, 0, 0x80, 0] },
            Test { name: "push -2", val: -2, expected: vec![OpData1, 0x82] },
            Test { name: "push -127", val: -127, expected: vec![OpData1, 0xff] },
            Test { name: "push -128", val: -128, expected: vec![OpData2, 0x80, 0x80] },
            Test { name: "push -255", val: -255, expected: vec![OpData2, 0xff, 0x80] },
            Test { name: "push -256", val: -256, expected: vec![OpData2, 0x00, 0x81] },
            Test { name: "push -32767", val: -32767, expected: vec![OpData2, 0xff, 0xff] },
            Test { name: "push -32768", val: -32768, expected: vec![OpData3, 0x00, 0x80, 0x80] },
        ];

        for test in tests {
            let mut builder = ScriptBuilder::new();
            let result = builder.add_i64(test.val).script().expect("the script is canonical");
            assert_eq!(result, test.expected, "{} wrong result", test.name);
        }
    }

    #[test]
    fn test_add_data() {
        struct Test {
            name: &'static str,
            data: Vec<u8>,
            expected: Result<Vec<u8>>,
            /// use add_data_unchecked instead of add_data
            unchecked: bool,
        }

        let tests = vec![
            Test { name: "push empty byte sequence", data: vec![], expected: Ok(vec![Op0]), unchecked: false },
            Test { name: "push 1 byte 0x00", data: vec![0x00], expected: Ok(vec![Op0]), unchecked: false },
            Test { name: "push 1 byte 0x01", data: vec![0x01], expected: Ok(vec![Op1]), unchecked: false },
            Test { name: "push 1 byte 0x10", data: vec![0x10], expected: Ok(vec![Op16]), unchecked: false },
            Test { name: "push 1 byte 0x81", data: vec![0x81], expected: Ok(vec![Op1Negate]), unchecked: false },
            Test { name: "push 1 byte 0x11", data: vec![0x11], expected: Ok(vec![OpData1, 0x11]), unchecked: false },
            Test { name: "push 1 byte 0xff", data: vec![0xff], expected: Ok(vec![OpData1, 0xff]), unchecked: false },
            Test {
                name: "push data len 17",
                data: vec![0x49; 17],
                expected: Ok(once(OpData17).chain(repeat(0x49).take(17)).collect()),
                unchecked: false,
            },
            Test {
                name: "push data len 75",
                data: vec![0x49; 75],
                expected: Ok(once(OpData75).chain(repeat(0x49).take(75)).collect()),
                unchecked: false,
            },
            Test {
                name: "push data len 76",
                data: vec![0x49; 76],
                expected: Ok(once(OpPushData1).chain(once(76)).chain(repeat(0x49).take(76)).collect()),
                unchecked: false,
            },
            Test {
                name: "push data len 255",
                data: vec![0x49; 255],
                expected: Ok(once(OpPushData1).chain(once(255)).chain(repeat(0x49).take(255)).collect()),
                unchecked: false,
            },
            Test {
                name: "push data len 256",
                data: vec![0x49; 256],
                expected: Ok(once(OpPushData2).chain([0, 1]).chain(repeat(0x49).take(256)).collect()),
                unchecked: false,
            },
            Test {
                name: "push data len 520",
                data: vec![0x49; 520],
                expected: Ok(once(OpPushData2).chain([8, 2]).chain(repeat(0x49).take(520)).collect()),
                unchecked: false,
            },
            Test {
                name: "push data len 521",
                data: vec![0x49; 521],
                expected: Err(Error::ElementExceedsMaxSize(521)),
                unchecked: false,
            },
            Test {
                name: "push data len 32767 (canonical)",
                data: vec![0x49; 32767],
                expected: Err(Error::DataRejected(32770)),
                unchecked: false,
            },
            // Oversized pushes via the unchecked path, verifying the
            // OpPushData2/4 encodings themselves.
            Test {
                name: "push data len 32767 (non-canonical)",
                data: vec![0x49; 32767],
                expected: Ok(once(OpPushData2).chain([255, 127]).chain(repeat(0x49).take(32767)).collect()),
                unchecked: true,
            },
            Test {
                name: "push data len 65536 (non-canonical)",
                data: vec![0x49; 65536],
                expected: Ok(once(OpPushData4).chain([0, 0, 1, 0]).chain(repeat(0x49).take(65536)).collect()),
                unchecked: true,
            },
        ];

        for test in tests {
            let mut builder = ScriptBuilder::new();
            match test.unchecked {
                false => {
                    builder.add_data(&test.data);
                }
                true => {
                    builder.add_data_unchecked(&test.data);
                }
            }
            let result = builder.drain();
            assert_eq!(result, test.expected, "{} wrong result", test.name);
        }
    }

    #[test]
    fn test_exceed_max_script_size() {
        fn full_builder() -> ScriptBuilder {
            let mut builder = ScriptBuilder::new();
            builder.add_data_unchecked(&[0u8; MAX_SCRIPTS_SIZE - 3]);
            builder
        }

        let mut builder = full_builder();
        let original_result = builder.script().map(Vec::from);
        assert!(original_result.is_ok(), "adding unchecked data respecting the max script size must succeed");

        let result = builder.add_data(&[0u8]).script();
        assert_eq!(result, Err(Error::DataRejected(1)), "adding data past the maximum script size must fail");

        let result = full_builder().add_op(Op0).drain();
        assert_eq!(result, Err(Error::OpCodeRejected), "adding an opcode past the maximum script size must fail");

        let result = full_builder().add_ops(&[OpCheckSig]).drain();
        assert_eq!(result, Err(Error::OpCodesRejected), "adding opcodes past the maximum script size must fail");

        let result = full_builder().add_i64(0).drain();
        assert_eq!(result, Err(Error::IntegerRejected), "adding an integer past the maximum script size must fail");
    }

    #[test]
    fn test_error_latches_until_drain() {
        let mut builder = ScriptBuilder::new();
        builder.add_data(&[0x49; MAX_SCRIPT_ELEMENT_SIZE + 1]);
        builder.add_op(OpTrue);
        assert_eq!(builder.drain(), Err(Error::ElementExceedsMaxSize(MAX_SCRIPT_ELEMENT_SIZE + 1)));
        // A drained builder is clean again.
        assert_eq!(builder.add_op(OpTrue).drain(), Ok(vec![OpTrue]));
    }
}
