//! Byte values of the opcodes the construction layer emits. This is the
//! subset of the Kaspa script engine's opcode table that standard scripts,
//! signature scripts and data envelopes are assembled from.

#[allow(non_upper_case_globals)]
pub mod codes {
    /// Pushes an empty element. Alias of [`OpFalse`].
    pub const Op0: u8 = 0x00;
    pub const OpFalse: u8 = 0x00;

    // OpData1 through OpData75 push the next `opcode` bytes; the opcode value
    // doubles as the data length.
    pub const OpData1: u8 = 0x01;
    pub const OpData2: u8 = 0x02;
    pub const OpData3: u8 = 0x03;
    pub const OpData4: u8 = 0x04;
    pub const OpData5: u8 = 0x05;
    pub const OpData6: u8 = 0x06;
    pub const OpData7: u8 = 0x07;
    pub const OpData8: u8 = 0x08;
    pub const OpData9: u8 = 0x09;
    pub const OpData16: u8 = 0x10;
    pub const OpData17: u8 = 0x11;
    pub const OpData32: u8 = 0x20;
    pub const OpData33: u8 = 0x21;
    pub const OpData64: u8 = 0x40;
    pub const OpData65: u8 = 0x41;
    pub const OpData75: u8 = 0x4b;

    /// Pushes the next byte as a length, then that many bytes of data.
    pub const OpPushData1: u8 = 0x4c;
    /// Pushes the next 2 bytes (little endian) as a length, then the data.
    pub const OpPushData2: u8 = 0x4d;
    /// Pushes the next 4 bytes (little endian) as a length, then the data.
    pub const OpPushData4: u8 = 0x4e;

    pub const Op1Negate: u8 = 0x4f;
    pub const OpReserved: u8 = 0x50;

    /// Pushes the number 1. Alias of [`Op1`].
    pub const OpTrue: u8 = 0x51;
    pub const Op1: u8 = 0x51;
    pub const Op2: u8 = 0x52;
    pub const Op3: u8 = 0x53;
    pub const Op4: u8 = 0x54;
    pub const Op5: u8 = 0x55;
    pub const Op6: u8 = 0x56;
    pub const Op7: u8 = 0x57;
    pub const Op8: u8 = 0x58;
    pub const Op9: u8 = 0x59;
    pub const Op10: u8 = 0x5a;
    pub const Op11: u8 = 0x5b;
    pub const Op12: u8 = 0x5c;
    pub const Op13: u8 = 0x5d;
    pub const Op14: u8 = 0x5e;
    pub const Op15: u8 = 0x5f;
    pub const Op16: u8 = 0x60;

    pub const OpNop: u8 = 0x61;
    pub const OpIf: u8 = 0x63;
    pub const OpNotIf: u8 = 0x64;
    pub const OpElse: u8 = 0x67;
    pub const OpEndIf: u8 = 0x68;
    pub const OpVerify: u8 = 0x69;
    pub const OpReturn: u8 = 0x6a;

    pub const OpEqual: u8 = 0x87;
    pub const OpEqualVerify: u8 = 0x88;

    pub const OpSHA256: u8 = 0xa8;
    pub const OpCheckMultiSigECDSA: u8 = 0xa9;
    pub const OpBlake2b: u8 = 0xaa;
    pub const OpCheckSigECDSA: u8 = 0xab;
    pub const OpCheckSig: u8 = 0xac;
    pub const OpCheckSigVerify: u8 = 0xad;
    pub const OpCheckMultiSig: u8 = 0xae;
    pub const OpCheckMultiSigVerify: u8 = 0xaf;
    pub const OpCheckLockTimeVerify: u8 = 0xb0;
    pub const OpCheckSequenceVerify: u8 = 0xb1;
}
