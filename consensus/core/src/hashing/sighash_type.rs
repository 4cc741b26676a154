pub const SIG_HASH_ALL: SigHashType = SigHashType(0b00000001);
pub const SIG_HASH_NONE: SigHashType = SigHashType(0b00000010);
pub const SIG_HASH_SINGLE: SigHashType = SigHashType(0b00000100);
pub const SIG_HASH_ANY_ONE_CAN_PAY: SigHashType = SigHashType(0b10000000);

/// The sighash-type bytes a standard transaction may carry: the three base
/// types, each optionally combined with `AnyOneCanPay`.
pub const ALLOWED_SIG_HASH_TYPES_VALUES: [u8; 6] = [
    SIG_HASH_ALL.0,
    SIG_HASH_NONE.0,
    SIG_HASH_SINGLE.0,
    SIG_HASH_ALL.0 | SIG_HASH_ANY_ONE_CAN_PAY.0,
    SIG_HASH_NONE.0 | SIG_HASH_ANY_ONE_CAN_PAY.0,
    SIG_HASH_SINGLE.0 | SIG_HASH_ANY_ONE_CAN_PAY.0,
];

const MASK: u8 = 0b00000111;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct SigHashType(pub u8);

impl SigHashType {
    pub fn is_sighash_all(self) -> bool {
        self.0 & MASK == SIG_HASH_ALL.0
    }

    pub fn is_sighash_none(self) -> bool {
        self.0 & MASK == SIG_HASH_NONE.0
    }

    pub fn is_sighash_single(self) -> bool {
        self.0 & MASK == SIG_HASH_SINGLE.0
    }

    pub fn is_sighash_anyone_can_pay(self) -> bool {
        self.0 & SIG_HASH_ANY_ONE_CAN_PAY.0 == SIG_HASH_ANY_ONE_CAN_PAY.0
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }

    /// Accepts only the standard type bytes listed in
    /// [`ALLOWED_SIG_HASH_TYPES_VALUES`].
    pub fn from_u8(value: u8) -> Option<Self> {
        ALLOWED_SIG_HASH_TYPES_VALUES.contains(&value).then_some(Self(value))
    }
}
