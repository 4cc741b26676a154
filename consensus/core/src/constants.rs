/// Transaction version this library constructs.
pub const TX_VERSION: u16 = 0;

/// Maximum valid sequence number of a transaction input.
pub const MAX_TX_IN_SEQUENCE_NUM: u64 = u64::MAX;

/// Number of sompi per KAS.
pub const SOMPI_PER_KASPA: u64 = 100_000_000;

/// Upper bound enforced on caller-supplied amounts.
pub const MAX_SOMPI: u64 = 21_000_000 * SOMPI_PER_KASPA;
