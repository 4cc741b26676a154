use crate::Hash;

/// All-zero hash, used as the masked value for skipped sighash fields.
pub const ZERO_HASH: Hash = Hash::from_bytes([0; crate::HASH_SIZE]);

pub trait HasherBase {
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self;
}

pub trait Hasher: HasherBase + Clone + Default {
    fn finalize(&self) -> Hash;
    fn reset(&mut self);
    fn hash<A: AsRef<[u8]>>(data: A) -> Hash {
        let mut hasher = Self::default();
        hasher.update(data);
        hasher.finalize()
    }
}

/// Implements a hasher wrapping a keyed BLAKE2B-256 state. The key acts as a
/// domain separator so digests from different contexts can never collide.
macro_rules! blake2b_hasher {
    ($(#[$meta:meta])* struct $name:ident => $domain_sep:literal) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(blake2b_simd::State);

        impl $name {
            #[inline(always)]
            pub fn new() -> Self {
                Self(blake2b_simd::Params::new().hash_length(32).key($domain_sep).to_state())
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::new()
            }
        }

        impl HasherBase for $name {
            #[inline(always)]
            fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
                self.0.update(data.as_ref());
                self
            }
        }

        impl Hasher for $name {
            #[inline(always)]
            fn finalize(&self) -> Hash {
                Hash::from_slice(self.0.finalize().as_bytes())
            }

            #[inline(always)]
            fn reset(&mut self) {
                self.0 = blake2b_simd::Params::new().hash_length(32).key($domain_sep).to_state();
            }
        }
    };
}

blake2b_hasher! {
    /// Domain hasher for the Schnorr signature-hash pre-image and its cached subhashes.
    struct TransactionSigningHash => b"TransactionSigningHash"
}

blake2b_hasher! {
    /// Domain hasher for transaction ids (signature scripts excluded from the pre-image).
    struct TransactionID => b"TransactionID"
}

/// Domain hasher for ECDSA signature hashes: plain SHA-256 seeded with
/// `SHA-256("TransactionSigningHashECDSA")`, then fed the Schnorr digest.
#[derive(Clone)]
pub struct TransactionSigningHashECDSA(sha2::Sha256);

impl TransactionSigningHashECDSA {
    #[inline(always)]
    pub fn new() -> Self {
        use sha2::{Digest, Sha256};
        Self(Sha256::new_with_prefix(Sha256::digest(b"TransactionSigningHashECDSA")))
    }
}

impl Default for TransactionSigningHashECDSA {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl HasherBase for TransactionSigningHashECDSA {
    #[inline(always)]
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
        use sha2::Digest;
        self.0.update(data.as_ref());
        self
    }
}

impl Hasher for TransactionSigningHashECDSA {
    #[inline(always)]
    fn finalize(&self) -> Hash {
        use sha2::Digest;
        Hash::from_slice(&self.0.clone().finalize())
    }

    #[inline(always)]
    fn reset(&mut self) {
        *self = Self::new();
    }
}
