//! Pluggable 32-bit digests over raw bytes.
//!
//! Any `Fn(&[u8]) -> u32` is a `ByteHasher`, so plain functions and closures
//! can be handed to the table directly. Digests must be deterministic: the
//! table keeps each entry's digest and reuses it when re-slotting on resize.
//! A hasher with poor distribution only lengthens chains; lookups stay
//! correct because keys are always compared byte for byte.

/// Maps a byte span to a 32-bit digest.
pub trait ByteHasher {
    fn digest(&self, bytes: &[u8]) -> u32;
}

impl<F> ByteHasher for F
where
    F: Fn(&[u8]) -> u32,
{
    #[inline]
    fn digest(&self, bytes: &[u8]) -> u32 {
        self(bytes)
    }
}

/// djb2 variant: `h = h * 33 ^ b`, starting from `0x1505`. The default hasher.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Djb2;

impl Djb2 {
    pub const SEED: u32 = 0x1505;
}

impl ByteHasher for Djb2 {
    #[inline]
    fn digest(&self, bytes: &[u8]) -> u32 {
        bytes.iter().fold(Self::SEED, |h, &b| {
            (h << 5).wrapping_add(h) ^ u32::from(b)
        })
    }
}

/// Polynomial hash `h = h * seed + b`, starting from zero.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Multiplicative {
    pub seed: u32,
}

impl Multiplicative {
    pub const DEFAULT_SEED: u32 = 0xC70F_6907;

    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }
}

impl Default for Multiplicative {
    fn default() -> Self {
        Self::with_seed(Self::DEFAULT_SEED)
    }
}

impl ByteHasher for Multiplicative {
    #[inline]
    fn digest(&self, bytes: &[u8]) -> u32 {
        bytes
            .iter()
            .fold(0u32, |h, &b| h.wrapping_mul(self.seed).wrapping_add(u32::from(b)))
    }
}
