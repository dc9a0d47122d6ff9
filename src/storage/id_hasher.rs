use std::hash::{BuildHasher, Hasher};

/// A pass-through hasher for keys that already are unique integers.
///
/// [`TypeId`](std::any::TypeId)s hash as a single `u64` and
/// [`ComponentId`](crate::component::ComponentId)s as a single `usize`, so
/// the hash is the key itself. Anything else falls back to FNV-1a.
#[repr(transparent)]
#[derive(Default, Clone, Copy)]
pub struct IdHasher {
    hash: u64,
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

impl Hasher for IdHasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        if self.hash == 0 {
            self.hash = FNV_OFFSET;
        }

        for &byte in bytes {
            self.hash = (self.hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME);
        }
    }

    #[inline(always)]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }

    #[inline(always)]
    fn write_usize(&mut self, i: usize) {
        self.hash = i as _;
    }
}

impl BuildHasher for IdHasher {
    type Hasher = Self;

    fn build_hasher(&self) -> Self::Hasher {
        Self::default()
    }
}
