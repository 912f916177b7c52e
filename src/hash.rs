//! 32-bit-masked FNV-1a hashing.
//!
//! Used to fold arbitrary key material and the PIN into the 32-bit values
//! the preamble protocol is built from. The multiply runs with the 64-bit
//! FNV prime but the state is masked back to 32 bits after every step, so
//! the result is identical to plain 32-bit wrapping arithmetic.

const OFFSET_BASIS: u64 = 2_166_136_261;
const PRIME: u64 = 1_099_511_628_211;
const MASK: u64 = 0xFFFF_FFFF;

/// Incremental FNV-1a hasher with a 32-bit state.
#[derive(Debug, Clone)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    /// Create a hasher at the offset basis.
    pub fn new() -> Self {
        Self {
            state: OFFSET_BASIS,
        }
    }

    /// Restore the offset basis.
    pub fn reset(&mut self) {
        self.state = OFFSET_BASIS;
    }

    /// Fold bytes into the state.
    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state = (self.state ^ u64::from(b)).wrapping_mul(PRIME) & MASK;
        }
    }

    /// The masked hash value.
    pub fn finish(&self) -> u32 {
        self.state as u32
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a byte sequence in one call.
pub fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hasher = FnvHasher::new();
    hasher.update(bytes);
    hasher.finish()
}
