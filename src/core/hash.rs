//! State Hashing for Verification
//!
//! Provides deterministic hashing of level state for:
//! - Replay validation
//! - Comparing two runs of the same input recording

use sha2::{Sha256, Digest};
use super::vec2::GridVec2;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for level state.
///
/// Wraps SHA-256 with helpers for grid types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for level state.
    pub fn for_level_state() -> Self {
        Self::new(b"PRISM_GRID_LEVEL_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a grid vector.
    #[inline]
    pub fn update_vec2(&mut self, value: GridVec2) {
        self.update_i32(value.x);
        self.update_i32(value.y);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with an optional tick stamp.
    ///
    /// `None` and `Some(_)` hash differently even for equal payload bytes.
    #[inline]
    pub fn update_opt_u32(&mut self, value: Option<u32>) {
        match value {
            Some(v) => {
                self.update_u8(1);
                self.update_u32(v);
            }
            None => self.update_u8(0),
        }
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute state hash for level verification.
///
/// This function is called by `LevelState::compute_hash()`.
/// The closure adds the cell-by-cell state.
pub fn compute_state_hash<F>(level_index: u32, tick: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_level_state();

    // Always hash level and tick first
    hasher.update_u32(level_index);
    hasher.update_u32(tick);

    add_state(&mut hasher);

    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_level_state();
            hasher.update_u32(100);
            hasher.update_vec2(GridVec2::new(3, 5));
            hasher.update_opt_u32(Some(7));
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_optional_stamp_is_tagged() {
        let none = {
            let mut h = StateHasher::new(b"test");
            h.update_opt_u32(None);
            h.update_u8(0);
            h.finalize()
        };
        let zero = {
            let mut h = StateHasher::new(b"test");
            h.update_opt_u32(Some(0));
            h.finalize()
        };
        assert_ne!(none, zero);
    }

    #[test]
    fn test_domain_separation() {
        fn hash(domain: &[u8]) -> StateHash {
            let mut h = StateHasher::new(domain);
            h.update_u32(7);
            h.finalize()
        }
        assert_ne!(hash(b"DOMAIN_A"), hash(b"DOMAIN_B"));
    }

    #[test]
    fn test_compute_state_hash() {
        let hash = compute_state_hash(0, 100, |hasher| hasher.update_bool(true));
        let hash2 = compute_state_hash(0, 100, |hasher| hasher.update_bool(true));
        assert_eq!(hash, hash2);

        let hash3 = compute_state_hash(0, 101, |hasher| hasher.update_bool(true));
        assert_ne!(hash, hash3);
    }
}
