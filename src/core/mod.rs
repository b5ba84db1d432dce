//! Core deterministic primitives.
//!
//! Integer-only types shared by the simulation. Nothing in here depends on
//! game rules.

pub mod vec2;
pub mod hash;

// Re-export core types
pub use vec2::{GridVec2, Direction};
pub use hash::{StateHash, StateHasher, compute_state_hash};
