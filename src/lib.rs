//! # Prism Grid
//!
//! Deterministic simulation engine for a grid-based laser puzzle: emitters
//! fire colored beams, mirrors redirect and recolor them, matching blocks
//! fade away under them, and the player swaps adjacent pieces until every
//! block is gone.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        PRISM GRID                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── vec2.rs     - Integer grid vectors and directions       │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── entity.rs   - Entity variants and hook dispatch         │
//! │  ├── grid.rs     - Cell occupancy                            │
//! │  ├── state.rs    - Level state and entity arena              │
//! │  ├── beam.rs     - Beam propagation                          │
//! │  ├── block.rs    - Block fading and win counter              │
//! │  ├── gravity.rs  - Gravity pass                              │
//! │  ├── swap.rs     - Selection and swapping                    │
//! │  ├── level.rs    - Level codes, packs, loading               │
//! │  ├── campaign.rs - Level sequencing and navigation           │
//! │  ├── tick.rs     - Authoritative simulation loop             │
//! │  ├── input.rs    - Commands and recordings                   │
//! │  ├── events.rs   - Events for audio/telemetry                │
//! │  └── view.rs     - Render snapshot                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - Integer arithmetic only
//! - Fixed grid sweep order (no hash-ordered iteration)
//! - No system time dependencies; every interval is a tick count
//! - No randomness
//!
//! Given the same level pack, config and commands, a session produces
//! **identical state hashes** on every run.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::vec2::{GridVec2, Direction};
pub use crate::core::hash::StateHash;
pub use crate::game::campaign::{Campaign, CampaignPhase};
pub use crate::game::config::SimConfig;
pub use crate::game::input::Command;
pub use crate::game::level::{LevelPack, LevelError};
pub use crate::game::state::LevelState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nominal tick rate (Hz) the timing constants are tuned for
pub const TICK_RATE: u32 = 60;
