//! Game Logic Module
//!
//! All simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `entity`: Entity variants, handles and per-variant hooks
//! - `grid`: Cell occupancy
//! - `state`: Level state (grid, entity arena, clocks, selection)
//! - `beam`: Beam propagation and retraction
//! - `block`: Block fading and the win counter
//! - `gravity`: Periodic gravity pass
//! - `swap`: Selection and swapping
//! - `level`: Level codes, packs and loading
//! - `campaign`: Level sequencing and navigation
//! - `tick`: Authoritative simulation loop and replay
//! - `input`: Player commands and recordings
//! - `events`: Game events for audio/telemetry collaborators
//! - `view`: Read-only render snapshot

pub mod config;
pub mod entity;
pub mod grid;
pub mod state;
pub mod beam;
pub mod block;
pub mod gravity;
pub mod swap;
pub mod level;
pub mod campaign;
pub mod tick;
pub mod input;
pub mod events;
pub mod view;

// Re-export key types
pub use config::{SimConfig, ConfigError};
pub use entity::{Color, Entity, EntityId, EntityKind, EntityTag};
pub use grid::Grid;
pub use state::LevelState;
pub use swap::TouchOutcome;
pub use level::{LevelData, LevelError, LevelPack};
pub use campaign::{Campaign, CampaignPhase};
pub use tick::{TickResult, tick, replay};
pub use input::{Command, InputRecording};
pub use events::{GameEvent, GameEventData};
pub use view::{EntityView, LevelView};
