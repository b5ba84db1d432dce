//! Game Events
//!
//! Side-effect notifications produced during simulation. The engine never
//! plays audio or reports telemetry itself; collaborators drain these from
//! each `TickResult`.

use serde::{Serialize, Deserialize};
use crate::core::vec2::{GridVec2, Direction};
use crate::game::entity::Color;

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A primary emission grew a new beam
    BeamFired {
        /// Emitting cell
        source: GridVec2,
        /// Beam direction
        dir: Direction,
        /// Beam color
        color: Color,
    },

    /// A mirror started being struck
    MirrorActivated {
        /// Mirror cell
        position: GridVec2,
        /// Output color
        color: Color,
    },

    /// A matching beam struck a block; it is now fading
    BlockStruck {
        /// Block cell
        position: GridVec2,
        /// Block color
        color: Color,
    },

    /// A block finished fading
    BlockDestroyed {
        /// Block cell
        position: GridVec2,
        /// Block color
        color: Color,
        /// Live blocks left on the level
        blocks_remaining: u32,
    },

    /// Player selected a swap anchor
    Selected {
        /// Anchor cell
        position: GridVec2,
    },

    /// Player cleared the swap anchor
    Deselected {
        /// Former anchor cell
        position: GridVec2,
    },

    /// Two entities exchanged cells
    Swapped {
        /// Anchor cell
        a: GridVec2,
        /// Touched cell
        b: GridVec2,
        /// Swaps this level, including this one
        moves: u32,
    },

    /// A level was loaded
    LevelLoaded {
        /// Blocks to destroy
        blocks: u32,
    },

    /// Last block destroyed
    LevelWon {
        /// Swaps used
        moves: u32,
        /// Level ticks taken
        ticks_since_load: u32,
    },

    /// Player reloaded the current level
    LevelRestarted {
        /// Swaps made before restarting
        moves: u32,
        /// Level ticks played
        ticks_since_load: u32,
    },

    /// Player skipped ahead
    LevelSkipped {
        /// Swaps made before skipping
        moves: u32,
        /// Level ticks played
        ticks_since_load: u32,
    },

    /// Player went back a level
    LevelBack {
        /// Swaps made before leaving
        moves: u32,
        /// Level ticks played
        ticks_since_load: u32,
    },

    /// Winning delay elapsed, moving on
    LevelAdvanced {
        /// Level loaded on the next tick
        next_level: u32,
    },

    /// The final level was won
    CampaignCompleted,
}

/// A game event with timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Level-local tick when the event occurred
    pub tick: u32,

    /// Level index
    pub level: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, level: u32, data: GameEventData) -> Self {
        Self { tick, level, data }
    }

    /// Create beam fired event.
    pub fn beam_fired(tick: u32, level: u32, source: GridVec2, dir: Direction, color: Color) -> Self {
        Self::new(tick, level, GameEventData::BeamFired { source, dir, color })
    }

    /// Create block destroyed event.
    pub fn block_destroyed(
        tick: u32,
        level: u32,
        position: GridVec2,
        color: Color,
        blocks_remaining: u32,
    ) -> Self {
        Self::new(
            tick,
            level,
            GameEventData::BlockDestroyed {
                position,
                color,
                blocks_remaining,
            },
        )
    }

    /// Create level won event.
    pub fn level_won(tick: u32, level: u32, moves: u32) -> Self {
        Self::new(
            tick,
            level,
            GameEventData::LevelWon {
                moves,
                ticks_since_load: tick,
            },
        )
    }

    /// True for events a telemetry sink records (win and navigation).
    pub fn is_telemetry(&self) -> bool {
        matches!(
            self.data,
            GameEventData::LevelWon { .. }
                | GameEventData::LevelRestarted { .. }
                | GameEventData::LevelSkipped { .. }
                | GameEventData::LevelBack { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_won_records_ticks() {
        let event = GameEvent::level_won(167, 0, 2);
        assert_eq!(
            event.data,
            GameEventData::LevelWon { moves: 2, ticks_since_load: 167 }
        );
        assert!(event.is_telemetry());
    }

    #[test]
    fn test_event_json_shape() {
        let event = GameEvent::beam_fired(31, 0, GridVec2::new(0, 5), Direction::Right, Color::Green);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("BeamFired"));
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert!(!back.is_telemetry());
    }
}
