//! Campaign and Level Navigation
//!
//! Owns the level pack and the live level, and walks the per-level state
//! machine:
//!
//! ```text
//! Playing ──last block destroyed──▶ Winning ──advance delay──▶ Advancing ──next tick──▶ Playing
//!                                       │
//!                                       └──(final level)──▶ Completed
//! ```
//!
//! Gameplay keeps running while `Winning`. `Completed` clears the grid; the
//! HUD actions (restart, back) still work from there.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::hash::{StateHash, StateHasher};
use crate::core::vec2::GridVec2;
use crate::game::config::SimConfig;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::level::{self, LevelError, LevelPack};
use crate::game::state::LevelState;
use crate::game::swap::{self, TouchOutcome};

/// Status text shown once every level is beaten.
pub const COMPLETION_TEXT: &str = "Congrats! You beat all the levels.";

/// Campaign phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignPhase {
    /// Level in progress
    Playing,
    /// Last block destroyed; waiting out the advance delay
    Winning {
        /// Level tick of the win
        win_tick: u32,
    },
    /// Delay elapsed; `next_level` loads on the next tick
    Advancing {
        /// Level to load
        next_level: u32,
    },
    /// Final level won
    Completed,
}

impl CampaignPhase {
    fn code(self) -> (u8, u32) {
        match self {
            CampaignPhase::Playing => (0, 0),
            CampaignPhase::Winning { win_tick } => (1, win_tick),
            CampaignPhase::Advancing { next_level } => (2, next_level),
            CampaignPhase::Completed => (3, 0),
        }
    }
}

/// A run through a level pack.
#[derive(Clone, Debug)]
pub struct Campaign {
    /// Levels in play order
    pub pack: LevelPack,

    /// Timing constants applied to every level
    pub config: SimConfig,

    /// The live level
    pub level: LevelState,

    /// Where the current level is in its lifecycle
    pub phase: CampaignPhase,

    /// Ticks since the campaign started
    pub tick: u32,

    /// Campaign-level events not yet drained
    pending_events: Vec<GameEvent>,
}

impl Campaign {
    /// Start a campaign at the first level.
    pub fn new(pack: LevelPack, config: SimConfig) -> Result<Self, LevelError> {
        Self::starting_at(pack, config, 0)
    }

    /// Start a campaign at `index`.
    pub fn starting_at(pack: LevelPack, config: SimConfig, index: u32) -> Result<Self, LevelError> {
        pack.validate()?;
        let level = level::load(index, pack.level(index)?, config)?;
        Ok(Self {
            pack,
            config,
            level,
            phase: CampaignPhase::Playing,
            tick: 0,
            pending_events: Vec::new(),
        })
    }

    /// Index of the live level.
    #[inline]
    pub fn level_index(&self) -> u32 {
        self.level.level_index
    }

    /// Has the final level been won?
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.phase == CampaignPhase::Completed
    }

    /// Replace the live level with a fresh load of `index`.
    pub fn load_level(&mut self, index: u32) -> Result<(), LevelError> {
        let mut fresh = level::load(index, self.pack.level(index)?, self.config)?;
        fresh.session_tick = self.level.session_tick;
        self.absorb_level_events();
        self.level = fresh;
        self.phase = CampaignPhase::Playing;
        Ok(())
    }

    /// Reload the current level.
    pub fn restart(&mut self) -> Result<(), LevelError> {
        let index = self.level_index();
        let (moves, ticks_since_load) = (self.level.moves, self.level.tick);
        self.push_event(GameEventData::LevelRestarted { moves, ticks_since_load });
        debug!(level = index, "level restarted");
        self.load_level(index)
    }

    /// Go back one level. Returns false on the first level.
    pub fn previous_level(&mut self) -> Result<bool, LevelError> {
        let index = self.level_index();
        if index == 0 {
            return Ok(false);
        }
        let (moves, ticks_since_load) = (self.level.moves, self.level.tick);
        self.push_event(GameEventData::LevelBack { moves, ticks_since_load });
        debug!(level = index, "level back");
        self.load_level(index - 1)?;
        Ok(true)
    }

    /// Skip to the next level. Returns false on the last level.
    pub fn skip_level(&mut self) -> Result<bool, LevelError> {
        let index = self.level_index();
        if self.pack.is_last(index) {
            return Ok(false);
        }
        let (moves, ticks_since_load) = (self.level.moves, self.level.tick);
        self.push_event(GameEventData::LevelSkipped { moves, ticks_since_load });
        debug!(level = index, "level skipped");
        self.load_level(index + 1)?;
        Ok(true)
    }

    /// Touch a grid cell. Ignored once the level is over.
    pub fn touch(&mut self, pos: GridVec2) -> TouchOutcome {
        match self.phase {
            CampaignPhase::Playing | CampaignPhase::Winning { .. } => swap::touch(&mut self.level, pos),
            CampaignPhase::Advancing { .. } | CampaignPhase::Completed => TouchOutcome::Ignored,
        }
    }

    /// Note a win recorded during the last level step.
    pub(crate) fn observe_win(&mut self) {
        if self.phase != CampaignPhase::Playing {
            return;
        }
        if let Some(win_tick) = self.level.win_tick {
            self.phase = CampaignPhase::Winning { win_tick };
        }
    }

    /// Leave `Winning` once the advance delay has elapsed.
    pub(crate) fn check_advance(&mut self) {
        let CampaignPhase::Winning { win_tick } = self.phase else {
            return;
        };
        if self.level.tick.saturating_sub(win_tick) <= self.config.level_advance_time {
            return;
        }

        let index = self.level_index();
        if self.pack.is_last(index) {
            self.complete();
        } else {
            let next_level = index + 1;
            debug!(level = index, next_level, "level advancing");
            self.push_event(GameEventData::LevelAdvanced { next_level });
            self.phase = CampaignPhase::Advancing { next_level };
        }
    }

    fn complete(&mut self) {
        debug!(level = self.level_index(), campaign_tick = self.tick, "campaign completed");
        self.push_event(GameEventData::CampaignCompleted);
        self.level.clear();
        self.level.status_text = COMPLETION_TEXT.to_string();
        self.phase = CampaignPhase::Completed;
    }

    /// Push campaign-level event data stamped with the live level's clock.
    pub fn push_event(&mut self, data: GameEventData) {
        self.absorb_level_events();
        let event = GameEvent::new(self.level.tick, self.level.level_index, data);
        self.pending_events.push(event);
    }

    fn absorb_level_events(&mut self) {
        let events = self.level.take_events();
        self.pending_events.extend(events);
    }

    /// Take pending events from the campaign and the live level, in order.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.absorb_level_events();
        std::mem::take(&mut self.pending_events)
    }

    /// Hash of the campaign position plus the live level.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::new(b"PRISM_GRID_CAMPAIGN_V1");
        hasher.update_u32(self.tick);
        let (phase, arg) = self.phase.code();
        hasher.update_u8(phase);
        hasher.update_u32(arg);
        hasher.update_bytes(&self.level.compute_hash());
        hasher.finalize()
    }
}
