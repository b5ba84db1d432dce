//! Authoritative Simulation Tick
//!
//! One call advances the campaign by one fixed time unit and runs the whole
//! cascade to completion before returning:
//!
//! 1. load a pending next level
//! 2. apply player commands
//! 3. drop a stale selection
//! 4. tick every entity (columns left to right, rows top to bottom)
//! 5. gravity pass, when due
//! 6. advance the clocks
//! 7. win and advance checks
//!
//! There is no other suspension point. Given the same pack, config and
//! commands, every run produces the same state hash.

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::core::vec2::GridVec2;
use crate::game::campaign::{Campaign, CampaignPhase};
use crate::game::config::SimConfig;
use crate::game::entity;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::gravity::{apply_gravity, gravity_due};
use crate::game::input::Command;
use crate::game::level::{LevelError, LevelPack};
use crate::game::state::LevelState;
use crate::game::swap::{self, TouchOutcome};

/// Result of a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickResult {
    /// Events generated this tick, in order
    pub events: Vec<GameEvent>,
    /// Phase after the tick
    pub phase: CampaignPhase,
    /// Level simulated (or shown) this tick
    pub level: u32,
    /// Outcome of each touch command, in submission order
    pub touches: Vec<TouchOutcome>,
}

impl TickResult {
    /// Did the level's last block go this tick?
    pub fn level_won(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e.data, GameEventData::LevelWon { .. }))
    }
}

/// Simulate one tick of a single level.
pub fn step_level(level: &mut LevelState) {
    swap::validate_selection(level);

    // Entities spawned ahead of the sweep are ticked in the same pass
    let (width, height) = (level.grid.width() as i32, level.grid.height() as i32);
    for x in 0..width {
        for y in 0..height {
            if let Some(id) = level.occupant(GridVec2::new(x, y)) {
                entity::tick(level, id);
            }
        }
    }

    if gravity_due(level) {
        apply_gravity(level);
    }

    level.tick += 1;
    level.session_tick += 1;
    level.ticks_since_move += 1;
}

/// Apply one player command to the campaign.
pub fn apply_command(campaign: &mut Campaign, command: Command) -> Result<Option<TouchOutcome>, LevelError> {
    match command {
        Command::Touch { x, y } => Ok(Some(campaign.touch(GridVec2::new(x, y)))),
        Command::Restart => campaign.restart().map(|_| None),
        Command::PreviousLevel => campaign.previous_level().map(|_| None),
        Command::SkipLevel => campaign.skip_level().map(|_| None),
    }
}

/// Run one campaign tick.
///
/// `commands` are applied in order before the level is simulated. Once the
/// campaign is completed only navigation commands have any effect.
pub fn tick(campaign: &mut Campaign, commands: &[Command]) -> TickResult {
    if let CampaignPhase::Advancing { next_level } = campaign.phase {
        if let Err(err) = campaign.load_level(next_level) {
            warn!(next_level, %err, "failed to load next level");
        }
    }

    let mut touches = Vec::new();
    for &command in commands {
        match apply_command(campaign, command) {
            Ok(Some(outcome)) => touches.push(outcome),
            Ok(None) => {}
            Err(err) => warn!(?command, %err, "command failed"),
        }
    }

    if campaign.phase != CampaignPhase::Completed {
        step_level(&mut campaign.level);
        campaign.observe_win();
        campaign.check_advance();
        campaign.tick += 1;
    }

    TickResult {
        events: campaign.take_events(),
        phase: campaign.phase,
        level: campaign.level_index(),
        touches,
    }
}

/// Replay a recorded session from the start of a pack.
///
/// Each frame holds the commands applied before one tick. Returns the final
/// campaign and every event produced.
pub fn replay<I>(
    pack: LevelPack,
    config: SimConfig,
    frames: I,
) -> Result<(Campaign, Vec<GameEvent>), LevelError>
where
    I: IntoIterator,
    I::Item: AsRef<[Command]>,
{
    let mut campaign = Campaign::new(pack, config)?;
    let mut all_events = campaign.take_events();

    for frame in frames {
        let result = tick(&mut campaign, frame.as_ref());
        all_events.extend(result.events);
    }

    Ok((campaign, all_events))
}
