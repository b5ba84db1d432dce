//! Player Commands and Recording
//!
//! The engine receives grid-cell touches and HUD actions as [`Command`]
//! values, never raw pointer coordinates. A [`InputRecording`] keeps the
//! commands of a session keyed by tick so it can be replayed exactly.

use serde::{Serialize, Deserialize};
use crate::core::vec2::GridVec2;

// =============================================================================
// COMMANDS
// =============================================================================

/// One player action, applied before the tick it is submitted with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Touch a grid cell (select, deselect or swap)
    Touch {
        /// Column
        x: i32,
        /// Row
        y: i32,
    },
    /// Reload the current level
    Restart,
    /// Go back one level
    PreviousLevel,
    /// Skip to the next level
    SkipLevel,
}

impl Command {
    /// Touch command for a cell.
    pub fn touch(pos: GridVec2) -> Self {
        Command::Touch { x: pos.x, y: pos.y }
    }
}

// =============================================================================
// RECORDING
// =============================================================================

/// Commands submitted on one tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFrame {
    /// Campaign tick the commands were applied before
    pub tick: u32,
    /// Commands in submission order
    pub commands: Vec<Command>,
}

/// Sparse recording of a session: only ticks that carried commands are
/// stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecording {
    /// Last tick covered by the recording
    pub end_tick: u32,

    /// Non-empty frames in tick order
    frames: Vec<CommandFrame>,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the commands applied before `tick`.
    ///
    /// Ticks must be recorded in nondecreasing order; commands for a tick
    /// already recorded are appended to it.
    pub fn record(&mut self, tick: u32, commands: &[Command]) {
        self.end_tick = self.end_tick.max(tick);
        if commands.is_empty() {
            return;
        }
        match self.frames.last_mut() {
            Some(last) if last.tick == tick => last.commands.extend_from_slice(commands),
            _ => self.frames.push(CommandFrame { tick, commands: commands.to_vec() }),
        }
    }

    /// Total number of recorded commands.
    pub fn command_count(&self) -> usize {
        self.frames.iter().map(|f| f.commands.len()).sum()
    }

    /// Iterate every tick with its commands.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: 0,
            frame_idx: 0,
        }
    }
}

/// Iterator for replaying commands tick by tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    frame_idx: usize,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u32, &'a [Command]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.recording.end_tick {
            return None;
        }

        let tick = self.current_tick;
        self.current_tick += 1;

        let frames = &self.recording.frames;
        match frames.get(self.frame_idx) {
            Some(frame) if frame.tick == tick => {
                self.frame_idx += 1;
                Some((tick, frame.commands.as_slice()))
            }
            _ => Some((tick, &[])),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
