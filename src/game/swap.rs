//! Selection and Swapping
//!
//! The player selects a swappable entity, then touches an orthogonal
//! neighbour to exchange the two. Rejected touches are normal input and are
//! reported as an outcome, never as an error.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::vec2::GridVec2;
use crate::game::entity;
use crate::game::events::GameEventData;
use crate::game::state::LevelState;

/// What a touch did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchOutcome {
    /// Empty, non-swappable, out of bounds, or not adjacent to the selection
    Ignored,
    /// Became the swap anchor
    Selected,
    /// Touched the anchor again
    Deselected,
    /// Exchanged with the anchor
    Swapped,
    /// Adjacent to the anchor, but the anchor stopped being swappable
    SwapRejected,
}

/// Is there a swappable entity on this cell?
pub fn is_swappable_at(level: &LevelState, pos: GridVec2) -> bool {
    level.entity_at(pos).is_some_and(|e| e.swappable())
}

/// Exchange the occupants of two cells.
///
/// No-op unless both cells hold swappable entities. Both grid writes land
/// before either entity's `on_move` hook runs, so hooks never observe a
/// half-applied swap.
pub fn swap(level: &mut LevelState, a: GridVec2, b: GridVec2) -> bool {
    if a == b || !is_swappable_at(level, a) || !is_swappable_at(level, b) {
        return false;
    }
    let (Some(first), Some(second)) = (level.occupant(a), level.occupant(b)) else {
        return false;
    };

    level.relocate(first, b);
    level.relocate(second, a);
    entity::on_move(level, first);
    entity::on_move(level, second);

    level.ticks_since_move = 0;
    level.moves += 1;

    debug!(level = level.level_index, tick = level.tick, %a, %b, moves = level.moves, "swap");
    let moves = level.moves;
    level.emit_event(GameEventData::Swapped { a, b, moves });
    true
}

/// Drop the selection if its cell emptied or stopped being swappable.
pub fn validate_selection(level: &mut LevelState) {
    if let Some(pos) = level.selection {
        if !is_swappable_at(level, pos) {
            level.selection = None;
        }
    }
}

/// Handle a touch on a grid cell.
pub fn touch(level: &mut LevelState, pos: GridVec2) -> TouchOutcome {
    if !is_swappable_at(level, pos) {
        return TouchOutcome::Ignored;
    }

    match level.selection {
        None => {
            level.selection = Some(pos);
            level.emit_event(GameEventData::Selected { position: pos });
            TouchOutcome::Selected
        }
        Some(anchor) if anchor == pos => {
            level.selection = None;
            level.emit_event(GameEventData::Deselected { position: pos });
            TouchOutcome::Deselected
        }
        Some(anchor) if anchor.is_adjacent(pos) => {
            level.selection = None;
            if swap(level, anchor, pos) {
                TouchOutcome::Swapped
            } else {
                TouchOutcome::SwapRejected
            }
        }
        Some(_) => TouchOutcome::Ignored,
    }
}
