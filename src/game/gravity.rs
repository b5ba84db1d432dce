//! Gravity Pass
//!
//! Every dwell interval after the last swap, gravity-affected entities drop
//! one row if the cell beneath them is empty or holds a beam segment (the
//! segment and everything downstream of it is destroyed first).
//!
//! Columns are swept left to right, rows bottom to top, so a stack of
//! entities settles together in a single pass.

use crate::core::vec2::{GridVec2, Direction};
use crate::game::entity::EntityId;
use crate::game::state::LevelState;

/// Does gravity run on the current tick?
///
/// Shares the beam dwell cadence and is suspended for a full interval after
/// each successful swap.
pub fn gravity_due(level: &LevelState) -> bool {
    let interval = level.config.laser_time.max(1);
    level.ticks_since_move > 0 && level.ticks_since_move % interval == 0
}

/// Run one gravity pass. Returns how many entities fell.
pub fn apply_gravity(level: &mut LevelState) -> u32 {
    let width = level.grid.width() as i32;
    let height = level.grid.height() as i32;
    let mut fallen = 0;

    for x in 0..width {
        // Bottom row has nowhere to go
        for y in (0..height - 1).rev() {
            let Some(id) = level.occupant(GridVec2::new(x, y)) else {
                continue;
            };
            if fall(level, id) {
                fallen += 1;
            }
        }
    }

    fallen
}

/// Drop one entity by one row if it can fall.
fn fall(level: &mut LevelState, id: EntityId) -> bool {
    let Some(entity) = level.entity(id) else {
        return false;
    };
    if !entity.has_gravity {
        return false;
    }

    let below = entity.pos.step(Direction::Down);
    if !level.grid.in_bounds(below) {
        return false;
    }

    if let Some(under) = level.occupant(below) {
        if !level.entity(under).is_some_and(|e| e.is_beam()) {
            return false;
        }
        level.destroy(under);
    }

    // The crushed chain may have notified this entity; re-check both cells
    if !level.is_alive(id) || !level.grid.is_empty(below) {
        return false;
    }
    level.move_entity(id, below);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::beam::{emit, chain_len};
    use crate::game::config::SimConfig;
    use crate::game::entity::{Color, Entity, EntityKind};

    fn level(w: u32, h: u32) -> LevelState {
        LevelState::new(0, w, h, SimConfig::default())
    }

    #[test]
    fn test_gravity_cadence() {
        let mut state = level(3, 3);
        let interval = state.config.laser_time;

        state.ticks_since_move = 0;
        assert!(!gravity_due(&state), "suspended right after a swap");
        state.ticks_since_move = interval - 1;
        assert!(!gravity_due(&state));
        state.ticks_since_move = interval;
        assert!(gravity_due(&state));
        state.ticks_since_move = interval * 3;
        assert!(gravity_due(&state));
    }

    #[test]
    fn test_falls_one_row_per_pass() {
        let mut state = level(3, 4);
        let id = state.spawn(Entity::mirror(GridVec2::new(1, 0), Direction::Left, Color::Red));
        assert_eq!(apply_gravity(&mut state), 1);
        assert_eq!(state.entity(id).unwrap().pos, GridVec2::new(1, 1));
        apply_gravity(&mut state);
        apply_gravity(&mut state);
        assert_eq!(state.entity(id).unwrap().pos, GridVec2::new(1, 3));
        assert_eq!(apply_gravity(&mut state), 0);
    }

    #[test]
    fn test_stack_settles_together() {
        let mut state = level(1, 4);
        let top = state.spawn_block(Entity::block(GridVec2::new(0, 0), Color::Red));
        let bottom = state.spawn_block(Entity::block(GridVec2::new(0, 1), Color::Blue));
        assert_eq!(apply_gravity(&mut state), 2);
        assert_eq!(state.entity(bottom).unwrap().pos, GridVec2::new(0, 2));
        assert_eq!(state.entity(top).unwrap().pos, GridVec2::new(0, 1));
        assert!(state.is_consistent());
    }

    #[test]
    fn test_does_not_fall_through_solids() {
        let mut state = level(1, 3);
        state.spawn(Entity::boulder(GridVec2::new(0, 2)));
        let block = state.spawn_block(Entity::block(GridVec2::new(0, 1), Color::Green));
        let emitter = state.spawn(Entity::emitter(GridVec2::new(0, 0), Direction::Right, Color::Green));
        assert_eq!(apply_gravity(&mut state), 0);
        assert_eq!(state.entity(block).unwrap().pos, GridVec2::new(0, 1));
        assert_eq!(state.entity(emitter).unwrap().pos, GridVec2::new(0, 0));
    }

    #[test]
    fn test_fading_block_stays_put() {
        let mut state = level(1, 3);
        let block = state.spawn_block(Entity::block(GridVec2::new(0, 0), Color::Green));
        if let Some(EntityKind::Block(b)) = state.entity_mut(block).map(|e| &mut e.kind) {
            b.fade_start = Some(0);
        }
        state.entity_mut(block).unwrap().has_gravity = false;
        assert_eq!(apply_gravity(&mut state), 0);
    }

    #[test]
    fn test_falling_crushes_beam_chain() {
        // Emitter fires right along row 2; block above (2, 2) drops into the beam
        let mut state = level(5, 3);
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 2), Direction::Right, Color::Red));
        let block = state.spawn_block(Entity::block(GridVec2::new(2, 1), Color::Red));
        emit(&mut state, src, true);
        assert_eq!(chain_len(&state, src), 4);

        apply_gravity(&mut state);

        assert_eq!(state.entity(block).unwrap().pos, GridVec2::new(2, 2));
        assert_eq!(chain_len(&state, src), 1);
        assert!(state.grid.is_empty(GridVec2::new(3, 2)));
        assert!(state.grid.is_empty(GridVec2::new(4, 2)));
        assert!(state.is_consistent());
    }

    #[test]
    fn test_falling_emitter_retracts_its_beam() {
        let mut state = level(4, 2);
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 0), Direction::Right, Color::Red));
        emit(&mut state, src, true);
        assert_eq!(chain_len(&state, src), 3);

        apply_gravity(&mut state);

        assert_eq!(state.entity(src).unwrap().pos, GridVec2::new(0, 1));
        assert_eq!(chain_len(&state, src), 0);
        assert_eq!(state.entities.len(), 1);
    }
}
