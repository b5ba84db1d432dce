//! Blocks and Boulders
//!
//! Blocks are the level's targets: a beam of their own color starts a fade,
//! and once the fade runs out the block is destroyed. Destroying the last
//! block wins the level. Boulders just sit there (and fall).

use tracing::debug;

use crate::game::entity::{Behavior, Block, Boulder, Entity, EntityId, EntityKind};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::state::LevelState;

fn block_mut(level: &mut LevelState, id: EntityId) -> Option<&mut Block> {
    match level.entity_mut(id).map(|e| &mut e.kind) {
        Some(EntityKind::Block(b)) => Some(b),
        _ => None,
    }
}

impl Block {
    /// Is the block dissolving?
    #[inline]
    pub fn is_fading(&self) -> bool {
        self.fade_start.is_some()
    }

    /// Ticks elapsed since the fade began.
    pub fn fade_elapsed(&self, now: u32) -> Option<u32> {
        self.fade_start.map(|start| now.saturating_sub(start))
    }
}

impl Behavior for Block {
    fn swappable(&self) -> bool {
        !self.is_fading()
    }

    fn tick(level: &mut LevelState, id: EntityId) {
        let now = level.tick;
        let fade_time = level.config.fade_time;
        let expired = block_mut(level, id)
            .and_then(|b| b.fade_elapsed(now))
            .is_some_and(|elapsed| elapsed > fade_time);
        if expired {
            level.destroy(id);
        }
    }

    fn on_hit(level: &mut LevelState, id: EntityId, by: EntityId) {
        let beam_color = level.entity(by).and_then(Entity::color);
        let now = level.tick;
        let Some(entity) = level.entity_mut(id) else {
            return;
        };
        let position = entity.pos;
        let EntityKind::Block(block) = &mut entity.kind else {
            return;
        };
        if beam_color != Some(block.color) || block.is_fading() {
            return;
        }

        block.fade_start = Some(now);
        let color = block.color;
        // Dissolving blocks stop falling
        entity.has_gravity = false;

        level.emit_event(GameEventData::BlockStruck { position, color });
    }

    fn on_destroy(level: &mut LevelState, _id: EntityId, removed: &Entity) {
        level.block_count = level.block_count.saturating_sub(1);

        if let EntityKind::Block(block) = removed.kind {
            debug!(
                level = level.level_index,
                tick = level.tick,
                pos = %removed.pos,
                remaining = level.block_count,
                "block destroyed"
            );
            let event = GameEvent::block_destroyed(
                level.tick,
                level.level_index,
                removed.pos,
                block.color,
                level.block_count,
            );
            level.push_event(event);
        }

        if level.block_count == 0 {
            level.record_win();
        }
    }
}

impl Behavior for Boulder {
    fn swappable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::{GridVec2, Direction};
    use crate::game::config::SimConfig;
    use crate::game::entity::{self, Color};

    fn setup(block_color: Color, beam_color: Color) -> (LevelState, EntityId, EntityId) {
        let mut state = LevelState::new(0, 4, 4, SimConfig::default());
        let block = state.spawn_block(Entity::block(GridVec2::new(1, 1), block_color));
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 1), Direction::Right, beam_color));
        (state, block, src)
    }

    fn fade_start(state: &LevelState, id: EntityId) -> Option<u32> {
        match state.entity(id).map(|e| e.kind) {
            Some(EntityKind::Block(b)) => b.fade_start,
            _ => None,
        }
    }

    #[test]
    fn test_matching_hit_starts_fade() {
        let (mut state, block, src) = setup(Color::Green, Color::Green);
        state.tick = 7;
        entity::on_hit(&mut state, block, src);

        assert_eq!(fade_start(&state, block), Some(7));
        let e = state.entity(block).unwrap();
        assert!(!e.has_gravity);
        assert!(!e.swappable());
    }

    #[test]
    fn test_mismatched_hit_is_ignored() {
        let (mut state, block, src) = setup(Color::Red, Color::Blue);
        entity::on_hit(&mut state, block, src);
        assert_eq!(fade_start(&state, block), None);
        assert!(state.entity(block).unwrap().has_gravity);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_repeat_hits_do_not_restart_fade() {
        let (mut state, block, src) = setup(Color::Red, Color::Red);
        state.tick = 3;
        entity::on_hit(&mut state, block, src);
        state.tick = 9;
        entity::on_hit(&mut state, block, src);
        assert_eq!(fade_start(&state, block), Some(3));
    }

    #[test]
    fn test_fade_destroys_after_fade_time() {
        let (mut state, block, src) = setup(Color::Blue, Color::Blue);
        entity::on_hit(&mut state, block, src);
        let fade_time = state.config.fade_time;

        state.tick = fade_time;
        entity::tick(&mut state, block);
        assert!(state.is_alive(block));

        state.tick = fade_time + 1;
        entity::tick(&mut state, block);
        assert!(!state.is_alive(block));
        assert_eq!(state.block_count, 0);
        assert_eq!(state.win_tick, Some(fade_time + 1));
        assert!(state.grid.is_empty(GridVec2::new(1, 1)));
    }

    #[test]
    fn test_win_waits_for_last_block() {
        let mut state = LevelState::new(0, 4, 4, SimConfig::default());
        let a = state.spawn_block(Entity::block(GridVec2::new(0, 0), Color::Red));
        let b = state.spawn_block(Entity::block(GridVec2::new(1, 0), Color::Red));

        state.destroy(a);
        assert_eq!(state.block_count, 1);
        assert!(!state.is_won());

        state.destroy(b);
        assert!(state.is_won());
    }

    #[test]
    fn test_boulder_unaffected_by_hits() {
        let mut state = LevelState::new(0, 4, 4, SimConfig::default());
        let boulder = state.spawn(Entity::boulder(GridVec2::new(1, 0)));
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 0), Direction::Right, Color::Red));
        entity::on_hit(&mut state, boulder, src);
        entity::tick(&mut state, boulder);
        assert!(state.is_alive(boulder));
        assert!(!state.entity(boulder).unwrap().swappable());
    }
}
