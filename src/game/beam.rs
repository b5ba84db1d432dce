//! Beam Propagation
//!
//! Grows beams from emitters and mirrors, notifies whatever they strike, and
//! tears chains down when a source moves or a segment is destroyed.
//!
//! ## Growth
//!
//! `emit` places a segment in the next empty cell and immediately continues
//! from it, so a beam runs straight to the first obstacle in one call. The
//! recursion consumes one cell of travel per level and every segment is a
//! fresh occupant, so depth never exceeds the grid's longest side.
//!
//! Only *primary* emissions report hits. A tip segment reports the obstacle
//! in front of it once its dwell interval has elapsed, which is what paces
//! mirrors and blocks.
//!
//! ## Retraction
//!
//! A source that moves or is destroyed destroys its child (which cascades
//! down the chain) and ends the hit on whatever it was striking.

#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::game::entity::{
    self, Behavior, BeamLinks, Beam, Emitter, Entity, EntityId, EntityKind, Mirror,
};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::state::LevelState;

/// Extend the beam leaving `source` by one cell, continuing through empty cells.
///
/// No-op if the source already has a live child, if the next cell is out of
/// bounds, or if the next cell is the source itself.
pub fn emit(level: &mut LevelState, source: EntityId, is_primary: bool) {
    let Some(src) = level.entity(source) else {
        return;
    };
    let (Some(dir), Some(color), Some(links)) = (src.direction(), src.color(), src.links()) else {
        return;
    };

    if links.child.is_some_and(|child| level.is_alive(child)) {
        return;
    }

    let origin = src.pos;
    let next = origin.step(dir);
    if !level.grid.in_bounds(next) {
        return;
    }

    match level.occupant(next) {
        Some(occupant) if occupant == source => {}
        None => {
            let child = level.spawn(Entity::beam(next, dir, color, level.tick));
            if let Some(links) = level.entity_mut(source).and_then(Entity::links_mut) {
                links.child = Some(child);
            }

            #[cfg(feature = "debug-tracing")]
            trace!(tick = level.tick, cell = %next, ?color, "beam segment");

            if is_primary {
                let event = GameEvent::beam_fired(level.tick, level.level_index, origin, dir, color);
                level.push_event(event);
            }
            emit(level, child, false);
        }
        Some(occupant) => {
            if is_primary {
                entity::on_hit(level, occupant, source);
                if let Some(links) = level.entity_mut(source).and_then(Entity::links_mut) {
                    links.hitting = Some(occupant);
                }
            }
        }
    }
}

/// Tear down what a source's links point at.
fn release(level: &mut LevelState, source: EntityId, links: BeamLinks) {
    if let Some(child) = links.child {
        level.destroy(child);
    }
    if let Some(hitting) = links.hitting {
        entity::on_hit_end(level, hitting, source);
    }
}

/// Retract the beam leaving a live source.
pub fn retract(level: &mut LevelState, source: EntityId) {
    let links = level
        .entity_mut(source)
        .and_then(Entity::links_mut)
        .map(BeamLinks::take)
        .unwrap_or_default();
    release(level, source, links);
}

/// Length of the live chain leaving `source` (segments only).
pub fn chain_len(level: &LevelState, source: EntityId) -> usize {
    let mut len = 0;
    let mut cursor = level.entity(source).and_then(Entity::links).and_then(|l| l.child);
    while let Some(id) = cursor {
        let Some(segment) = level.entity(id) else {
            break;
        };
        len += 1;
        cursor = segment.links().and_then(|l| l.child);
    }
    len
}

#[inline]
fn elapsed(now: u32, since: u32) -> u32 {
    now.saturating_sub(since)
}

// =============================================================================
// EMITTER
// =============================================================================

impl Behavior for Emitter {
    fn tick(level: &mut LevelState, id: EntityId) {
        // Warm-up runs once per session, not once per level
        let config = level.config;
        let now = level.session_tick;
        if now > config.emitter_warmup
            && (now - config.emitter_warmup) % config.emitter_period.max(1) == 0
        {
            emit(level, id, true);
        }
    }

    fn on_move(level: &mut LevelState, id: EntityId) {
        retract(level, id);
    }

    fn on_destroy(level: &mut LevelState, id: EntityId, removed: &Entity) {
        if let Some(links) = removed.links() {
            release(level, id, links);
        }
    }
}

// =============================================================================
// MIRROR
// =============================================================================

fn mirror_mut(level: &mut LevelState, id: EntityId) -> Option<&mut Mirror> {
    match level.entity_mut(id).map(|e| &mut e.kind) {
        Some(EntityKind::Mirror(m)) => Some(m),
        _ => None,
    }
}

impl Behavior for Mirror {
    fn tick(level: &mut LevelState, id: EntityId) {
        let Some(hit_start) = mirror_mut(level, id).and_then(|m| m.hit_start) else {
            return;
        };
        if elapsed(level.tick, hit_start) > level.config.laser_time {
            emit(level, id, true);
        }
    }

    fn on_hit(level: &mut LevelState, id: EntityId, _by: EntityId) {
        let now = level.tick;
        let Some(mirror) = mirror_mut(level, id) else {
            return;
        };
        if mirror.hit_start.is_some() {
            return;
        }
        mirror.hit_start = Some(now);
        let color = mirror.color;
        if let Some(position) = level.entity(id).map(|e| e.pos) {
            level.emit_event(GameEventData::MirrorActivated { position, color });
        }
    }

    fn on_hit_end(level: &mut LevelState, id: EntityId, _by: EntityId) {
        Self::on_move(level, id);
    }

    fn on_move(level: &mut LevelState, id: EntityId) {
        retract(level, id);
        if let Some(mirror) = mirror_mut(level, id) {
            mirror.hit_start = None;
        }
    }

    fn on_destroy(level: &mut LevelState, id: EntityId, removed: &Entity) {
        if let Some(links) = removed.links() {
            release(level, id, links);
        }
    }
}

// =============================================================================
// BEAM SEGMENT
// =============================================================================

impl Behavior for Beam {
    fn swappable(&self) -> bool {
        false
    }

    fn tick(level: &mut LevelState, id: EntityId) {
        let Some(EntityKind::Beam(beam)) = level.entity(id).map(|e| e.kind) else {
            return;
        };
        if elapsed(level.tick, beam.created) > level.config.laser_time {
            emit(level, id, true);
        }
    }

    fn on_move(level: &mut LevelState, id: EntityId) {
        retract(level, id);
    }

    fn on_destroy(level: &mut LevelState, id: EntityId, removed: &Entity) {
        if let Some(links) = removed.links() {
            release(level, id, links);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::{GridVec2, Direction};
    use crate::game::config::SimConfig;
    use crate::game::entity::Color;

    fn level(w: u32, h: u32) -> LevelState {
        LevelState::new(0, w, h, SimConfig::default())
    }

    fn beam_at(level: &LevelState, pos: GridVec2) -> Option<Beam> {
        match level.entity_at(pos).map(|e| e.kind) {
            Some(EntityKind::Beam(b)) => Some(b),
            _ => None,
        }
    }

    #[test]
    fn test_emit_runs_to_boundary() {
        let mut state = level(6, 6);
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 5), Direction::Right, Color::Green));
        emit(&mut state, src, true);

        for x in 1..6 {
            let beam = beam_at(&state, GridVec2::new(x, 5)).expect("segment");
            assert_eq!(beam.dir, Direction::Right);
            assert_eq!(beam.color, Color::Green);
        }
        assert_eq!(chain_len(&state, src), 5);
        assert!(state.is_consistent());
        assert_eq!(state.take_events().len(), 1, "one BeamFired per primary emission");
    }

    #[test]
    fn test_emit_out_of_bounds_creates_nothing() {
        let mut state = level(3, 3);
        let src = state.spawn(Entity::emitter(GridVec2::new(2, 0), Direction::Up, Color::Red));
        emit(&mut state, src, true);
        assert_eq!(state.entities.len(), 1);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_emit_with_live_child_is_noop() {
        let mut state = level(6, 1);
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 0), Direction::Right, Color::Red));
        emit(&mut state, src, true);
        let before = state.entities.len();
        emit(&mut state, src, true);
        assert_eq!(state.entities.len(), before);
    }

    #[test]
    fn test_secondary_emission_does_not_hit() {
        let mut state = level(6, 1);
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 0), Direction::Right, Color::Red));
        let block = state.spawn_block(Entity::block(GridVec2::new(3, 0), Color::Red));
        emit(&mut state, src, true);

        // Segments at 1 and 2, tip faces the block but never reported it
        assert_eq!(chain_len(&state, src), 2);
        let Some(EntityKind::Block(b)) = state.entity(block).map(|e| e.kind) else {
            panic!("block missing");
        };
        assert_eq!(b.fade_start, None);
    }

    #[test]
    fn test_primary_emission_hits_adjacent() {
        let mut state = level(6, 1);
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 0), Direction::Right, Color::Red));
        let block = state.spawn_block(Entity::block(GridVec2::new(1, 0), Color::Red));
        emit(&mut state, src, true);

        assert_eq!(state.entity(src).unwrap().links().unwrap().hitting, Some(block));
        let Some(EntityKind::Block(b)) = state.entity(block).map(|e| e.kind) else {
            panic!("block missing");
        };
        assert_eq!(b.fade_start, Some(0));
    }

    #[test]
    fn test_retract_cascades_whole_chain() {
        let mut state = level(6, 1);
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 0), Direction::Right, Color::Blue));
        emit(&mut state, src, true);
        assert_eq!(state.entities.len(), 6);

        retract(&mut state, src);
        assert_eq!(state.entities.len(), 1);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_destroying_mid_segment_drops_downstream_only() {
        let mut state = level(6, 1);
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 0), Direction::Right, Color::Blue));
        emit(&mut state, src, true);

        let mid = state.occupant(GridVec2::new(3, 0)).unwrap();
        state.destroy(mid);

        assert!(beam_at(&state, GridVec2::new(1, 0)).is_some());
        assert!(beam_at(&state, GridVec2::new(2, 0)).is_some());
        for x in 3..6 {
            assert!(state.grid.is_empty(GridVec2::new(x, 0)));
        }
        assert_eq!(chain_len(&state, src), 2);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_mirror_recolors_output() {
        let mut state = level(6, 6);
        let mirror = state.spawn(Entity::mirror(GridVec2::new(2, 5), Direction::Up, Color::Blue));
        let src = state.spawn(Entity::emitter(GridVec2::new(1, 5), Direction::Right, Color::Red));
        emit(&mut state, src, true);

        let hit_start = match state.entity(mirror).unwrap().kind {
            EntityKind::Mirror(m) => m.hit_start,
            _ => unreachable!(),
        };
        assert_eq!(hit_start, Some(0));

        state.tick = state.config.laser_time + 1;
        entity::tick(&mut state, mirror);
        let out = beam_at(&state, GridVec2::new(2, 4)).expect("mirror output");
        assert_eq!(out.color, Color::Blue);
        assert_eq!(out.dir, Direction::Up);
    }

    #[test]
    fn test_mirror_activation_fires_once() {
        let mut state = level(4, 1);
        let mirror = state.spawn(Entity::mirror(GridVec2::new(1, 0), Direction::Right, Color::Red));
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 0), Direction::Right, Color::Red));
        emit(&mut state, src, true);
        state.tick = 5;
        emit(&mut state, src, true);

        let activations = state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e.data, GameEventData::MirrorActivated { .. }))
            .count();
        assert_eq!(activations, 1);
        assert!(matches!(
            state.entity(mirror).unwrap().kind,
            EntityKind::Mirror(Mirror { hit_start: Some(0), .. })
        ));
    }

    #[test]
    fn test_hit_end_retracts_mirror_output() {
        let mut state = level(6, 6);
        let mirror = state.spawn(Entity::mirror(GridVec2::new(2, 5), Direction::Up, Color::Blue));
        let src = state.spawn(Entity::emitter(GridVec2::new(1, 5), Direction::Right, Color::Red));
        emit(&mut state, src, true);
        state.tick = 31;
        entity::tick(&mut state, mirror);
        assert_eq!(chain_len(&state, mirror), 5);

        retract(&mut state, src);

        assert_eq!(chain_len(&state, mirror), 0);
        assert!(matches!(
            state.entity(mirror).unwrap().kind,
            EntityKind::Mirror(Mirror { hit_start: None, .. })
        ));
        assert_eq!(state.entities.len(), 2);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_mirror_loop_terminates() {
        // Four mirrors facing around a 2x2 loop
        let mut state = level(2, 2);
        let m = [
            state.spawn(Entity::mirror(GridVec2::new(0, 0), Direction::Right, Color::Red)),
            state.spawn(Entity::mirror(GridVec2::new(1, 0), Direction::Down, Color::Red)),
            state.spawn(Entity::mirror(GridVec2::new(1, 1), Direction::Left, Color::Red)),
            state.spawn(Entity::mirror(GridVec2::new(0, 1), Direction::Up, Color::Red)),
        ];
        for _ in 0..3 {
            for id in m {
                emit(&mut state, id, true);
            }
        }
        assert_eq!(state.entities.len(), 4);
        assert!(state.is_consistent());
    }

    #[test]
    fn test_segment_waits_dwell_before_reporting_hit() {
        let mut state = level(4, 1);
        let src = state.spawn(Entity::emitter(GridVec2::new(0, 0), Direction::Right, Color::Green));
        let block = state.spawn_block(Entity::block(GridVec2::new(3, 0), Color::Green));
        emit(&mut state, src, true);
        let tip = state.occupant(GridVec2::new(2, 0)).unwrap();

        state.tick = state.config.laser_time;
        entity::tick(&mut state, tip);
        assert!(matches!(
            state.entity(block).unwrap().kind,
            EntityKind::Block(crate::game::entity::Block { fade_start: None, .. })
        ));

        state.tick = state.config.laser_time + 1;
        entity::tick(&mut state, tip);
        assert_eq!(state.entity(tip).unwrap().links().unwrap().hitting, Some(block));
    }
}
