//! Level State
//!
//! Everything one level's simulation reads and writes: the grid, the entity
//! arena, tick counters, the live-block count and the swap selection.
//! Threaded explicitly through every operation; there is no global state.

use slotmap::SlotMap;
use tracing::debug;

use crate::core::vec2::GridVec2;
use crate::core::hash::{StateHash, compute_state_hash};
use crate::game::config::SimConfig;
use crate::game::entity::{self, Entity, EntityId, EntityKind};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::grid::Grid;

/// Complete state of one loaded level.
#[derive(Clone, Debug)]
pub struct LevelState {
    /// Index of this level in its pack
    pub level_index: u32,

    /// Hint shown by the HUD
    pub status_text: String,

    /// Timing constants
    pub config: SimConfig,

    /// Cell occupancy
    pub grid: Grid,

    /// All live entities
    pub entities: SlotMap<EntityId, Entity>,

    /// Ticks since load
    pub tick: u32,

    /// Ticks since the session started; carried across loads
    pub session_tick: u32,

    /// Ticks since the last successful swap (gravity cadence)
    pub ticks_since_move: u32,

    /// Live blocks remaining
    pub block_count: u32,

    /// Pending swap anchor
    pub selection: Option<GridVec2>,

    /// Tick the last block was destroyed
    pub win_tick: Option<u32>,

    /// Successful swaps this level
    pub moves: u32,

    /// Events generated since last drained
    pending_events: Vec<GameEvent>,
}

impl LevelState {
    /// Create an empty level.
    pub fn new(level_index: u32, width: u32, height: u32, config: SimConfig) -> Self {
        Self {
            level_index,
            status_text: String::new(),
            config,
            grid: Grid::new(width, height),
            entities: SlotMap::with_key(),
            tick: 0,
            session_tick: 0,
            ticks_since_move: 0,
            block_count: 0,
            selection: None,
            win_tick: None,
            moves: 0,
            pending_events: Vec::new(),
        }
    }

    /// Place a new entity on its (empty) cell.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        debug_assert!(self.grid.in_bounds(entity.pos), "spawn out of bounds at {}", entity.pos);
        debug_assert!(self.grid.is_empty(entity.pos), "spawn on occupied cell {}", entity.pos);
        let pos = entity.pos;
        let id = self.entities.insert(entity);
        self.grid.set(pos, Some(id));
        id
    }

    /// Place a block and count it toward the win condition.
    pub fn spawn_block(&mut self, entity: Entity) -> EntityId {
        debug_assert!(matches!(entity.kind, EntityKind::Block(_)));
        self.block_count += 1;
        self.spawn(entity)
    }

    /// Get an entity by handle.
    #[inline]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Get an entity mutably by handle.
    #[inline]
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Has the entity not been destroyed?
    #[inline]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Occupant of a cell.
    #[inline]
    pub fn occupant(&self, pos: GridVec2) -> Option<EntityId> {
        self.grid.get(pos)
    }

    /// Entity at a cell.
    pub fn entity_at(&self, pos: GridVec2) -> Option<&Entity> {
        self.occupant(pos).and_then(|id| self.entity(id))
    }

    /// Grid bookkeeping for a move, without firing `on_move`.
    ///
    /// The old cell is cleared only if it still holds this entity, so two
    /// relocations forming a swap never erase each other.
    pub fn relocate(&mut self, id: EntityId, to: GridVec2) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        let from = entity.pos;
        entity.pos = to;
        self.grid.clear_if(from, id);
        self.grid.set(to, Some(id));
    }

    /// Move an entity and fire its `on_move` hook.
    pub fn move_entity(&mut self, id: EntityId, to: GridVec2) {
        if !self.is_alive(id) {
            return;
        }
        self.relocate(id, to);
        entity::on_move(self, id);
    }

    /// Remove an entity and fire its `on_destroy` hook.
    ///
    /// Destroying a stale handle is a no-op, so cascades may revisit freely.
    pub fn destroy(&mut self, id: EntityId) {
        let Some(removed) = self.entities.remove(id) else {
            return;
        };
        self.grid.clear_if(removed.pos, id);
        entity::on_destroy(self, id, &removed);
    }

    /// Record the win on the tick the last block goes.
    pub fn record_win(&mut self) {
        if self.win_tick.is_some() {
            return;
        }
        self.win_tick = Some(self.tick);
        debug!(level = self.level_index, tick = self.tick, moves = self.moves, "level won");
        self.push_event(GameEvent::level_won(self.tick, self.level_index, self.moves));
    }

    /// Has the last block been destroyed?
    #[inline]
    pub fn is_won(&self) -> bool {
        self.win_tick.is_some()
    }

    /// Remove every entity without firing hooks.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.grid.clear_all();
        self.selection = None;
    }

    /// Grid/entity consistency: every live entity sits on exactly its own
    /// cell and every occupied cell holds a live entity.
    pub fn is_consistent(&self) -> bool {
        let entities_placed = self
            .entities
            .iter()
            .all(|(id, e)| self.grid.get(e.pos) == Some(id));
        let cells_live = self
            .grid
            .occupied()
            .all(|(pos, id)| self.entity(id).is_some_and(|e| e.pos == pos));
        entities_placed && cells_live && self.grid.occupied_count() == self.entities.len()
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.level_index, self.tick, |hasher| {
            hasher.update_u32(self.session_tick);
            hasher.update_u32(self.ticks_since_move);
            hasher.update_u32(self.block_count);
            hasher.update_u32(self.moves);
            hasher.update_opt_u32(self.win_tick);
            match self.selection {
                Some(pos) => {
                    hasher.update_u8(1);
                    hasher.update_vec2(pos);
                }
                None => hasher.update_u8(0),
            }

            // Row-major cell order is independent of arena slot reuse
            for (pos, id) in self.grid.occupied() {
                let Some(e) = self.entity(id) else {
                    continue;
                };
                hasher.update_vec2(pos);
                hasher.update_u8(e.tag() as u8);
                hasher.update_bool(e.has_gravity);
                hasher.update_u8(e.color().map_or(u8::MAX, |c| c.index()));
                hasher.update_u8(e.direction().map_or(u8::MAX, |d| d.index()));
                match &e.kind {
                    EntityKind::Block(b) => hasher.update_opt_u32(b.fade_start),
                    EntityKind::Mirror(m) => hasher.update_opt_u32(m.hit_start),
                    EntityKind::Beam(b) => hasher.update_u32(b.created),
                    EntityKind::Emitter(_) | EntityKind::Boulder(_) => {}
                }

                // Links by target cell; stale handles hash as absent
                if let Some(links) = e.links() {
                    for link in [links.child, links.hitting] {
                        match link.and_then(|target| self.entity(target)) {
                            Some(target) => {
                                hasher.update_u8(1);
                                hasher.update_vec2(target.pos);
                            }
                            None => hasher.update_u8(0),
                        }
                    }
                }
            }
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Push event data stamped with the current tick and level.
    pub fn emit_event(&mut self, data: GameEventData) {
        let event = GameEvent::new(self.tick, self.level_index, data);
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
