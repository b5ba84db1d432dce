//! Grid Occupants
//!
//! Every cell holds at most one entity. Entities live in a generational
//! arena owned by `LevelState`; beam chains and "who am I hitting" links are
//! stored as `EntityId` handles, so destroying an entity simply makes its
//! handle stale.
//!
//! Behavior is dispatched through the [`Behavior`] trait, one implementation
//! per variant. Hooks receive the level and the entity's handle rather than
//! `&mut self`, since most of them need to touch neighbours as well.

use serde::{Serialize, Deserialize};
use slotmap::new_key_type;

use crate::core::vec2::{GridVec2, Direction};
use crate::game::state::LevelState;

new_key_type! {
    /// Stable handle for grid entities backed by a generational slot map.
    pub struct EntityId;
}

// =============================================================================
// COLOR
// =============================================================================

/// Light color (index into the renderer's palette).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    /// Palette slot 0
    Red = 0,
    /// Palette slot 1
    Green = 1,
    /// Palette slot 2
    Blue = 2,
}

impl Color {
    /// All colors in index order.
    pub const ALL: [Color; 3] = [Color::Red, Color::Green, Color::Blue];

    /// Palette index.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Get color from index.
    pub fn from_index(index: u8) -> Option<Color> {
        Self::ALL.get(index as usize).copied()
    }
}

// =============================================================================
// VARIANTS
// =============================================================================

/// Outgoing links of anything that emits light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BeamLinks {
    /// First segment of the outgoing beam
    pub child: Option<EntityId>,
    /// Occupant the beam is currently striking
    pub hitting: Option<EntityId>,
}

impl BeamLinks {
    /// Clear both links, returning what they held.
    pub fn take(&mut self) -> BeamLinks {
        std::mem::take(self)
    }
}

/// Destructible colored block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    /// Only beams of this color fade it
    pub color: Color,
    /// Tick the fade began (None = not fading)
    pub fade_start: Option<u32>,
}

/// Inert obstacle. Never swapped, never destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Boulder;

/// Fixed light source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Emitter {
    /// Firing direction
    pub dir: Direction,
    /// Beam color
    pub color: Color,
    /// Outgoing beam
    pub links: BeamLinks,
}

/// Re-emits incoming light in its own direction and color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mirror {
    /// Output direction
    pub dir: Direction,
    /// Output color
    pub color: Color,
    /// Tick a beam started striking this mirror (None = not hit)
    pub hit_start: Option<u32>,
    /// Outgoing beam
    pub links: BeamLinks,
}

/// One cell of an active beam.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Beam {
    /// Travel direction
    pub dir: Direction,
    /// Inherited from the source
    pub color: Color,
    /// Tick this segment was created
    pub created: u32,
    /// Next segment, or the occupant the tip is striking
    pub links: BeamLinks,
}

/// Variant payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    /// Colored block, the win target
    Block(Block),
    /// Immovable obstacle
    Boulder(Boulder),
    /// Light source
    Emitter(Emitter),
    /// Redirecting light source
    Mirror(Mirror),
    /// Beam segment
    Beam(Beam),
}

/// Fieldless discriminant of [`EntityKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntityTag {
    /// [`EntityKind::Block`]
    Block = 0,
    /// [`EntityKind::Boulder`]
    Boulder = 1,
    /// [`EntityKind::Emitter`]
    Emitter = 2,
    /// [`EntityKind::Mirror`]
    Mirror = 3,
    /// [`EntityKind::Beam`]
    Beam = 4,
}

// =============================================================================
// ENTITY
// =============================================================================

/// A grid occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entity {
    /// Current cell (always matches the grid)
    pub pos: GridVec2,
    /// Participates in the gravity pass
    pub has_gravity: bool,
    /// Variant payload
    pub kind: EntityKind,
}

impl Entity {
    /// Create a block.
    pub fn block(pos: GridVec2, color: Color) -> Self {
        Self {
            pos,
            has_gravity: true,
            kind: EntityKind::Block(Block { color, fade_start: None }),
        }
    }

    /// Create a boulder.
    pub fn boulder(pos: GridVec2) -> Self {
        Self {
            pos,
            has_gravity: true,
            kind: EntityKind::Boulder(Boulder),
        }
    }

    /// Create an emitter.
    pub fn emitter(pos: GridVec2, dir: Direction, color: Color) -> Self {
        Self {
            pos,
            has_gravity: true,
            kind: EntityKind::Emitter(Emitter { dir, color, links: BeamLinks::default() }),
        }
    }

    /// Create a mirror.
    pub fn mirror(pos: GridVec2, dir: Direction, color: Color) -> Self {
        Self {
            pos,
            has_gravity: true,
            kind: EntityKind::Mirror(Mirror {
                dir,
                color,
                hit_start: None,
                links: BeamLinks::default(),
            }),
        }
    }

    /// Create a beam segment. Beams never fall.
    pub fn beam(pos: GridVec2, dir: Direction, color: Color, created: u32) -> Self {
        Self {
            pos,
            has_gravity: false,
            kind: EntityKind::Beam(Beam { dir, color, created, links: BeamLinks::default() }),
        }
    }

    /// Variant discriminant.
    pub fn tag(&self) -> EntityTag {
        match self.kind {
            EntityKind::Block(_) => EntityTag::Block,
            EntityKind::Boulder(_) => EntityTag::Boulder,
            EntityKind::Emitter(_) => EntityTag::Emitter,
            EntityKind::Mirror(_) => EntityTag::Mirror,
            EntityKind::Beam(_) => EntityTag::Beam,
        }
    }

    /// Is this a beam segment?
    #[inline]
    pub fn is_beam(&self) -> bool {
        matches!(self.kind, EntityKind::Beam(_))
    }

    /// Color, for everything except boulders.
    pub fn color(&self) -> Option<Color> {
        match &self.kind {
            EntityKind::Block(b) => Some(b.color),
            EntityKind::Boulder(_) => None,
            EntityKind::Emitter(e) => Some(e.color),
            EntityKind::Mirror(m) => Some(m.color),
            EntityKind::Beam(b) => Some(b.color),
        }
    }

    /// Facing, for light sources and beams.
    pub fn direction(&self) -> Option<Direction> {
        match &self.kind {
            EntityKind::Emitter(e) => Some(e.dir),
            EntityKind::Mirror(m) => Some(m.dir),
            EntityKind::Beam(b) => Some(b.dir),
            EntityKind::Block(_) | EntityKind::Boulder(_) => None,
        }
    }

    /// Outgoing beam links, for anything that emits.
    pub fn links(&self) -> Option<BeamLinks> {
        match &self.kind {
            EntityKind::Emitter(e) => Some(e.links),
            EntityKind::Mirror(m) => Some(m.links),
            EntityKind::Beam(b) => Some(b.links),
            EntityKind::Block(_) | EntityKind::Boulder(_) => None,
        }
    }

    /// Mutable outgoing beam links.
    pub fn links_mut(&mut self) -> Option<&mut BeamLinks> {
        match &mut self.kind {
            EntityKind::Emitter(e) => Some(&mut e.links),
            EntityKind::Mirror(m) => Some(&mut m.links),
            EntityKind::Beam(b) => Some(&mut b.links),
            EntityKind::Block(_) | EntityKind::Boulder(_) => None,
        }
    }

    /// Whether the player may swap this entity right now.
    pub fn swappable(&self) -> bool {
        match &self.kind {
            EntityKind::Block(b) => b.swappable(),
            EntityKind::Boulder(b) => b.swappable(),
            EntityKind::Emitter(e) => e.swappable(),
            EntityKind::Mirror(m) => m.swappable(),
            EntityKind::Beam(b) => b.swappable(),
        }
    }
}

// =============================================================================
// BEHAVIOR
// =============================================================================

/// Per-variant hooks.
///
/// Defaults are no-ops; `swappable` defaults to true.
pub trait Behavior {
    /// May the player swap this entity right now?
    fn swappable(&self) -> bool {
        true
    }

    /// Called once per simulation tick while the entity is on the grid.
    fn tick(_level: &mut LevelState, _id: EntityId) {}

    /// A light source `by` started (or keeps) striking this entity.
    fn on_hit(_level: &mut LevelState, _id: EntityId, _by: EntityId) {}

    /// The beam from `by` stopped striking this entity.
    fn on_hit_end(_level: &mut LevelState, _id: EntityId, _by: EntityId) {}

    /// Entity was relocated (swap or gravity).
    fn on_move(_level: &mut LevelState, _id: EntityId) {}

    /// Entity was removed from the arena. `removed` is its final state.
    fn on_destroy(_level: &mut LevelState, _id: EntityId, _removed: &Entity) {}
}

/// Dispatch `tick` by variant.
pub fn tick(level: &mut LevelState, id: EntityId) {
    let Some(tag) = level.entity(id).map(Entity::tag) else {
        return;
    };
    match tag {
        EntityTag::Block => Block::tick(level, id),
        EntityTag::Boulder => Boulder::tick(level, id),
        EntityTag::Emitter => Emitter::tick(level, id),
        EntityTag::Mirror => Mirror::tick(level, id),
        EntityTag::Beam => Beam::tick(level, id),
    }
}

/// Dispatch `on_hit` by variant.
pub fn on_hit(level: &mut LevelState, id: EntityId, by: EntityId) {
    let Some(tag) = level.entity(id).map(Entity::tag) else {
        return;
    };
    match tag {
        EntityTag::Block => Block::on_hit(level, id, by),
        EntityTag::Boulder => Boulder::on_hit(level, id, by),
        EntityTag::Emitter => Emitter::on_hit(level, id, by),
        EntityTag::Mirror => Mirror::on_hit(level, id, by),
        EntityTag::Beam => Beam::on_hit(level, id, by),
    }
}

/// Dispatch `on_hit_end` by variant. Stale handles are ignored.
pub fn on_hit_end(level: &mut LevelState, id: EntityId, by: EntityId) {
    let Some(tag) = level.entity(id).map(Entity::tag) else {
        return;
    };
    match tag {
        EntityTag::Block => Block::on_hit_end(level, id, by),
        EntityTag::Boulder => Boulder::on_hit_end(level, id, by),
        EntityTag::Emitter => Emitter::on_hit_end(level, id, by),
        EntityTag::Mirror => Mirror::on_hit_end(level, id, by),
        EntityTag::Beam => Beam::on_hit_end(level, id, by),
    }
}

/// Dispatch `on_move` by variant.
pub fn on_move(level: &mut LevelState, id: EntityId) {
    let Some(tag) = level.entity(id).map(Entity::tag) else {
        return;
    };
    match tag {
        EntityTag::Block => Block::on_move(level, id),
        EntityTag::Boulder => Boulder::on_move(level, id),
        EntityTag::Emitter => Emitter::on_move(level, id),
        EntityTag::Mirror => Mirror::on_move(level, id),
        EntityTag::Beam => Beam::on_move(level, id),
    }
}

/// Dispatch `on_destroy` by variant.
pub fn on_destroy(level: &mut LevelState, id: EntityId, removed: &Entity) {
    match removed.tag() {
        EntityTag::Block => Block::on_destroy(level, id, removed),
        EntityTag::Boulder => Boulder::on_destroy(level, id, removed),
        EntityTag::Emitter => Emitter::on_destroy(level, id, removed),
        EntityTag::Mirror => Mirror::on_destroy(level, id, removed),
        EntityTag::Beam => Beam::on_destroy(level, id, removed),
    }
}
