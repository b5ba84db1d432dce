//! Render View
//!
//! Read-only snapshot of a level for renderers and HUDs. Built on demand;
//! the simulation never depends on it.

use serde::{Serialize, Deserialize};

use crate::core::vec2::{GridVec2, Direction};
use crate::game::entity::{Color, EntityKind, EntityTag};
use crate::game::state::LevelState;

/// One entity as a renderer sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityView {
    /// Cell
    pub position: GridVec2,
    /// Kind of entity
    pub kind: EntityTag,
    /// Color, if the kind has one
    pub color: Option<Color>,
    /// Facing (0 right, 1 up, 2 left, 3 down), for glyph/rotation choice
    pub direction: Option<u8>,
    /// Ticks a struck block has been fading
    pub fade_ticks: Option<u32>,
    /// Whether a mirror is currently being struck
    pub hit: bool,
    /// Whether the entity falls under gravity
    pub has_gravity: bool,
}

/// Snapshot of a whole level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelView {
    /// Level index in its pack
    pub level: u32,
    /// Columns
    pub width: u32,
    /// Rows
    pub height: u32,
    /// HUD hint
    pub status_text: String,
    /// Ticks since load
    pub tick: u32,
    /// Swap anchor
    pub selection: Option<GridVec2>,
    /// Live blocks remaining
    pub block_count: u32,
    /// Successful swaps
    pub moves: u32,
    /// Last block destroyed
    pub won: bool,
    /// Live entities, row-major
    pub entities: Vec<EntityView>,
}

impl LevelState {
    /// Snapshot the level for rendering.
    pub fn view(&self) -> LevelView {
        let entities = self
            .grid
            .occupied()
            .filter_map(|(position, id)| {
                let e = self.entity(id)?;
                let (fade_ticks, hit) = match &e.kind {
                    EntityKind::Block(b) => (b.fade_elapsed(self.tick), false),
                    EntityKind::Mirror(m) => (None, m.hit_start.is_some()),
                    _ => (None, false),
                };
                Some(EntityView {
                    position,
                    kind: e.tag(),
                    color: e.color(),
                    direction: e.direction().map(Direction::index),
                    fade_ticks,
                    hit,
                    has_gravity: e.has_gravity,
                })
            })
            .collect();

        LevelView {
            level: self.level_index,
            width: self.grid.width(),
            height: self.grid.height(),
            status_text: self.status_text.clone(),
            tick: self.tick,
            selection: self.selection,
            block_count: self.block_count,
            moves: self.moves,
            won: self.is_won(),
            entities,
        }
    }
}

impl EntityView {
    /// Single-character glyph for text rendering.
    pub fn glyph(&self) -> char {
        let facing = self.direction.and_then(Direction::from_index);
        match self.kind {
            EntityTag::Block => {
                let c = match self.color {
                    Some(Color::Red) => 'R',
                    Some(Color::Green) => 'G',
                    Some(Color::Blue) => 'B',
                    None => '?',
                };
                if self.fade_ticks.is_some() { c.to_ascii_lowercase() } else { c }
            }
            EntityTag::Boulder => '#',
            EntityTag::Emitter => match facing {
                Some(Direction::Right) => '>',
                Some(Direction::Up) => '^',
                Some(Direction::Left) => '<',
                Some(Direction::Down) => 'v',
                None => '?',
            },
            EntityTag::Mirror => if self.hit { '@' } else { 'O' },
            EntityTag::Beam => match facing {
                Some(d) if d.is_horizontal() => '-',
                _ => '|',
            },
        }
    }
}

impl LevelView {
    /// Text rendering, one line per row. Fading blocks are lower case.
    pub fn to_ascii(&self) -> String {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut cells = vec![vec!['.'; w]; h];
        for e in &self.entities {
            let (x, y) = (e.position.x as usize, e.position.y as usize);
            if let Some(cell) = cells.get_mut(y).and_then(|row| row.get_mut(x)) {
                *cell = e.glyph();
            }
        }

        let mut out = String::with_capacity((w + 1) * h);
        for row in cells {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}
