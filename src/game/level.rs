//! Level Data and Loading
//!
//! Levels are authored as rectangular arrays of integer cell codes, row-major
//! (`data[y][x]`, `y` growing downward). Each category of entity owns a
//! contiguous code range laid out as `base + color * 4 + direction`.
//!
//! Unknown codes decode as empty cells; only structural problems (wrong
//! dimensions, missing levels, unparseable JSON) are errors.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::vec2::{GridVec2, Direction};
use crate::game::config::SimConfig;
use crate::game::entity::{Color, Entity, EntityKind};
use crate::game::events::GameEventData;
use crate::game::state::LevelState;

// =============================================================================
// CELL CODES
// =============================================================================

/// Cell code layout.
pub mod codes {
    use crate::core::vec2::Direction;
    use crate::game::entity::Color;

    /// Empty cell
    pub const CLEAR: u32 = 0;
    /// First block code (red, green, blue)
    pub const BLOCK_BASE: u32 = 1;
    /// First emitter code
    pub const EMITTER_BASE: u32 = 4;
    /// First mirror code
    pub const MIRROR_BASE: u32 = 16;
    /// Reserved, decodes as empty
    pub const BOMB: u32 = 28;
    /// Reserved, decodes as empty
    pub const DOG: u32 = 29;
    /// Reserved, decodes as empty
    pub const SPLITTER: u32 = 30;
    /// Immovable boulder
    pub const BOULDER: u32 = 31;

    /// Code for a block of `color`.
    pub const fn block(color: Color) -> u32 {
        BLOCK_BASE + color as u32
    }

    /// Code for an emitter of `color` facing `dir`.
    pub const fn emitter(color: Color, dir: Direction) -> u32 {
        EMITTER_BASE + color as u32 * 4 + dir as u32
    }

    /// Code for a mirror of `color` facing `dir`.
    pub const fn mirror(color: Color, dir: Direction) -> u32 {
        MIRROR_BASE + color as u32 * 4 + dir as u32
    }
}

/// Split a directional code into (color, direction) relative to its base.
fn color_dir(offset: u32) -> Option<(Color, Direction)> {
    let color = Color::from_index(u8::try_from(offset / 4).ok()?)?;
    let dir = Direction::from_index(u8::try_from(offset % 4).ok()?)?;
    Some((color, dir))
}

/// Decode one cell. Unknown and reserved codes are empty.
pub fn decode_cell(code: u32, pos: GridVec2) -> Option<Entity> {
    use codes::*;

    match code {
        BLOCK_BASE..=3 => {
            let color = Color::from_index((code - BLOCK_BASE) as u8)?;
            Some(Entity::block(pos, color))
        }
        EMITTER_BASE..=15 => {
            let (color, dir) = color_dir(code - EMITTER_BASE)?;
            Some(Entity::emitter(pos, dir, color))
        }
        MIRROR_BASE..=27 => {
            let (color, dir) = color_dir(code - MIRROR_BASE)?;
            Some(Entity::mirror(pos, dir, color))
        }
        BOULDER => Some(Entity::boulder(pos)),
        _ => None,
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Level data errors.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// Width or height of zero.
    #[error("level has zero size ({width}x{height})")]
    ZeroSize {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
    },

    /// Number of rows disagrees with the declared height.
    #[error("expected {expected} rows, found {found}")]
    RowCount {
        /// Declared height
        expected: u32,
        /// Rows present
        found: usize,
    },

    /// A row's length disagrees with the declared width.
    #[error("row {row}: expected {expected} cells, found {found}")]
    RowWidth {
        /// Row index
        row: usize,
        /// Declared width
        expected: u32,
        /// Cells present
        found: usize,
    },

    /// Level index outside the pack.
    #[error("no level {index} (pack has {count})")]
    NoSuchLevel {
        /// Requested index
        index: u32,
        /// Levels in the pack
        count: usize,
    },

    /// A pack must contain at least one level.
    #[error("level pack is empty")]
    EmptyPack,

    /// JSON could not be parsed.
    #[error("invalid level pack JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// LEVEL DATA
// =============================================================================

/// One authored level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    /// Columns
    pub width: u32,
    /// Rows
    pub height: u32,
    /// Tutorial hint shown by the HUD
    #[serde(default)]
    pub status_text: String,
    /// Cell codes, `data[y][x]`
    pub data: Vec<Vec<u32>>,
}

impl LevelData {
    /// Check that the code array matches the declared size.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.width == 0 || self.height == 0 {
            return Err(LevelError::ZeroSize { width: self.width, height: self.height });
        }
        if self.data.len() != self.height as usize {
            return Err(LevelError::RowCount { expected: self.height, found: self.data.len() });
        }
        for (row, cells) in self.data.iter().enumerate() {
            if cells.len() != self.width as usize {
                return Err(LevelError::RowWidth { row, expected: self.width, found: cells.len() });
            }
        }
        Ok(())
    }

    /// Number of block codes in the level.
    pub fn block_total(&self) -> u32 {
        let blocks = codes::BLOCK_BASE..=3;
        self.data.iter().flatten().filter(|&&code| blocks.contains(&code)).count() as u32
    }
}

/// An ordered campaign of levels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPack {
    /// Levels in play order
    pub levels: Vec<LevelData>,
}

impl LevelPack {
    /// Build a pack, validating every level.
    pub fn new(levels: Vec<LevelData>) -> Result<Self, LevelError> {
        let pack = Self { levels };
        pack.validate()?;
        Ok(pack)
    }

    /// Parse and validate a JSON pack.
    pub fn from_json_str(json: &str) -> Result<Self, LevelError> {
        let pack: LevelPack = serde_json::from_str(json)?;
        pack.validate()?;
        Ok(pack)
    }

    /// Reject empty packs and malformed levels.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.levels.is_empty() {
            return Err(LevelError::EmptyPack);
        }
        self.levels.iter().try_for_each(LevelData::validate)
    }

    /// Number of levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True if the pack has no levels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level by index.
    pub fn level(&self, index: u32) -> Result<&LevelData, LevelError> {
        self.levels
            .get(index as usize)
            .ok_or(LevelError::NoSuchLevel { index, count: self.levels.len() })
    }

    /// Is `index` the final level?
    pub fn is_last(&self, index: u32) -> bool {
        index as usize + 1 >= self.levels.len()
    }

    /// The nine tutorial levels.
    pub fn builtin() -> Self {
        use codes::CLEAR as CLR;
        use Color::{Red, Green, Blue};
        use Direction::{Right, Up, Left, Down};

        const RBL: u32 = codes::block(Red);
        const GBL: u32 = codes::block(Green);
        const BBL: u32 = codes::block(Blue);
        const RER: u32 = codes::emitter(Red, Right);
        const REU: u32 = codes::emitter(Red, Up);
        const RED: u32 = codes::emitter(Red, Down);
        const GER: u32 = codes::emitter(Green, Right);
        const GEL: u32 = codes::emitter(Green, Left);
        const BER: u32 = codes::emitter(Blue, Right);
        const BEU: u32 = codes::emitter(Blue, Up);
        const BEL: u32 = codes::emitter(Blue, Left);
        const RMR: u32 = codes::mirror(Red, Right);
        const RMU: u32 = codes::mirror(Red, Up);
        const RML: u32 = codes::mirror(Red, Left);
        const GMU: u32 = codes::mirror(Green, Up);
        const GML: u32 = codes::mirror(Green, Left);
        const BMU: u32 = codes::mirror(Blue, Up);
        const BML: u32 = codes::mirror(Blue, Left);
        const BLD: u32 = codes::BOULDER;

        fn level(status_text: &str, data: [[u32; 6]; 6]) -> LevelData {
            LevelData {
                width: 6,
                height: 6,
                status_text: status_text.to_string(),
                data: data.iter().map(|row| row.to_vec()).collect(),
            }
        }

        let levels = vec![
            level("1. Destroy blocks with lasers to win.", [
                [CLR, CLR, CLR, GBL, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [GER, CLR, CLR, CLR, CLR, CLR],
            ]),
            level("2. Click two adjacent blocks to swap them.", [
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, BBL, BER, CLR, CLR],
            ]),
            level("3. Mirrors can redirect a laser.", [
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [RMU, CLR, CLR, CLR, REU, CLR],
                [RBL, CLR, CLR, CLR, RML, CLR],
            ]),
            level("4. Blocks must be hit by the correct color.", [
                [CLR, CLR, BBL, RBL, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, REU, BEU, CLR, CLR],
            ]),
            level("5. Mirrors can change the color of light.", [
                [CLR, CLR, BBL, RBL, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [GER, CLR, RMU, BMU, CLR, GEL],
            ]),
            level("6. If you mess up, you can restart with \u{21ba}.", [
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, RED],
                [BBL, CLR, CLR, RML, CLR, BML],
                [RBL, CLR, CLR, BBL, CLR, RBL],
            ]),
            level("7. Practice what you've learned so far.", [
                [CLR, CLR, GBL, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, RMU, RBL, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, BBL, BMU, CLR, CLR],
                [GER, CLR, CLR, CLR, CLR, CLR],
            ]),
            level("8. Be wary of gaps.", [
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, BBL, CLR, GBL, CLR, CLR],
                [CLR, GMU, GBL, BML, CLR, CLR],
                [CLR, GML, BBL, BMU, CLR, BEL],
            ]),
            level("9. Boulders cannot be moved or destroyed.", [
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, CLR, CLR],
                [CLR, CLR, CLR, CLR, RBL, CLR],
                [CLR, RER, CLR, CLR, BLD, CLR],
                [CLR, RMR, CLR, CLR, RBL, CLR],
            ]),
        ];

        Self { levels }
    }
}

impl Default for LevelPack {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// LOADING
// =============================================================================

/// Build a fresh level state from authored data.
pub fn load(index: u32, data: &LevelData, config: SimConfig) -> Result<LevelState, LevelError> {
    data.validate()?;

    let mut level = LevelState::new(index, data.width, data.height, config);
    level.status_text = data.status_text.clone();

    for (y, row) in data.data.iter().enumerate() {
        for (x, &code) in row.iter().enumerate() {
            let pos = GridVec2::new(x as i32, y as i32);
            let Some(entity) = decode_cell(code, pos) else {
                continue;
            };
            if matches!(entity.kind, EntityKind::Block(_)) {
                level.spawn_block(entity);
            } else {
                level.spawn(entity);
            }
        }
    }

    debug!(
        level = index,
        width = data.width,
        height = data.height,
        blocks = level.block_count,
        entities = level.entities.len(),
        "level loaded"
    );
    let blocks = level.block_count;
    level.emit_event(GameEventData::LevelLoaded { blocks });

    Ok(level)
}
