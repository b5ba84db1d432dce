//! Integer Grid Vectors
//!
//! Cell coordinates and the four cardinal directions.
//! Row-major convention: `x` grows right, `y` grows downward.

use std::fmt;
use std::ops::{Add, Sub, Neg};
use serde::{Serialize, Deserialize};

/// 2D integer vector addressing a grid cell (or an offset between cells).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct GridVec2 {
    /// Column
    pub x: i32,
    /// Row (0 = top)
    pub y: i32,
}

impl GridVec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Add another vector.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
        }
    }

    /// Subtract another vector.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
        }
    }

    /// Step one cell in a direction.
    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        self.add(dir.offset())
    }

    /// Manhattan (taxicab) distance.
    #[inline]
    pub fn manhattan(self, other: Self) -> u32 {
        let d = self.sub(other);
        d.x.unsigned_abs() + d.y.unsigned_abs()
    }

    /// True when the two cells share an edge.
    #[inline]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }
}

impl Add for GridVec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        GridVec2::add(self, other)
    }
}

impl Sub for GridVec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        GridVec2::sub(self, other)
    }
}

impl Neg for GridVec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

impl fmt::Debug for GridVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for GridVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

/// Cardinal direction.
///
/// The discriminant is the direction index used by level codes and by
/// renderers choosing a glyph or rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// +X
    Right = 0,
    /// -Y (toward row 0)
    Up = 1,
    /// -X
    Left = 2,
    /// +Y (toward the bottom row)
    Down = 3,
}

impl Direction {
    /// All directions in index order.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];

    /// Unit offset for this direction.
    #[inline]
    pub const fn offset(self) -> GridVec2 {
        match self {
            Direction::Right => GridVec2::new(1, 0),
            Direction::Up => GridVec2::new(0, -1),
            Direction::Left => GridVec2::new(-1, 0),
            Direction::Down => GridVec2::new(0, 1),
        }
    }

    /// Direction index (0-3).
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Get direction from index (0-3).
    pub fn from_index(index: u8) -> Option<Direction> {
        Self::ALL.get(index as usize).copied()
    }

    /// True for Left/Right.
    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Right | Direction::Left)
    }
}
