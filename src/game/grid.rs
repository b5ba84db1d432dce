//! Occupancy Grid
//!
//! Fixed-size, row-major array of at most one entity handle per cell.
//! Pure bookkeeping: no hooks are fired from here.

use crate::core::vec2::GridVec2;
use crate::game::entity::EntityId;

/// Width x height array of optional entity handles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Option<EntityId>>,
}

impl Grid {
    /// Create an empty grid.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; (width as usize) * (height as usize)],
        }
    }

    /// Columns.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Rows.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Is the cell inside the grid?
    #[inline]
    pub fn in_bounds(&self, pos: GridVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    #[inline]
    fn index(&self, pos: GridVec2) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Occupant of a cell. Out-of-bounds cells read as empty.
    #[inline]
    pub fn get(&self, pos: GridVec2) -> Option<EntityId> {
        self.index(pos).and_then(|i| self.cells[i])
    }

    /// Write a cell. Out-of-bounds writes are ignored and return false.
    pub fn set(&mut self, pos: GridVec2, value: Option<EntityId>) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Empty a cell.
    #[inline]
    pub fn clear(&mut self, pos: GridVec2) {
        self.set(pos, None);
    }

    /// Empty a cell only if it still holds `id`.
    ///
    /// Returns true if the cell was cleared.
    pub fn clear_if(&mut self, pos: GridVec2, id: EntityId) -> bool {
        if self.get(pos) == Some(id) {
            self.clear(pos);
            true
        } else {
            false
        }
    }

    /// Empty every cell.
    pub fn clear_all(&mut self) {
        self.cells.fill(None);
    }

    /// No occupant. Out-of-bounds cells count as empty.
    #[inline]
    pub fn is_empty(&self, pos: GridVec2) -> bool {
        self.get(pos).is_none()
    }

    /// Longest straight run a beam can make (upper bound on chain length).
    pub fn max_run(&self) -> u32 {
        self.width.max(self.height)
    }

    /// All cell positions, row-major.
    pub fn positions(&self) -> impl Iterator<Item = GridVec2> {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..h).flat_map(move |y| (0..w).map(move |x| GridVec2::new(x, y)))
    }

    /// Occupied cells, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (GridVec2, EntityId)> + '_ {
        self.positions().filter_map(move |p| self.get(p).map(|id| (p, id)))
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
