use biolife_data::{Bounds, Species, Vec2};
use glam::UVec2;
use thiserror::Error;

/// Maximum number of ids a single grid cell holds.
pub const CELL_CAPACITY: usize = 20;
/// Maximum number of ids a 3x3 neighbourhood query can return.
pub const NEIGHBOR_CAPACITY: usize = CELL_CAPACITY * 9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("position ({x}, {y}) lies outside the grid")]
    OutOfRange { x: f32, y: f32 },

    #[error("grid needs at least one cell per axis, got {cols}x{rows}")]
    InvalidDimensions { cols: u32, rows: u32 },
}

/// Identity of an entity inside the grid.
///
/// Both pools share one signed id space: cells encode as `slot + 1`,
/// plants as `-(slot + 1)`. Zero never names an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    Cell(usize),
    Plant(usize),
}

impl EntityId {
    #[inline]
    #[must_use]
    pub fn encode(self) -> i32 {
        match self {
            Self::Cell(slot) => slot as i32 + 1,
            Self::Plant(slot) => -(slot as i32) - 1,
        }
    }

    #[inline]
    #[must_use]
    pub fn decode(raw: i32) -> Option<Self> {
        match raw {
            0 => None,
            r if r > 0 => Some(Self::Cell(r as usize - 1)),
            r => Some(Self::Plant(r.unsigned_abs() as usize - 1)),
        }
    }

    #[must_use]
    pub fn slot(self) -> usize {
        match self {
            Self::Cell(slot) | Self::Plant(slot) => slot,
        }
    }

    #[must_use]
    pub fn species(self) -> Species {
        match self {
            Self::Cell(_) => Species::Cell,
            Self::Plant(_) => Species::Plant,
        }
    }
}

/// Fixed-capacity bucket of encoded ids.
#[derive(Debug, Clone, Copy)]
pub struct CollisionCell {
    ids: [i32; CELL_CAPACITY],
    len: u8,
}

impl Default for CollisionCell {
    fn default() -> Self {
        Self {
            ids: [0; CELL_CAPACITY],
            len: 0,
        }
    }
}

impl CollisionCell {
    #[inline]
    fn push(&mut self, raw: i32) -> bool {
        let len = self.len as usize;
        if len == CELL_CAPACITY {
            return false;
        }
        self.ids[len] = raw;
        self.len += 1;
        true
    }

    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[i32] {
        &self.ids[..self.len as usize]
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Reusable output buffer for [`SpatialHashGrid::query`].
#[derive(Debug, Clone)]
pub struct NeighborBuffer {
    ids: [i32; NEIGHBOR_CAPACITY],
    len: usize,
}

impl Default for NeighborBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl NeighborBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: [0; NEIGHBOR_CAPACITY],
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    fn extend_from(&mut self, ids: &[i32]) {
        let take = ids.len().min(NEIGHBOR_CAPACITY - self.len);
        self.ids[self.len..self.len + take].copy_from_slice(&ids[..take]);
        self.len += take;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn raw(&self) -> &[i32] {
        &self.ids[..self.len]
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.raw().iter().filter_map(|&raw| EntityId::decode(raw))
    }
}

/// Uniform broad-phase grid, rebuilt from scratch every tick.
///
/// Every cell holds at most [`CELL_CAPACITY`] ids; inserting into a full
/// cell drops the id and bumps [`SpatialHashGrid::dropped_inserts`].
/// A 3x3 query around a point is complete for any interaction range that
/// does not exceed the cell width and height.
///
/// # Examples
/// ```
/// use biolife_core::spatial_hash::{EntityId, NeighborBuffer, SpatialHashGrid};
/// use biolife_data::{Bounds, Vec2};
/// use glam::UVec2;
///
/// let mut grid = SpatialHashGrid::new(Bounds::new(0.0, 0.0, 100.0, 100.0), UVec2::new(10, 10)).unwrap();
/// grid.insert(Vec2::new(15.0, 15.0), EntityId::Cell(0)).unwrap();
///
/// let mut nearby = NeighborBuffer::new();
/// grid.query(Vec2::new(22.0, 22.0), &mut nearby).unwrap();
/// assert_eq!(nearby.iter().next(), Some(EntityId::Cell(0)));
/// ```
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    bounds: Bounds,
    cols: usize,
    rows: usize,
    cell_dimensions: Vec2,
    inverse_cell_size: Vec2,
    cells: Vec<CollisionCell>,
    dropped_inserts: u64,
    dropped_since_clear: usize,
}

impl SpatialHashGrid {
    /// Builds a grid of `cell_count.x * cell_count.y` empty cells over `bounds`.
    pub fn new(bounds: Bounds, cell_count: UVec2) -> Result<Self, GridError> {
        if cell_count.x == 0 || cell_count.y == 0 || bounds.width <= 0.0 || bounds.height <= 0.0
        {
            return Err(GridError::InvalidDimensions {
                cols: cell_count.x,
                rows: cell_count.y,
            });
        }
        let cell_dimensions = bounds.size() / cell_count.as_vec2();
        Ok(Self {
            bounds,
            cols: cell_count.x as usize,
            rows: cell_count.y as usize,
            cell_dimensions,
            inverse_cell_size: Vec2::ONE / cell_dimensions,
            cells: vec![CollisionCell::default(); (cell_count.x * cell_count.y) as usize],
            dropped_inserts: 0,
            dropped_since_clear: 0,
        })
    }

    /// Largest cell count whose cells are at least `range` wide and tall.
    #[must_use]
    pub fn cell_count_for_range(bounds: &Bounds, range: f32) -> UVec2 {
        if range <= 0.0 || !range.is_finite() {
            return UVec2::ONE;
        }
        let fit = |extent: f32| ((extent / range).floor() as u32).max(1);
        UVec2::new(fit(bounds.width), fit(bounds.height))
    }

    /// Resets every cell's occupancy. Cost is proportional to the cell count.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.len = 0;
        }
        self.dropped_since_clear = 0;
    }

    #[inline]
    fn cell_coords(&self, position: Vec2) -> Option<(usize, usize)> {
        let rel = (position - self.bounds.origin()) * self.inverse_cell_size;
        if !rel.is_finite() || rel.x < 0.0 || rel.y < 0.0 {
            return None;
        }
        let cx = rel.x.floor() as usize;
        let cy = rel.y.floor() as usize;
        // A point exactly on the far edge belongs to the last cell.
        let cx = if cx == self.cols && position.x <= self.bounds.right() {
            self.cols - 1
        } else {
            cx
        };
        let cy = if cy == self.rows && position.y <= self.bounds.bottom() {
            self.rows - 1
        } else {
            cy
        };
        (cx < self.cols && cy < self.rows).then_some((cx, cy))
    }

    /// Flat index of the cell containing `position`.
    #[inline]
    #[must_use]
    pub fn cell_index(&self, position: Vec2) -> Option<usize> {
        self.cell_coords(position).map(|(cx, cy)| cy * self.cols + cx)
    }

    /// Adds `id` to the cell under `position`.
    ///
    /// Returns `Ok(false)` when the cell was full and the id was dropped.
    pub fn insert(&mut self, position: Vec2, id: EntityId) -> Result<bool, GridError> {
        let idx = self.cell_index(position).ok_or(GridError::OutOfRange {
            x: position.x,
            y: position.y,
        })?;
        if self.cells[idx].push(id.encode()) {
            Ok(true)
        } else {
            self.dropped_inserts += 1;
            self.dropped_since_clear += 1;
            tracing::trace!(cell = idx, ?id, "grid cell full, insertion dropped");
            Ok(false)
        }
    }

    /// Collects the ids stored in the 3x3 block of cells around `position`.
    ///
    /// Neighbour cells past the grid edge are skipped; a centre outside the
    /// grid is an error.
    pub fn query(&self, position: Vec2, out: &mut NeighborBuffer) -> Result<(), GridError> {
        out.clear();
        let (cx, cy) = self.cell_coords(position).ok_or(GridError::OutOfRange {
            x: position.x,
            y: position.y,
        })?;
        let x0 = cx.saturating_sub(1);
        let y0 = cy.saturating_sub(1);
        let x1 = (cx + 1).min(self.cols - 1);
        let y1 = (cy + 1).min(self.rows - 1);
        for y in y0..=y1 {
            let row = y * self.cols;
            for x in x0..=x1 {
                out.extend_from(self.cells[row + x].ids());
            }
        }
        Ok(())
    }

    /// Allocating convenience over [`SpatialHashGrid::query`].
    pub fn query_ids(&self, position: Vec2) -> Result<Vec<EntityId>, GridError> {
        let mut out = NeighborBuffer::new();
        self.query(position, &mut out)?;
        Ok(out.iter().collect())
    }

    #[must_use]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cell_dimensions(&self) -> Vec2 {
        self.cell_dimensions
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&CollisionCell> {
        self.cells.get(index)
    }

    /// Total insertions dropped because a cell was full, over the grid's lifetime.
    #[must_use]
    pub fn dropped_inserts(&self) -> u64 {
        self.dropped_inserts
    }

    /// Insertions dropped since the last [`SpatialHashGrid::clear`].
    #[must_use]
    pub fn dropped_since_clear(&self) -> usize {
        self.dropped_since_clear
    }
}
