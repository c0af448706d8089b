//! # Collision Map
//!
//! The solid-tile grid for one map. Cells hold a small integer tag; zero
//! is passable and anything else is solid. Queries are rect-based: a
//! region is blocked if any tile it touches is solid. Space outside the
//! grid is passable, so maps do not need a border of wall tiles to keep
//! queries well-defined (edge walls are the map author's job).

use crate::game::Rect;

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell(pub u32);

impl Cell {
    pub fn is_solid(self) -> bool {
        self.0 != 0
    }

    /// The collision tag, or None for a passable cell.
    pub fn tile(self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0)
        }
    }
}

/// Row-major grid of collision cells with fixed tile dimensions.
#[derive(Debug, Clone)]
pub struct CollisionMap {
    cols: usize,
    rows: usize,
    tile_width: f32,
    tile_height: f32,
    cells: Vec<Cell>,
}

impl CollisionMap {
    /// Creates an all-passable grid.
    pub fn new(cols: usize, rows: usize, tile_width: f32, tile_height: f32) -> Self {
        Self {
            cols,
            rows,
            tile_width,
            tile_height,
            cells: vec![Cell::default(); cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> f32 {
        self.tile_height
    }

    /// Map size in pixels.
    pub fn pixel_size(&self) -> (f32, f32) {
        (
            self.cols as f32 * self.tile_width,
            self.rows as f32 * self.tile_height,
        )
    }

    /// The cell at the given grid position; passable outside the grid.
    pub fn get(&self, col: i64, row: i64) -> Cell {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return Cell::default();
        }
        self.cells[row as usize * self.cols + col as usize]
    }

    /// Sets the collision tag of one cell. Out-of-grid positions are
    /// ignored.
    pub fn set_solid(&mut self, col: usize, row: usize, tag: u32) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = Cell(tag);
        }
    }

    /// The grid cells a pixel region touches, as inclusive column and row
    /// ranges. Region boundaries are inclusive: a region whose edge lands
    /// exactly on a tile boundary touches the tile on both sides.
    fn cell_range(&self, region: &Rect) -> (i64, i64, i64, i64) {
        let col0 = (region.x / self.tile_width).floor() as i64;
        let col1 = (region.right() / self.tile_width).floor() as i64;
        let row0 = (region.y / self.tile_height).floor() as i64;
        let row1 = (region.bottom() / self.tile_height).floor() as i64;
        (col0, col1, row0, row1)
    }

    /// Pixel-space box of one grid cell.
    pub fn cell_rect(&self, col: i64, row: i64) -> Rect {
        Rect::new(
            col as f32 * self.tile_width,
            row as f32 * self.tile_height,
            self.tile_width,
            self.tile_height,
        )
    }

    /// The cells a pixel region touches, with their grid positions.
    pub fn get_in_region(&self, region: &Rect) -> Vec<(i64, i64, Cell)> {
        let (col0, col1, row0, row1) = self.cell_range(region);
        let mut cells = Vec::new();
        for row in row0..=row1 {
            for col in col0..=col1 {
                cells.push((col, row, self.get(col, row)));
            }
        }
        cells
    }

    /// Tests if any tile the region touches is solid.
    pub fn is_blocked(&self, region: &Rect) -> bool {
        let (col0, col1, row0, row1) = self.cell_range(region);
        for row in row0..=row1 {
            for col in col0..=col1 {
                if self.get(col, row).is_solid() {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with_wall() -> CollisionMap {
        let mut map = CollisionMap::new(10, 10, 24.0, 24.0);
        map.set_solid(4, 4, 1);
        map
    }

    #[test]
    fn test_open_region_is_passable() {
        let map = map_with_wall();
        assert!(!map.is_blocked(&Rect::new(0.0, 0.0, 24.0, 24.0)));
    }

    #[test]
    fn test_overlapping_solid_tile_blocks() {
        let map = map_with_wall();
        // Solid tile spans [96, 120) on both axes
        assert!(map.is_blocked(&Rect::new(100.0, 100.0, 24.0, 24.0)));
    }

    #[test]
    fn test_touching_boundary_blocks() {
        let map = map_with_wall();
        // Right edge lands exactly on x=96, the wall's left boundary
        assert!(map.is_blocked(&Rect::new(72.0, 96.0, 24.0, 24.0)));
        // One pixel short clears it
        assert!(!map.is_blocked(&Rect::new(71.0, 96.0, 24.0, 24.0)));
    }

    #[test]
    fn test_outside_grid_is_passable() {
        let map = map_with_wall();
        assert!(!map.is_blocked(&Rect::new(-100.0, -100.0, 24.0, 24.0)));
        assert!(!map.is_blocked(&Rect::new(1000.0, 1000.0, 24.0, 24.0)));
    }

    #[test]
    fn test_get_in_region_reports_cells_and_tiles() {
        let map = map_with_wall();
        let cells = map.get_in_region(&Rect::new(90.0, 100.0, 24.0, 10.0));
        // Columns 3..=4, rows 4..=4
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0], (3, 4, Cell(0)));
        assert_eq!(cells[1], (4, 4, Cell(1)));
        assert_eq!(cells[0].2.tile(), None);
        assert_eq!(cells[1].2.tile(), Some(1));
    }

    #[test]
    fn test_cell_rect() {
        let map = map_with_wall();
        assert_eq!(map.cell_rect(4, 4), Rect::new(96.0, 96.0, 24.0, 24.0));
    }

    #[test]
    fn test_set_solid_out_of_bounds_ignored() {
        let mut map = CollisionMap::new(2, 2, 24.0, 24.0);
        map.set_solid(5, 5, 1);
        assert!(!map.is_blocked(&Rect::new(0.0, 0.0, 200.0, 200.0)));
    }
}
