//! # Dig Grid
//!
//! Binary wall/floor state for every cell of a level under construction.

use crate::Coord;
use serde::{Deserialize, Serialize};

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Solid rock, not yet dug
    Wall,
    /// Dug out, walkable
    Floor,
}

impl Cell {
    /// Character used by the ASCII renderer.
    pub fn glyph(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Floor => '.',
        }
    }
}

/// A width × height array of [`Cell`]s stored row by row.
///
/// # Examples
///
/// ```
/// use delve::{Cell, Coord, Grid};
///
/// let mut grid = Grid::new(4, 3);
/// assert!(grid.is_wall(Coord::new(1, 1)));
/// grid.set(Coord::new(1, 1), Cell::Floor);
/// assert!(grid.is_floor(Coord::new(1, 1)));
/// assert_eq!(grid.get(Coord::new(4, 0)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid filled with walls.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Wall; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether a coordinate lies inside the grid.
    pub fn is_valid(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width as i32 && coord.y < self.height as i32
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.is_valid(coord) {
            Some(coord.y as usize * self.width as usize + coord.x as usize)
        } else {
            None
        }
    }

    /// Cell at `coord`, `None` when out of bounds.
    pub fn get(&self, coord: Coord) -> Option<Cell> {
        self.index(coord).map(|i| self.cells[i])
    }

    /// Sets a cell. Out-of-bounds writes are ignored and reported as `false`.
    pub fn set(&mut self, coord: Coord, cell: Cell) -> bool {
        match self.index(coord) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// In bounds and floor.
    pub fn is_floor(&self, coord: Coord) -> bool {
        self.get(coord) == Some(Cell::Floor)
    }

    /// In bounds and wall.
    pub fn is_wall(&self, coord: Coord) -> bool {
        self.get(coord) == Some(Cell::Wall)
    }

    /// Resets every cell to `cell`.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.iter_mut().for_each(|c| *c = cell);
    }

    /// Number of floor cells.
    pub fn floor_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Floor).count()
    }

    /// Number of cells inside the one-cell border.
    pub fn interior_area(&self) -> usize {
        self.width.saturating_sub(2) as usize * self.height.saturating_sub(2) as usize
    }

    /// Every coordinate, row by row.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..h).flat_map(move |y| (0..w).map(move |x| Coord::new(x, y)))
    }

    /// Coordinates on the outermost ring.
    pub fn border(&self) -> impl Iterator<Item = Coord> + '_ {
        let (w, h) = (self.width as i32, self.height as i32);
        self.coords()
            .filter(move |c| c.x == 0 || c.y == 0 || c.x == w - 1 || c.y == h - 1)
    }

    /// Row-major cell slice.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Renders the grid with `#` for walls and `.` for floor, one line per row.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.cells.chunks(self.width.max(1) as usize) {
            out.extend(row.iter().map(|c| c.glyph()));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_solid() {
        let grid = Grid::new(5, 4);
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.floor_count(), 0);
        assert_eq!(grid.interior_area(), 6);
        assert!(grid.coords().all(|c| grid.is_wall(c)));
    }

    #[test]
    fn test_bounds() {
        let mut grid = Grid::new(3, 3);
        assert!(grid.is_valid(Coord::new(0, 0)));
        assert!(grid.is_valid(Coord::new(2, 2)));
        assert!(!grid.is_valid(Coord::new(3, 0)));
        assert!(!grid.is_valid(Coord::new(0, -1)));
        assert!(!grid.set(Coord::new(-1, 0), Cell::Floor));
        assert!(!grid.is_wall(Coord::new(5, 5)));
        assert!(!grid.is_floor(Coord::new(5, 5)));
    }

    #[test]
    fn test_border_ring() {
        let grid = Grid::new(4, 3);
        let border: Vec<_> = grid.border().collect();
        assert_eq!(border.len(), 10);
        assert!(!border.contains(&Coord::new(1, 1)));
    }

    #[test]
    fn test_ascii_rendering() {
        let mut grid = Grid::new(4, 3);
        grid.set(Coord::new(1, 1), Cell::Floor);
        grid.set(Coord::new(2, 1), Cell::Floor);
        assert_eq!(grid.to_ascii(), "####\n#..#\n####\n");

        grid.fill(Cell::Wall);
        assert_eq!(grid.floor_count(), 0);
    }
}
