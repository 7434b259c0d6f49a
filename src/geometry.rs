//! # Geometry
//!
//! Integer grid coordinates and the four cardinal sides of a rectangle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate on the dungeon grid.
///
/// # Examples
///
/// ```
/// use delve::Coord;
///
/// let c = Coord::new(3, 4) + Coord::new(1, -1);
/// assert_eq!(c, Coord::new(4, 3));
/// assert_eq!(-c, Coord::new(-4, -3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    /// Creates a new coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin (0, 0).
    pub const fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Rotates a direction vector by 90 degrees, giving its normal.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Coord;
    ///
    /// assert_eq!(Coord::new(0, 1).rotate(), Coord::new(1, 0));
    /// assert_eq!(Coord::new(1, 0).rotate(), Coord::new(0, -1));
    /// ```
    pub const fn rotate(self) -> Self {
        Self::new(self.y, -self.x)
    }

    /// Component-wise minimum.
    pub fn min(self, other: Coord) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Coord) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// The four cardinal neighbours in west, east, north, south order.
    pub fn cardinal_neighbors(self) -> [Coord; 4] {
        CARDINAL_DELTAS.map(|delta| self + delta)
    }

    /// All eight surrounding cells.
    pub fn surrounding(self) -> impl Iterator<Item = Coord> {
        (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| Coord::new(dx, dy)))
            .filter(|delta| *delta != Coord::origin())
            .map(move |delta| self + delta)
    }
}

/// Cardinal unit vectors in the order neighbours are inspected.
pub const CARDINAL_DELTAS: [Coord; 4] = [
    Coord::new(-1, 0),
    Coord::new(1, 0),
    Coord::new(0, -1),
    Coord::new(0, 1),
];

impl std::ops::Add for Coord {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Coord {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Neg for Coord {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl std::ops::Mul<i32> for Coord {
    type Output = Self;

    fn mul(self, factor: i32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One side of an axis-aligned room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    /// All sides, in the order used for side bookkeeping.
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    /// Unit vector pointing out of the room through this side.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Coord, Side};
    ///
    /// assert_eq!(Side::North.outward(), Coord::new(0, -1));
    /// assert_eq!(Side::East.outward(), Coord::new(1, 0));
    /// ```
    pub fn outward(self) -> Coord {
        match self {
            Side::North => Coord::new(0, -1),
            Side::East => Coord::new(1, 0),
            Side::South => Coord::new(0, 1),
            Side::West => Coord::new(-1, 0),
        }
    }

    /// The side facing the opposite way.
    pub fn opposite(self) -> Side {
        match self {
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
            Side::West => Side::East,
        }
    }

    /// Whether this side runs along the x axis (north and south walls).
    pub fn is_horizontal_wall(self) -> bool {
        matches!(self, Side::North | Side::South)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::North => 0,
            Side::East => 1,
            Side::South => 2,
            Side::West => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_arithmetic() {
        let a = Coord::new(2, 3);
        let b = Coord::new(-1, 5);
        assert_eq!(a + b, Coord::new(1, 8));
        assert_eq!(a - b, Coord::new(3, -2));
        assert_eq!(-a, Coord::new(-2, -3));
        assert_eq!(a * 3, Coord::new(6, 9));
        assert_eq!(a.min(b), Coord::new(-1, 3));
        assert_eq!(a.max(b), Coord::new(2, 5));
    }

    #[test]
    fn test_rotation_is_perpendicular() {
        for delta in CARDINAL_DELTAS {
            let normal = delta.rotate();
            assert_eq!(delta.x * normal.x + delta.y * normal.y, 0);
            assert_eq!(normal.rotate().rotate(), -normal);
        }
    }

    #[test]
    fn test_surrounding_has_eight_cells() {
        let center = Coord::new(5, 5);
        let cells: Vec<_> = center.surrounding().collect();
        assert_eq!(cells.len(), 8);
        assert!(!cells.contains(&center));
        assert!(cells.contains(&Coord::new(4, 4)));
        assert!(cells.contains(&Coord::new(6, 6)));
    }

    #[test]
    fn test_side_vectors() {
        for side in Side::ALL {
            assert_eq!(side.outward(), -side.opposite().outward());
            assert_eq!(Side::ALL[side.index()], side);
        }
        assert!(Side::North.is_horizontal_wall());
        assert!(!Side::West.is_horizontal_wall());
    }
}
