//! # Excavation
//!
//! Per-call dig state shared by every strategy: the grid, the rooms dug so far
//! and how much floor has been opened. Strategies create one at the start of a
//! generation call and consume it with [`Excavation::dig`].

use crate::{Cell, Coord, DelveResult, GeneratorOptions, Grid, MapBuilder, RandomSource, Room};
use log::trace;

/// Grid and room bookkeeping for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Excavation {
    grid: Grid,
    rooms: Vec<Room>,
    dug: usize,
}

impl Excavation {
    /// Creates a solid grid with no rooms.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            grid: Grid::new(width, height),
            rooms: Vec::new(),
            dug: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub(crate) fn rooms_mut(&mut self) -> &mut [Room] {
        &mut self.rooms
    }

    pub fn width(&self) -> i32 {
        self.grid.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.grid.height() as i32
    }

    /// Resets the grid to solid wall and forgets all rooms.
    pub fn blank(&mut self) {
        self.grid.fill(Cell::Wall);
        self.rooms.clear();
        self.dug = 0;
    }

    pub fn is_valid(&self, coord: Coord) -> bool {
        self.grid.is_valid(coord)
    }

    pub fn is_floor(&self, coord: Coord) -> bool {
        self.grid.is_floor(coord)
    }

    pub fn is_wall(&self, coord: Coord) -> bool {
        self.grid.is_wall(coord)
    }

    /// Number of floor cells among the eight surrounding cells.
    pub fn free_neighbor_count(&self, center: Coord) -> usize {
        center.surrounding().filter(|c| self.grid.is_floor(*c)).count()
    }

    /// Marks a single cell as floor. The cell must be on the grid.
    pub fn dig_cell(&mut self, coord: Coord) {
        let dug = self.grid.set(coord, Cell::Floor);
        debug_assert!(dug, "dig at {} outside the {}x{} grid", coord, self.width(), self.height());
    }

    /// Marks the inclusive rectangle as floor and registers it as a room.
    /// Returns the new room's index.
    pub fn dig_room(&mut self, corner1: Coord, corner2: Coord) -> usize {
        self.push_room(Room::new(corner1, corner2))
    }

    /// Like [`Excavation::dig_room`] with per-side connector tracking.
    pub fn dig_tracked_room(&mut self, corner1: Coord, corner2: Coord) -> usize {
        self.push_room(Room::with_side_tracking(corner1, corner2))
    }

    fn push_room(&mut self, room: Room) -> usize {
        for cell in room.cells() {
            self.dig_cell(cell);
        }
        trace!("dug room {} - {}", room.corner1, room.corner2);
        self.rooms.push(room);
        self.rooms.len() - 1
    }

    /// Random top-left corner leaving space for a `min_size` room plus the
    /// border: `x` in `[1, width - min_size - 1]`, same for `y`.
    pub fn generate_coords<R: RandomSource>(&self, rng: &mut R, min_size: u32) -> Coord {
        let padding = 2 + min_size as i32 - 1;
        let span_x = (self.width() - padding).max(1) as usize;
        let span_y = (self.height() - padding).max(1) as usize;
        Coord::new(rng.next_int(span_x) as i32 + 1, rng.next_int(span_y) as i32 + 1)
    }

    /// Random room dimensions for a room whose top-left is `corner`, never
    /// reaching into the border and never above the given maxima.
    pub fn generate_size<R: RandomSource>(
        &self,
        rng: &mut R,
        corner: Coord,
        min_size: u32,
        max_width: u32,
        max_height: u32,
    ) -> Coord {
        let min = min_size as i32;
        let avail_x = (self.width() - corner.x - min).min(max_width as i32 - min + 1).max(1);
        let avail_y = (self.height() - corner.y - min).min(max_height as i32 - min + 1).max(1);
        Coord::new(
            rng.next_int(avail_x as usize) as i32 + min,
            rng.next_int(avail_y as usize) as i32 + min,
        )
    }

    /// True iff every cell of the inclusive rectangle is in bounds and wall.
    pub fn is_free_space(&self, corner1: Coord, corner2: Coord) -> bool {
        let (lo, hi) = (corner1.min(corner2), corner1.max(corner2));
        (lo.y..=hi.y).all(|y| (lo.x..=hi.x).all(|x| self.grid.is_wall(Coord::new(x, y))))
    }

    /// Cells inside the one-cell border.
    pub fn interior_area(&self) -> usize {
        self.grid.interior_area()
    }

    /// Floor cells counted by the strategy so far.
    pub fn dug(&self) -> usize {
        self.dug
    }

    pub fn add_dug(&mut self, cells: usize) {
        self.dug += cells;
    }

    /// Dug cells as a fraction of the interior.
    pub fn dug_fraction(&self) -> f64 {
        match self.interior_area() {
            0 => 0.0,
            area => self.dug as f64 / area as f64,
        }
    }

    /// Hands the finished dig to `builder`: the bitmap first, then each room
    /// in the order it was dug.
    pub fn dig<B: MapBuilder>(
        self,
        id: &str,
        options: &GeneratorOptions,
        builder: &mut B,
    ) -> DelveResult<B::Map> {
        let mut map = builder.from_bitmap(id, &self.grid, &options.wall, &options.corridor)?;
        for room in &self.rooms {
            builder.add_room(&mut map, &options.room, room.corner1, room.corner2)?;
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DelveError, ScriptedSource, SeededSource};

    /// Records builder calls in order.
    #[derive(Default)]
    struct RecordingBuilder {
        calls: Vec<String>,
    }

    impl MapBuilder for RecordingBuilder {
        type Map = Vec<String>;

        fn from_bitmap(
            &mut self,
            id: &str,
            grid: &Grid,
            wall: &str,
            corridor: &str,
        ) -> DelveResult<Self::Map> {
            let (w, h) = (grid.width(), grid.height());
            self.calls.push(format!("bitmap {} {}x{} {} {}", id, w, h, wall, corridor));
            Ok(Vec::new())
        }

        fn add_room(
            &mut self,
            map: &mut Self::Map,
            room: &str,
            corner1: Coord,
            corner2: Coord,
        ) -> DelveResult<()> {
            let call = format!("room {} {} {}", room, corner1, corner2);
            map.push(call.clone());
            self.calls.push(call);
            Ok(())
        }
    }

    #[test]
    fn test_dig_room_and_blank() {
        let mut ex = Excavation::new(10, 8);
        let index = ex.dig_room(Coord::new(2, 2), Coord::new(4, 3));
        assert_eq!(index, 0);
        assert_eq!(ex.grid().floor_count(), 6);
        assert!(ex.is_floor(Coord::new(4, 3)));
        assert!(ex.is_wall(Coord::new(5, 3)));
        ex.add_dug(6);
        assert_eq!(ex.dug(), 6);

        ex.blank();
        assert_eq!(ex.grid().floor_count(), 0);
        assert!(ex.rooms().is_empty());
        assert_eq!(ex.dug(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside the 6x6 grid")]
    fn test_dig_off_the_grid_panics_in_debug() {
        let mut ex = Excavation::new(6, 6);
        ex.dig_cell(Coord::new(6, 2));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside the 6x6 grid")]
    fn test_room_off_the_grid_panics_in_debug() {
        let mut ex = Excavation::new(6, 6);
        ex.dig_room(Coord::new(4, 4), Coord::new(6, 5));
    }

    #[test]
    fn test_free_neighbor_count() {
        let mut ex = Excavation::new(6, 6);
        ex.dig_room(Coord::new(1, 1), Coord::new(2, 2));
        assert_eq!(ex.free_neighbor_count(Coord::new(3, 3)), 1);
        assert_eq!(ex.free_neighbor_count(Coord::new(3, 2)), 2);
        assert_eq!(ex.free_neighbor_count(Coord::new(0, 0)), 1);
        assert_eq!(ex.free_neighbor_count(Coord::new(1, 1)), 3);
    }

    #[test]
    fn test_is_free_space() {
        let mut ex = Excavation::new(10, 10);
        assert!(ex.is_free_space(Coord::new(0, 0), Coord::new(9, 9)));
        assert!(!ex.is_free_space(Coord::new(-1, 0), Coord::new(3, 3)));
        assert!(!ex.is_free_space(Coord::new(5, 5), Coord::new(10, 6)));

        ex.dig_cell(Coord::new(4, 4));
        assert!(!ex.is_free_space(Coord::new(3, 3), Coord::new(5, 5)));
        assert!(ex.is_free_space(Coord::new(5, 5), Coord::new(7, 7)));
        // Corners may come in either order
        assert!(ex.is_free_space(Coord::new(7, 7), Coord::new(5, 5)));
    }

    #[test]
    fn test_generated_rooms_fit_inside_border() {
        let ex = Excavation::new(20, 12);
        let mut rng = SeededSource::from_seed(99);
        for _ in 0..500 {
            let corner = ex.generate_coords(&mut rng, 3);
            assert!(corner.x >= 1 && corner.y >= 1);
            let size = ex.generate_size(&mut rng, corner, 3, 7, 5);
            assert!(size.x >= 3 && size.x <= 7);
            assert!(size.y >= 3 && size.y <= 5);
            let corner2 = corner + size - Coord::new(1, 1);
            assert!(corner2.x <= 18 && corner2.y <= 10, "{} leaves the interior", corner2);
        }
    }

    #[test]
    fn test_generate_coords_extremes() {
        let ex = Excavation::new(10, 8);
        let mut low = ScriptedSource::constant(0.0);
        assert_eq!(ex.generate_coords(&mut low, 3), Coord::new(1, 1));
        let mut high = ScriptedSource::constant(0.999);
        assert_eq!(ex.generate_coords(&mut high, 3), Coord::new(6, 4));
        let corner = Coord::new(6, 4);
        assert_eq!(ex.generate_size(&mut high, corner, 3, 10, 10), Coord::new(3, 3));
    }

    #[test]
    fn test_dig_calls_builder_in_room_order() -> DelveResult<()> {
        let mut ex = Excavation::new(12, 8);
        ex.dig_room(Coord::new(6, 1), Coord::new(8, 3));
        ex.dig_room(Coord::new(1, 1), Coord::new(3, 3));

        let mut builder = RecordingBuilder::default();
        let map = ex.dig("depth-1", &GeneratorOptions::default(), &mut builder)?;

        assert_eq!(
            builder.calls,
            vec![
                "bitmap depth-1 12x8 wall corridor",
                "room room (6, 1) (8, 3)",
                "room room (1, 1) (3, 3)",
            ]
        );
        assert_eq!(map.len(), 2);
        Ok(())
    }

    #[test]
    fn test_builder_errors_propagate() {
        struct Refusing;
        impl MapBuilder for Refusing {
            type Map = ();
            fn from_bitmap(&mut self, _: &str, _: &Grid, _: &str, _: &str) -> DelveResult<()> {
                Err(DelveError::Builder("no".to_string()))
            }
            fn add_room(&mut self, _: &mut (), _: &str, _: Coord, _: Coord) -> DelveResult<()> {
                Ok(())
            }
        }

        let ex = Excavation::new(5, 5);
        let result = ex.dig("x", &GeneratorOptions::default(), &mut Refusing);
        assert!(matches!(result, Err(DelveError::Builder(_))));
    }
}
