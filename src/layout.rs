//! # Layout
//!
//! A plain, serializable map produced by [`LayoutBuilder`]. Games with their
//! own map model implement [`MapBuilder`] themselves; the layout is what the
//! command line tool prints and what the tests inspect.

use crate::{Coord, DelveError, DelveResult, Grid, MapBuilder};
use serde::{Deserialize, Serialize};

/// A room as registered on a [`Layout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRoom {
    /// Room token from the generator options
    pub kind: String,
    pub corner1: Coord,
    pub corner2: Coord,
}

/// A finished level: the dig grid, the builder tokens and the rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub id: String,
    /// Token for wall cells
    pub wall: String,
    /// Token for dug cells outside rooms
    pub corridor: String,
    pub grid: Grid,
    pub rooms: Vec<LayoutRoom>,
}

impl Layout {
    /// ASCII picture of the level, `#` for wall and `.` for floor.
    pub fn to_ascii(&self) -> String {
        self.grid.to_ascii()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> DelveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Room containing `coord`, if any.
    pub fn room_at(&self, coord: Coord) -> Option<&LayoutRoom> {
        self.rooms.iter().find(|room| {
            coord.x >= room.corner1.x
                && coord.y >= room.corner1.y
                && coord.x <= room.corner2.x
                && coord.y <= room.corner2.y
        })
    }
}

/// Builds a [`Layout`] by copying the grid and recording each room.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutBuilder;

impl MapBuilder for LayoutBuilder {
    type Map = Layout;

    fn from_bitmap(
        &mut self,
        id: &str,
        grid: &Grid,
        wall: &str,
        corridor: &str,
    ) -> DelveResult<Layout> {
        Ok(Layout {
            id: id.to_string(),
            wall: wall.to_string(),
            corridor: corridor.to_string(),
            grid: grid.clone(),
            rooms: Vec::new(),
        })
    }

    fn add_room(
        &mut self,
        map: &mut Layout,
        room: &str,
        corner1: Coord,
        corner2: Coord,
    ) -> DelveResult<()> {
        if !map.grid.is_valid(corner1) || !map.grid.is_valid(corner2) {
            return Err(DelveError::Builder(format!(
                "room {} - {} is outside the {}x{} map",
                corner1,
                corner2,
                map.grid.width(),
                map.grid.height()
            )));
        }
        map.rooms.push(LayoutRoom {
            kind: room.to_string(),
            corner1,
            corner2,
        });
        Ok(())
    }
}
