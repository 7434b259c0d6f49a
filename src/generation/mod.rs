//! # Generation Module
//!
//! Dungeon layout generation: the shared dig bookkeeping and the three
//! strategies built on it.
//!
//! Every strategy implements [`Generator`]. A call to [`Generator::generate`]
//! creates a fresh [`Excavation`], fills it with rooms and corridors, checks it
//! and finally hands grid and rooms to a [`MapBuilder`].

pub mod arena;
pub mod base;
pub mod digger;
pub mod grid;
pub mod uniform;

pub use arena::*;
pub use base::*;
pub use digger::*;
pub use grid::*;
pub use uniform::*;

use crate::{config, Coord, DelveError, DelveResult, RandomSource, SeededSource, Side};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tokens naming what the builder should instantiate for walls, corridors and
/// rooms. Generators pass them through without looking at them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    pub wall: String,
    pub corridor: String,
    pub room: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            wall: "wall".to_string(),
            corridor: "corridor".to_string(),
            room: "room".to_string(),
        }
    }
}

/// Which strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// One room filling the whole interior
    Arena,
    /// Evenly scattered rooms joined afterwards
    Uniform,
    /// Rooms and corridors grown out of existing floor
    Digger,
}

/// Configuration for a generation run.
///
/// Everything has a default, so a JSON config only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Grid width in cells, border included
    pub width: u32,
    /// Grid height in cells, border included
    pub height: u32,
    /// Strategy to use
    pub generator: GeneratorKind,
    /// Builder tokens
    pub options: GeneratorOptions,
    /// Uniform strategy tunables
    pub uniform: UniformConfig,
    /// Digger strategy tunables
    pub digger: DiggerConfig,
}

impl GenerationConfig {
    /// Creates a default configuration with a fixed seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.seed, Some(42));
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            width: 40,
            height: 20,
            generator: GeneratorKind::Digger,
            options: GeneratorOptions::default(),
            uniform: UniformConfig {
                room_coverage: 0.1,
                ..UniformConfig::default()
            },
            digger: DiggerConfig {
                dug_fraction: 0.15,
                ..DiggerConfig::default()
            },
        }
    }

    /// Parses a JSON configuration.
    pub fn from_json_str(json: &str) -> DelveResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> DelveResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks the settings of the selected strategy against the grid size.
    pub fn validate(&self) -> DelveResult<()> {
        match self.generator {
            GeneratorKind::Arena => ArenaGenerator::check_size(self.width, self.height),
            GeneratorKind::Uniform => self.uniform.validate(self.width, self.height),
            GeneratorKind::Digger => self.digger.validate(self.width, self.height),
        }
    }

    /// Random source for this run.
    pub fn source(&self) -> SeededSource {
        match self.seed {
            Some(seed) => SeededSource::from_seed(seed),
            None => SeededSource::from_entropy(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            width: config::DEFAULT_WIDTH,
            height: config::DEFAULT_HEIGHT,
            generator: GeneratorKind::Digger,
            options: GeneratorOptions::default(),
            uniform: UniformConfig::default(),
            digger: DiggerConfig::default(),
        }
    }
}

/// Which sides of a room already have a connector leaving them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideUsage {
    used: [bool; 4],
}

impl SideUsage {
    pub fn is_used(&self, side: Side) -> bool {
        self.used[side.index()]
    }

    pub fn mark_used(&mut self, side: Side) {
        self.used[side.index()] = true;
    }

    /// At least one side is still free.
    pub fn has_unused(&self) -> bool {
        self.used.iter().any(|used| !used)
    }

    /// Number of sides carrying a connector.
    pub fn used_count(&self) -> usize {
        self.used.iter().filter(|used| **used).count()
    }
}

/// An axis-aligned rectangular room, corners inclusive.
///
/// # Examples
///
/// ```
/// use delve::{Coord, Room};
///
/// let room = Room::new(Coord::new(5, 5), Coord::new(8, 7));
/// assert_eq!(room.width(), 4);
/// assert_eq!(room.height(), 3);
/// assert!(room.contains(Coord::new(8, 7)));
/// assert!(!room.contains(Coord::new(9, 7)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Top-left corner
    pub corner1: Coord,
    /// Bottom-right corner
    pub corner2: Coord,
    /// Connector bookkeeping, only kept by the uniform strategy
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sides: Option<SideUsage>,
}

impl Room {
    /// Creates a room from any two opposite corners.
    pub fn new(a: Coord, b: Coord) -> Self {
        Self {
            corner1: a.min(b),
            corner2: a.max(b),
            sides: None,
        }
    }

    /// Creates a room that tracks connector usage per side.
    pub fn with_side_tracking(a: Coord, b: Coord) -> Self {
        Self {
            sides: Some(SideUsage::default()),
            ..Self::new(a, b)
        }
    }

    pub fn width(&self) -> u32 {
        (self.corner2.x - self.corner1.x + 1) as u32
    }

    pub fn height(&self) -> u32 {
        (self.corner2.y - self.corner1.y + 1) as u32
    }

    /// Number of floor cells in the room.
    pub fn area(&self) -> u32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Coord {
        Coord::new(
            (self.corner1.x + self.corner2.x) / 2,
            (self.corner1.y + self.corner2.y) / 2,
        )
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= self.corner1.x
            && coord.y >= self.corner1.y
            && coord.x <= self.corner2.x
            && coord.y <= self.corner2.y
    }

    /// Whether two rooms share at least one cell.
    pub fn overlaps(&self, other: &Room) -> bool {
        !(self.corner2.x < other.corner1.x
            || other.corner2.x < self.corner1.x
            || self.corner2.y < other.corner1.y
            || other.corner2.y < self.corner1.y)
    }

    /// Wall cells separating two rooms, summed over both axes. Zero when the
    /// rooms touch or overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Coord, Room};
    ///
    /// let a = Room::new(Coord::new(2, 2), Coord::new(4, 4));
    /// let b = Room::new(Coord::new(10, 7), Coord::new(12, 9));
    /// assert_eq!(a.gap(&b), 5 + 2);
    /// ```
    pub fn gap(&self, other: &Room) -> i32 {
        let gap_x = (other.corner1.x - self.corner2.x).max(self.corner1.x - other.corner2.x) - 1;
        let gap_y = (other.corner1.y - self.corner2.y).max(self.corner1.y - other.corner2.y) - 1;
        gap_x.max(0) + gap_y.max(0)
    }

    /// Corners of the room grown by `amount` cells on every side.
    pub fn padded(&self, amount: i32) -> (Coord, Coord) {
        let pad = Coord::new(amount, amount);
        (self.corner1 - pad, self.corner2 + pad)
    }

    /// The wall cells just outside one side, as an inclusive segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Coord, Room, Side};
    ///
    /// let room = Room::new(Coord::new(2, 2), Coord::new(4, 3));
    /// assert_eq!(room.side_cells(Side::North), (Coord::new(2, 1), Coord::new(4, 1)));
    /// assert_eq!(room.side_cells(Side::East), (Coord::new(5, 2), Coord::new(5, 3)));
    /// ```
    pub fn side_cells(&self, side: Side) -> (Coord, Coord) {
        let (c1, c2) = (self.corner1, self.corner2);
        match side {
            Side::North => (Coord::new(c1.x, c1.y - 1), Coord::new(c2.x, c1.y - 1)),
            Side::South => (Coord::new(c1.x, c2.y + 1), Coord::new(c2.x, c2.y + 1)),
            Side::West => (Coord::new(c1.x - 1, c1.y), Coord::new(c1.x - 1, c2.y)),
            Side::East => (Coord::new(c2.x + 1, c1.y), Coord::new(c2.x + 1, c2.y)),
        }
    }

    /// Every cell of the room, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let (c1, c2) = (self.corner1, self.corner2);
        (c1.y..=c2.y).flat_map(move |y| (c1.x..=c2.x).map(move |x| Coord::new(x, y)))
    }
}

/// External collaborator that turns a finished dig into a game map.
///
/// `from_bitmap` is called once, then `add_room` once per room in the order
/// rooms were dug.
pub trait MapBuilder {
    /// The map type produced.
    type Map;

    /// Builds a map from the dig grid, using the wall and corridor tokens.
    fn from_bitmap(
        &mut self,
        id: &str,
        grid: &Grid,
        wall: &str,
        corridor: &str,
    ) -> DelveResult<Self::Map>;

    /// Registers one room on the map being built.
    fn add_room(
        &mut self,
        map: &mut Self::Map,
        room: &str,
        corner1: Coord,
        corner2: Coord,
    ) -> DelveResult<()>;
}

/// Trait for layout generators.
///
/// Implementors only fill in [`Generator::excavate`]; checking and handing the
/// result to the builder is shared.
pub trait Generator {
    /// Digs a complete layout into a fresh excavation.
    fn excavate<R: RandomSource>(&self, rng: &mut R) -> DelveResult<Excavation>;

    /// Builder tokens used by [`Generator::generate`].
    fn options(&self) -> &GeneratorOptions;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;

    /// Validates that the dug layout meets the structural guarantees.
    fn validate(&self, excavation: &Excavation) -> DelveResult<()> {
        utils::validate_excavation(excavation)
    }

    /// Generates a level and materializes it through `builder`.
    fn generate<R: RandomSource, B: MapBuilder>(
        &self,
        id: &str,
        rng: &mut R,
        builder: &mut B,
    ) -> DelveResult<B::Map> {
        let excavation = self.excavate(rng)?;
        self.validate(&excavation)?;
        info!(
            "{} dug level '{}': {} rooms, {:.1}% floor",
            self.generator_type(),
            id,
            excavation.rooms().len(),
            excavation.dug_fraction() * 100.0
        );
        excavation.dig(id, self.options(), builder)
    }
}

/// Runs the strategy selected in `config`.
pub fn generate_with_kind<R: RandomSource, B: MapBuilder>(
    config: &GenerationConfig,
    id: &str,
    rng: &mut R,
    builder: &mut B,
) -> DelveResult<B::Map> {
    config.validate()?;
    let options = config.options.clone();
    match config.generator {
        GeneratorKind::Arena => {
            ArenaGenerator::new(config.width, config.height, options)?.generate(id, rng, builder)
        }
        GeneratorKind::Uniform => {
            let uniform = config.uniform.clone();
            UniformGenerator::with_config(config.width, config.height, options, uniform)?
                .generate(id, rng, builder)
        }
        GeneratorKind::Digger => {
            let digger = config.digger.clone();
            DiggerGenerator::with_config(config.width, config.height, options, digger)?
                .generate(id, rng, builder)
        }
    }
}

/// Utility functions shared by the generators.
pub mod utils {
    use super::*;
    use pathfinding::prelude::bfs_reach;

    /// Checks the structural guarantees every finished layout must meet:
    /// solid border, rooms inside the border, rooms disjoint, some floor.
    pub fn validate_excavation(excavation: &Excavation) -> DelveResult<()> {
        let grid = excavation.grid();

        if let Some(cell) = grid.border().find(|c| grid.is_floor(*c)) {
            return Err(DelveError::InvariantViolation(format!(
                "border cell {} was dug",
                cell
            )));
        }

        let lo = Coord::new(config::MARGIN, config::MARGIN);
        let hi = Coord::new(
            grid.width() as i32 - 1 - config::MARGIN,
            grid.height() as i32 - 1 - config::MARGIN,
        );
        let rooms = excavation.rooms();
        for (i, room) in rooms.iter().enumerate() {
            let inside = room.corner1.x >= lo.x
                && room.corner1.y >= lo.y
                && room.corner2.x <= hi.x
                && room.corner2.y <= hi.y;
            if !inside {
                return Err(DelveError::InvariantViolation(format!(
                    "room {} ({} - {}) leaves the interior",
                    i, room.corner1, room.corner2
                )));
            }
            if let Some(j) = rooms[..i].iter().position(|other| other.overlaps(room)) {
                return Err(DelveError::InvariantViolation(format!(
                    "rooms {} and {} overlap",
                    j, i
                )));
            }
        }

        if grid.floor_count() == 0 {
            return Err(DelveError::GenerationFailed(
                "Level has no floor tiles".to_string(),
            ));
        }

        Ok(())
    }

    /// Floor cells reachable from `start` by 4-directional floor steps.
    pub fn reachable_floor(grid: &Grid, start: Coord) -> Vec<Coord> {
        if !grid.is_floor(start) {
            return Vec::new();
        }
        bfs_reach(start, |c| {
            c.cardinal_neighbors()
                .into_iter()
                .filter(|n| grid.is_floor(*n))
                .collect::<Vec<_>>()
        })
        .collect()
    }

    /// Whether every floor cell can reach every other one. A grid without any
    /// floor counts as connected.
    pub fn floor_is_connected(grid: &Grid) -> bool {
        match grid.coords().find(|c| grid.is_floor(*c)) {
            Some(start) => reachable_floor(grid, start).len() == grid.floor_count(),
            None => true,
        }
    }
}
