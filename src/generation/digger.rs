//! # Digger Generation
//!
//! Grows a dungeon outward from a single starting room, the way a person
//! digging it would: pick a wall bordering existing floor, then try to build a
//! room or a corridor behind it. Corridor ends are queued as *forced* walls so
//! that every corridor is extended or capped before the dig stops.
//!
//! Based on the "Tyrant" dungeon-building algorithm.

use crate::{Coord, DelveError, DelveResult, Excavation, Generator, GeneratorOptions, RandomSource};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Structures the digger knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Room,
    Corridor,
}

impl FromStr for Feature {
    type Err = DelveError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "room" => Ok(Feature::Room),
            "corridor" => Ok(Feature::Corridor),
            other => Err(DelveError::UnknownFeature(other.to_string())),
        }
    }
}

/// Tunables for [`DiggerGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiggerConfig {
    /// Relative weights for picking the next feature, by feature name
    pub features: BTreeMap<String, u32>,
    /// Tries per selected wall before moving on
    pub feature_attempts: u32,
    /// Shortest corridor
    pub min_corridor_length: u32,
    /// Longest corridor; a wall needs at least this much run to the edge
    pub max_corridor_length: u32,
    /// Minimum room dimension
    pub min_room_size: u32,
    /// Maximum room width
    pub max_room_width: u32,
    /// Maximum room height
    pub max_room_height: u32,
    /// Keep digging until this fraction of the interior is floor
    pub dug_fraction: f64,
    /// Wall selections allowed before the dig is declared stuck
    pub max_wall_selections: u32,
}

impl Default for DiggerConfig {
    fn default() -> Self {
        Self {
            features: BTreeMap::from([("room".to_string(), 2), ("corridor".to_string(), 4)]),
            feature_attempts: 15,
            min_corridor_length: 2,
            max_corridor_length: 10,
            min_room_size: 3,
            max_room_width: 8,
            max_room_height: 5,
            dug_fraction: 0.2,
            max_wall_selections: 10_000,
        }
    }
}

impl DiggerConfig {
    /// Checks the tunables against a grid size.
    pub fn validate(&self, width: u32, height: u32) -> DelveResult<()> {
        let invalid = |message: String| Err(DelveError::InvalidConfig(message));

        if self.min_room_size < 3 {
            return invalid("min_room_size must be at least 3".to_string());
        }
        if self.max_room_width < self.min_room_size || self.max_room_height < self.min_room_size {
            return invalid("maximum room dimensions are below min_room_size".to_string());
        }
        if self.min_corridor_length == 0 || self.max_corridor_length < self.min_corridor_length {
            return invalid(format!(
                "corridor lengths {}..{} are not a valid range",
                self.min_corridor_length, self.max_corridor_length
            ));
        }
        let min_side = self.min_grid_side();
        if width < min_side || height < min_side {
            return invalid(format!(
                "{}x{} grid is below the {}x{} minimum for these room and corridor sizes",
                width, height, min_side, min_side
            ));
        }
        if !(0.0..1.0).contains(&self.dug_fraction) {
            return invalid("dug_fraction must be in [0, 1)".to_string());
        }
        if self.features.values().sum::<u32>() == 0 {
            return invalid("feature weights must not all be zero".to_string());
        }
        if self.feature_attempts == 0 || self.max_wall_selections == 0 {
            return invalid("attempt counts must be positive".to_string());
        }
        Ok(())
    }

    /// Smallest grid side the digger accepts. Any minimum room must leave
    /// space for a second one beside it, and when corridors are enabled a
    /// wall next to a minimum room must have a full corridor of run.
    pub fn min_grid_side(&self) -> u32 {
        let rooms = 3 * self.min_room_size + 3;
        if self.features.get("corridor").is_some_and(|weight| *weight > 0) {
            rooms.max(self.min_room_size + self.max_corridor_length + 2)
        } else {
            rooms
        }
    }
}

/// Everything one dig needs to remember: the excavation plus the two wall
/// queues.
#[derive(Debug, Clone, PartialEq)]
pub struct DiggerState {
    excavation: Excavation,
    free_walls: Vec<Coord>,
    forced_walls: Vec<Coord>,
}

impl DiggerState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            excavation: Excavation::new(width, height),
            free_walls: Vec::new(),
            forced_walls: Vec::new(),
        }
    }

    pub fn excavation(&self) -> &Excavation {
        &self.excavation
    }

    pub fn into_excavation(self) -> Excavation {
        self.excavation
    }

    /// Walls available for optional growth.
    pub fn free_walls(&self) -> &[Coord] {
        &self.free_walls
    }

    /// Walls that must be grown from before the dig may stop.
    pub fn forced_walls(&self) -> &[Coord] {
        &self.forced_walls
    }

    /// Direction to dig from `coord`: away from its single floor neighbour.
    ///
    /// `None` unless all four cardinal neighbours are in bounds and exactly
    /// one of them is floor.
    pub fn empty_direction(&self, coord: Coord) -> Option<Coord> {
        let mut empty = None;
        for neighbor in coord.cardinal_neighbors() {
            if !self.excavation.is_valid(neighbor) {
                return None;
            }
            if self.excavation.is_floor(neighbor) {
                if empty.is_some() {
                    return None;
                }
                empty = Some(neighbor);
            }
        }
        empty.map(|floor| coord - floor)
    }

    fn is_candidate(&self, coord: Coord) -> bool {
        self.excavation.is_wall(coord) && self.empty_direction(coord).is_some()
    }

    /// Queues a free wall, replacing any earlier entry for the same cell.
    pub fn add_free_wall(&mut self, coord: Coord) {
        self.remove_free_wall(coord);
        if self.is_candidate(coord) {
            self.free_walls.push(coord);
        }
    }

    pub fn add_forced_wall(&mut self, coord: Coord) {
        if self.is_candidate(coord) {
            self.forced_walls.push(coord);
        }
    }

    pub fn remove_free_wall(&mut self, coord: Coord) {
        if let Some(index) = self.free_walls.iter().position(|w| *w == coord) {
            self.free_walls.remove(index);
        }
    }

    /// Queues every usable cell on the ring just outside a rectangle.
    pub fn add_surrounding_walls(&mut self, corner1: Coord, corner2: Coord) {
        let (left, right) = (corner1.x - 1, corner2.x + 1);
        let (top, bottom) = (corner1.y - 1, corner2.y + 1);

        for x in left..=right {
            for y in top..=bottom {
                if x == left || x == right || y == top || y == bottom {
                    self.add_free_wall(Coord::new(x, y));
                }
            }
        }
    }

    /// Next wall to grow from. Forced walls are taken first and leave their
    /// queue; free walls stay queued.
    pub fn find_wall<R: RandomSource>(&mut self, rng: &mut R) -> DelveResult<Coord> {
        if !self.forced_walls.is_empty() {
            let index = rng.next_int(self.forced_walls.len());
            return Ok(self.forced_walls.remove(index));
        }
        match rng.pick(&self.free_walls) {
            Some(wall) => Ok(*wall),
            None => Err(DelveError::InvariantViolation(
                "no wall left to dig from".to_string(),
            )),
        }
    }
}

/// Organic room-and-corridor generator.
#[derive(Debug, Clone)]
pub struct DiggerGenerator {
    width: u32,
    height: u32,
    options: GeneratorOptions,
    config: DiggerConfig,
}

impl DiggerGenerator {
    /// Creates a generator with default tunables.
    pub fn new(width: u32, height: u32, options: GeneratorOptions) -> DelveResult<Self> {
        Self::with_config(width, height, options, DiggerConfig::default())
    }

    /// Creates a generator with explicit tunables.
    pub fn with_config(
        width: u32,
        height: u32,
        options: GeneratorOptions,
        config: DiggerConfig,
    ) -> DelveResult<Self> {
        config.validate(width, height)?;
        Ok(Self {
            width,
            height,
            options,
            config,
        })
    }

    pub fn config(&self) -> &DiggerConfig {
        &self.config
    }

    /// Runs the whole dig and returns the final state, queues included.
    pub fn dig_state<R: RandomSource>(&self, rng: &mut R) -> DelveResult<DiggerState> {
        let mut state = DiggerState::new(self.width, self.height);
        self.first_room(&mut state, rng);
        self.grow(&mut state, rng)?;
        Ok(state)
    }

    /// Builds features off queued walls until the dug fraction is reached and
    /// no forced wall is left. Runs at least one selection unless there is
    /// nothing to grow from.
    fn grow<R: RandomSource>(&self, state: &mut DiggerState, rng: &mut R) -> DelveResult<()> {
        let mut selections = 0;
        loop {
            selections += 1;
            if selections > self.config.max_wall_selections {
                warn!(
                    "digger stuck at {:.1}% floor after {} wall selections",
                    state.excavation.dug_fraction() * 100.0,
                    self.config.max_wall_selections
                );
                return Err(DelveError::GenerationFailed(format!(
                    "dig did not finish within {} wall selections",
                    self.config.max_wall_selections
                )));
            }

            if state.free_walls.is_empty() && state.forced_walls.is_empty() {
                if state.excavation.dug_fraction() >= self.config.dug_fraction {
                    break;
                }
                warn!(
                    "digger ran out of walls at {:.1}% floor",
                    state.excavation.dug_fraction() * 100.0
                );
                return Err(DelveError::GenerationFailed(
                    "no wall left to grow from before reaching the dug fraction".to_string(),
                ));
            }

            let wall = state.find_wall(rng)?;
            if state.empty_direction(wall).is_none() {
                // Later digging surrounded this wall with floor
                state.remove_free_wall(wall);
            } else {
                for _ in 0..self.config.feature_attempts {
                    let feature = self.choose_feature(rng)?;
                    if self.try_feature(state, wall, feature, rng) {
                        break;
                    }
                }
            }

            let dug = state.excavation.dug_fraction();
            if dug >= self.config.dug_fraction && state.forced_walls.is_empty() {
                break;
            }
        }

        debug!(
            "digger finished after {} wall selections: {} rooms, {:.1}% floor",
            selections,
            state.excavation.rooms().len(),
            state.excavation.dug_fraction() * 100.0
        );
        Ok(())
    }

    fn first_room<R: RandomSource>(&self, state: &mut DiggerState, rng: &mut R) {
        let min = self.config.min_room_size;
        let corner1 = state.excavation.generate_coords(rng, min);
        let dims = state.excavation.generate_size(
            rng,
            corner1,
            min,
            self.config.max_room_width,
            self.config.max_room_height,
        );
        let corner2 = corner1 + dims - Coord::new(1, 1);

        state.excavation.add_dug((dims.x * dims.y) as usize);
        state.excavation.dig_room(corner1, corner2);
        state.add_surrounding_walls(corner1, corner2);
    }

    /// Weighted pick over the feature table, in key order.
    fn choose_feature<R: RandomSource>(&self, rng: &mut R) -> DelveResult<Feature> {
        let total: u32 = self.config.features.values().sum();
        let roll = rng.next_int(total as usize) as u32;

        let mut sum = 0;
        for (name, weight) in &self.config.features {
            sum += weight;
            if roll < sum {
                return name.parse();
            }
        }
        Err(DelveError::InvariantViolation(format!(
            "feature roll {} exceeded total weight {}",
            roll, total
        )))
    }

    fn try_feature<R: RandomSource>(
        &self,
        state: &mut DiggerState,
        wall: Coord,
        feature: Feature,
        rng: &mut R,
    ) -> bool {
        let built = match feature {
            Feature::Room => self.feature_room(state, wall, rng),
            Feature::Corridor => self.feature_corridor(state, wall, rng),
        };
        if built {
            trace!("built {:?} from wall {}", feature, wall);
        }
        built
    }

    /// Room behind `wall`, entered through it. Leaves the state untouched on
    /// failure.
    fn feature_room<R: RandomSource>(
        &self,
        state: &mut DiggerState,
        wall: Coord,
        rng: &mut R,
    ) -> bool {
        let Some(direction) = state.empty_direction(wall) else {
            return false;
        };
        let normal = direction.rotate();

        let min = self.config.min_room_size;
        let width_span = (self.config.max_room_width - min + 1) as usize;
        let height_span = (self.config.max_room_height - min + 1) as usize;
        let width = (rng.next_int(width_span) as u32 + min) as i32;
        let height = (rng.next_int(height_span) as u32 + min) as i32;

        let near = wall + direction;
        let (corner1, corner2) = if direction.x != 0 {
            let (x1, x2) = if direction.x > 0 {
                (near.x, near.x + width - 1)
            } else {
                (near.x - width + 1, near.x)
            };
            // Keep the entrance off the room corners
            let shift = rng.next_int((height - 2) as usize) as i32 + 1;
            let y1 = near.y - shift;
            (Coord::new(x1, y1), Coord::new(x2, y1 + height - 1))
        } else {
            let (y1, y2) = if direction.y > 0 {
                (near.y, near.y + height - 1)
            } else {
                (near.y - height + 1, near.y)
            };
            let shift = rng.next_int((width - 2) as usize) as i32 + 1;
            let x1 = near.x - shift;
            (Coord::new(x1, y1), Coord::new(x1 + width - 1, y2))
        };

        let pad = Coord::new(1, 1);
        if !state.excavation.is_free_space(corner1 - pad, corner2 + pad) {
            return false;
        }

        state.excavation.add_dug(1 + (width * height) as usize);
        state.excavation.dig_cell(wall);
        state.excavation.dig_room(corner1, corner2);

        state.add_surrounding_walls(corner1, corner2);

        state.remove_free_wall(wall);
        state.remove_free_wall(wall + normal);
        state.remove_free_wall(wall - normal);
        true
    }

    /// Straight corridor starting at `wall`. Leaves the state untouched on
    /// failure.
    fn feature_corridor<R: RandomSource>(
        &self,
        state: &mut DiggerState,
        wall: Coord,
        rng: &mut R,
    ) -> bool {
        let Some(direction) = state.empty_direction(wall) else {
            return false;
        };
        let normal = direction.rotate();

        let mut avail = 0;
        let mut c = wall;
        while state.excavation.is_valid(c) {
            c = c + direction;
            avail += 1;
        }
        avail -= 1;

        let (min, max) = (
            self.config.min_corridor_length as i32,
            self.config.max_corridor_length as i32,
        );
        if avail < max {
            return false;
        }
        let length = (rng.next_int((max - min + 1) as usize) as i32 + min).min(avail);

        let start = wall;
        let end = start + direction * (length - 1);

        let ends = [start + normal, start - normal, end + normal, end - normal];
        let corner1 = ends.iter().fold(ends[0], |acc, c| acc.min(*c));
        let corner2 = ends.iter().fold(ends[0], |acc, c| acc.max(*c));
        if !state.excavation.is_free_space(corner1, corner2) {
            return false;
        }

        state.excavation.add_dug(length as usize);
        for step in 0..length {
            state.excavation.dig_cell(start + direction * step);
        }

        state.forced_walls.clear();
        state.add_forced_wall(end + direction);
        state.add_forced_wall(end + normal);
        state.add_forced_wall(end - normal);

        state.remove_free_wall(end);
        state.add_surrounding_walls(start.min(end), start.max(end));

        state.remove_free_wall(wall);
        state.remove_free_wall(wall + normal);
        state.remove_free_wall(wall - normal);
        true
    }
}

impl Generator for DiggerGenerator {
    fn excavate<R: RandomSource>(&self, rng: &mut R) -> DelveResult<Excavation> {
        self.dig_state(rng).map(DiggerState::into_excavation)
    }

    fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn generator_type(&self) -> &'static str {
        "DiggerGenerator"
    }

    fn validate(&self, excavation: &Excavation) -> DelveResult<()> {
        crate::generation::utils::validate_excavation(excavation)?;
        if !crate::generation::utils::floor_is_connected(excavation.grid()) {
            return Err(DelveError::InvariantViolation(
                "digger left unreachable floor".to_string(),
            ));
        }
        Ok(())
    }
}
