//! # Uniform Generation
//!
//! Scatters non-overlapping rooms over the grid until a coverage target is
//! met, then joins them with straight or single-bend corridors running between
//! facing walls.
//!
//! A layout is only accepted once every room is connected; otherwise the grid
//! is blanked and the whole thing starts over, up to a fixed number of times.

use crate::generation::utils;
use crate::{
    Coord, DelveError, DelveResult, Excavation, Generator, GeneratorOptions, RandomSource, Room,
    Side,
};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tunables for [`UniformGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformConfig {
    /// Placement tries for one room before room placement stops
    pub room_attempts: u32,
    /// Consecutive failed corridors before a layout is abandoned
    pub corridor_attempts: u32,
    /// Stop placing rooms once this fraction of the interior is floor
    pub room_coverage: f64,
    /// Minimum room dimension
    pub min_room_size: u32,
    /// Maximum room width
    pub max_room_width: u32,
    /// Maximum room height
    pub max_room_height: u32,
    /// Wall cells required around a room when placing it (at least 1)
    pub room_separation: u32,
    /// Whole layouts tried before giving up
    pub max_generation_attempts: u32,
}

impl Default for UniformConfig {
    fn default() -> Self {
        Self {
            room_attempts: 10,
            corridor_attempts: 50,
            room_coverage: 0.15,
            min_room_size: 3,
            max_room_width: 7,
            max_room_height: 5,
            room_separation: 1,
            max_generation_attempts: 100,
        }
    }
}

impl UniformConfig {
    /// Checks the tunables against a grid size.
    pub fn validate(&self, width: u32, height: u32) -> DelveResult<()> {
        let problem = if self.min_room_size == 0 {
            Some("min_room_size must be positive".to_string())
        } else if self.max_room_width < self.min_room_size
            || self.max_room_height < self.min_room_size
        {
            Some("maximum room dimensions are below min_room_size".to_string())
        } else if width < self.min_room_size + 4 || height < self.min_room_size + 4 {
            Some(format!(
                "{}x{} grid cannot hold a {} cell room",
                width, height, self.min_room_size
            ))
        } else if !(self.room_coverage > 0.0 && self.room_coverage <= 1.0) {
            Some("room_coverage must be in (0, 1]".to_string())
        } else if self.room_attempts == 0
            || self.corridor_attempts == 0
            || self.max_generation_attempts == 0
        {
            Some("attempt counts must be positive".to_string())
        } else {
            None
        };

        match problem {
            Some(message) => Err(DelveError::InvalidConfig(message)),
            None => Ok(()),
        }
    }
}

/// Room-scatter generator with post-hoc connection.
#[derive(Debug, Clone)]
pub struct UniformGenerator {
    width: u32,
    height: u32,
    options: GeneratorOptions,
    config: UniformConfig,
}

/// A planned corridor: every cell to dig, and the stretches between the two
/// doors that must be surrounded by solid wall.
#[derive(Debug, Clone, PartialEq)]
struct CorridorPlan {
    cells: Vec<Coord>,
    legs: Vec<(Coord, Coord)>,
}

/// Closest unconnected pairs considered when choosing the next corridor.
const NEAREST_PAIRS: usize = 3;

impl UniformGenerator {
    /// Creates a generator with default tunables.
    pub fn new(width: u32, height: u32, options: GeneratorOptions) -> DelveResult<Self> {
        Self::with_config(width, height, options, UniformConfig::default())
    }

    /// Creates a generator with explicit tunables.
    pub fn with_config(
        width: u32,
        height: u32,
        options: GeneratorOptions,
        config: UniformConfig,
    ) -> DelveResult<Self> {
        config.validate(width, height)?;
        Ok(Self {
            width,
            height,
            options,
            config,
        })
    }

    pub fn config(&self) -> &UniformConfig {
        &self.config
    }

    /// Places rooms until placement fails or coverage is reached.
    fn generate_rooms<R: RandomSource>(&self, excavation: &mut Excavation, rng: &mut R) {
        loop {
            let placed = self.generate_room(excavation, rng);
            if excavation.dug_fraction() > self.config.room_coverage || !placed {
                break;
            }
        }
        trace!("placed {} rooms", excavation.rooms().len());
    }

    /// Tries to place one room, giving up after `room_attempts` misses.
    fn generate_room<R: RandomSource>(&self, excavation: &mut Excavation, rng: &mut R) -> bool {
        let pad = self.config.room_separation.max(1) as i32;
        let pad = Coord::new(pad, pad);

        for _ in 0..self.config.room_attempts {
            let corner1 = excavation.generate_coords(rng, self.config.min_room_size);
            let dims = excavation.generate_size(
                rng,
                corner1,
                self.config.min_room_size,
                self.config.max_room_width,
                self.config.max_room_height,
            );
            let corner2 = corner1 + dims - Coord::new(1, 1);

            if excavation.is_free_space(corner1 - pad, corner2 + pad) {
                excavation.dig_tracked_room(corner1, corner2);
                excavation.add_dug((dims.x * dims.y) as usize);
                return true;
            }
        }
        false
    }

    /// Joins rooms until they form one group. Returns `false` when no
    /// connectable pair is left or too many corridors fail in a row.
    ///
    /// Digging only ever removes free space, so a pair that cannot be joined
    /// now never can be later in the same layout and is not tried again.
    fn generate_corridors<R: RandomSource>(
        &self,
        excavation: &mut Excavation,
        rng: &mut R,
    ) -> bool {
        let count = excavation.rooms().len();
        if count == 0 {
            return false;
        }

        let mut groups: Vec<usize> = (0..count).collect();
        let mut blocked = HashSet::new();
        let mut failures = 0;

        while groups.iter().any(|g| *g != groups[0]) {
            let pair = Self::find_room_pair(excavation.rooms(), &groups, &blocked, rng);
            let Some((i, j)) = pair else {
                trace!("no connectable room pair left");
                return false;
            };

            if self.try_corridor(excavation, i, j, rng) {
                failures = 0;
                let (keep, merge) = (groups[i], groups[j]);
                groups.iter_mut().filter(|g| **g == merge).for_each(|g| *g = keep);
            } else {
                blocked.insert((i, j));
                failures += 1;
                if failures >= self.config.corridor_attempts {
                    trace!("{} corridors failed in a row", failures);
                    return false;
                }
            }
        }
        true
    }

    /// Picks two rooms from different groups that both have a usable side
    /// facing the other. The choice is random among the few closest pairs.
    fn find_room_pair<R: RandomSource>(
        rooms: &[Room],
        groups: &[usize],
        blocked: &HashSet<(usize, usize)>,
        rng: &mut R,
    ) -> Option<(usize, usize)> {
        let mut candidates = Vec::new();
        for i in 0..rooms.len() {
            for j in (i + 1)..rooms.len() {
                if groups[i] == groups[j] || blocked.contains(&(i, j)) {
                    continue;
                }
                let (avail_i, avail_j) = eligible_sides(&rooms[i], &rooms[j]);
                if !avail_i.is_empty() && !avail_j.is_empty() {
                    candidates.push((rooms[i].gap(&rooms[j]), i, j));
                }
            }
        }
        if candidates.is_empty() {
            return None;
        }

        candidates.sort_unstable();
        let (_, i, j) = candidates[rng.next_int(candidates.len().min(NEAREST_PAIRS))];
        Some((i, j))
    }

    /// Attempts to dig a corridor between two rooms, trying every pairing of
    /// their eligible sides from a random starting point. On success both
    /// sides used are marked.
    fn try_corridor<R: RandomSource>(
        &self,
        excavation: &mut Excavation,
        i: usize,
        j: usize,
        rng: &mut R,
    ) -> bool {
        let (room_i, room_j) = (excavation.rooms()[i], excavation.rooms()[j]);
        let (avail_i, avail_j) = eligible_sides(&room_i, &room_j);
        let pairings: Vec<(Side, Side)> = avail_i
            .iter()
            .flat_map(|a| avail_j.iter().map(move |b| (*a, *b)))
            .collect();
        if pairings.is_empty() {
            return false;
        }

        let start = rng.next_int(pairings.len());
        for k in 0..pairings.len() {
            let (side_i, side_j) = pairings[(start + k) % pairings.len()];
            let Some(plan) = plan_corridor(excavation, &room_i, side_i, &room_j, side_j, rng) else {
                continue;
            };

            for cell in &plan.cells {
                excavation.dig_cell(*cell);
            }
            for (index, side) in [(i, side_i), (j, side_j)] {
                if let Some(sides) = excavation.rooms_mut()[index].sides.as_mut() {
                    sides.mark_used(side);
                }
            }
            trace!("corridor of {} cells joins rooms {} and {}", plan.cells.len(), i, j);
            return true;
        }
        false
    }
}

/// Sides of each room allowed to carry a connector towards the other.
///
/// The larger of the horizontal and vertical spans between the two rooms
/// picks a dominant axis; on that axis only the side facing the other room
/// qualifies, on the other axis any unused side does. When both spans are
/// equal both axes count as dominant.
fn eligible_sides(room1: &Room, room2: &Room) -> (Vec<Side>, Vec<Side>) {
    let (a1, a2, b1, b2) = (room1.corner1, room1.corner2, room2.corner1, room2.corner2);

    let w = (a1.x - b2.x).abs().max((a2.x - b1.x).abs());
    let h = (a1.y - b2.y).abs().max((a2.y - b1.y).abs());
    let total = w.max(h);

    let unused = |room: &Room, side: Side| room.sides.map_or(true, |s| !s.is_used(side));

    let mut avail1 = Vec::new();
    let mut avail2 = Vec::new();
    for side in Side::ALL {
        let (ok1, ok2) = match side {
            Side::West => (total != w || a1.x > b1.x, total != w || b1.x > a1.x),
            Side::East => (total != w || a2.x < b2.x, total != w || b2.x < a2.x),
            Side::North => (total != h || a1.y > b1.y, total != h || b1.y > a1.y),
            Side::South => (total != h || a2.y < b2.y, total != h || b2.y < a2.y),
        };
        if ok1 && unused(room1, side) {
            avail1.push(side);
        }
        if ok2 && unused(room2, side) {
            avail2.push(side);
        }
    }
    (avail1, avail2)
}

fn dot(a: Coord, b: Coord) -> i32 {
    a.x * b.x + a.y * b.y
}

/// Every cell of a straight inclusive segment.
fn segment_cells((lo, hi): (Coord, Coord)) -> Vec<Coord> {
    if lo.x == hi.x {
        (lo.y..=hi.y).map(|y| Coord::new(lo.x, y)).collect()
    } else {
        (lo.x..=hi.x).map(|x| Coord::new(x, lo.y)).collect()
    }
}

/// Finds door cells on both sides joined by a straight or single-bend path
/// that only touches solid wall. Door positions are scanned from a random
/// offset so repeated layouts vary. Returns `None` when no placement works.
fn plan_corridor<R: RandomSource>(
    excavation: &Excavation,
    room1: &Room,
    side1: Side,
    room2: &Room,
    side2: Side,
    rng: &mut R,
) -> Option<CorridorPlan> {
    if side1 == side2 {
        return None;
    }

    let doors1 = segment_cells(room1.side_cells(side1));
    let doors2 = segment_cells(room2.side_cells(side2));

    let door_pairs: Vec<(Coord, Coord)> = if side2 == side1.opposite() {
        // Doors must share a row or column
        doors1
            .iter()
            .flat_map(|d1| doors2.iter().map(move |d2| (*d1, *d2)))
            .filter(|(d1, d2)| {
                if side1.is_horizontal_wall() {
                    d1.x == d2.x
                } else {
                    d1.y == d2.y
                }
            })
            .collect()
    } else {
        doors1
            .iter()
            .flat_map(|d1| doors2.iter().map(move |d2| (*d1, *d2)))
            .collect()
    };
    if door_pairs.is_empty() {
        return None;
    }

    let start = rng.next_int(door_pairs.len());
    (0..door_pairs.len()).find_map(|k| {
        let (door1, door2) = door_pairs[(start + k) % door_pairs.len()];
        checked_path(excavation, door1, side1, door2, side2)
    })
}

/// The path between two fixed doors, if it fits the grid.
fn checked_path(
    excavation: &Excavation,
    door1: Coord,
    side1: Side,
    door2: Coord,
    side2: Side,
) -> Option<CorridorPlan> {
    let (w, h) = (excavation.width(), excavation.height());
    let inside = |c: Coord| c.x >= 1 && c.y >= 1 && c.x <= w - 2 && c.y <= h - 2;
    if ![door1, door2].iter().all(|d| inside(*d) && excavation.is_wall(*d)) {
        return None;
    }

    let plan = corridor_path(door1, side1.outward(), door2, side2.outward())?;
    let pad = Coord::new(1, 1);
    let clear = plan
        .legs
        .iter()
        .all(|&(start, end)| excavation.is_free_space(start.min(end) - pad, start.max(end) + pad));
    clear.then_some(plan)
}

/// Path leaving `door1` along `out1` and entering `door2` against `out2`.
///
/// Opposite directions give a straight run; perpendicular ones a single bend.
fn corridor_path(door1: Coord, out1: Coord, door2: Coord, out2: Coord) -> Option<CorridorPlan> {
    if out2 == -out1 {
        let offset = door2 - door1;
        let steps = dot(offset, out1);
        if steps < 0 || offset != out1 * steps {
            return None;
        }
        let cells = (0..=steps).map(|k| door1 + out1 * k).collect();
        let legs = if steps >= 2 {
            vec![(door1 + out1, door2 - out1)]
        } else {
            Vec::new()
        };
        return Some(CorridorPlan { cells, legs });
    }

    if dot(out1, out2) != 0 {
        return None;
    }

    let corner = if out1.x == 0 {
        Coord::new(door1.x, door2.y)
    } else {
        Coord::new(door2.x, door1.y)
    };
    let first = dot(corner - door1, out1);
    let second = dot(door2 - corner, -out2);
    if first < 1 || second < 1 {
        return None;
    }

    let mut cells: Vec<Coord> = (0..=first).map(|k| door1 + out1 * k).collect();
    cells.extend((1..=second).map(|k| corner - out2 * k));

    let mut legs = vec![(door1 + out1, corner)];
    if second >= 2 {
        legs.push((corner - out2, door2 + out2));
    }
    Some(CorridorPlan { cells, legs })
}

impl Generator for UniformGenerator {
    fn excavate<R: RandomSource>(&self, rng: &mut R) -> DelveResult<Excavation> {
        let mut excavation = Excavation::new(self.width, self.height);

        for attempt in 1..=self.config.max_generation_attempts {
            excavation.blank();
            self.generate_rooms(&mut excavation, rng);

            let joined = self.generate_corridors(&mut excavation, rng);
            if joined && utils::floor_is_connected(excavation.grid()) {
                debug!(
                    "uniform layout connected on attempt {} with {} rooms",
                    attempt,
                    excavation.rooms().len()
                );
                return Ok(excavation);
            }
            debug!(
                "uniform attempt {} left {} rooms unconnected, starting over",
                attempt,
                excavation.rooms().len()
            );
        }

        warn!(
            "uniform generation gave up after {} attempts",
            self.config.max_generation_attempts
        );
        Err(DelveError::GenerationFailed(format!(
            "could not connect all rooms in {} attempts",
            self.config.max_generation_attempts
        )))
    }

    fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn generator_type(&self) -> &'static str {
        "UniformGenerator"
    }
}
