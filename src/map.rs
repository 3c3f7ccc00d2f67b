//! The layout solver.
//!
//! A `DungeonMap` walks a fixed sequence of modes. Each tick dispatches to the
//! handler registered for the current mode in [`MODE_TABLE`]; a handler either
//! stays put or asks to advance to the table's next mode.
//!
//! Ready: rooms sit stacked at the map center until [`DungeonMap::setup`]
//! nudges them apart. Colliding: the physics space runs until total room
//! speed drops under the threshold (or the tick cap is hit). Adjusting:
//! rooms snap to `snap_grid` if one is configured. Culling passes straight
//! through. Neighbors: room centers are triangulated into an adjacency graph.
//! Done: nothing changes any more.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::error::{LayoutError, TriangulationError};
use crate::neighbors::NeighborGraph;
use crate::nudge::NudgeCycle;
use crate::physics::Space;
use crate::room::{Room, Wall};

/// Solver stage. Ordered; only moves forward except on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mode {
    Ready,
    Colliding,
    Adjusting,
    Culling,
    Neighbors,
    Done,
}

impl Mode {
    /// The mode that follows this one; Done follows itself.
    pub fn next(self) -> Mode {
        MODE_TABLE[self as usize].next
    }
}

/// What a handler wants after doing its work for the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Advance,
}

type Handler = fn(&mut DungeonMap) -> Result<Transition, LayoutError>;

pub struct ModeEntry {
    pub mode: Mode,
    handler: Option<Handler>,
    pub next: Mode,
}

/// Handler and successor for every mode, indexed by `Mode as usize`.
pub const MODE_TABLE: [ModeEntry; 6] = [
    ModeEntry {
        mode: Mode::Ready,
        handler: None,
        next: Mode::Colliding,
    },
    ModeEntry {
        mode: Mode::Colliding,
        handler: Some(DungeonMap::update_colliding),
        next: Mode::Adjusting,
    },
    ModeEntry {
        mode: Mode::Adjusting,
        handler: Some(DungeonMap::update_adjusting),
        next: Mode::Culling,
    },
    ModeEntry {
        mode: Mode::Culling,
        handler: Some(DungeonMap::update_culling),
        next: Mode::Neighbors,
    },
    ModeEntry {
        mode: Mode::Neighbors,
        handler: Some(DungeonMap::update_neighbors),
        next: Mode::Done,
    },
    ModeEntry {
        mode: Mode::Done,
        handler: Some(DungeonMap::update_done),
        next: Mode::Done,
    },
];

/// Rooms, walls, the physics space and the solver state.
pub struct DungeonMap {
    config: LayoutConfig,
    space: Space,
    walls: Vec<Wall>,
    rooms: Vec<Room>,
    mode: Mode,
    nudge: NudgeCycle,
    graph: NeighborGraph,
    colliding_ticks: u32,
    energy: f32,
}

impl DungeonMap {
    /// Build the walls and `config.rooms` random rooms stacked at the center.
    pub fn new(config: &LayoutConfig, rng: &mut impl Rng) -> Result<Self, LayoutError> {
        let catalog = config.catalog()?;
        let mut space = config.space();
        let walls = Wall::bounds(&mut space, config.width, config.height)?;

        let center = center_of(config.width, config.height);
        let mut rooms = Vec::with_capacity(config.rooms as usize);
        for _ in 0..config.rooms {
            rooms.push(catalog.random_room(rng, &mut space, center)?);
        }

        Ok(Self {
            config: config.clone(),
            space,
            walls,
            rooms,
            mode: Mode::Ready,
            nudge: NudgeCycle::new(config.width, config.height),
            graph: NeighborGraph::empty(config.rooms as usize),
            colliding_ticks: 0,
            energy: 0.0,
        })
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn center(&self) -> Vec2 {
        center_of(self.config.width, self.config.height)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    /// Triangles over room indices; empty until the Neighbors stage has run.
    pub fn triangles(&self) -> &[[usize; 3]] {
        if self.mode < Mode::Neighbors {
            return &[];
        }
        &self.graph.triangles
    }

    /// Ticks spent in Colliding since the last reset.
    pub fn colliding_ticks(&self) -> u32 {
        self.colliding_ticks
    }

    /// Total room speed measured by the last Colliding tick.
    pub fn kinetic_energy(&self) -> f32 {
        self.energy
    }

    /// Teleport a room, e.g. to place it by hand before triangulation.
    pub fn set_room_position(&mut self, index: usize, position: Vec2) -> Result<(), LayoutError> {
        let rooms = self.rooms.len();
        let room = self
            .rooms
            .get_mut(index)
            .ok_or(LayoutError::UnknownRoom { index, rooms })?;
        self.space.set_position(room.body, position)?;
        room.position = position;
        Ok(())
    }

    /// Give every room its first nudge and start colliding.
    pub fn setup(&mut self) -> Result<(), LayoutError> {
        if self.mode != Mode::Ready {
            return Err(LayoutError::NotReady(self.mode));
        }
        info!(rooms = self.rooms.len(), "setting up map");

        for room in &self.rooms {
            let force = self.nudge.next_nudge();
            self.space.apply_impulse(room.body, force, room.position)?;
            debug!("{room} nudged by {force}");
        }
        self.advance();
        Ok(())
    }

    /// Move to the next mode. A no-op once Done.
    pub fn advance(&mut self) -> Mode {
        let next = self.mode.next();
        if next != self.mode {
            info!("advancing map mode from {:?} to {:?}", self.mode, next);
        }
        self.mode = next;
        next
    }

    /// Run one tick of the current mode's handler.
    pub fn update(&mut self) -> Result<(), LayoutError> {
        puffin::profile_function!();

        let handler = MODE_TABLE[self.mode as usize]
            .handler
            .ok_or(LayoutError::UnhandledMode(self.mode))?;
        if handler(self)? == Transition::Advance {
            self.advance();
        }
        Ok(())
    }

    /// Put every room back at the center, at rest, and return to Ready.
    /// Room sizes are kept.
    pub fn reset(&mut self) -> Result<(), LayoutError> {
        info!("resetting map");
        let center = self.center();
        for room in &mut self.rooms {
            self.space.set_position(room.body, center)?;
            self.space.set_velocity(room.body, Vec2::ZERO)?;
            self.space.reindex(room.body)?;
            room.position = center;
            room.touching = 0;
            room.neighbors.clear();
        }
        self.nudge.restart();
        self.graph = NeighborGraph::empty(self.rooms.len());
        self.space.reset_clock();
        self.colliding_ticks = 0;
        self.energy = 0.0;
        self.mode = Mode::Ready;
        Ok(())
    }

    fn update_colliding(&mut self) -> Result<Transition, LayoutError> {
        for _ in 0..self.config.steps_per_tick {
            self.space.step(self.config.step_dt);
        }
        self.colliding_ticks += 1;
        self.sync_rooms()?;

        let touching = count_touching(&self.rooms);
        for (room, touching) in self.rooms.iter_mut().zip(touching) {
            room.touching = touching;
            if touching > 0 {
                let force = self.nudge.next_half_nudge();
                self.space.apply_impulse(room.body, force, room.position)?;
            }
        }
        // Rooms are the only dynamic bodies
        let energy = self.space.kinetic_energy();
        self.energy = energy;

        if energy < self.config.energy_threshold {
            info!(ticks = self.colliding_ticks, energy, "rooms settled");
            return Ok(Transition::Advance);
        }
        if self.colliding_ticks >= self.config.max_colliding_ticks {
            let still_touching = self.rooms.iter().filter(|r| r.touching > 0).count();
            warn!(
                ticks = self.colliding_ticks,
                energy, still_touching, "rooms failed to settle, giving up"
            );
            return Ok(Transition::Advance);
        }
        Ok(Transition::Stay)
    }

    fn update_adjusting(&mut self) -> Result<Transition, LayoutError> {
        if let Some(grid) = self.config.snap_grid {
            let g = grid as f32;
            for index in 0..self.rooms.len() {
                let p = self.rooms[index].position;
                let snapped = Vec2::new(p.x - p.x.rem_euclid(g) + g, p.y - p.y.rem_euclid(g) + g);
                self.set_room_position(index, snapped)?;
            }
        }
        Ok(Transition::Advance)
    }

    fn update_culling(&mut self) -> Result<Transition, LayoutError> {
        Ok(Transition::Advance)
    }

    fn update_neighbors(&mut self) -> Result<Transition, LayoutError> {
        let centers: Vec<Vec2> = self.rooms.iter().map(|r| r.position).collect();
        self.graph = match NeighborGraph::build(&centers) {
            Ok(graph) => graph,
            Err(TriangulationError::TooFewPoints { got }) => {
                info!(rooms = got, "too few rooms to triangulate, no neighbors");
                NeighborGraph::empty(centers.len())
            }
            Err(e) => {
                warn!("triangulation failed, no neighbors: {e}");
                NeighborGraph::empty(centers.len())
            }
        };

        for (room, neighbors) in self.rooms.iter_mut().zip(&self.graph.adjacency) {
            room.neighbors = neighbors.clone();
        }
        Ok(Transition::Advance)
    }

    fn update_done(&mut self) -> Result<Transition, LayoutError> {
        Ok(Transition::Stay)
    }

    fn sync_rooms(&mut self) -> Result<(), LayoutError> {
        for room in &mut self.rooms {
            room.position = self.space.position(room.body)?;
        }
        Ok(())
    }
}

fn center_of(width: u32, height: u32) -> Vec2 {
    Vec2::new((width / 2) as f32, (height / 2) as f32)
}

/// For each room, how many other rooms overlap it.
pub fn count_touching(rooms: &[Room]) -> Vec<usize> {
    let boxes: Vec<_> = rooms.iter().map(Room::aabb).collect();
    let mut counts = vec![0; rooms.len()];
    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            if boxes[i].overlaps(&boxes[j]) {
                counts[i] += 1;
                counts[j] += 1;
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_map(width: u32, height: u32, rooms: u32, seed: u64) -> DungeonMap {
        let config = LayoutConfig::sized(width, height, rooms).with_seed(seed);
        let mut rng = StdRng::seed_from_u64(seed);
        DungeonMap::new(&config, &mut rng).unwrap()
    }

    /// Tick until Done, returning the mode seen after each tick.
    fn run_to_done(map: &mut DungeonMap) -> Vec<Mode> {
        let limit = map.config.max_colliding_ticks as usize + 10;
        let mut modes = Vec::new();
        for _ in 0..limit {
            map.update().unwrap();
            modes.push(map.mode());
            if map.mode() == Mode::Done {
                break;
            }
        }
        modes
    }

    fn snapshot(map: &DungeonMap) -> Vec<(Vec2, Vec2, usize)> {
        map.rooms()
            .iter()
            .map(|r| {
                (
                    map.space().position(r.body).unwrap(),
                    map.space().velocity(r.body).unwrap(),
                    r.touching,
                )
            })
            .collect()
    }

    #[test]
    fn test_mode_table_is_indexed_by_mode() {
        for (i, entry) in MODE_TABLE.iter().enumerate() {
            assert_eq!(entry.mode as usize, i);
            assert!(entry.next >= entry.mode);
        }
        assert_eq!(Mode::Done.next(), Mode::Done);
    }

    #[test]
    fn test_new_map_is_ready_and_stacked() {
        let map = make_map(512, 512, 8, 1);
        assert_eq!(map.mode(), Mode::Ready);
        assert_eq!(map.rooms().len(), 8);
        assert_eq!(map.walls().len(), 4);
        for room in map.rooms() {
            assert_eq!(room.position, Vec2::new(256.0, 256.0));
            assert!(room.neighbors.is_empty());
        }
    }

    #[test]
    fn test_ready_has_no_handler() {
        let mut map = make_map(512, 512, 4, 1);
        assert_eq!(map.update(), Err(LayoutError::UnhandledMode(Mode::Ready)));
        assert_eq!(map.mode(), Mode::Ready);
    }

    #[test]
    fn test_setup_only_from_ready() {
        let mut map = make_map(512, 512, 4, 1);
        map.setup().unwrap();
        assert_eq!(map.mode(), Mode::Colliding);
        assert_eq!(map.setup(), Err(LayoutError::NotReady(Mode::Colliding)));
    }

    #[test]
    fn test_setup_applies_cycling_nudges() {
        let mut map = make_map(1024, 1024, 7, 3);
        map.setup().unwrap();
        let velocities: Vec<Vec2> = map
            .rooms()
            .iter()
            .map(|r| map.space().velocity(r.body).unwrap())
            .collect();
        assert_eq!(velocities[0], Vec2::ZERO);
        assert_eq!(velocities[1], Vec2::new(0.0, 256.0));
        assert_eq!(velocities[3], Vec2::new(256.0, 256.0));
        assert_eq!(velocities[6], velocities[0]);
    }

    #[test]
    fn test_modes_are_monotonic_and_done_is_terminal() {
        let mut map = make_map(1024, 1024, 15, 11);
        map.setup().unwrap();
        let modes = run_to_done(&mut map);
        assert_eq!(modes.last(), Some(&Mode::Done));
        assert!(modes.windows(2).all(|w| w[0] <= w[1]));

        assert_eq!(map.advance(), Mode::Done);
        map.update().unwrap();
        assert_eq!(map.mode(), Mode::Done);
    }

    #[test]
    fn test_touching_matches_independent_overlap_count() {
        let mut map = make_map(600, 600, 20, 5);
        map.setup().unwrap();
        while map.mode() == Mode::Colliding {
            map.update().unwrap();
            let boxes: Vec<_> = map
                .rooms()
                .iter()
                .map(|r| map.space().aabb(r.body).unwrap())
                .collect();
            for (i, room) in map.rooms().iter().enumerate() {
                let expected = boxes
                    .iter()
                    .enumerate()
                    .filter(|&(j, b)| j != i && b.overlaps(&boxes[i]))
                    .count();
                assert_eq!(room.touching, expected);
            }
        }
    }

    #[test]
    fn test_colliding_terminates_when_crowded() {
        // Far more room area than map area: rooms can never all separate
        let config = LayoutConfig {
            max_colliding_ticks: 40,
            ..LayoutConfig::sized(120, 120, 30).with_seed(2)
        };
        let mut rng = StdRng::seed_from_u64(2);
        let mut map = DungeonMap::new(&config, &mut rng).unwrap();
        map.setup().unwrap();

        let mut ticks = 0;
        while map.mode() == Mode::Colliding {
            map.update().unwrap();
            ticks += 1;
            assert!(ticks <= 40);
        }
        assert!(map.kinetic_energy() < config.energy_threshold || map.colliding_ticks() == 40);
        assert_eq!(run_to_done(&mut map).last(), Some(&Mode::Done));
    }

    #[test]
    fn test_neighbors_are_symmetric() {
        let mut map = make_map(1024, 1024, 25, 8);
        map.setup().unwrap();
        run_to_done(&mut map);
        for (a, room) in map.rooms().iter().enumerate() {
            for &b in &room.neighbors {
                assert_ne!(a, b);
                assert!(map.rooms()[b].neighbors.contains(&a));
            }
        }
    }

    #[test]
    fn test_neighbors_empty_until_neighbors_mode() {
        let mut map = make_map(1024, 1024, 10, 4);
        map.setup().unwrap();
        while map.mode() < Mode::Neighbors {
            assert!(map.triangles().is_empty());
            assert!(map.rooms().iter().all(|r| r.neighbors.is_empty()));
            map.update().unwrap();
        }
    }

    #[test]
    fn test_three_rooms_form_one_triangle() {
        let mut map = make_map(1024, 1024, 3, 6);
        map.setup().unwrap();
        while map.mode() != Mode::Neighbors {
            map.update().unwrap();
        }
        map.set_room_position(0, Vec2::new(200.0, 200.0)).unwrap();
        map.set_room_position(1, Vec2::new(700.0, 250.0)).unwrap();
        map.set_room_position(2, Vec2::new(400.0, 800.0)).unwrap();

        map.update().unwrap();

        assert_eq!(map.mode(), Mode::Done);
        assert_eq!(map.triangles().len(), 1);
        for room in map.rooms() {
            assert_eq!(room.neighbors.len(), 2);
        }
    }

    #[test]
    fn test_one_or_two_rooms_have_no_neighbors() {
        for rooms in [1, 2] {
            let mut map = make_map(1024, 1024, rooms, 9);
            map.setup().unwrap();
            assert_eq!(run_to_done(&mut map).last(), Some(&Mode::Done));
            assert!(map.triangles().is_empty());
            assert!(map.rooms().iter().all(|r| r.neighbors.is_empty()));
        }
    }

    #[test]
    fn test_zero_rooms_reach_done() {
        let mut map = make_map(1024, 1024, 0, 0);
        map.setup().unwrap();
        let modes = run_to_done(&mut map);
        assert_eq!(
            modes,
            vec![Mode::Adjusting, Mode::Culling, Mode::Neighbors, Mode::Done]
        );
        assert!(map.rooms().is_empty());
    }

    #[test]
    fn test_reset_round_trip_matches_fresh_map() {
        let mut used = make_map(800, 800, 12, 21);
        used.setup().unwrap();
        for _ in 0..15 {
            used.update().unwrap();
        }
        used.reset().unwrap();
        assert_eq!(used.mode(), Mode::Ready);
        assert_eq!(used.colliding_ticks(), 0);
        assert_eq!(used.space().step_count(), 0);
        used.setup().unwrap();

        let mut fresh = make_map(800, 800, 12, 21);
        fresh.setup().unwrap();

        assert_eq!(snapshot(&used), snapshot(&fresh));
        for _ in 0..5 {
            used.update().unwrap();
            fresh.update().unwrap();
        }
        assert_eq!(snapshot(&used), snapshot(&fresh));
    }

    #[test]
    fn test_adjusting_snaps_to_grid() {
        let config = LayoutConfig {
            snap_grid: Some(10),
            ..LayoutConfig::sized(1024, 1024, 6).with_seed(13)
        };
        let mut rng = StdRng::seed_from_u64(13);
        let mut map = DungeonMap::new(&config, &mut rng).unwrap();
        map.setup().unwrap();
        while map.mode() != Mode::Culling {
            map.update().unwrap();
        }
        for room in map.rooms() {
            assert_eq!(room.position.x % 10.0, 0.0);
            assert_eq!(room.position.y % 10.0, 0.0);
            assert_eq!(map.space().position(room.body).unwrap(), room.position);
        }
    }

    #[test]
    fn test_rooms_stay_inside_map() {
        for seed in 0..16 {
            let config = LayoutConfig {
                max_colliding_ticks: 30,
                ..LayoutConfig::default().with_seed(seed)
            };
            let mut rng = StdRng::seed_from_u64(seed);
            let mut map = DungeonMap::new(&config, &mut rng).unwrap();
            let bounds = Vec2::new(map.width() as f32, map.height() as f32);
            map.setup().unwrap();
            while map.mode() == Mode::Colliding {
                map.update().unwrap();
                for room in map.rooms() {
                    let aabb = map.space().aabb(room.body).unwrap();
                    assert!(aabb.min.cmpge(Vec2::ZERO).all(), "seed {seed}: {room}");
                    assert!(aabb.max.cmple(bounds).all(), "seed {seed}: {room}");
                }
            }
        }
    }

    #[test]
    fn test_energy_matches_space() {
        let mut map = make_map(800, 800, 20, 17);
        map.setup().unwrap();
        for _ in 0..5 {
            map.update().unwrap();
            assert_eq!(map.kinetic_energy(), map.space().kinetic_energy());
        }
    }

    /// Advance to Neighbors, place the rooms by hand and triangulate.
    fn neighbors_from(points: &[Vec2], seed: u64) -> DungeonMap {
        let mut map = make_map(1024, 1024, points.len() as u32, seed);
        map.setup().unwrap();
        while map.mode() != Mode::Neighbors {
            map.update().unwrap();
        }
        for (index, &p) in points.iter().enumerate() {
            map.set_room_position(index, p).unwrap();
        }
        map.update().unwrap();
        map
    }

    #[test]
    fn test_collinear_rooms_have_no_neighbors() {
        let points = [100.0, 300.0, 500.0, 700.0].map(|x| Vec2::new(x, 500.0));
        let map = neighbors_from(&points, 14);
        assert_eq!(map.mode(), Mode::Done);
        assert!(map.triangles().is_empty());
        assert!(map.rooms().iter().all(|r| r.neighbors.is_empty()));
    }

    #[test]
    fn test_coincident_rooms_have_no_neighbors() {
        let points = [
            Vec2::new(300.0, 300.0),
            Vec2::new(300.0, 300.0),
            Vec2::new(700.0, 600.0),
        ];
        let map = neighbors_from(&points, 15);
        assert_eq!(map.mode(), Mode::Done);
        assert!(map.triangles().is_empty());
        assert!(map.rooms().iter().all(|r| r.neighbors.is_empty()));
    }

    #[test]
    fn test_set_room_position_out_of_range() {
        let mut map = make_map(1024, 1024, 4, 1);
        assert_eq!(
            map.set_room_position(9, Vec2::ZERO),
            Err(LayoutError::UnknownRoom { index: 9, rooms: 4 })
        );
        assert!(map.set_room_position(4, Vec2::ZERO).is_err());
        assert!(map.set_room_position(3, Vec2::ZERO).is_ok());
    }

    #[test]
    fn test_count_touching() {
        let mut map = make_map(1024, 1024, 3, 1);
        map.set_room_position(0, Vec2::new(100.0, 100.0)).unwrap();
        map.set_room_position(1, Vec2::new(105.0, 100.0)).unwrap();
        map.set_room_position(2, Vec2::new(900.0, 900.0)).unwrap();
        assert_eq!(count_touching(map.rooms()), vec![1, 1, 0]);
    }
}
