//! Host-facing controller.
//!
//! The event loop owns one `Dungeon` and drives it: one `tick` per frame,
//! then `present` to hand rooms, walls and corridors to whatever draws them.
//! Key bindings only ever call `begin`, `toggle_pause` and `reset`.

use glam::Vec2;
use rand::Rng;
use tracing::{info, warn};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::map::{DungeonMap, Mode};
use crate::neighbors::corridors;
use crate::room::{Room, Wall};

/// Receives the map's drawable parts once per frame.
pub trait Presenter {
    fn draw_room(&mut self, room: &Room);
    fn draw_wall(&mut self, wall: &Wall);
    fn draw_corridor(&mut self, from: Vec2, to: Vec2);
}

pub struct Dungeon {
    map: DungeonMap,
    paused: bool,
}

impl Dungeon {
    /// A paused dungeon in Ready mode.
    pub fn new(config: &LayoutConfig, rng: &mut impl Rng) -> Result<Self, LayoutError> {
        Ok(Self {
            map: DungeonMap::new(config, rng)?,
            paused: true,
        })
    }

    pub fn map(&self) -> &DungeonMap {
        &self.map
    }

    pub fn mode(&self) -> Mode {
        self.map.mode()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn setup(&mut self) -> Result<(), LayoutError> {
        self.map.setup()
    }

    /// Start solving: nudge the rooms if that has not happened yet, then unpause.
    pub fn begin(&mut self) -> Result<(), LayoutError> {
        if self.map.mode() == Mode::Ready {
            self.map.setup()?;
        }
        self.paused = false;
        info!("begin");
        Ok(())
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        info!(paused = self.paused, "toggled pause");
    }

    /// Pause and put the map back to its initial state.
    pub fn reset(&mut self) -> Result<(), LayoutError> {
        self.paused = true;
        self.map.reset()
    }

    /// Advance the solver one tick unless paused. Solver errors are logged
    /// and the tick is skipped so the host can keep rendering.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        if let Err(e) = self.map.update() {
            warn!("tick skipped: {e}");
        }
    }

    /// Hand every wall, room and corridor to `presenter`.
    pub fn present(&self, presenter: &mut impl Presenter) {
        puffin::profile_function!();

        for wall in self.map.walls() {
            presenter.draw_wall(wall);
        }

        let rooms = self.map.rooms();
        let centers: Vec<Vec2> = rooms.iter().map(|r| r.position).collect();
        let adjacency: Vec<Vec<usize>> = rooms.iter().map(|r| r.neighbors.clone()).collect();
        for (from, to) in corridors(&adjacency, &centers) {
            presenter.draw_corridor(from, to);
        }

        for room in rooms {
            presenter.draw_room(room);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct Recorder {
        rooms: usize,
        walls: usize,
        corridors: Vec<(Vec2, Vec2)>,
    }

    impl Presenter for Recorder {
        fn draw_room(&mut self, _room: &Room) {
            self.rooms += 1;
        }

        fn draw_wall(&mut self, _wall: &Wall) {
            self.walls += 1;
        }

        fn draw_corridor(&mut self, from: Vec2, to: Vec2) {
            self.corridors.push((from, to));
        }
    }

    fn make_dungeon(rooms: u32, seed: u64) -> Dungeon {
        let config = LayoutConfig::sized(1024, 1024, rooms).with_seed(seed);
        Dungeon::new(&config, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_starts_paused_and_ticks_are_ignored() {
        let mut dungeon = make_dungeon(5, 1);
        assert!(dungeon.is_paused());
        dungeon.tick();
        assert_eq!(dungeon.mode(), Mode::Ready);
    }

    #[test]
    fn test_begin_sets_up_and_unpauses() {
        let mut dungeon = make_dungeon(5, 1);
        dungeon.begin().unwrap();
        assert!(!dungeon.is_paused());
        assert_eq!(dungeon.mode(), Mode::Colliding);

        // A second begin must not try to set up again
        dungeon.begin().unwrap();
        assert_eq!(dungeon.mode(), Mode::Colliding);
    }

    #[test]
    fn test_toggle_pause_stops_progress() {
        let mut dungeon = make_dungeon(0, 1);
        dungeon.begin().unwrap();
        dungeon.toggle_pause();
        assert!(dungeon.is_paused());
        dungeon.tick();
        assert_eq!(dungeon.mode(), Mode::Colliding);
        dungeon.toggle_pause();
        dungeon.tick();
        assert_eq!(dungeon.mode(), Mode::Adjusting);
    }

    #[test]
    fn test_unhandled_mode_does_not_panic() {
        let mut dungeon = make_dungeon(3, 1);
        dungeon.toggle_pause();
        dungeon.tick();
        assert_eq!(dungeon.mode(), Mode::Ready);
    }

    #[test]
    fn test_reset_pauses_and_returns_to_ready() {
        let mut dungeon = make_dungeon(6, 2);
        dungeon.begin().unwrap();
        for _ in 0..3 {
            dungeon.tick();
        }
        dungeon.reset().unwrap();
        assert!(dungeon.is_paused());
        assert_eq!(dungeon.mode(), Mode::Ready);
        let center = dungeon.map().center();
        assert!(dungeon.map().rooms().iter().all(|r| r.position == center));
    }

    #[test]
    fn test_present_draws_everything_once() {
        let mut dungeon = make_dungeon(12, 4);
        dungeon.begin().unwrap();
        while dungeon.mode() != Mode::Done {
            dungeon.tick();
        }

        let mut recorder = Recorder::default();
        dungeon.present(&mut recorder);
        assert_eq!(recorder.walls, 4);
        assert_eq!(recorder.rooms, 12);

        let edges: usize = dungeon.map().rooms().iter().map(|r| r.neighbors.len()).sum();
        assert_eq!(recorder.corridors.len(), edges / 2);
    }
}
