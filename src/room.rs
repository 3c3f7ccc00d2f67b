//! Rooms, map walls and the random room catalog.

use glam::Vec2;
use rand::Rng;

use crate::constants::*;
use crate::error::{CatalogError, PhysicsError};
use crate::physics::{Aabb, BodyDesc, BodyHandle, Space};

/// A rectangular room backed by a dynamic body.
#[derive(Debug, Clone)]
pub struct Room {
    /// Width in grid cells
    pub grid_w: u32,
    /// Height in grid cells
    pub grid_h: u32,
    /// Width in pixels, borders and separator lines included
    pub width: u32,
    /// Height in pixels, borders and separator lines included
    pub height: u32,
    pub body: BodyHandle,
    /// Center in pixels, mirrored from the body after every tick
    pub position: Vec2,
    /// Number of other rooms currently overlapping this one
    pub touching: usize,
    /// Indices of neighboring rooms in the map's room list
    pub neighbors: Vec<usize>,
}

impl Room {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.size() * 0.5)
    }

    /// Pixel offsets (from the left/bottom edge) of the interior grid lines.
    pub fn grid_lines(&self) -> (Vec<u32>, Vec<u32>) {
        let offsets = |cells: u32| -> Vec<u32> {
            (1..cells)
                .map(|d| ROOM_WALL_THICKNESS + d * (ROOM_GRID_SIZE + ROOM_LINE_THICKNESS))
                .collect()
        };
        (offsets(self.grid_w), offsets(self.grid_h))
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Room @ ({:.1}, {:.1}) {}x{} [{}x{} cells]",
            self.position.x, self.position.y, self.width, self.height, self.grid_w, self.grid_h
        )
    }
}

/// One of the four static bounds around the map.
#[derive(Debug, Clone)]
pub struct Wall {
    pub width: u32,
    pub height: u32,
    pub position: Vec2,
    /// Unit normal pointing into the map
    pub inward: Vec2,
    pub body: BodyHandle,
}

impl Wall {
    pub fn new(
        space: &mut Space,
        position: Vec2,
        width: u32,
        height: u32,
        inward: Vec2,
    ) -> Result<Self, PhysicsError> {
        let body = space.create_body(BodyDesc::boundary(
            position,
            Vec2::new(width as f32, height as f32),
            inward,
        ));
        space.add(body)?;
        Ok(Self {
            width,
            height,
            position,
            inward,
            body,
        })
    }

    /// Bottom, top, left and right bounds of a `width` x `height` map, each
/// with its normal pointing into the map.
    pub fn bounds(space: &mut Space, width: u32, height: u32) -> Result<Vec<Wall>, PhysicsError> {
        let t = MAP_WALL_THICKNESS;
        let cx = (width / 2) as f32;
        let cy = (height / 2) as f32;
        Ok(vec![
            Wall::new(space, Vec2::new(cx, 0.0), width, t, Vec2::Y)?,
            Wall::new(space, Vec2::new(cx, height as f32), width, t, Vec2::NEG_Y)?,
            Wall::new(space, Vec2::new(0.0, cy), t, height, Vec2::X)?,
            Wall::new(space, Vec2::new(width as f32, cy), t, height, Vec2::NEG_X)?,
        ])
    }
}

/// Pixel length of a room side spanning `cells` grid cells.
pub fn pixel_size(cells: u32) -> u32 {
    2 * ROOM_WALL_THICKNESS + ROOM_GRID_SIZE * cells + ROOM_LINE_THICKNESS * (cells - 1)
}

/// Generates rooms with uniformly random grid dimensions.
#[derive(Debug, Clone, Copy)]
pub struct RoomCatalog {
    min_dim: u32,
    max_dim: u32,
}

impl RoomCatalog {
    pub fn new(min_dim: u32, max_dim: u32) -> Result<Self, CatalogError> {
        if min_dim < 1 || max_dim < min_dim {
            return Err(CatalogError::InvalidDimensions {
                min: min_dim,
                max: max_dim,
            });
        }
        Ok(Self { min_dim, max_dim })
    }

    pub fn min_dim(&self) -> u32 {
        self.min_dim
    }

    pub fn max_dim(&self) -> u32 {
        self.max_dim
    }

    /// Draw a room size, create its body at `position` and register it with `space`.
    pub fn random_room(
        &self,
        rng: &mut impl Rng,
        space: &mut Space,
        position: Vec2,
    ) -> Result<Room, PhysicsError> {
        let grid_w = rng.gen_range(self.min_dim..=self.max_dim);
        let grid_h = rng.gen_range(self.min_dim..=self.max_dim);
        let width = pixel_size(grid_w);
        let height = pixel_size(grid_h);

        let body = space.create_body(BodyDesc::dynamic(
            position,
            Vec2::new(width as f32, height as f32),
        ));
        space.add(body)?;

        Ok(Room {
            grid_w,
            grid_h,
            width,
            height,
            body,
            position,
            touching: 0,
            neighbors: Vec::new(),
        })
    }
}

impl Default for RoomCatalog {
    fn default() -> Self {
        Self {
            min_dim: ROOM_MIN_DIM,
            max_dim: ROOM_MAX_DIM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pixel_size() {
        assert_eq!(pixel_size(1), 16);
        assert_eq!(pixel_size(5), 60);
        assert_eq!(pixel_size(10), 115);
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert_eq!(
            RoomCatalog::new(5, 4).unwrap_err(),
            CatalogError::InvalidDimensions { min: 5, max: 4 }
        );
        assert!(RoomCatalog::new(0, 4).is_err());
        assert!(RoomCatalog::new(3, 3).is_ok());
    }

    #[test]
    fn test_random_room_within_bounds() {
        let catalog = RoomCatalog::new(2, 6).unwrap();
        let mut space = Space::new();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let room = catalog.random_room(&mut rng, &mut space, Vec2::ZERO).unwrap();
            assert!((2..=6).contains(&room.grid_w));
            assert!((2..=6).contains(&room.grid_h));
            assert_eq!(room.width, pixel_size(room.grid_w));
            assert_eq!(room.height, pixel_size(room.grid_h));
            assert!(space.is_registered(room.body));
        }
    }

    #[test]
    fn test_random_room_is_deterministic() {
        let catalog = RoomCatalog::default();
        let sizes = |seed| {
            let mut space = Space::new();
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| {
                    let room = catalog.random_room(&mut rng, &mut space, Vec2::ZERO).unwrap();
                    (room.grid_w, room.grid_h)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(sizes(7), sizes(7));
    }

    #[test]
    fn test_grid_lines() {
        let catalog = RoomCatalog::new(3, 3).unwrap();
        let mut space = Space::new();
        let mut rng = StdRng::seed_from_u64(1);
        let room = catalog.random_room(&mut rng, &mut space, Vec2::ZERO).unwrap();
        let (xs, ys) = room.grid_lines();
        assert_eq!(xs, vec![14, 25]);
        assert_eq!(ys, xs);
    }

    #[test]
    fn test_bounds_surround_map() {
        let mut space = Space::new();
        let walls = Wall::bounds(&mut space, 200, 100).unwrap();
        assert_eq!(walls.len(), 4);
        assert_eq!(walls[0].position, Vec2::new(100.0, 0.0));
        assert_eq!(walls[1].position, Vec2::new(100.0, 100.0));
        assert_eq!(walls[2].position, Vec2::new(0.0, 50.0));
        assert_eq!(walls[3].position, Vec2::new(200.0, 50.0));
        assert_eq!(space.body_count(), 4);
        for wall in &walls {
            // Every normal points from the wall toward the map center
            let to_center = Vec2::new(100.0, 50.0) - wall.position;
            assert!(wall.inward.dot(to_center) > 0.0);
        }
    }

    #[test]
    fn test_bounds_recover_tunnelled_room() {
        let mut space = Space::new();
        Wall::bounds(&mut space, 200, 100).unwrap();
        let catalog = RoomCatalog::new(2, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        // Center already past the left wall's center line
        let room = catalog
            .random_room(&mut rng, &mut space, Vec2::new(-4.0, 50.0))
            .unwrap();
        space.apply_impulse(room.body, Vec2::new(-500.0, 0.0), Vec2::ZERO).unwrap();

        space.step(1.0 / 60.0);

        let aabb = space.aabb(room.body).unwrap();
        assert!(aabb.min.x >= MAP_WALL_THICKNESS as f32 * 0.5 - 1e-3);
        assert!(space.velocity(room.body).unwrap().x >= 0.0);
    }
}
