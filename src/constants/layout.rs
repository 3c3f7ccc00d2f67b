//! Layout solver and room generation constants.

/// Default map width in pixels
pub const MAP_DEFAULT_WIDTH: u32 = 1024;
/// Default map height in pixels
pub const MAP_DEFAULT_HEIGHT: u32 = 1024;
/// Default number of rooms
pub const MAP_DEFAULT_ROOMS: u32 = 50;
/// Upper bound on the number of rooms a config may request
pub const MAP_MAX_ROOMS: u32 = 10_000;

/// Smallest room side in grid cells
pub const ROOM_MIN_DIM: u32 = 1;
/// Largest room side in grid cells
pub const ROOM_MAX_DIM: u32 = 10;
/// Room border thickness in pixels
pub const ROOM_WALL_THICKNESS: u32 = 3;
/// Size of one room grid cell in pixels
pub const ROOM_GRID_SIZE: u32 = 10;
/// Thickness of the separator line between grid cells in pixels
pub const ROOM_LINE_THICKNESS: u32 = 1;

/// Thickness of the static map bounds in pixels
pub const MAP_WALL_THICKNESS: u32 = 3;

/// Total room speed below which Colliding is considered settled
pub const SETTLE_ENERGY_THRESHOLD: f32 = 1.0;
/// Ticks spent in Colliding before the solver gives up and moves on
pub const MAX_COLLIDING_TICKS: u32 = 1000;
/// Nudge force is max(width, height) divided by this
pub const NUDGE_DIVISOR: u32 = 4;
