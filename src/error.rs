//! Error types for the physics space, room catalog, layout solver and config.

use thiserror::Error;

use crate::map::Mode;
use crate::physics::BodyHandle;

/// Misuse of the physics space registration API.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsError {
    /// The body is already registered with the space
    #[error("body {0:?} is already registered with the space")]
    DuplicateBody(BodyHandle),

    /// The body is not registered with the space (or no longer exists)
    #[error("body {0:?} is not registered with the space")]
    UnknownBody(BodyHandle),
}

/// Invalid room generation parameters.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogError {
    /// Dimension bounds are empty or start below one grid cell
    #[error("invalid room dimensions: min {min}, max {max} (need 1 <= min <= max)")]
    InvalidDimensions {
        /// Requested minimum side in grid cells
        min: u32,
        /// Requested maximum side in grid cells
        max: u32,
    },
}

/// The point set cannot be triangulated.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TriangulationError {
    /// Fewer than three points
    #[error("triangulation needs at least 3 points, got {got}")]
    TooFewPoints {
        /// Number of points supplied
        got: usize,
    },

    /// Two points share the same coordinates
    #[error("points {first} and {second} coincide")]
    DuplicatePoint {
        /// Index of the first point
        first: usize,
        /// Index of the second point
        second: usize,
    },

    /// Every point lies on one line
    #[error("all points are collinear")]
    Collinear,
}

/// Layout solver failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// The current mode has no update handler
    #[error("no update handler for mode {0:?}")]
    UnhandledMode(Mode),

    /// An operation that requires the Ready mode was called later
    #[error("operation requires mode Ready, map is in {0:?}")]
    NotReady(Mode),

    /// A room index past the end of the room list
    #[error("no room at index {index}, map has {rooms}")]
    UnknownRoom {
        /// Requested room index
        index: usize,
        /// Number of rooms on the map
        rooms: usize,
    },

    /// The physics space rejected a registration call
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// Room generation parameters were invalid
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Rejected configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Width or height of zero
    #[error("map size must be positive, got {width}x{height}")]
    InvalidSize {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// More rooms than the solver is willing to simulate
    #[error("room count {got} exceeds the maximum of {max}")]
    TooManyRooms {
        /// Requested room count
        got: u32,
        /// Maximum allowed room count
        max: u32,
    },

    /// A simulation parameter is out of range
    #[error("invalid simulation parameter {name}: {reason}")]
    InvalidParameter {
        /// Field name in the config
        name: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Room dimension bounds are invalid
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for a layout config
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}
