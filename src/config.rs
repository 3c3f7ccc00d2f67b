//! Solver configuration.
//!
//! Every tunable has a default from `constants`; a JSON file may override any
//! subset of them and command-line flags override the file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{CatalogError, ConfigError};
use crate::physics::Space;
use crate::room::RoomCatalog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Map width in pixels
    pub width: u32,
    /// Map height in pixels
    pub height: u32,
    /// Number of rooms to generate
    pub rooms: u32,
    /// Seed for room sizes; drawn from entropy when absent
    pub seed: Option<u64>,
    pub min_room_dim: u32,
    pub max_room_dim: u32,
    /// Integration sub-steps per tick
    pub steps_per_tick: u32,
    /// Seconds per integration sub-step
    pub step_dt: f32,
    /// Total room speed below which Colliding ends
    pub energy_threshold: f32,
    /// Colliding gives up after this many ticks
    pub max_colliding_ticks: u32,
    /// Contact resolution passes per sub-step
    pub iterations: usize,
    pub damping: f32,
    pub collision_bias: f32,
    /// Snap settled rooms to this pixel grid during Adjusting
    pub snap_grid: Option<u32>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: MAP_DEFAULT_WIDTH,
            height: MAP_DEFAULT_HEIGHT,
            rooms: MAP_DEFAULT_ROOMS,
            seed: None,
            min_room_dim: ROOM_MIN_DIM,
            max_room_dim: ROOM_MAX_DIM,
            steps_per_tick: STEPS_PER_TICK,
            step_dt: STEP_DT,
            energy_threshold: SETTLE_ENERGY_THRESHOLD,
            max_colliding_ticks: MAX_COLLIDING_TICKS,
            iterations: SPACE_ITERATIONS,
            damping: SPACE_DAMPING,
            collision_bias: SPACE_COLLISION_BIAS,
            snap_grid: None,
        }
    }
}

impl LayoutConfig {
    /// Map of the given size and room count, everything else default.
    pub fn sized(width: u32, height: u32, rooms: u32) -> Self {
        Self {
            width,
            height,
            rooms,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.rooms > MAP_MAX_ROOMS {
            return Err(ConfigError::TooManyRooms {
                got: self.rooms,
                max: MAP_MAX_ROOMS,
            });
        }
        self.catalog()?;

        if self.steps_per_tick == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "steps_per_tick",
                reason: "must be at least 1",
            });
        }
        if !(self.step_dt.is_finite() && self.step_dt > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "step_dt",
                reason: "must be a positive number of seconds",
            });
        }
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(ConfigError::InvalidParameter {
                name: "damping",
                reason: "must lie strictly between 0 and 1",
            });
        }
        if !(0.0..1.0).contains(&self.collision_bias) {
            return Err(ConfigError::InvalidParameter {
                name: "collision_bias",
                reason: "must lie in [0, 1)",
            });
        }
        if !(self.energy_threshold.is_finite() && self.energy_threshold > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "energy_threshold",
                reason: "must be positive",
            });
        }
        if self.snap_grid == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "snap_grid",
                reason: "must be at least 1 pixel",
            });
        }
        Ok(())
    }

    pub fn catalog(&self) -> Result<RoomCatalog, CatalogError> {
        RoomCatalog::new(self.min_room_dim, self.max_room_dim)
    }

    /// A physics space carrying this config's simulation parameters.
    pub fn space(&self) -> Space {
        Space::with_params(self.iterations, self.damping, self.collision_bias)
    }
}
