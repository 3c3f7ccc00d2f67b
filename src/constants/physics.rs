//! Rigid-body simulation constants.

/// Contact resolution passes per step
pub const SPACE_ITERATIONS: usize = 30;
/// Fraction of velocity kept after each step
pub const SPACE_DAMPING: f32 = 0.9;
/// Fraction of penetration left uncorrected by each resolution pass
pub const SPACE_COLLISION_BIAS: f32 = 0.01;
/// Extra clearance (pixels) added when pushing overlapping bodies apart
pub const CONTACT_CLEARANCE: f32 = 0.05;
/// Bounce factor for the normal velocity of colliding bodies
pub const CONTACT_RESTITUTION: f32 = 0.5;
/// Fixed timestep of one integration sub-step (seconds)
pub const STEP_DT: f32 = 0.01;
/// Integration sub-steps per solver tick
pub const STEPS_PER_TICK: u32 = 10;
