//! Minimal 2D rigid-body space for non-rotating rectangles.
//!
//! Bodies live in a `hecs::World` as component bundles. Creating a body only
//! allocates it; [`Space::add`] registers it with the simulation and
//! [`Space::remove`] takes it out again without destroying its state, so a
//! body can be re-registered later.

mod body;
mod contact;

pub use body::{Aabb, BodyDesc, BodyHandle, BodyKind};

use body::{Boundary, HalfExtents, InvMass, Position, Registered, Static, Velocity};
use contact::{ContactParams, SimBody};
use glam::Vec2;
use hecs::World;

use crate::constants::*;
use crate::error::PhysicsError;

/// Owns every body and the global simulation parameters.
pub struct Space {
    world: World,
    /// Contact resolution passes per step
    pub iterations: usize,
    /// Fraction of velocity kept after each step, in (0, 1)
    pub damping: f32,
    /// Fraction of penetration left uncorrected per pass
    pub collision_bias: f32,
    /// Bounce factor applied to colliding bodies
    pub restitution: f32,
    current_time: f32,
    step_count: u64,
}

impl Space {
    pub fn new() -> Self {
        Self::with_params(SPACE_ITERATIONS, SPACE_DAMPING, SPACE_COLLISION_BIAS)
    }

    pub fn with_params(iterations: usize, damping: f32, collision_bias: f32) -> Self {
        Self {
            world: World::new(),
            iterations,
            damping,
            collision_bias,
            restitution: CONTACT_RESTITUTION,
            current_time: 0.0,
            step_count: 0,
        }
    }

    /// Allocate a body. It does not take part in the simulation until [`add`](Self::add).
    pub fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let position = Position(desc.position);
        let half = HalfExtents(desc.size * 0.5);
        let entity = match (desc.kind, desc.inward) {
            (BodyKind::Dynamic, _) => {
                let inv_mass = if desc.mass > 0.0 { 1.0 / desc.mass } else { 1.0 };
                self.world
                    .spawn((position, Velocity(Vec2::ZERO), half, InvMass(inv_mass)))
            }
            (BodyKind::Static, Some(inward)) => self.world.spawn((
                position,
                Velocity(Vec2::ZERO),
                half,
                InvMass(0.0),
                Static,
                Boundary(inward),
            )),
            (BodyKind::Static, None) => self.world.spawn((
                position,
                Velocity(Vec2::ZERO),
                half,
                InvMass(0.0),
                Static,
            )),
        };
        BodyHandle(entity)
    }

    /// Register a body with the simulation.
    pub fn add(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        if self.is_registered(handle) {
            return Err(PhysicsError::DuplicateBody(handle));
        }
        self.world
            .insert_one(handle.0, Registered)
            .map_err(|_| PhysicsError::UnknownBody(handle))
    }

    /// Take a body out of the simulation, keeping its state.
    pub fn remove(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        self.world
            .remove_one::<Registered>(handle.0)
            .map(|_| ())
            .map_err(|_| PhysicsError::UnknownBody(handle))
    }

    /// Drop and re-add a body's registration, e.g. after teleporting it.
    pub fn reindex(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        self.remove(handle)?;
        self.add(handle)
    }

    pub fn is_registered(&self, handle: BodyHandle) -> bool {
        self.world.get::<&Registered>(handle.0).is_ok()
    }

    /// Number of registered bodies, static ones included.
    pub fn body_count(&self) -> usize {
        self.world.query::<&Registered>().iter().count()
    }

    pub fn position(&self, handle: BodyHandle) -> Result<Vec2, PhysicsError> {
        self.world
            .get::<&Position>(handle.0)
            .map(|p| p.0)
            .map_err(|_| PhysicsError::UnknownBody(handle))
    }

    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) -> Result<(), PhysicsError> {
        let mut p = self
            .world
            .get::<&mut Position>(handle.0)
            .map_err(|_| PhysicsError::UnknownBody(handle))?;
        p.0 = position;
        Ok(())
    }

    pub fn velocity(&self, handle: BodyHandle) -> Result<Vec2, PhysicsError> {
        self.world
            .get::<&Velocity>(handle.0)
            .map(|v| v.0)
            .map_err(|_| PhysicsError::UnknownBody(handle))
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        if self.world.get::<&Static>(handle.0).is_ok() {
            return Ok(());
        }
        let mut v = self
            .world
            .get::<&mut Velocity>(handle.0)
            .map_err(|_| PhysicsError::UnknownBody(handle))?;
        v.0 = velocity;
        Ok(())
    }

    pub fn aabb(&self, handle: BodyHandle) -> Result<Aabb, PhysicsError> {
        let mut query = self
            .world
            .query_one::<(&Position, &HalfExtents)>(handle.0)
            .map_err(|_| PhysicsError::UnknownBody(handle))?;
        let (p, h) = query.get().ok_or(PhysicsError::UnknownBody(handle))?;
        Ok(Aabb::from_center(p.0, h.0))
    }

    /// Instantaneous velocity change of `impulse / mass`. Bodies never rotate,
    /// so the application point does not matter.
    pub fn apply_impulse(
        &mut self,
        handle: BodyHandle,
        impulse: Vec2,
        _local_point: Vec2,
    ) -> Result<(), PhysicsError> {
        if !self.is_registered(handle) {
            return Err(PhysicsError::UnknownBody(handle));
        }
        let inv_mass = self
            .world
            .get::<&InvMass>(handle.0)
            .map(|m| m.0)
            .map_err(|_| PhysicsError::UnknownBody(handle))?;
        let mut v = self
            .world
            .get::<&mut Velocity>(handle.0)
            .map_err(|_| PhysicsError::UnknownBody(handle))?;
        v.0 += impulse * inv_mass;
        Ok(())
    }

    /// Advance the simulation by `dt` seconds: damp and integrate dynamic
    /// bodies, then push overlapping bodies apart. Static contacts are
    /// resolved last, so dynamic bodies end the step outside every bound.
    pub fn step(&mut self, dt: f32) {
        puffin::profile_function!();

        let mut bodies: Vec<SimBody> = self
            .world
            .query::<(&Position, &Velocity, &HalfExtents, &InvMass, Option<&Boundary>)>()
            .with::<&Registered>()
            .iter()
            .map(|(entity, (p, v, h, m, bound))| SimBody {
                handle: BodyHandle(entity),
                position: p.0,
                velocity: v.0,
                half: h.0,
                inv_mass: m.0,
                inward: bound.map(|b| b.0),
            })
            .collect();
        bodies.sort_by_key(|b| b.handle);

        for body in bodies.iter_mut().filter(|b| b.inv_mass > 0.0) {
            body.velocity *= self.damping;
            body.position += body.velocity * dt;
        }

        contact::resolve_contacts(
            &mut bodies,
            ContactParams {
                iterations: self.iterations,
                collision_bias: self.collision_bias,
                clearance: CONTACT_CLEARANCE,
                restitution: self.restitution,
            },
        );

        for body in bodies.iter().filter(|b| b.inv_mass > 0.0) {
            if let Ok((p, v)) = self
                .world
                .query_one_mut::<(&mut Position, &mut Velocity)>(body.handle.0)
            {
                p.0 = body.position;
                v.0 = body.velocity;
            }
        }

        self.current_time += dt;
        self.step_count += 1;
    }

    /// Sum of speed over registered dynamic bodies.
    pub fn kinetic_energy(&self) -> f32 {
        self.world
            .query::<&Velocity>()
            .with::<&Registered>()
            .without::<&Static>()
            .iter()
            .map(|(_, v)| v.0.length())
            .sum()
    }

    /// Simulated seconds since creation or the last clock reset.
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn reset_clock(&mut self) {
        self.current_time = 0.0;
        self.step_count = 0;
    }
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}
