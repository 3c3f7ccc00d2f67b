//! AABB contact resolution between registered bodies.
//!
//! Each pass walks every dynamic pair once, pushes overlapping bodies apart
//! along the axis of least penetration (weighted by inverse mass) and removes
//! the approaching part of their relative normal velocity. Static bodies are
//! handled after the dynamic pairs of the same pass. A static body with an
//! inward normal acts as a half-plane, so a body that tunnelled past its
//! center line is still pushed back to the inner side.

use glam::Vec2;

use super::body::Aabb;
use super::BodyHandle;

/// Working copy of one body for the duration of a step.
#[derive(Debug, Clone, Copy)]
pub(super) struct SimBody {
    pub handle: BodyHandle,
    pub position: Vec2,
    pub velocity: Vec2,
    pub half: Vec2,
    pub inv_mass: f32,
    pub inward: Option<Vec2>,
}

impl SimBody {
    fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.half)
    }
}

/// Tunables for one resolution run.
#[derive(Debug, Clone, Copy)]
pub(super) struct ContactParams {
    pub iterations: usize,
    pub collision_bias: f32,
    pub clearance: f32,
    pub restitution: f32,
}

/// Run up to `params.iterations` resolution passes. Bodies must be sorted by
/// handle so that the result only depends on the initial state.
pub(super) fn resolve_contacts(bodies: &mut [SimBody], params: ContactParams) {
    puffin::profile_function!();

    let (dynamic, fixed): (Vec<usize>, Vec<usize>) =
        (0..bodies.len()).partition(|&i| bodies[i].inv_mass > 0.0);

    for _ in 0..params.iterations {
        let mut any_contact = false;
        for (n, &i) in dynamic.iter().enumerate() {
            for &j in &dynamic[n + 1..] {
                let (head, tail) = bodies.split_at_mut(j);
                any_contact |= resolve_pair(&mut head[i], &mut tail[0], params);
            }
        }
        for &s in &fixed {
            let wall = bodies[s];
            for &d in &dynamic {
                any_contact |= resolve_static(&mut bodies[d], &wall, params);
            }
        }
        if !any_contact {
            break;
        }
    }
}

/// Push a dynamic body out of a static one. Returns true on contact.
fn resolve_static(body: &mut SimBody, wall: &SimBody, params: ContactParams) -> bool {
    let Some(n) = wall.inward else {
        let mut wall = *wall;
        return resolve_pair(&mut wall, body, params);
    };

    let face = wall.position.dot(n) + wall.half.dot(n.abs());
    let lowest = body.position.dot(n) - body.half.dot(n.abs());
    let depth = face - lowest;
    if depth <= 0.0 {
        return false;
    }

    body.position += n * (depth + params.clearance);
    let vn = body.velocity.dot(n);
    if vn < 0.0 {
        body.velocity -= n * (1.0 + params.restitution) * vn;
    }
    true
}

/// Separate one pair. Returns true if the pair was overlapping.
fn resolve_pair(a: &mut SimBody, b: &mut SimBody, params: ContactParams) -> bool {
    let total_inv_mass = a.inv_mass + b.inv_mass;
    if total_inv_mass <= 0.0 {
        return false;
    }

    let penetration = a.aabb().penetration(&b.aabb());
    if penetration.x <= 0.0 || penetration.y <= 0.0 {
        return false;
    }

    // Normal points from a to b; coincident centers push a toward negative.
    let delta = b.position - a.position;
    let (depth, normal) = if penetration.x < penetration.y {
        (penetration.x, Vec2::new(axis_sign(delta.x), 0.0))
    } else {
        (penetration.y, Vec2::new(0.0, axis_sign(delta.y)))
    };

    let correction = depth * (1.0 - params.collision_bias) + params.clearance;
    a.position -= normal * correction * (a.inv_mass / total_inv_mass);
    b.position += normal * correction * (b.inv_mass / total_inv_mass);

    let approach = (b.velocity - a.velocity).dot(normal);
    if approach < 0.0 {
        let impulse = -(1.0 + params.restitution) * approach / total_inv_mass;
        a.velocity -= normal * impulse * a.inv_mass;
        b.velocity += normal * impulse * b.inv_mass;
    }

    true
}

fn axis_sign(d: f32) -> f32 {
    if d >= 0.0 {
        1.0
    } else {
        -1.0
    }
}
