//! Rigid-body primitives: handles, components and axis-aligned boxes.

use glam::Vec2;

/// Opaque handle to a body stored in a [`Space`](super::Space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(super) hecs::Entity);

impl BodyHandle {
    /// Stable ordering key; bodies created earlier sort first.
    pub fn id(&self) -> u32 {
        self.0.id()
    }
}

/// Whether the simulation moves a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Integrated every step and pushed out of contacts
    Dynamic,
    /// Never moves; only pushes dynamic bodies away
    Static,
}

/// Description used to create a body.
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub position: Vec2,
    pub size: Vec2,
    pub kind: BodyKind,
    /// Zero means unit mass.
    pub mass: f32,
    /// For static map bounds: the direction pointing into the map.
    pub inward: Option<Vec2>,
}

impl BodyDesc {
    pub fn dynamic(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            kind: BodyKind::Dynamic,
            mass: 0.0,
            inward: None,
        }
    }

    pub fn fixed(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            kind: BodyKind::Static,
            mass: 0.0,
            inward: None,
        }
    }

    /// A static bound that keeps dynamic bodies on its `inward` side,
    /// however deep they have sunk into it.
    pub fn boundary(position: Vec2, size: Vec2, inward: Vec2) -> Self {
        Self {
            inward: Some(inward.normalize_or_zero()),
            ..Self::fixed(position, size)
        }
    }
}

/// Center of a body in world pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

/// Linear velocity in pixels per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity(pub Vec2);

/// Half the body's width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfExtents(pub Vec2);

/// Inverse mass; zero for static bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvMass(pub f32);

/// Unit normal of a static bound, pointing into the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary(pub Vec2);

/// Marker for bodies that never move.
#[derive(Debug, Clone, Copy)]
pub struct Static;

/// Marker for bodies currently taking part in the simulation.
#[derive(Debug, Clone, Copy)]
pub struct Registered;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Overlap with nonzero area. Boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Penetration depth along each axis; non-positive components mean no overlap.
    pub fn penetration(&self, other: &Aabb) -> Vec2 {
        Vec2::new(
            self.max.x.min(other.max.x) - self.min.x.max(other.min.x),
            self.max.y.min(other.max.y) - self.min.y.max(other.min.y),
        )
    }
}
