//! Room adjacency derived from a Delaunay triangulation of room centers.

use std::collections::BTreeSet;

use glam::{DVec2, Vec2};
use tracing::debug;

use crate::delaunay;
use crate::error::TriangulationError;

/// Triangles over room indices plus the symmetric adjacency they imply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborGraph {
    pub triangles: Vec<[usize; 3]>,
    /// Sorted neighbor indices per room
    pub adjacency: Vec<Vec<usize>>,
}

impl NeighborGraph {
    /// A graph over `rooms` rooms with no edges.
    pub fn empty(rooms: usize) -> Self {
        Self {
            triangles: Vec::new(),
            adjacency: vec![Vec::new(); rooms],
        }
    }

    /// Triangulate `centers`; every pair of vertices in a triangle become neighbors.
    pub fn build(centers: &[Vec2]) -> Result<Self, TriangulationError> {
        let points: Vec<DVec2> = centers.iter().map(|c| c.as_dvec2()).collect();
        let triangles = delaunay::triangulate(&points)?;
        debug!(points = ?centers, simplices = ?triangles, "triangulated room centers");

        let mut sets = vec![BTreeSet::new(); centers.len()];
        for tri in &triangles {
            for &a in tri {
                for &b in tri {
                    if a != b {
                        sets[a].insert(b);
                    }
                }
            }
        }

        Ok(Self {
            triangles,
            adjacency: sets.into_iter().map(|s| s.into_iter().collect()).collect(),
        })
    }

    /// Every neighbor pair once, lower index first.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(a, ns)| ns.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
    }
}

/// Corridor segments between the centers of neighboring rooms.
pub fn corridors<'a>(
    adjacency: &'a [Vec<usize>],
    centers: &'a [Vec2],
) -> impl Iterator<Item = (Vec2, Vec2)> + 'a {
    adjacency.iter().enumerate().flat_map(move |(a, ns)| {
        ns.iter()
            .filter(move |&&b| a < b)
            .map(move |&b| (centers[a], centers[b]))
    })
}
