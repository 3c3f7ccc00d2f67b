//! Delaunay triangulation (Bowyer-Watson).
//!
//! Points are inserted one at a time into a super-triangle that encloses the
//! whole set; triangles whose circumcircle contains the new point are carved
//! out and the hole is re-triangulated from its boundary edges.

use glam::DVec2;

use crate::error::TriangulationError;

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Triangle {
    /// Counter-clockwise vertex indices; indices >= n are super-triangle corners
    v: [usize; 3],
    circumcenter: DVec2,
    radius_sq: f64,
}

impl Triangle {
    fn new(a: usize, b: usize, c: usize, pts: &[DVec2]) -> Self {
        let v = if cross(pts[a], pts[b], pts[c]) < 0.0 {
            [a, c, b]
        } else {
            [a, b, c]
        };
        let (circumcenter, radius_sq) = circumcircle(pts[v[0]], pts[v[1]], pts[v[2]]);
        Self {
            v,
            circumcenter,
            radius_sq,
        }
    }

    fn in_circumcircle(&self, p: DVec2) -> bool {
        p.distance_squared(self.circumcenter) < self.radius_sq - EPSILON
    }

    fn edges(&self) -> [(usize, usize); 3] {
        [(self.v[0], self.v[1]), (self.v[1], self.v[2]), (self.v[2], self.v[0])]
    }
}

fn cross(o: DVec2, a: DVec2, b: DVec2) -> f64 {
    (a - o).perp_dot(b - o)
}

fn circumcircle(a: DVec2, b: DVec2, c: DVec2) -> (DVec2, f64) {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    let a2 = a.length_squared();
    let b2 = b.length_squared();
    let c2 = c.length_squared();
    let center = DVec2::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    );
    (center, center.distance_squared(a))
}

/// Reject inputs that have no triangulation.
fn check_degenerate(points: &[DVec2]) -> Result<(), TriangulationError> {
    if points.len() < 3 {
        return Err(TriangulationError::TooFewPoints { got: points.len() });
    }

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        points[i]
            .x
            .total_cmp(&points[j].x)
            .then(points[i].y.total_cmp(&points[j].y))
    });
    for pair in order.windows(2) {
        if points[pair[0]].distance_squared(points[pair[1]]) < EPSILON {
            let (first, second) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
            return Err(TriangulationError::DuplicatePoint { first, second });
        }
    }

    let origin = points[0];
    let axis = points[1];
    let scale = points
        .iter()
        .map(|p| p.distance(origin))
        .fold(1.0_f64, f64::max);
    if points[2..]
        .iter()
        .all(|&p| cross(origin, axis, p).abs() <= EPSILON * scale * scale)
    {
        return Err(TriangulationError::Collinear);
    }

    Ok(())
}

/// Triangulate `points`, returning counter-clockwise index triples.
///
/// Fails for fewer than three points, coincident points, or a collinear set.
pub fn triangulate(points: &[DVec2]) -> Result<Vec<[usize; 3]>, TriangulationError> {
    puffin::profile_function!();

    check_degenerate(points)?;

    let n = points.len();
    let (min, max) = points.iter().fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(lo, hi), &p| (lo.min(p), hi.max(p)),
    );
    let span = (max - min).max_element().max(1.0);
    let mid = (min + max) * 0.5;

    let mut pts = points.to_vec();
    pts.push(DVec2::new(mid.x - 20.0 * span, mid.y - span));
    pts.push(DVec2::new(mid.x, mid.y + 20.0 * span));
    pts.push(DVec2::new(mid.x + 20.0 * span, mid.y - span));

    let mut triangles = vec![Triangle::new(n, n + 1, n + 2, &pts)];

    for i in 0..n {
        let p = pts[i];

        let (bad, good): (Vec<Triangle>, Vec<Triangle>) =
            triangles.into_iter().partition(|t| t.in_circumcircle(p));
        triangles = good;

        // Boundary of the cavity: edges of bad triangles not shared with another bad triangle
        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for tri in &bad {
            for (a, b) in tri.edges() {
                let shared = bad.iter().any(|other| {
                    other.edges().iter().any(|&(c, d)| c == b && d == a)
                });
                if !shared {
                    boundary.push((a, b));
                }
            }
        }

        for (a, b) in boundary {
            triangles.push(Triangle::new(a, b, i, &pts));
        }
    }

    let mut result: Vec<[usize; 3]> = triangles
        .into_iter()
        .filter(|t| t.v.iter().all(|&v| v < n))
        .map(|t| t.v)
        .collect();
    result.sort_unstable();
    Ok(result)
}
