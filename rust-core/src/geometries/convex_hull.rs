// Convex hull of a small 3D point cloud by supporting-plane enumeration
//
// Every non-collinear triple spans a candidate plane; the plane is a facet when all
// points lie on one side of it. A point is a hull *vertex* when it lies on three or more
// facet planes, on an edge when it lies on two, and inside a face when it lies on one.
// The enumeration is O(n⁴), which is intended for reciprocal shells and similar clouds of
// a few dozen points; points lying in faces or on edges never become vertices.

use log::debug;
use nalgebra::Vector3;

use crate::config::HULL_TOLERANCE;
use crate::error::CrystalError;
use crate::lattice::polyhedron::Polyhedron;
use crate::Result;

/// A supporting plane `normal · x = offset` with all input points on the `≤` side.
#[derive(Debug, Clone)]
pub struct HullFacet {
    /// Outward unit normal
    pub normal: Vector3<f64>,
    pub offset: f64,
    /// Hull vertices on this facet, counter-clockwise seen from outside (input indices)
    pub vertices: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct ConvexHull {
    points: Vec<Vector3<f64>>,
    /// Input indices of hull vertices, ascending
    vertices: Vec<usize>,
    facets: Vec<HullFacet>,
    tolerance: f64,
}

impl ConvexHull {
    /// Build the hull of `points`.
    ///
    /// Fails with `DegenerateGeometry` when the cloud has fewer than four affinely
    /// independent points (empty, collinear or coplanar input).
    pub fn new(points: &[Vector3<f64>]) -> Result<Self> {
        if points.iter().any(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(CrystalError::InvalidArgument(
                "convex hull input contains non-finite coordinates".to_string(),
            ));
        }

        let scale = cloud_scale(points);
        let tolerance = HULL_TOLERANCE * scale.max(f64::MIN_POSITIVE);
        ensure_affinely_independent(points, tolerance)?;

        // 1) Enumerate supporting planes
        let mut planes: Vec<(Vector3<f64>, f64)> = Vec::new();
        let n = points.len();
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let normal = (points[j] - points[i]).cross(&(points[k] - points[i]));
                    let norm = normal.norm();
                    if norm <= tolerance * scale {
                        continue; // collinear triple
                    }
                    let mut normal = normal / norm;
                    let mut offset = normal.dot(&points[i]);

                    if planes.iter().any(|(nn, oo)| same_plane(nn, *oo, &normal, offset, tolerance)) {
                        continue;
                    }

                    let above = points.iter().any(|p| normal.dot(p) - offset > tolerance);
                    let below = points.iter().any(|p| normal.dot(p) - offset < -tolerance);
                    match (above, below) {
                        (true, true) => continue,
                        (true, false) => {
                            normal = -normal;
                            offset = -offset;
                        }
                        _ => {}
                    }
                    planes.push((normal, offset));
                }
            }
        }

        // 2) Classify points by the number of facet planes they touch
        let on_plane: Vec<Vec<usize>> = planes
            .iter()
            .map(|(normal, offset)| {
                (0..n)
                    .filter(|&idx| (normal.dot(&points[idx]) - offset).abs() <= tolerance)
                    .collect()
            })
            .collect();

        let mut incidence = vec![0usize; n];
        for members in &on_plane {
            for &idx in members {
                incidence[idx] += 1;
            }
        }
        let is_vertex: Vec<bool> = incidence.iter().map(|&count| count >= 3).collect();
        let vertices: Vec<usize> = (0..n).filter(|&idx| is_vertex[idx]).collect();

        // 3) Order the vertices of each facet around its centre
        let facets = planes
            .into_iter()
            .zip(on_plane)
            .map(|((normal, offset), members)| {
                let corner_ids: Vec<usize> =
                    members.into_iter().filter(|&idx| is_vertex[idx]).collect();
                HullFacet {
                    vertices: order_around_normal(points, corner_ids, &normal),
                    normal,
                    offset,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "convex hull: {} points -> {} vertices, {} facets",
            n,
            vertices.len(),
            facets.len()
        );

        Ok(ConvexHull {
            points: points.to_vec(),
            vertices,
            facets,
            tolerance,
        })
    }

    /// Input indices of the hull vertices, in input order.
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Coordinates of the hull vertices, in input order.
    pub fn vertex_points(&self) -> Vec<Vector3<f64>> {
        self.vertices.iter().map(|&idx| self.points[idx]).collect()
    }

    pub fn facets(&self) -> &[HullFacet] {
        &self.facets
    }

    /// `true` when `point` is inside or on the hull.
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        self.facets
            .iter()
            .all(|facet| facet.normal.dot(point) - facet.offset <= self.tolerance)
    }

    /// The hull as a [`Polyhedron`] whose vertices are the hull vertices in input order.
    pub fn to_polyhedron(&self) -> Polyhedron {
        let mut remap = vec![usize::MAX; self.points.len()];
        for (new_idx, &old_idx) in self.vertices.iter().enumerate() {
            remap[old_idx] = new_idx;
        }

        let faces = self
            .facets
            .iter()
            .map(|facet| facet.vertices.iter().map(|&idx| remap[idx]).collect())
            .collect();

        Polyhedron::from_faces(self.vertex_points(), faces)
    }
}

// ======================== HELPER FUNCTIONS ========================

fn cloud_scale(points: &[Vector3<f64>]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let centroid = points.iter().fold(Vector3::zeros(), |acc, p| acc + p) / points.len() as f64;
    points
        .iter()
        .map(|p| (p - centroid).norm())
        .fold(0.0, f64::max)
}

fn same_plane(
    n1: &Vector3<f64>,
    o1: f64,
    n2: &Vector3<f64>,
    o2: f64,
    tolerance: f64,
) -> bool {
    const NORMAL_TOLERANCE: f64 = 1e-7;
    ((n1 - n2).norm() < NORMAL_TOLERANCE && (o1 - o2).abs() <= tolerance)
        || ((n1 + n2).norm() < NORMAL_TOLERANCE && (o1 + o2).abs() <= tolerance)
}

/// Fail unless the cloud spans three dimensions.
pub(crate) fn ensure_affinely_independent(points: &[Vector3<f64>], tolerance: f64) -> Result<()> {
    let degenerate = |what: &str| {
        Err(CrystalError::DegenerateGeometry(format!(
            "point set of {} points is {}; a 3D hull needs 4 affinely independent points",
            points.len(),
            what
        )))
    };

    let Some(origin) = points.first() else {
        return degenerate("empty");
    };

    let Some(direction) = points
        .iter()
        .map(|p| p - origin)
        .find(|d| d.norm() > tolerance)
    else {
        return degenerate("a single location");
    };

    let Some(normal) = points
        .iter()
        .map(|p| direction.cross(&(p - origin)))
        .find(|c| c.norm() > tolerance * direction.norm())
    else {
        return degenerate("collinear");
    };

    let unit = normal.normalize();
    if points.iter().all(|p| unit.dot(&(p - origin)).abs() <= tolerance) {
        return degenerate("coplanar");
    }
    Ok(())
}

// Sort facet vertices counter-clockwise around the outward normal
fn order_around_normal(
    points: &[Vector3<f64>],
    mut ids: Vec<usize>,
    normal: &Vector3<f64>,
) -> Vec<usize> {
    if ids.len() < 3 {
        return ids;
    }
    let center = ids.iter().fold(Vector3::zeros(), |acc, &i| acc + points[i]) / ids.len() as f64;
    let u = (points[ids[0]] - center).normalize();
    let v = normal.cross(&u);

    let angle = |idx: usize| {
        let d = points[idx] - center;
        d.dot(&v).atan2(d.dot(&u))
    };
    ids.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
    ids
}
