// Brillouin zone envelope from a cloud of reciprocal lattice points

use log::debug;
use nalgebra::Vector3;

use crate::geometries::ConvexHull;
use crate::lattice::polyhedron::Polyhedron;
use crate::Result;

/// Convex hull of `reciprocal_points` as a [`Polyhedron`].
///
/// Only true hull corners are kept as vertices (points inside hull faces or on hull edges
/// are dropped), in the order they appear in the input. Fails with `DegenerateGeometry`
/// for clouds with fewer than four affinely independent points, e.g. from a 1D or 2D
/// lattice.
pub fn first_brillouin_zone(reciprocal_points: &[Vector3<f64>]) -> Result<Polyhedron> {
    let hull = ConvexHull::new(reciprocal_points)?;
    let zone = hull.to_polyhedron();

    debug!(
        "brillouin zone: {} vertices, {} faces, volume {:.6}",
        zone.vertices.len(),
        zone.faces.len(),
        zone.measure
    );

    Ok(zone)
}
