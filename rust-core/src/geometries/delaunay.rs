// Delaunay tetrahedralisation (Bowyer–Watson) and piecewise-linear interpolation
//
// Points are inserted one at a time. Every cell whose open circumsphere strictly contains
// the new point is removed and the cavity is re-filled by connecting its boundary faces to
// the point. The hull is closed by cells that share a single vertex at infinity, so the
// finite cells always tile the convex hull of the inserted points. Orientation and
// in-sphere decisions use exact adaptive predicates, which keeps the cavities star-shaped
// on the cospherical configurations of regular sample grids.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use nalgebra::{Matrix3, Vector3};
use robust::{insphere, orient3d, Coord3D};

use crate::config::HULL_TOLERANCE;
use crate::error::CrystalError;
use crate::geometries::convex_hull::ensure_affinely_independent;
use crate::Result;

/// Vertex index standing for the point at infinity.
const INFINITE: usize = usize::MAX;
/// Neighbor slot not yet linked.
const UNLINKED: usize = usize::MAX;
/// Relative slack accepted on barycentric weights during point location.
const LOCATE_TOLERANCE: f64 = 1e-9;

/// A tetrahedralisation of a scattered 3D point set.
#[derive(Debug, Clone)]
pub struct Tetrahedralization {
    points: Vec<Vector3<f64>>,
    tetrahedra: Vec<[usize; 4]>,
    locator: TetLocator,
}

impl Tetrahedralization {
    /// Triangulate `points`.
    ///
    /// Fails with `DegenerateGeometry` unless the points span three dimensions.
    pub fn new(points: &[Vector3<f64>]) -> Result<Self> {
        if points.iter().any(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(CrystalError::InvalidArgument(
                "triangulation input contains non-finite coordinates".to_string(),
            ));
        }

        let (lower, upper) = bounding_box(points);
        let extent = (upper - lower).norm();
        ensure_affinely_independent(points, HULL_TOLERANCE * extent.max(f64::MIN_POSITIVE))?;

        let tetrahedra = bowyer_watson(points)?;
        let locator = TetLocator::new(points, &tetrahedra, lower, upper);

        debug!(
            "tetrahedralisation: {} points -> {} tetrahedra",
            points.len(),
            tetrahedra.len()
        );

        Ok(Tetrahedralization {
            points: points.to_vec(),
            tetrahedra,
            locator,
        })
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn tetrahedra(&self) -> &[[usize; 4]] {
        &self.tetrahedra
    }

    /// Total volume covered by the tetrahedra.
    pub fn volume(&self) -> f64 {
        self.tetrahedra
            .iter()
            .map(|t| signed_volume(&self.points, t).abs())
            .sum()
    }

    /// Find the tetrahedron containing `point` and its barycentric weights.
    pub fn locate(&self, point: &Vector3<f64>) -> Option<(usize, [f64; 4])> {
        self.locator.locate(&self.points, &self.tetrahedra, point)
    }

    /// Linear interpolation of per-point `values` at `point`; `NaN` outside the hull.
    pub fn interpolate(&self, values: &[f64], point: &Vector3<f64>) -> f64 {
        match self.locate(point) {
            Some((tet, weights)) => self.tetrahedra[tet]
                .iter()
                .zip(weights)
                .map(|(&vertex, weight)| weight * values[vertex])
                .sum(),
            None => f64::NAN,
        }
    }
}

// ======================== CONSTRUCTION ========================

#[derive(Debug, Clone)]
struct Cell {
    vertices: [usize; 4],
    /// `neighbors[i]` shares the face opposite `vertices[i]`
    neighbors: [usize; 4],
}

impl Cell {
    fn infinite_slot(&self) -> Option<usize> {
        self.vertices.iter().position(|&v| v == INFINITE)
    }
}

/// One face on the cavity boundary: the cavity cell's vertices with the slot facing the
/// new point, and the outside cell with the slot that points back into the cavity.
struct BoundaryFace {
    vertices: [usize; 4],
    slot: usize,
    outside: usize,
    outside_slot: usize,
}

/// Incremental triangulation with a symbolic vertex at infinity. Finite cells are
/// positively oriented under `orient3d`; an infinite cell is positive when replacing its
/// infinite vertex by a point beyond its hull face gives a positive finite cell.
struct Builder<'a> {
    points: &'a [Vector3<f64>],
    cells: Vec<Cell>,
    alive: Vec<bool>,
    free: Vec<usize>,
    /// A live finite cell where point location starts
    last: usize,
}

fn bowyer_watson(points: &[Vector3<f64>]) -> Result<Vec<[usize; 4]>> {
    let seed = initial_simplex(points)?;
    let mut builder = Builder::new(points, seed);

    let mut skipped = 0usize;
    for p_idx in 0..points.len() {
        if seed.contains(&p_idx) {
            continue;
        }
        if !builder.insert(p_idx) {
            skipped += 1;
        }
    }

    if skipped > 0 {
        warn!("tetrahedralisation skipped {} coincident points", skipped);
    }

    Ok(builder.finite_cells())
}

// Four input points spanning a tetrahedron of non-zero exact volume, positively ordered
fn initial_simplex(points: &[Vector3<f64>]) -> Result<[usize; 4]> {
    let degenerate =
        || CrystalError::DegenerateGeometry("triangulation input spans fewer than 3 dimensions".to_string());

    let a = 0;
    let b = (0..points.len())
        .max_by(|&i, &j| {
            let di = (points[i] - points[a]).norm_squared();
            let dj = (points[j] - points[a]).norm_squared();
            di.total_cmp(&dj)
        })
        .ok_or_else(degenerate)?;
    let c = (0..points.len())
        .max_by(|&i, &j| {
            let ai = (points[b] - points[a]).cross(&(points[i] - points[a])).norm_squared();
            let aj = (points[b] - points[a]).cross(&(points[j] - points[a])).norm_squared();
            ai.total_cmp(&aj)
        })
        .ok_or_else(degenerate)?;
    let d = (0..points.len())
        .max_by(|&i, &j| {
            let oi = orient(points, [a, b, c, i]).abs();
            let oj = orient(points, [a, b, c, j]).abs();
            oi.total_cmp(&oj)
        })
        .ok_or_else(degenerate)?;

    let volume = orient(points, [a, b, c, d]);
    if volume == 0.0 {
        return Err(degenerate());
    }
    Ok(if volume > 0.0 { [a, b, c, d] } else { [b, a, c, d] })
}

impl<'a> Builder<'a> {
    fn new(points: &'a [Vector3<f64>], seed: [usize; 4]) -> Self {
        let mut cells = vec![Cell {
            vertices: seed,
            neighbors: [UNLINKED; 4],
        }];

        // Swapping two finite slots after placing the infinite vertex flips the
        // orientation back so each hull cell faces outward
        for slot in 0..4 {
            let mut vertices = seed;
            vertices[slot] = INFINITE;
            let others: Vec<usize> = (0..4).filter(|&s| s != slot).collect();
            vertices.swap(others[0], others[1]);
            cells.push(Cell {
                vertices,
                neighbors: [UNLINKED; 4],
            });
        }

        let mut builder = Builder {
            points,
            alive: vec![true; cells.len()],
            cells,
            free: Vec::new(),
            last: 0,
        };
        builder.link_open_faces(&[0, 1, 2, 3, 4]);
        builder
    }

    fn coord(&self, idx: usize) -> Coord3D<f64> {
        let p = self.points[idx];
        Coord3D { x: p.x, y: p.y, z: p.z }
    }

    // orient3d of `vertices` with `slot` replaced by point `p_idx`
    fn orient_with(&self, vertices: &[usize; 4], slot: usize, p_idx: usize) -> f64 {
        let mut replaced = *vertices;
        replaced[slot] = p_idx;
        orient(self.points, replaced)
    }

    /// Does the open circumsphere of `cell_idx` strictly contain point `p_idx`?
    fn in_conflict(&self, cell_idx: usize, p_idx: usize) -> bool {
        let cell = &self.cells[cell_idx];
        match cell.infinite_slot() {
            None => {
                let [a, b, c, d] = cell.vertices.map(|v| self.coord(v));
                insphere(a, b, c, d, self.coord(p_idx)) > 0.0
            }
            Some(slot) => {
                let side = self.orient_with(&cell.vertices, slot, p_idx);
                if side > 0.0 {
                    true
                } else if side < 0.0 {
                    false
                } else {
                    // On the hull plane: inside the face's circumcircle exactly when inside
                    // the circumsphere of the finite cell behind it
                    self.in_conflict(cell.neighbors[slot], p_idx)
                }
            }
        }
    }

    /// Visibility walk from the last finite cell to a cell in conflict with `p_idx`.
    /// `None` when the point coincides with an existing vertex.
    fn locate_conflict(&self, p_idx: usize) -> Option<usize> {
        let mut current = self.last;
        for step in 0..self.cells.len() {
            let cell = &self.cells[current];
            if cell.infinite_slot().is_some() {
                if self.in_conflict(current, p_idx) {
                    return Some(current);
                }
                break;
            }

            let exit = (0..4)
                .map(|offset| (step + offset) % 4)
                .find(|&slot| self.orient_with(&cell.vertices, slot, p_idx) < 0.0);
            match exit {
                Some(slot) => current = cell.neighbors[slot],
                None => {
                    return self.in_conflict(current, p_idx).then_some(current);
                }
            }
        }

        debug!("point location walk did not settle; scanning all cells");
        (0..self.cells.len()).find(|&idx| self.alive[idx] && self.in_conflict(idx, p_idx))
    }

    /// Insert point `p_idx`; `false` if it duplicates an existing vertex.
    fn insert(&mut self, p_idx: usize) -> bool {
        let Some(start) = self.locate_conflict(p_idx) else {
            return false;
        };

        let mut cavity: HashSet<usize> = HashSet::new();
        let mut rejected: HashSet<usize> = HashSet::new();
        let mut stack = vec![start];
        cavity.insert(start);
        while let Some(cell_idx) = stack.pop() {
            for neighbor in self.cells[cell_idx].neighbors {
                if cavity.contains(&neighbor) || rejected.contains(&neighbor) {
                    continue;
                }
                if self.in_conflict(neighbor, p_idx) {
                    cavity.insert(neighbor);
                    stack.push(neighbor);
                } else {
                    rejected.insert(neighbor);
                }
            }
        }

        let mut boundary = Vec::new();
        for &cell_idx in &cavity {
            let cell = &self.cells[cell_idx];
            for slot in 0..4 {
                let outside = cell.neighbors[slot];
                if cavity.contains(&outside) {
                    continue;
                }
                let outside_slot = self.cells[outside]
                    .neighbors
                    .iter()
                    .position(|&n| n == cell_idx)
                    .unwrap_or(UNLINKED);
                boundary.push(BoundaryFace {
                    vertices: cell.vertices,
                    slot,
                    outside,
                    outside_slot,
                });
            }
        }
        // Deterministic refill order regardless of hash iteration
        boundary.sort_unstable_by_key(|face| (face.vertices, face.slot));

        for &cell_idx in &cavity {
            self.alive[cell_idx] = false;
            self.free.push(cell_idx);
        }
        self.free.sort_unstable_by(|a, b| b.cmp(a));

        let mut created = Vec::with_capacity(boundary.len());
        for face in boundary {
            let mut vertices = face.vertices;
            vertices[face.slot] = p_idx;
            let mut neighbors = [UNLINKED; 4];
            neighbors[face.slot] = face.outside;

            let new_idx = self.allocate(Cell { vertices, neighbors });
            if face.outside_slot != UNLINKED {
                self.cells[face.outside].neighbors[face.outside_slot] = new_idx;
            }
            created.push(new_idx);
        }
        self.link_open_faces(&created);

        if let Some(&finite) = created
            .iter()
            .find(|&&idx| self.cells[idx].infinite_slot().is_none())
        {
            self.last = finite;
        }
        true
    }

    fn allocate(&mut self, cell: Cell) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.cells[idx] = cell;
                self.alive[idx] = true;
                idx
            }
            None => {
                self.cells.push(cell);
                self.alive.push(true);
                self.cells.len() - 1
            }
        }
    }

    // Pair up unlinked faces among `ids` by their vertex sets
    fn link_open_faces(&mut self, ids: &[usize]) {
        let mut open: HashMap<[usize; 3], (usize, usize)> = HashMap::new();
        for &idx in ids {
            for slot in 0..4 {
                if self.cells[idx].neighbors[slot] != UNLINKED {
                    continue;
                }
                let key = face_key(&self.cells[idx].vertices, slot);
                match open.remove(&key) {
                    Some((other, other_slot)) => {
                        self.cells[idx].neighbors[slot] = other;
                        self.cells[other].neighbors[other_slot] = idx;
                    }
                    None => {
                        open.insert(key, (idx, slot));
                    }
                }
            }
        }
    }

    fn finite_cells(&self) -> Vec<[usize; 4]> {
        self.cells
            .iter()
            .zip(&self.alive)
            .filter(|(cell, alive)| **alive && cell.infinite_slot().is_none())
            .map(|(cell, _)| cell.vertices)
            .collect()
    }
}

fn face_key(vertices: &[usize; 4], slot: usize) -> [usize; 3] {
    let mut key = [0usize; 3];
    let mut n = 0;
    for (s, &v) in vertices.iter().enumerate() {
        if s != slot {
            key[n] = v;
            n += 1;
        }
    }
    key.sort_unstable();
    key
}

fn orient(points: &[Vector3<f64>], t: [usize; 4]) -> f64 {
    let [a, b, c, d] = t.map(|idx| {
        let p = points[idx];
        Coord3D { x: p.x, y: p.y, z: p.z }
    });
    orient3d(a, b, c, d)
}

fn signed_volume(points: &[Vector3<f64>], t: &[usize; 4]) -> f64 {
    let a = points[t[0]];
    (points[t[1]] - a).dot(&(points[t[2]] - a).cross(&(points[t[3]] - a))) / 6.0
}

fn bounding_box(points: &[Vector3<f64>]) -> (Vector3<f64>, Vector3<f64>) {
    let mut lower = Vector3::repeat(f64::INFINITY);
    let mut upper = Vector3::repeat(f64::NEG_INFINITY);
    for p in points {
        lower = lower.inf(p);
        upper = upper.sup(p);
    }
    (lower, upper)
}

// ======================== POINT LOCATION ========================

/// Uniform bucket grid over the bounding box; each bucket lists the tetrahedra whose
/// bounding boxes overlap it.
#[derive(Debug, Clone)]
struct TetLocator {
    lower: Vector3<f64>,
    cell_size: Vector3<f64>,
    dims: [usize; 3],
    buckets: Vec<Vec<usize>>,
    /// Inverse edge matrices for barycentric weights; `None` for flat tetrahedra
    inverses: Vec<Option<Matrix3<f64>>>,
}

impl TetLocator {
    fn new(
        points: &[Vector3<f64>],
        tetrahedra: &[[usize; 4]],
        lower: Vector3<f64>,
        upper: Vector3<f64>,
    ) -> Self {
        let per_axis = ((tetrahedra.len() as f64).cbrt().ceil() as usize).clamp(1, 64);
        let dims = [per_axis; 3];
        let span = (upper - lower).map(|s| if s > 0.0 { s } else { 1.0 });
        let cell_size = span / per_axis as f64;

        let mut locator = TetLocator {
            lower,
            cell_size,
            dims,
            buckets: vec![Vec::new(); per_axis * per_axis * per_axis],
            inverses: Vec::with_capacity(tetrahedra.len()),
        };

        for (tet_idx, tet) in tetrahedra.iter().enumerate() {
            let a = points[tet[0]];
            let edges = Matrix3::from_columns(&[
                points[tet[1]] - a,
                points[tet[2]] - a,
                points[tet[3]] - a,
            ]);
            let scale = edges.column_iter().map(|c| c.norm()).product::<f64>();
            let inverse = if edges.determinant().abs() > 1e-12 * scale {
                edges.try_inverse()
            } else {
                None
            };
            locator.inverses.push(inverse);
            if inverse.is_none() {
                continue;
            }

            let (tet_lower, tet_upper) = bounding_box(&tet.map(|v| points[v]));
            let from = locator.bucket_coords(&tet_lower);
            let to = locator.bucket_coords(&tet_upper);
            for i in from[0]..=to[0] {
                for j in from[1]..=to[1] {
                    for k in from[2]..=to[2] {
                        let bucket = locator.flat_index([i, j, k]);
                        locator.buckets[bucket].push(tet_idx);
                    }
                }
            }
        }

        locator
    }

    fn bucket_coords(&self, p: &Vector3<f64>) -> [usize; 3] {
        let mut coords = [0usize; 3];
        for axis in 0..3 {
            let t = ((p[axis] - self.lower[axis]) / self.cell_size[axis]).floor();
            coords[axis] = (t.max(0.0) as usize).min(self.dims[axis] - 1);
        }
        coords
    }

    fn flat_index(&self, c: [usize; 3]) -> usize {
        (c[0] * self.dims[1] + c[1]) * self.dims[2] + c[2]
    }

    fn locate(
        &self,
        points: &[Vector3<f64>],
        tetrahedra: &[[usize; 4]],
        point: &Vector3<f64>,
    ) -> Option<(usize, [f64; 4])> {
        if !point.iter().all(|c| c.is_finite()) {
            return None;
        }
        let slack = self.cell_size.norm() * 1e-9;
        let upper = self.lower + self.cell_size.component_mul(&Vector3::new(
            self.dims[0] as f64,
            self.dims[1] as f64,
            self.dims[2] as f64,
        ));
        if (0..3).any(|a| point[a] < self.lower[a] - slack || point[a] > upper[a] + slack) {
            return None;
        }

        let bucket = &self.buckets[self.flat_index(self.bucket_coords(point))];
        for &tet_idx in bucket {
            let Some(inverse) = self.inverses[tet_idx] else {
                continue;
            };
            let tet = tetrahedra[tet_idx];
            let local = inverse * (point - points[tet[0]]);
            let weights = [1.0 - local.sum(), local[0], local[1], local[2]];
            if weights.iter().all(|&w| w >= -LOCATE_TOLERANCE) {
                return Some((tet_idx, weights));
            }
        }
        None
    }
}
