use glam::Vec3;

use crate::{
    collision::shapes::{ConvexShape, SupportMap},
    config::{CollisionConfig, DEFAULT_GJK_MAX_ITERATIONS, DEFAULT_REFINE_MAX_DEPTH},
    core::{collider::ColliderShape, object::PhysicsObject},
    utils::math::{any_perpendicular, axis_direction, triple_cross},
};

const EPSILON: f32 = 1e-6;
const REFINE_TOLERANCE: f32 = 1e-4;

/// Support point of the Minkowski difference `a - b` along `direction`.
pub fn minkowski_support<A, B>(a: &A, b: &B, direction: Vec3) -> Vec3
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    a.support(direction) - b.support(-direction)
}

/// Four points of the Minkowski difference enclosing the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simplex {
    points: [Vec3; 4],
}

/// A tetrahedron face: three vertex indices plus the opposite vertex.
const FACES: [([usize; 3], usize); 4] = [
    ([1, 2, 3], 0),
    ([0, 2, 3], 1),
    ([0, 1, 3], 2),
    ([0, 1, 2], 3),
];

impl Simplex {
    pub fn new(points: [Vec3; 4]) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Vec3; 4] {
        &self.points
    }

    pub fn centroid(&self) -> Vec3 {
        self.points.iter().copied().sum::<Vec3>() * 0.25
    }

    /// Unit normal of the face opposite `vertex`, oriented away from it.
    /// Zero for a degenerate face.
    pub fn outward_normal(&self, vertex: usize) -> Vec3 {
        let ([i, j, k], opposite) = FACES[vertex];
        let (p0, p1, p2) = (self.points[i], self.points[j], self.points[k]);
        let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
        if normal.dot(self.points[opposite] - p0) > 0.0 {
            -normal
        } else {
            normal
        }
    }

    /// Signed distance from `reference` to the plane of the face opposite
    /// `vertex`, positive when `reference` is on the inner side.
    pub fn face_distance(&self, vertex: usize, reference: Vec3) -> f32 {
        let ([i, _, _], _) = FACES[vertex];
        self.outward_normal(vertex).dot(self.points[i] - reference)
    }

    /// Face tests with normals oriented away from the centroid.
    pub fn encloses_origin(&self) -> bool {
        let centroid = self.centroid();
        FACES.iter().all(|&([i, j, k], _)| {
            let (p0, p1, p2) = (self.points[i], self.points[j], self.points[k]);
            let mut normal = (p1 - p0).cross(p2 - p0);
            if normal.dot(p0 - centroid) < 0.0 {
                normal = -normal;
            }
            normal.dot(p0) >= -EPSILON
        })
    }

    fn with_vertex(mut self, vertex: usize, point: Vec3) -> Self {
        self.points[vertex] = point;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GjkResult {
    NoIntersection,
    Intersection(Simplex),
}

impl GjkResult {
    pub fn is_intersecting(&self) -> bool {
        matches!(self, GjkResult::Intersection(_))
    }

    pub fn simplex(&self) -> Option<&Simplex> {
        match self {
            GjkResult::Intersection(simplex) => Some(simplex),
            GjkResult::NoIntersection => None,
        }
    }
}

/// Gilbert-Johnson-Keerthi overlap test on support functions.
#[derive(Debug, Clone, Copy)]
pub struct Gjk {
    max_iterations: usize,
}

impl Default for Gjk {
    fn default() -> Self {
        Self::new(DEFAULT_GJK_MAX_ITERATIONS)
    }
}

impl Gjk {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Touching shapes (origin on the boundary of the difference) do not
    /// count as intersecting.
    pub fn intersect<A, B>(&self, a: &A, b: &B) -> GjkResult
    where
        A: SupportMap + ?Sized,
        B: SupportMap + ?Sized,
    {
        let mut direction = a.center() - b.center();
        if direction.length_squared() < EPSILON {
            direction = Vec3::X;
        }
        let mut simplex: Vec<Vec3> = Vec::with_capacity(4);

        for _ in 0..self.max_iterations {
            let point = minkowski_support(a, b, direction);
            if point.dot(direction) < 0.0 {
                return GjkResult::NoIntersection;
            }

            simplex.push(point);
            if Self::evolve(&mut simplex, &mut direction) {
                return GjkResult::Intersection(Simplex::new([
                    simplex[0], simplex[1], simplex[2], simplex[3],
                ]));
            }
            if direction.length_squared() < EPSILON * EPSILON {
                log::trace!("gjk: origin lies on the simplex, treating as touching");
                return GjkResult::NoIntersection;
            }
        }

        log::warn!(
            "gjk: no verdict after {} iterations, reporting no collision",
            self.max_iterations
        );
        GjkResult::NoIntersection
    }

    /// Folds the newest point (last) into the simplex and picks the next
    /// search direction. Returns `true` once a tetrahedron encloses the origin.
    fn evolve(simplex: &mut Vec<Vec3>, direction: &mut Vec3) -> bool {
        match simplex.len() {
            1 => {
                *direction = -simplex[0];
                false
            }
            2 => {
                let a = simplex[1];
                let b = simplex[0];
                let ab = b - a;
                let ao = -a;
                let perpendicular = triple_cross(ab, ao, ab);
                *direction = if perpendicular.length_squared() < EPSILON {
                    // Origin is on the line through the segment.
                    any_perpendicular(ab)
                } else {
                    perpendicular
                };
                false
            }
            3 => {
                let a = simplex[2];
                let b = simplex[1];
                let c = simplex[0];
                let ab = b - a;
                let ac = c - a;
                let ao = -a;
                let abc = ab.cross(ac);

                if abc.length_squared() < EPSILON {
                    // Collinear: keep the newest edge and leave the line.
                    simplex.remove(0);
                    *direction = any_perpendicular(ab);
                } else if abc.cross(ac).dot(ao) > 0.0 {
                    simplex.remove(1);
                    *direction = triple_cross(ac, ao, ac);
                } else if ab.cross(abc).dot(ao) > 0.0 {
                    simplex.remove(0);
                    *direction = triple_cross(ab, ao, ab);
                } else if abc.dot(ao) > 0.0 {
                    *direction = abc;
                } else {
                    *direction = -abc;
                }
                false
            }
            4 => {
                let a = simplex[3];
                let ao = -a;
                // Faces through the newest point; the base face was already
                // checked when the triangle chose this direction.
                for (others, opposite) in [([2, 1], 0), ([1, 0], 2), ([0, 2], 1)] {
                    let b = simplex[others[0]];
                    let c = simplex[others[1]];
                    let mut normal = (b - a).cross(c - a);
                    if normal.dot(simplex[opposite] - a) > 0.0 {
                        normal = -normal;
                    }
                    if normal.dot(ao) > 0.0 {
                        *simplex = vec![c, b, a];
                        *direction = normal;
                        return false;
                    }
                }
                true
            }
            _ => false,
        }
    }
}

/// Outcome of a penetration query. `normal` points from the first shape
/// toward the second; moving the first shape by `-normal * depth` separates
/// them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    pub normal: Vec3,
    pub depth: f32,
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
struct FaceChoice {
    vertex: usize,
    normal: Vec3,
    distance: f32,
}

/// Simplified expanding-polytope step.
///
/// Works on a single tetrahedron: pick the face the shapes are approaching
/// through, push it out to the true boundary with one support query, and
/// repeat on the tetrahedron built from that face and the new point.
#[derive(Debug, Clone, Copy)]
pub struct PenetrationRefiner {
    max_depth: usize,
    offset: Vec3,
}

impl Default for PenetrationRefiner {
    fn default() -> Self {
        Self::new(DEFAULT_REFINE_MAX_DEPTH)
    }
}

impl PenetrationRefiner {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            offset: Vec3::ZERO,
        }
    }

    /// Measure face distances from `offset` instead of the origin.
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn refine<A, B>(&self, simplex: &Simplex, a: &A, b: &B) -> Penetration
    where
        A: SupportMap + ?Sized,
        B: SupportMap + ?Sized,
    {
        let relative_travel = b.travel() - a.travel();
        let mut tetrahedron = *simplex;
        let mut best: Option<FaceChoice> = None;

        for step in 0..self.max_depth {
            let Some((face, approached)) = self.select_face(&tetrahedron, relative_travel) else {
                break;
            };
            if step > 0 && !approached {
                // The new tetrahedron no longer faces the approach direction.
                log::debug!("refine: no approached face after {step} steps, keeping best");
                break;
            }
            best = Some(face);

            let candidate = minkowski_support(a, b, face.normal);
            let reach = face.normal.dot(candidate - self.offset);
            if reach - face.distance <= REFINE_TOLERANCE {
                return Penetration {
                    normal: face.normal,
                    depth: face.distance.max(0.0),
                    iterations: step + 1,
                    converged: true,
                };
            }
            tetrahedron = tetrahedron.with_vertex(face.vertex, candidate);
        }

        match best {
            Some(face) => {
                log::warn!(
                    "refine: no convergence within {} steps, using best face (depth {:.5})",
                    self.max_depth,
                    face.distance
                );
                Penetration {
                    normal: face.normal,
                    depth: face.distance.max(0.0),
                    iterations: self.max_depth,
                    converged: false,
                }
            }
            None => {
                log::warn!("refine: degenerate simplex, falling back to center axis");
                Penetration {
                    normal: (b.center() - a.center()).try_normalize().unwrap_or(Vec3::X),
                    depth: 0.0,
                    iterations: 0,
                    converged: false,
                }
            }
        }
    }

    /// Closest face among those whose normal opposes the relative travel,
    /// flagged `true`; closest face overall when none does (or when the
    /// shapes are not moving relative to each other).
    fn select_face(
        &self,
        tetrahedron: &Simplex,
        relative_travel: Vec3,
    ) -> Option<(FaceChoice, bool)> {
        let moving = relative_travel.length_squared() > EPSILON;
        let mut approached: Option<FaceChoice> = None;
        let mut any: Option<FaceChoice> = None;

        for vertex in 0..4 {
            let normal = tetrahedron.outward_normal(vertex);
            if normal == Vec3::ZERO {
                continue;
            }
            let distance = tetrahedron.face_distance(vertex, self.offset);
            if distance < -EPSILON {
                continue;
            }
            let choice = FaceChoice {
                vertex,
                normal,
                distance,
            };
            if moving && normal.dot(relative_travel) < 0.0 {
                keep_closest(&mut approached, choice);
            }
            keep_closest(&mut any, choice);
        }

        match approached {
            Some(face) => Some((face, true)),
            None => any.map(|face| (face, !moving)),
        }
    }
}

fn keep_closest(slot: &mut Option<FaceChoice>, candidate: FaceChoice) {
    match slot {
        Some(current) if current.distance <= candidate.distance => {}
        _ => *slot = Some(candidate),
    }
}

/// Shape-pair dispatcher over the collider tagged union.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrowPhase {
    gjk: Gjk,
    refiner: PenetrationRefiner,
}

impl NarrowPhase {
    pub fn new(config: &CollisionConfig) -> Self {
        Self {
            gjk: Gjk::new(config.gjk_max_iterations),
            refiner: PenetrationRefiner::new(config.refine_max_depth),
        }
    }

    pub fn gjk(&self) -> &Gjk {
        &self.gjk
    }

    /// Exact overlap test between two objects at their current positions.
    pub fn collide(&self, a: &PhysicsObject, b: &PhysicsObject) -> Option<Penetration> {
        match (a.shape(), b.shape()) {
            (
                ColliderShape::Box { .. } | ColliderShape::MultiBox { .. },
                ColliderShape::Box { .. } | ColliderShape::MultiBox { .. },
            ) => Self::box_penetration(a, b),
            (ColliderShape::Convex(_), _) | (_, ColliderShape::Convex(_)) => {
                self.convex_penetration(&ConvexShape::from_object(a), &ConvexShape::from_object(b))
            }
        }
    }

    pub fn convex_penetration<A, B>(&self, a: &A, b: &B) -> Option<Penetration>
    where
        A: SupportMap + ?Sized,
        B: SupportMap + ?Sized,
    {
        match self.gjk.intersect(a, b) {
            GjkResult::Intersection(simplex) => Some(self.refiner.refine(&simplex, a, b)),
            GjkResult::NoIntersection => None,
        }
    }

    /// Deepest overlap among all sub-box pairs, resolved along the axis of
    /// least overlap.
    fn box_penetration(a: &PhysicsObject, b: &PhysicsObject) -> Option<Penetration> {
        let mut deepest: Option<Penetration> = None;

        for box_a in a.shape().local_boxes() {
            let box_a = box_a.translated(a.position());
            for box_b in b.shape().local_boxes() {
                let box_b = box_b.translated(b.position());
                if !box_a.overlaps(&box_b) {
                    continue;
                }

                let per_axis = (box_a.max - box_b.min).min(box_b.max - box_a.min);
                let axis = (0..3)
                    .min_by(|&i, &j| per_axis[i].total_cmp(&per_axis[j]))
                    .unwrap_or(0);
                let depth = per_axis[axis];
                if depth <= 0.0 {
                    continue;
                }

                let toward_b = box_b.center()[axis] - box_a.center()[axis];
                let contact = Penetration {
                    normal: axis_direction(axis, toward_b),
                    depth,
                    iterations: 0,
                    converged: true,
                };
                match deepest {
                    Some(current) if current.depth >= depth => {}
                    _ => deepest = Some(contact),
                }
            }
        }

        deepest
    }
}
