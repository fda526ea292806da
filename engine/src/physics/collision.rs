//! Collision detection module
//!
//! Contact generation for the rigid body world, in two stages:
//!
//! - **Broad phase**: world-space [`Aabb`] overlap between every pair of bodies
//! - **Narrow phase**: exact test per shape pair
//!   - cuboid vs cuboid: separating-axis test over the 15 candidate axes
//!   - cuboid vs sphere: closest point on the box in box-local space
//!   - sphere vs sphere: center distance
//!
//! All narrow-phase functions report the contact normal pointing from the
//! first shape toward the second.
//!
//! # Example
//!
//! ```ignore
//! use drop_box_engine::physics::collision::{shape_contact, Pose};
//! use drop_box_engine::physics::Shape;
//! use glam::Vec3;
//!
//! let ground = Shape::cuboid(Vec3::new(5.0, 0.25, 5.0));
//! let ball = Shape::sphere(0.5);
//! if let Some(c) = shape_contact(&ground, &Pose::at(Vec3::ZERO), &ball, &Pose::at(Vec3::new(0.0, 0.7, 0.0))) {
//!     println!("penetration {} along {}", c.penetration, c.normal);
//! }
//! ```

use glam::{Mat3, Quat, Vec3};

use super::body::Shape;
use super::registry::BodyHandle;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Overlap test, touching boxes count as overlapping. NaN bounds never overlap.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

/// Position and orientation of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

/// Most points a single contact manifold holds.
pub const MAX_MANIFOLD_POINTS: usize = 8;

/// Corners this close behind a reference face still join the manifold (m).
///
/// Points with a small gap are kept as speculative contacts so a tipping box
/// lands on its whole face instead of bouncing between edges.
pub const CONTACT_TOLERANCE: f32 = 0.01;

/// One point of a contact manifold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactPoint {
    /// World-space position, halfway between the two surfaces
    pub position: Vec3,
    /// Depth along the manifold normal, negative for a speculative gap
    pub penetration: f32,
}

/// Geometric result of a narrow-phase test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactGeometry {
    /// Unit normal pointing from the first shape toward the second
    pub normal: Vec3,
    /// Deepest overlap along the normal (>= 0)
    pub penetration: f32,
    points: [ContactPoint; MAX_MANIFOLD_POINTS],
    point_count: usize,
}

impl ContactGeometry {
    fn new(normal: Vec3, penetration: f32) -> Self {
        Self {
            normal,
            penetration,
            points: [ContactPoint::default(); MAX_MANIFOLD_POINTS],
            point_count: 0,
        }
    }

    /// Manifold with a single point.
    pub fn single(normal: Vec3, penetration: f32, position: Vec3) -> Self {
        let mut geometry = Self::new(normal, penetration);
        geometry.push(ContactPoint { position, penetration });
        geometry
    }

    pub fn points(&self) -> &[ContactPoint] {
        &self.points[..self.point_count]
    }

    fn push(&mut self, point: ContactPoint) {
        if self.point_count < MAX_MANIFOLD_POINTS {
            self.points[self.point_count] = point;
            self.point_count += 1;
        }
    }

    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// A contact manifold between two bodies of the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: BodyHandle,
    pub b: BodyHandle,
    /// Normal (pointing from `a` toward `b`), depth and points
    pub geometry: ContactGeometry,
}

impl Contact {
    pub fn new(a: BodyHandle, b: BodyHandle, geometry: ContactGeometry) -> Self {
        Self { a, b, geometry }
    }

    pub fn normal(&self) -> Vec3 {
        self.geometry.normal
    }

    pub fn penetration(&self) -> f32 {
        self.geometry.penetration
    }

    pub fn points(&self) -> &[ContactPoint] {
        self.geometry.points()
    }
}

/// Dispatch to the narrow-phase test for the given shape pair.
pub fn shape_contact(a: &Shape, pose_a: &Pose, b: &Shape, pose_b: &Pose) -> Option<ContactGeometry> {
    match (*a, *b) {
        (Shape::Cuboid { half_extents: ha }, Shape::Cuboid { half_extents: hb }) => {
            cuboid_cuboid(pose_a, ha, pose_b, hb)
        }
        (Shape::Cuboid { half_extents }, Shape::Sphere { radius }) => {
            cuboid_sphere(pose_a, half_extents, pose_b.position, radius)
        }
        (Shape::Sphere { radius }, Shape::Cuboid { half_extents }) => {
            cuboid_sphere(pose_b, half_extents, pose_a.position, radius).map(ContactGeometry::flipped)
        }
        (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
            sphere_sphere(pose_a.position, ra, pose_b.position, rb)
        }
    }
}

/// Sphere vs sphere. Concentric spheres are pushed apart along +Y.
pub fn sphere_sphere(center_a: Vec3, radius_a: f32, center_b: Vec3, radius_b: f32) -> Option<ContactGeometry> {
    let delta = center_b - center_a;
    let dist_sq = delta.length_squared();
    let min_dist = radius_a + radius_b;

    if dist_sq > min_dist * min_dist {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-6 { delta / dist } else { Vec3::Y };
    let penetration = min_dist - dist;
    let surface = center_a + normal * (radius_a - penetration * 0.5);
    Some(ContactGeometry::single(normal, penetration, surface))
}

/// Oriented box vs sphere, normal from the box toward the sphere.
pub fn cuboid_sphere(box_pose: &Pose, half_extents: Vec3, center: Vec3, radius: f32) -> Option<ContactGeometry> {
    let local = box_pose.orientation.inverse() * (center - box_pose.position);
    let closest = local.clamp(-half_extents, half_extents);
    let offset = local - closest;
    let dist_sq = offset.length_squared();

    if dist_sq > 1e-12 {
        // Center outside the box
        if dist_sq > radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(ContactGeometry::single(
            box_pose.orientation * (offset / dist),
            radius - dist,
            box_pose.position + box_pose.orientation * closest,
        ));
    }

    // Center inside the box: push out through the nearest face
    let depth = half_extents - local.abs();
    let (axis, face_depth) = if depth.x <= depth.y && depth.x <= depth.z {
        (Vec3::X * sign(local.x), depth.x)
    } else if depth.y <= depth.z {
        (Vec3::Y * sign(local.y), depth.y)
    } else {
        (Vec3::Z * sign(local.z), depth.z)
    };
    let face_point = local + axis * face_depth;

    Some(ContactGeometry::single(
        box_pose.orientation * axis,
        radius + face_depth,
        box_pose.position + box_pose.orientation * face_point,
    ))
}

/// Feature that produced the separating-axis normal.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Feature {
    FaceA(usize),
    FaceB(usize),
    Edge,
}

/// Oriented box in world space.
struct Obb {
    center: Vec3,
    axes: [Vec3; 3],
    half: [f32; 3],
}

impl Obb {
    fn new(pose: &Pose, half_extents: Vec3) -> Self {
        let rot = Mat3::from_quat(pose.orientation);
        Self {
            center: pose.position,
            axes: [rot.x_axis, rot.y_axis, rot.z_axis],
            half: half_extents.to_array(),
        }
    }

    /// Radius of the box projected onto `axis`.
    #[inline]
    fn project(&self, axis: Vec3) -> f32 {
        self.axes
            .iter()
            .zip(self.half)
            .map(|(box_axis, half)| half * box_axis.dot(axis).abs())
            .sum()
    }

    /// Corner furthest along `direction`.
    fn support(&self, direction: Vec3) -> Vec3 {
        self.axes
            .iter()
            .zip(self.half)
            .fold(self.center, |point, (axis, half)| point + *axis * half * sign(axis.dot(direction)))
    }

    fn contains(&self, point: Vec3, tolerance: f32) -> bool {
        let local = point - self.center;
        self.axes
            .iter()
            .zip(self.half)
            .all(|(axis, half)| local.dot(*axis).abs() <= half + tolerance)
    }

    fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|i| {
            let signs = [
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            ];
            self.axes
                .iter()
                .zip(self.half)
                .zip(signs)
                .fold(self.center, |point, ((axis, half), s)| point + *axis * half * s)
        })
    }
}

/// Separating-axis test between two oriented boxes.
///
/// Candidate axes are the three face normals of each box and the nine
/// pairwise edge cross products. The axis with the smallest overlap becomes
/// the contact normal. Edge axes must beat face axes by a small margin so
/// that resting boxes keep a stable face normal.
///
/// A face normal yields every corner of the other box lying behind that face
/// (up to [`CONTACT_TOLERANCE`] in front of it) and inside its outline, or
/// failing that the corners of the face covered by the other box. An edge
/// normal, or a face with neither, yields one point midway between the two
/// deepest corners.
pub fn cuboid_cuboid(pose_a: &Pose, half_a: Vec3, pose_b: &Pose, half_b: Vec3) -> Option<ContactGeometry> {
    const EDGE_AXIS_BIAS: f32 = 1e-4;

    let box_a = Obb::new(pose_a, half_a);
    let box_b = Obb::new(pose_b, half_b);
    let delta = box_b.center - box_a.center;

    let mut best_overlap = f32::INFINITY;
    let mut best_axis = Vec3::ZERO;
    let mut best_feature = Feature::Edge;

    // Returns false when the axis separates the boxes
    let mut test_axis = |axis: Vec3, bias: f32, feature: Feature| -> bool {
        let len_sq = axis.length_squared();
        if len_sq < 1e-8 {
            // Parallel edges, the cross product carries no direction
            return true;
        }
        let axis = axis / len_sq.sqrt();
        let distance = delta.dot(axis);
        let overlap = box_a.project(axis) + box_b.project(axis) - distance.abs();
        if overlap < 0.0 {
            return false;
        }
        if overlap + bias < best_overlap {
            best_overlap = overlap;
            best_axis = if distance < 0.0 { -axis } else { axis };
            best_feature = feature;
        }
        true
    };

    for (i, axis) in box_a.axes.iter().enumerate() {
        if !test_axis(*axis, 0.0, Feature::FaceA(i)) {
            return None;
        }
    }
    for (i, axis) in box_b.axes.iter().enumerate() {
        if !test_axis(*axis, 0.0, Feature::FaceB(i)) {
            return None;
        }
    }
    for edge_a in &box_a.axes {
        for edge_b in &box_b.axes {
            if !test_axis(edge_a.cross(*edge_b), EDGE_AXIS_BIAS, Feature::Edge) {
                return None;
            }
        }
    }

    if !best_overlap.is_finite() {
        return None;
    }

    let mut geometry = ContactGeometry::new(best_axis, best_overlap);
    match best_feature {
        Feature::FaceA(face) => face_points(&mut geometry, &box_a, face, best_axis, &box_b),
        Feature::FaceB(face) => face_points(&mut geometry, &box_b, face, -best_axis, &box_a),
        Feature::Edge => {}
    }
    if geometry.points().is_empty() {
        let deepest_a = box_a.support(best_axis);
        let deepest_b = box_b.support(-best_axis);
        geometry.push(ContactPoint {
            position: (deepest_a + deepest_b) * 0.5,
            penetration: best_overlap,
        });
    }

    Some(geometry)
}

/// Corners of `incident` behind the `face` of `reference` whose normal is `outward`.
fn face_points(geometry: &mut ContactGeometry, reference: &Obb, face: usize, outward: Vec3, incident: &Obb) {
    let plane = reference.center + outward * reference.half[face];
    let side_u = (face + 1) % 3;
    let side_v = (face + 2) % 3;

    for corner in incident.corners() {
        let depth = (plane - corner).dot(outward);
        if depth < -CONTACT_TOLERANCE {
            continue;
        }
        let local = corner - reference.center;
        let inside = local.dot(reference.axes[side_u]).abs() <= reference.half[side_u] + CONTACT_TOLERANCE
            && local.dot(reference.axes[side_v]).abs() <= reference.half[side_v] + CONTACT_TOLERANCE;
        if inside {
            geometry.push(ContactPoint {
                position: corner + outward * (depth * 0.5),
                penetration: depth,
            });
        }
    }
    if !geometry.points().is_empty() {
        return;
    }

    // Incident face overhangs the reference face: use the reference corners it covers
    let floor = incident.support(-outward).dot(outward);
    for corner in reference.corners() {
        if (corner - reference.center).dot(outward) <= 0.0 || !incident.contains(corner, CONTACT_TOLERANCE) {
            continue;
        }
        let depth = corner.dot(outward) - floor;
        geometry.push(ContactPoint {
            position: corner - outward * (depth * 0.5),
            penetration: depth,
        });
    }
}

/// Like `signum` but maps zero to +1.
#[inline]
fn sign(value: f32) -> f32 {
    if value < 0.0 { -1.0 } else { 1.0 }
}
