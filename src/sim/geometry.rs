//! Vector helpers and ray casting against oriented boxes
//!
//! The ball is treated as a point moving along its velocity; obstacles are
//! boxes that may be rotated. A ray only hits a box from the outside.

use glam::{EulerRot, Quat, Vec3};

/// Direction components below this are treated as parallel to a slab
const PARALLEL_EPSILON: f32 = 1e-8;

/// Reflect a vector about a surface normal
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect(v: Vec3, normal: Vec3) -> Vec3 {
    v - 2.0 * v.dot(normal) * normal
}

/// Component of `v` lying in the plane with the given unit normal
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

/// Where a ray entered a box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the (unit) ray direction
    pub distance: f32,
    pub point: Vec3,
    /// Outward world-space normal of the entered face
    pub normal: Vec3,
}

/// A box with arbitrary orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

impl OrientedBox {
    pub fn axis_aligned(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
            rotation: Quat::IDENTITY,
        }
    }

    /// Box from full extents and XYZ Euler angles (radians)
    pub fn from_euler(center: Vec3, size: Vec3, euler: Vec3) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
            rotation: Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z),
        }
    }

    /// Whether a world-space point lies inside the box
    pub fn contains(&self, point: Vec3) -> bool {
        let local = self.rotation.inverse() * (point - self.center);
        local.abs().cmple(self.half_extents).all()
    }

    /// Cast a ray against the box (slab test in box space)
    ///
    /// `dir` must be normalized. Rays starting inside the box report no hit,
    /// as do hits farther than `max_distance`.
    pub fn ray_cast(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<RayHit> {
        let inv = self.rotation.inverse();
        let local_origin = inv * (origin - self.center);
        let local_dir = inv * dir;

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut enter_normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = local_origin[axis];
            let d = local_dir[axis];
            let h = self.half_extents[axis];

            if d.abs() < PARALLEL_EPSILON {
                // Parallel to this slab: must already be between its planes
                if o.abs() > h {
                    return None;
                }
                continue;
            }

            let t0 = (-h - o) / d;
            let t1 = (h - o) / d;
            let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };

            if near > t_enter {
                t_enter = near;
                enter_normal = Vec3::ZERO;
                enter_normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(far);

            if t_enter > t_exit {
                return None;
            }
        }

        if t_enter < 0.0 || t_enter > max_distance {
            return None;
        }

        Some(RayHit {
            distance: t_enter,
            point: origin + dir * t_enter,
            normal: (self.rotation * enter_normal).normalize_or_zero(),
        })
    }
}

/// Nearest hit of a ray over a set of boxes
pub fn ray_cast_nearest(
    boxes: &[OrientedBox],
    origin: Vec3,
    dir: Vec3,
    max_distance: f32,
) -> Option<RayHit> {
    boxes
        .iter()
        .filter_map(|b| b.ray_cast(origin, dir, max_distance))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}
