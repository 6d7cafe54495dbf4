use std::f32::consts::PI;

mod normal;
mod point;
mod vector;

pub use self::normal::Normal3;
pub use self::point::{Point2, Point3};
pub use self::vector::{Vector2, Vector3};

use crate::{clamp, Normal3f, Vector3f};

/// Create an orthogonal coordinate system from a single (normalized) vector.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vector3::new(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vector3::new(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    let v3 = v1.cross(&v2);

    (v2, v3)
}

/// Flip `n` so that it lies in the same hemisphere as `v`.
pub fn face_forward(n: &Normal3f, v: &Vector3f) -> Normal3f {
    if n.dot(v) < 0.0 {
        -*n
    } else {
        *n
    }
}

/// Mirror reflection of `wi` about `n`. Both `wi` and the result point
/// away from the surface.
pub fn reflect(wi: &Vector3f, n: &Normal3f) -> Vector3f {
    n.to_vector() * (2.0 * n.dot(wi)) - *wi
}

/// Refract `wi` across `n` with relative index `eta = n_i / n_t`.
/// `wi` points away from the surface on the incident side and `n` is
/// oriented toward it (`wi·n > 0`). Returns the transmitted direction
/// and whether total internal reflection occurred (in which case the
/// direction is meaningless).
pub fn refract(wi: &Vector3f, n: &Normal3f, eta: f32) -> (Vector3f, bool) {
    let cos_i = n.dot(wi);
    let disc = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if disc < 0.0 {
        return (Vector3f::new(0.0, 0.0, 0.0), true);
    }
    let wt = -eta * *wi + n.to_vector() * (eta * cos_i - disc.sqrt());

    (wt, false)
}

pub fn spherical_direction(sin_theta: f32, cos_theta: f32, phi: f32) -> Vector3f {
    Vector3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

pub fn spherical_theta(v: &Vector3f) -> f32 {
    clamp(v.z, -1.0, 1.0).acos()
}

pub fn spherical_phi(v: &Vector3f) -> f32 {
    let p = v.y.atan2(v.x);
    if p < 0.0 {
        p + 2.0 * PI
    } else {
        p
    }
}

/// Whether two local shading-frame directions (normal = +z) lie on the
/// same side of the surface.
#[inline]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    w.z * wp.z > 0.0
}
