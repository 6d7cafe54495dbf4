use std::f32::consts;

use crate::{Point2f, Vector2f, Vector3f};

mod distribution1d;
mod distribution2d;

pub use self::distribution1d::Distribution1D;
pub use self::distribution2d::Distribution2D;

const FRAC_PI_4: f32 = consts::FRAC_PI_2 / 2.0;

pub fn uniform_sample_sphere(u1: f32, u2: f32) -> Vector3f {
    let z = 1.0 - 2.0 * u1;
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * consts::PI * u2;

    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

pub fn uniform_sphere_pdf() -> f32 {
    1.0 / (4.0 * consts::PI)
}

pub fn cosine_sample_hemisphere(u1: f32, u2: f32) -> Vector3f {
    let d = concentric_sample_disk(u1, u2);
    let z = (1.0 - d.x * d.x - d.y * d.y).max(0.0).sqrt();
    Vector3f::new(d.x, d.y, z)
}

pub fn concentric_sample_disk(u1: f32, u2: f32) -> Point2f {
    // Map uniform random numbers to [-1, 1]²
    let offset = Vector2f::new(2.0 * u1 - 1.0, 2.0 * u2 - 1.0);

    // Handle degeneracy at the origin
    if offset.x == 0.0 && offset.y == 0.0 {
        return Point2f::new(0.0, 0.0);
    }

    let (r, theta) = if offset.x.abs() > offset.y.abs() {
        (offset.x, FRAC_PI_4 * (offset.y / offset.x))
    } else {
        (
            offset.y,
            consts::FRAC_PI_2 - FRAC_PI_4 * (offset.x / offset.y),
        )
    };

    Point2f::new(r * theta.cos(), r * theta.sin())
}

/// Uniform barycentric coordinates over a triangle.
pub fn uniform_sample_triangle(u1: f32, u2: f32) -> Point2f {
    let su0 = u1.sqrt();
    Point2f::new(1.0 - su0, u2 * su0)
}

/// Balance heuristic over two strategies, with 0/0 ≝ 0.
#[inline]
pub fn balance_heuristic(f_pdf: f32, g_pdf: f32) -> f32 {
    if f_pdf == 0.0 && g_pdf == 0.0 {
        0.0
    } else {
        f_pdf / (f_pdf + g_pdf)
    }
}
