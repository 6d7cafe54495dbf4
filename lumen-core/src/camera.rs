use crate::ray::Ray;
use crate::{Point2f, Point3f, Vector3f};

/// Pinhole camera. The film plane sits at unit distance along the view
/// direction; `vfov` spans it vertically and `aspect` stretches it
/// horizontally.
#[derive(Debug, Clone)]
pub struct PinholeCamera {
    position: Point3f,
    /// Orthonormal view basis.
    right: Vector3f,
    up: Vector3f,
    forward: Vector3f,
    /// Tangent of the half vertical field of view.
    tf: f32,
}

impl PinholeCamera {
    pub fn new(position: Point3f, center: Point3f, up: Vector3f, vfov_degrees: f32) -> PinholeCamera {
        let forward = (center - position).normalize();
        let right = forward.cross(&up).normalize();
        let up = right.cross(&forward);

        PinholeCamera {
            position,
            right,
            up,
            forward,
            tf: (vfov_degrees.to_radians() * 0.5).tan(),
        }
    }

    pub fn position(&self) -> Point3f {
        self.position
    }

    /// Deterministic primary ray through raster position `rp ∈ [0,1]²`.
    pub fn primary_ray(&self, rp: &Point2f, aspect: f32) -> Ray {
        let x = (2.0 * rp.x - 1.0) * self.tf * aspect;
        let y = (2.0 * rp.y - 1.0) * self.tf;
        let d = (self.right * x + self.up * y + self.forward).normalize();

        Ray::new(self.position, d)
    }

    /// Inverse of `primary_ray`: the raster position a direction goes
    /// through, `None` when it misses the film.
    pub fn raster_position(&self, wo: &Vector3f, aspect: f32) -> Option<Point2f> {
        let z = wo.dot(&self.forward);
        if z <= 0.0 {
            return None;
        }
        let x = wo.dot(&self.right) / z;
        let y = wo.dot(&self.up) / z;
        let rp = Point2f::new(
            (x / (self.tf * aspect) + 1.0) * 0.5,
            (y / self.tf + 1.0) * 0.5,
        );
        if rp.x < 0.0 || rp.x > 1.0 || rp.y < 0.0 || rp.y > 1.0 {
            return None;
        }

        Some(rp)
    }

    /// Importance emitted along `wo`, which is also the solid-angle
    /// density of a raster-uniform primary ray. Zero off the film.
    pub fn importance(&self, wo: &Vector3f, aspect: f32) -> f32 {
        if self.raster_position(wo, aspect).is_none() {
            return 0.0;
        }
        let cos_theta = wo.normalize().dot(&self.forward);
        let film_area = 4.0 * self.tf * self.tf * aspect;

        1.0 / (film_area * cos_theta * cos_theta * cos_theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> PinholeCamera {
        PinholeCamera::new(
            Point3f::new(0.0, 1.0, 5.0),
            Point3f::new(0.0, 1.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            40.0,
        )
    }

    #[test]
    fn test_raster_round_trip() {
        let cam = camera();
        let aspect = 16.0 / 9.0;
        let mut rng = crate::rng::Rng::seeded(5);
        for _ in 0..200 {
            let rp = Point2f::new(rng.uniform_f32(), rng.uniform_f32());
            let ray = cam.primary_ray(&rp, aspect);
            let back = cam.raster_position(&ray.d, aspect).expect("on film");
            assert_relative_eq!(back.x, rp.x, epsilon = 1e-4);
            assert_relative_eq!(back.y, rp.y, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_center_looks_forward() {
        let cam = camera();
        let ray = cam.primary_ray(&Point2f::new(0.5, 0.5), 1.0);
        assert_relative_eq!(ray.d.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_importance_off_film() {
        let cam = camera();
        assert_eq!(cam.importance(&Vector3f::new(0.0, 0.0, 1.0), 1.0), 0.0);
        let on = cam.primary_ray(&Point2f::new(0.25, 0.75), 1.0);
        assert!(cam.importance(&on.d, 1.0) > 0.0);
    }
}
