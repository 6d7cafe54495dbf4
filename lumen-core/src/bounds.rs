use std::f32;

use crate::ray::Ray;
use crate::{Point2f, Point3f, Vector3f};

/// Axis-aligned raster window in [0,1]² coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds2f {
    pub p_min: Point2f,
    pub p_max: Point2f,
}

impl Bounds2f {
    pub fn from_points(p_min: Point2f, p_max: Point2f) -> Bounds2f {
        Bounds2f { p_min, p_max }
    }

    /// Whole unit square.
    pub fn unit() -> Bounds2f {
        Bounds2f::from_points(Point2f::new(0.0, 0.0), Point2f::new(1.0, 1.0))
    }

    pub fn lerp(&self, u: f32, v: f32) -> Point2f {
        Point2f::new(
            crate::lerp(u, self.p_min.x, self.p_max.x),
            crate::lerp(v, self.p_min.y, self.p_max.y),
        )
    }

    pub fn contains(&self, p: &Point2f) -> bool {
        p.x >= self.p_min.x && p.x <= self.p_max.x && p.y >= self.p_min.y && p.y <= self.p_max.y
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3f {
    pub p_min: Point3f,
    pub p_max: Point3f,
}

impl Bounds3f {
    /// Empty bounds, ready to be unioned with points.
    pub fn empty() -> Bounds3f {
        Bounds3f {
            p_min: Point3f::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            p_max: Point3f::new(-f32::INFINITY, -f32::INFINITY, -f32::INFINITY),
        }
    }

    pub fn from_points(p1: &Point3f, p2: &Point3f) -> Bounds3f {
        Bounds3f {
            p_min: Point3f::new(p1.x.min(p2.x), p1.y.min(p2.y), p1.z.min(p2.z)),
            p_max: Point3f::new(p1.x.max(p2.x), p1.y.max(p2.y), p1.z.max(p2.z)),
        }
    }

    pub fn union_point(&self, p: &Point3f) -> Bounds3f {
        Bounds3f {
            p_min: Point3f::new(
                self.p_min.x.min(p.x),
                self.p_min.y.min(p.y),
                self.p_min.z.min(p.z),
            ),
            p_max: Point3f::new(
                self.p_max.x.max(p.x),
                self.p_max.y.max(p.y),
                self.p_max.z.max(p.z),
            ),
        }
    }

    pub fn union(&self, b: &Bounds3f) -> Bounds3f {
        self.union_point(&b.p_min).union_point(&b.p_max)
    }

    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    pub fn centroid(&self) -> Point3f {
        self.p_min + self.diagonal() * 0.5
    }

    /// Dimension with the largest extent.
    pub fn maximum_extent(&self) -> usize {
        let d = self.diagonal();
        if d.x > d.y {
            if d.x > d.z {
                0
            } else {
                2
            }
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    pub fn contains(&self, p: &Point3f) -> bool {
        p.x >= self.p_min.x
            && p.x <= self.p_max.x
            && p.y >= self.p_min.y
            && p.y <= self.p_max.y
            && p.z >= self.p_min.z
            && p.z <= self.p_max.z
    }

    /// Slab test against [t0, t1]. Returns the clipped parametric range.
    pub fn intersect_p(&self, ray: &Ray, t0: f32, t1: f32) -> Option<(f32, f32)> {
        let mut t0 = t0;
        let mut t1 = t1;
        for axis in 0..3 {
            let inv_d = 1.0 / ray.d[axis];
            let mut t_near = (self.p_min[axis] - ray.o[axis]) * inv_d;
            let mut t_far = (self.p_max[axis] - ray.o[axis]) * inv_d;
            if t_near > t_far {
                std::mem::swap(&mut t_near, &mut t_far);
            }
            t0 = if t_near > t0 { t_near } else { t0 };
            t1 = if t_far < t1 { t_far } else { t1 };
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}
