use num::zero;

use crate::bounds::Bounds2f;
use crate::geometry::coordinate_system;
use crate::{Normal3f, Point2f, Point3f, Vector3f};

/// Geometry of a sampled point: a surface point, a point inside a
/// medium, a degenerate endpoint position, or a direction at infinity.
///
/// Invariants: `infinite` implies `wo` is set and `p` is meaningless;
/// `degenerated` implies the point carries no usable surface area
/// measure (densities around it are expressed in solid angle).
#[derive(Debug, Copy, Clone)]
pub struct PointGeometry {
    pub p: Point3f,
    /// Shading normal.
    pub n: Normal3f,
    /// Shading frame tangent and bitangent; orthonormal with `n`.
    pub u: Vector3f,
    pub v: Vector3f,
    /// Texture coordinates.
    pub t: Point2f,
    /// Direction toward the point, only meaningful when `infinite`.
    pub wo: Vector3f,
    pub infinite: bool,
    pub degenerated: bool,
}

impl PointGeometry {
    /// Point on a surface with the shading frame derived from `n`.
    pub fn on_surface(p: Point3f, n: Normal3f, t: Point2f) -> PointGeometry {
        let (u, v) = coordinate_system(&n.to_vector());
        PointGeometry {
            p,
            n,
            u,
            v,
            t,
            wo: zero(),
            infinite: false,
            degenerated: false,
        }
    }

    /// Point inside a participating medium. No surface frame, densities
    /// around it are in plain solid angle.
    pub fn in_medium(p: Point3f) -> PointGeometry {
        PointGeometry {
            p,
            n: zero(),
            u: zero(),
            v: zero(),
            t: Point2f::new(0.0, 0.0),
            wo: zero(),
            infinite: false,
            degenerated: true,
        }
    }

    /// Degenerate endpoint position (e.g. a pinhole).
    pub fn degenerated(p: Point3f) -> PointGeometry {
        PointGeometry {
            p,
            n: zero(),
            u: zero(),
            v: zero(),
            t: Point2f::new(0.0, 0.0),
            wo: zero(),
            infinite: false,
            degenerated: true,
        }
    }

    /// Point at infinity. `wo` is the propagation direction from the
    /// environment toward the scene (the negation of the escaped ray's
    /// direction), matching the emission convention of light endpoints.
    pub fn infinite_direction(wo: Vector3f) -> PointGeometry {
        PointGeometry {
            p: zero(),
            n: zero(),
            u: zero(),
            v: zero(),
            t: Point2f::new(0.0, 0.0),
            wo,
            infinite: true,
            degenerated: false,
        }
    }

    /// World direction into the local shading frame.
    pub fn to_local(&self, w: &Vector3f) -> Vector3f {
        Vector3f::new(w.dot(&self.u), w.dot(&self.v), self.n.dot(w))
    }

    /// Local shading-frame direction back to world space.
    pub fn to_world(&self, w: &Vector3f) -> Vector3f {
        self.u * w.x + self.v * w.y + self.n.to_vector() * w.z
    }

    /// Cosine factor of the projected solid angle measure at this
    /// point, 1 where the measure degenerates to plain solid angle.
    pub fn measure_cos(&self, w: &Vector3f) -> f32 {
        if self.degenerated || self.infinite {
            1.0
        } else {
            self.n.dot(w).abs()
        }
    }
}

/// Geometry term between two sampled points: the Jacobian between the
/// product of projected solid angles and the area measure. Degenerate
/// endpoints drop their cosine, an infinite endpoint collapses the
/// distance to one.
pub fn geometry_term(g1: &PointGeometry, g2: &PointGeometry) -> f32 {
    debug_assert!(!(g1.infinite && g2.infinite));
    if g1.infinite || g2.infinite {
        let (finite, inf) = if g1.infinite { (g2, g1) } else { (g1, g2) };
        // Direction from the finite point toward the environment.
        let d = -inf.wo.normalize();
        return finite.measure_cos(&d);
    }
    let d = g2.p - g1.p;
    let d2 = d.length_squared();
    if d2 == 0.0 {
        return 0.0;
    }
    let w = d / d2.sqrt();
    g1.measure_cos(&w) * g2.measure_cos(&w) / d2
}

/// Role of a sampled point in the transport path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InteractionKind {
    /// Camera terminator; a primary ray is sampled through the given
    /// raster window.
    CameraEndpoint { window: Bounds2f, aspect: f32 },
    /// Point evaluated as an emitter rather than as a scatterer.
    LightEndpoint,
    SurfacePoint,
    MediumPoint,
    /// Escaped ray that hit the environment light.
    InfiniteEnv,
}

#[derive(Debug, Copy, Clone)]
pub struct SceneInteraction {
    pub kind: InteractionKind,
    /// Handle of the primitive carrying the material/light/camera/medium
    /// attached to the point.
    pub primitive: usize,
    pub geom: PointGeometry,
}

impl SceneInteraction {
    pub fn new(kind: InteractionKind, primitive: usize, geom: PointGeometry) -> SceneInteraction {
        SceneInteraction {
            kind,
            primitive,
            geom,
        }
    }

    /// Copy of this interaction with the role re-tagged. The same
    /// geometric point is evaluated as a scatterer during the walk and
    /// as an endpoint when it contributes emission.
    pub fn as_type(&self, kind: InteractionKind) -> SceneInteraction {
        SceneInteraction { kind, ..*self }
    }

    pub fn is_surface(&self) -> bool {
        matches!(self.kind, InteractionKind::SurfacePoint)
    }

    pub fn is_medium(&self) -> bool {
        matches!(self.kind, InteractionKind::MediumPoint)
    }

    pub fn is_camera_endpoint(&self) -> bool {
        matches!(self.kind, InteractionKind::CameraEndpoint { .. })
    }

    pub fn is_light_endpoint(&self) -> bool {
        matches!(self.kind, InteractionKind::LightEndpoint)
    }

    pub fn is_infinite_env(&self) -> bool {
        matches!(self.kind, InteractionKind::InfiniteEnv)
    }

    /// Terminator endpoints start a path rather than continue one.
    pub fn is_terminator(&self) -> bool {
        self.is_camera_endpoint() || self.is_light_endpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_local_frame_round_trip() {
        let g = PointGeometry::on_surface(
            Point3f::new(1.0, 2.0, 3.0),
            Normal3f::new(0.0, 1.0, 0.0),
            Point2f::new(0.0, 0.0),
        );
        let w = Vector3f::new(0.4, -0.3, 0.87).normalize();
        let back = g.to_world(&g.to_local(&w));
        assert_relative_eq!(back.x, w.x, epsilon = 1e-5);
        assert_relative_eq!(back.y, w.y, epsilon = 1e-5);
        assert_relative_eq!(back.z, w.z, epsilon = 1e-5);
    }

    #[test]
    fn test_as_type_retags_only() {
        let g = PointGeometry::on_surface(
            Point3f::new(0.0, 0.0, 0.0),
            Normal3f::new(0.0, 0.0, 1.0),
            Point2f::new(0.5, 0.5),
        );
        let sp = SceneInteraction::new(InteractionKind::SurfacePoint, 3, g);
        let ep = sp.as_type(InteractionKind::LightEndpoint);
        assert!(ep.is_light_endpoint());
        assert_eq!(ep.primitive, 3);
        assert_eq!(ep.geom.p, sp.geom.p);
    }

    #[test]
    fn test_geometry_term_inverse_square() {
        let g1 = PointGeometry::on_surface(
            Point3f::new(0.0, 0.0, 0.0),
            Normal3f::new(0.0, 0.0, 1.0),
            Point2f::new(0.0, 0.0),
        );
        let g2 = PointGeometry::on_surface(
            Point3f::new(0.0, 0.0, 2.0),
            Normal3f::new(0.0, 0.0, -1.0),
            Point2f::new(0.0, 0.0),
        );
        // Facing patches at distance 2: G = 1·1/4.
        assert_relative_eq!(geometry_term(&g1, &g2), 0.25, epsilon = 1e-6);
        // Symmetric.
        assert_relative_eq!(geometry_term(&g2, &g1), 0.25, epsilon = 1e-6);
    }
}
