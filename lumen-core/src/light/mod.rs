use crate::interaction::PointGeometry;
use crate::rng::Rng;
use crate::spectrum::Spectrum;
use crate::{Point3f, Vector3f};

mod area;
mod envmap;

pub use self::area::AreaLight;
pub use self::envmap::EnvLight;

/// Sample of a light point/direction toward a reference point.
/// Convention: `wo` points from the light toward the reference point,
/// so callers shade with `-wo`.
#[derive(Debug, Copy, Clone)]
pub struct DirectSample {
    pub geom: PointGeometry,
    pub wo: Vector3f,
    /// Density in the projected solid angle measure at the reference
    /// point (solid angle when the reference geometry is degenerate).
    pub pdf: f32,
    /// Emission toward the reference point.
    pub le: Spectrum,
}

/// Emission ray leaving the light, for paths traced from the light side.
#[derive(Debug, Copy, Clone)]
pub struct EmissionRaySample {
    pub geom: PointGeometry,
    pub wo: Vector3f,
    pub weight: Spectrum,
}

#[derive(Debug)]
pub enum Light {
    Area(AreaLight),
    Envmap(EnvLight),
}

impl Light {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Light::Envmap(_))
    }

    pub fn sample_direct(&self, rng: &mut Rng, ref_geom: &PointGeometry) -> Option<DirectSample> {
        match self {
            Light::Area(l) => l.sample_direct(rng, ref_geom),
            Light::Envmap(l) => l.sample_direct(rng, ref_geom),
        }
    }

    /// Density `sample_direct` would have produced this connection
    /// with, in the same measure.
    pub fn pdf_direct(
        &self,
        ref_geom: &PointGeometry,
        light_geom: &PointGeometry,
        wo: &Vector3f,
    ) -> f32 {
        match self {
            Light::Area(l) => l.pdf_direct(ref_geom, light_geom),
            Light::Envmap(l) => l.pdf_direct(ref_geom, wo),
        }
    }

    /// Emission at `light_geom` toward `wo` (pointing from the light to
    /// the viewer).
    pub fn eval(&self, light_geom: &PointGeometry, wo: &Vector3f) -> Spectrum {
        match self {
            Light::Area(l) => l.eval(light_geom, wo),
            Light::Envmap(l) => l.eval(light_geom),
        }
    }

    pub fn sample_ray(
        &self,
        rng: &mut Rng,
        world_center: Point3f,
        world_radius: f32,
    ) -> Option<EmissionRaySample> {
        match self {
            Light::Area(l) => l.sample_ray(rng),
            Light::Envmap(l) => l.sample_ray(rng, world_center, world_radius),
        }
    }
}
