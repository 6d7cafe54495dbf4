use crate::phase::HenyeyGreenstein;
use crate::ray::Ray;
use crate::rng::Rng;
use crate::spectrum::Spectrum;

mod grid;
mod homogeneous;

pub use self::grid::GridMedium;
pub use self::homogeneous::HomogeneousMedium;

/// Outcome of free-flight sampling along a ray segment.
#[derive(Debug, Copy, Clone)]
pub struct MediumDistanceSample {
    /// Parametric distance of the event (== tmax when the segment was
    /// crossed without scattering).
    pub t: f32,
    /// Contribution over pdf, with any analytic transmittance division
    /// folded in.
    pub weight: Spectrum,
    /// True for a medium event, false when the ray reached tmax.
    pub scattered: bool,
}

#[derive(Debug)]
pub enum Medium {
    Homogeneous(HomogeneousMedium),
    Heterogeneous(GridMedium),
}

impl Medium {
    pub fn phase(&self) -> &HenyeyGreenstein {
        match self {
            Medium::Homogeneous(m) => m.phase(),
            Medium::Heterogeneous(m) => m.phase(),
        }
    }

    pub fn sample_distance(
        &self,
        rng: &mut Rng,
        ray: &Ray,
        tmin: f32,
        tmax: f32,
    ) -> MediumDistanceSample {
        match self {
            Medium::Homogeneous(m) => m.sample_distance(rng, ray, tmin, tmax),
            Medium::Heterogeneous(m) => m.sample_distance(rng, ray, tmin, tmax),
        }
    }

    /// Unbiased transmittance estimate; exact for homogeneous media,
    /// stochastic for heterogeneous ones.
    pub fn eval_transmittance(&self, rng: &mut Rng, ray: &Ray, tmin: f32, tmax: f32) -> Spectrum {
        match self {
            Medium::Homogeneous(m) => m.eval_transmittance(rng, ray, tmin, tmax),
            Medium::Heterogeneous(m) => m.eval_transmittance(rng, ray, tmin, tmax),
        }
    }
}
