use std::f32::consts::PI;

use crate::geometry::{coordinate_system, spherical_direction};
use crate::rng::Rng;
use crate::Vector3f;

/// Henyey–Greenstein phase function with asymmetry `g ∈ [-1, 1]`.
/// `g = 0` degrades to the uniform sphere.
#[derive(Debug, Copy, Clone)]
pub struct HenyeyGreenstein {
    g: f32,
}

#[derive(Debug, Copy, Clone)]
pub struct PhaseSample {
    pub wo: Vector3f,
    /// Phase value over pdf; 1 for the closed-form HG sampler.
    pub weight: f32,
}

fn phase_hg(cos_theta: f32, g: f32) -> f32 {
    let denom = 1.0 + g * g - 2.0 * g * cos_theta;
    (1.0 - g * g) / (4.0 * PI * denom * denom.sqrt())
}

impl HenyeyGreenstein {
    pub fn new(g: f32) -> HenyeyGreenstein {
        assert!((-1.0..=1.0).contains(&g));
        HenyeyGreenstein { g }
    }

    /// Phase value for the turn from incoming direction `-wi` to `wo`.
    /// Both arguments point away from the scattering point.
    pub fn eval(&self, wi: &Vector3f, wo: &Vector3f) -> f32 {
        phase_hg(-wi.dot(wo), self.g)
    }

    /// Densities match `eval` exactly (perfect importance sampling), in
    /// the plain solid-angle measure.
    pub fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> f32 {
        self.eval(wi, wo)
    }

    pub fn sample(&self, rng: &mut Rng, wi: &Vector3f) -> PhaseSample {
        let (u1, u2) = rng.uniform_2d();
        let g = self.g;
        let cos_theta = if g.abs() < 1e-3 {
            1.0 - 2.0 * u1
        } else {
            let sqr = (1.0 - g * g) / (1.0 + g - 2.0 * g * u1);
            (1.0 + g * g - sqr * sqr) / (2.0 * g)
        };
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let phi = 2.0 * PI * u2;
        // Frame around the incoming propagation direction.
        let d = -*wi;
        let (v1, v2) = coordinate_system(&d);
        let local = spherical_direction(sin_theta, cos_theta, phi);
        let wo = v1 * local.x + v2 * local.y + d * local.z;

        PhaseSample { wo, weight: 1.0 }
    }
}
