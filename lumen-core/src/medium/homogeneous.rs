use crate::medium::MediumDistanceSample;
use crate::phase::HenyeyGreenstein;
use crate::ray::Ray;
use crate::rng::Rng;
use crate::spectrum::Spectrum;

/// Homogeneous participating medium with spectral absorption and
/// scattering coefficients. Distances are sampled against the largest
/// extinction channel; the spectral correction rides in the returned
/// weight.
#[derive(Debug)]
pub struct HomogeneousMedium {
    sigma_a: Spectrum,
    sigma_s: Spectrum,
    sigma_t: Spectrum,
    phase: HenyeyGreenstein,
}

impl HomogeneousMedium {
    pub fn new(sigma_a: Spectrum, sigma_s: Spectrum, g: f32) -> HomogeneousMedium {
        HomogeneousMedium {
            sigma_a,
            sigma_s,
            sigma_t: sigma_a + sigma_s,
            phase: HenyeyGreenstein::new(g),
        }
    }

    pub fn phase(&self) -> &HenyeyGreenstein {
        &self.phase
    }

    pub fn sample_distance(
        &self,
        rng: &mut Rng,
        ray: &Ray,
        tmin: f32,
        tmax: f32,
    ) -> MediumDistanceSample {
        let m = self.sigma_t.max_component_value();
        if m == 0.0 {
            return MediumDistanceSample {
                t: tmax,
                weight: Spectrum::white(),
                scattered: false,
            };
        }
        let t = tmin - (1.0 - rng.uniform_f32()).ln() / m;
        if t < tmax {
            // Medium event. Density of this distance is m·e^{-m Δ}.
            let d = t - tmin;
            let tr = (self.sigma_t * -d).exp();
            let pdf = m * (-m * d).exp();
            MediumDistanceSample {
                t,
                weight: self.sigma_s * tr / pdf,
                scattered: true,
            }
        } else {
            // Passed through to the surface; probability e^{-m Δ}.
            let d = tmax - tmin;
            let tr = (self.sigma_t * -d).exp();
            let p_surface = (-m * d).exp();
            MediumDistanceSample {
                t: tmax,
                weight: tr / p_surface,
                scattered: false,
            }
        }
    }

    pub fn eval_transmittance(&self, _rng: &mut Rng, _ray: &Ray, tmin: f32, tmax: f32) -> Spectrum {
        (self.sigma_t * -(tmax - tmin)).exp()
    }
}
