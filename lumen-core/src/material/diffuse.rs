use std::f32::consts::FRAC_1_PI;
use std::sync::Arc;

use crate::interaction::PointGeometry;
use crate::material::MaterialDirectionSample;
use crate::rng::Rng;
use crate::sampling::cosine_sample_hemisphere;
use crate::spectrum::Spectrum;
use crate::texture::Texture;
use crate::Vector3f;

/// Two-sided Lambertian reflector, optionally modulated by a texture.
#[derive(Debug)]
pub struct DiffuseMaterial {
    kd: Spectrum,
    map: Option<Arc<Texture>>,
}

impl DiffuseMaterial {
    pub fn new(kd: Spectrum, map: Option<Arc<Texture>>) -> DiffuseMaterial {
        DiffuseMaterial { kd, map }
    }

    pub fn reflectance(&self, geom: &PointGeometry) -> Spectrum {
        match self.map {
            Some(ref map) => self.kd * map.eval(&geom.t),
            None => self.kd,
        }
    }

    pub fn texture(&self) -> Option<&Arc<Texture>> {
        self.map.as_ref()
    }

    pub fn sample(
        &self,
        rng: &mut Rng,
        geom: &PointGeometry,
        wi: &Vector3f,
    ) -> Option<MaterialDirectionSample> {
        let (u1, u2) = rng.uniform_2d();
        let mut local = cosine_sample_hemisphere(u1, u2);
        if geom.n.dot(wi) < 0.0 {
            local.z = -local.z;
        }
        if local.z == 0.0 {
            return None;
        }
        let weight = self.reflectance(geom);
        if weight.is_black() {
            return None;
        }

        Some(MaterialDirectionSample {
            wo: geom.to_world(&local),
            comp: 0,
            weight,
        })
    }

    /// Projected solid angle density of the cosine-weighted sampler.
    pub fn pdf(&self, geom: &PointGeometry, wi: &Vector3f, wo: &Vector3f) -> f32 {
        if geom.n.dot(wi) * geom.n.dot(wo) <= 0.0 {
            0.0
        } else {
            FRAC_1_PI
        }
    }

    pub fn eval(&self, geom: &PointGeometry, wi: &Vector3f, wo: &Vector3f) -> Spectrum {
        if geom.n.dot(wi) * geom.n.dot(wo) <= 0.0 {
            Spectrum::black()
        } else {
            self.reflectance(geom) * FRAC_1_PI
        }
    }
}
