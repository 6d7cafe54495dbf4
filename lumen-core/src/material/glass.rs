use crate::geometry::{reflect, refract};
use crate::interaction::PointGeometry;
use crate::material::{MaterialDirectionSample, TransDir};
use crate::rng::Rng;
use crate::spectrum::Spectrum;
use crate::{Normal3f, Vector3f};

pub const COMP_REFLECT: i32 = 0;
pub const COMP_REFRACT: i32 = 1;

/// Smooth dielectric with Schlick Fresnel. Two delta sub-components:
/// reflection (comp 0) and refraction (comp 1). Total internal
/// reflection forces the reflection branch.
#[derive(Debug)]
pub struct GlassMaterial {
    ni: f32,
}

/// Schlick approximation anchored at `r0 = ((1-Ni)/(1+Ni))²`.
fn schlick_fresnel(r0: f32, cos_theta: f32) -> f32 {
    let c = 1.0 - cos_theta;
    r0 + (1.0 - r0) * c * c * c * c * c
}

impl GlassMaterial {
    pub fn new(ni: f32) -> GlassMaterial {
        assert!(ni > 0.0);
        GlassMaterial { ni }
    }

    pub fn ni(&self) -> f32 {
        self.ni
    }

    fn r0(&self) -> f32 {
        let r = (1.0 - self.ni) / (1.0 + self.ni);
        r * r
    }

    /// Fresnel reflectance for `wi`; the refraction outcome decides
    /// which side's angle enters Schlick's formula.
    fn fresnel(&self, wi: &Vector3f, n: &Normal3f, into: bool) -> (f32, Vector3f, bool) {
        let eta = if into { 1.0 / self.ni } else { self.ni };
        let (wt, total_internal) = refract(wi, n, eta);
        if total_internal {
            return (1.0, wt, true);
        }
        // Use the angle on the thin side of the interface.
        let cos = if into { n.dot(wi) } else { -n.dot(&wt) };
        (schlick_fresnel(self.r0(), cos), wt, false)
    }

    pub fn sample(
        &self,
        rng: &mut Rng,
        geom: &PointGeometry,
        wi: &Vector3f,
        trans_dir: TransDir,
    ) -> Option<MaterialDirectionSample> {
        let into = geom.n.dot(wi) > 0.0;
        let n = if into { geom.n } else { -geom.n };
        let (fr, wt, total_internal) = self.fresnel(wi, &n, into);
        if total_internal || rng.uniform_f32() < fr {
            return Some(MaterialDirectionSample {
                wo: reflect(wi, &n),
                comp: COMP_REFLECT,
                weight: Spectrum::white(),
            });
        }
        // Radiance compresses by η² across the interface.
        let eta = if into { 1.0 / self.ni } else { self.ni };
        let weight = if trans_dir == TransDir::EL {
            Spectrum::grey(eta * eta)
        } else {
            Spectrum::white()
        };

        Some(MaterialDirectionSample {
            wo: wt,
            comp: COMP_REFRACT,
            weight,
        })
    }

    pub fn pdf(
        &self,
        geom: &PointGeometry,
        comp: i32,
        wi: &Vector3f,
        _wo: &Vector3f,
        eval_delta: bool,
    ) -> f32 {
        if !eval_delta {
            return 0.0;
        }
        let into = geom.n.dot(wi) > 0.0;
        let n = if into { geom.n } else { -geom.n };
        let (fr, _, total_internal) = self.fresnel(wi, &n, into);
        match comp {
            COMP_REFRACT if !total_internal => 1.0 - fr,
            _ => {
                if total_internal {
                    1.0
                } else {
                    fr
                }
            }
        }
    }

    pub fn eval(
        &self,
        geom: &PointGeometry,
        comp: i32,
        wi: &Vector3f,
        wo: &Vector3f,
        trans_dir: TransDir,
        eval_delta: bool,
    ) -> Spectrum {
        if !eval_delta {
            return Spectrum::black();
        }
        let pdf = self.pdf(geom, comp, wi, wo, true);
        if comp == COMP_REFRACT {
            let into = geom.n.dot(wi) > 0.0;
            let eta = if into { 1.0 / self.ni } else { self.ni };
            let scale = if trans_dir == TransDir::EL {
                eta * eta
            } else {
                1.0
            };
            Spectrum::grey(pdf * scale)
        } else {
            Spectrum::grey(pdf)
        }
    }
}
