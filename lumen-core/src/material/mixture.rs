use crate::interaction::PointGeometry;
use crate::material::{
    DiffuseMaterial, GlossyMaterial, MaskMaterial, MaterialDirectionSample, TransDir,
};
use crate::rng::Rng;
use crate::spectrum::Spectrum;
use crate::Vector3f;

pub const COMP_DIFFUSE: i32 = 0;
pub const COMP_GLOSSY: i32 = 1;
pub const COMP_MASK: i32 = 2;

/// Diffuse + glossy mixture, optionally with an alpha pass-through lobe
/// driven by the diffuse texture's alpha channel (the form OBJ
/// materials with transparent maps resolve to). Without the mask lobe
/// this is the plain two-lobe marginal mixture.
///
/// Conventions: the diffuse/glossy pair is always treated marginally.
/// `eval` sums both lobes and `pdf` mixes their densities by the
/// selection weight, whatever `comp` was sampled; `comp` records the
/// chosen lobe for specularity queries only. The alpha lobe is the sole
/// contributor whenever `wi` and `wo` lie in opposite half-planes, and
/// contributes nothing otherwise. Alpha selection cancels against the
/// path's lobe-choice probability, so no α factor appears in values or
/// densities.
#[derive(Debug)]
pub struct MixtureMaterial {
    diffuse: DiffuseMaterial,
    glossy: GlossyMaterial,
    mask: Option<MaskMaterial>,
}

impl MixtureMaterial {
    pub fn new(
        diffuse: DiffuseMaterial,
        glossy: GlossyMaterial,
        mask: Option<MaskMaterial>,
    ) -> MixtureMaterial {
        MixtureMaterial {
            diffuse,
            glossy,
            mask,
        }
    }

    pub fn reflectance(&self, geom: &PointGeometry) -> Spectrum {
        self.diffuse.reflectance(geom)
    }

    /// Opacity at this point; 1 without an alpha lobe.
    fn alpha(&self, geom: &PointGeometry) -> f32 {
        match (&self.mask, self.diffuse.texture()) {
            (Some(_), Some(map)) => map.eval_alpha(&geom.t),
            _ => 1.0,
        }
    }

    /// Probability of picking the diffuse lobe among diffuse+glossy.
    fn diffuse_weight(&self, geom: &PointGeometry) -> f32 {
        let kd = self.diffuse.reflectance(geom).max_component_value();
        let ks = self.glossy.ks().max_component_value();
        if kd + ks == 0.0 {
            1.0
        } else {
            kd / (kd + ks)
        }
    }

    pub fn is_specular(&self, _geom: &PointGeometry, comp: i32) -> bool {
        comp == COMP_MASK
    }

    pub fn sample(
        &self,
        rng: &mut Rng,
        geom: &PointGeometry,
        wi: &Vector3f,
        _trans_dir: TransDir,
    ) -> Option<MaterialDirectionSample> {
        if let Some(ref mask) = self.mask {
            if rng.uniform_f32() >= self.alpha(geom) {
                let s = mask.sample(wi)?;
                return Some(MaterialDirectionSample {
                    comp: COMP_MASK,
                    ..s
                });
            }
        }
        let wd = self.diffuse_weight(geom);
        let (sub, comp) = if rng.uniform_f32() < wd {
            (self.diffuse.sample(rng, geom, wi)?, COMP_DIFFUSE)
        } else {
            (self.glossy.sample(rng, geom, wi)?, COMP_GLOSSY)
        };
        // Re-weight against the marginal over both lobes.
        let pdf = self.marginal_pdf(geom, wi, &sub.wo);
        if pdf == 0.0 {
            return None;
        }
        let f = self.marginal_eval(geom, wi, &sub.wo);
        if f.is_black() {
            return None;
        }

        Some(MaterialDirectionSample {
            wo: sub.wo,
            comp,
            weight: f / pdf,
        })
    }

    fn marginal_pdf(&self, geom: &PointGeometry, wi: &Vector3f, wo: &Vector3f) -> f32 {
        let wd = self.diffuse_weight(geom);
        wd * self.diffuse.pdf(geom, wi, wo) + (1.0 - wd) * self.glossy.pdf(geom, wi, wo)
    }

    fn marginal_eval(&self, geom: &PointGeometry, wi: &Vector3f, wo: &Vector3f) -> Spectrum {
        self.diffuse.eval(geom, wi, wo) + self.glossy.eval(geom, wi, wo)
    }

    fn opposite_half_plane(&self, geom: &PointGeometry, wi: &Vector3f, wo: &Vector3f) -> bool {
        geom.n.dot(wi) * geom.n.dot(wo) < 0.0
    }

    pub fn pdf(
        &self,
        geom: &PointGeometry,
        comp: i32,
        wi: &Vector3f,
        wo: &Vector3f,
        eval_delta: bool,
    ) -> f32 {
        if comp == COMP_MASK || self.opposite_half_plane(geom, wi, wo) {
            // Only the delta lobe can cross the surface.
            return match self.mask {
                Some(ref mask) if self.opposite_half_plane(geom, wi, wo) => mask.pdf(eval_delta),
                _ => 0.0,
            };
        }
        self.marginal_pdf(geom, wi, wo)
    }

    pub fn eval(
        &self,
        geom: &PointGeometry,
        comp: i32,
        wi: &Vector3f,
        wo: &Vector3f,
        _trans_dir: TransDir,
        eval_delta: bool,
    ) -> Spectrum {
        if comp == COMP_MASK || self.opposite_half_plane(geom, wi, wo) {
            return match self.mask {
                Some(ref mask) if self.opposite_half_plane(geom, wi, wo) => mask.eval(eval_delta),
                _ => Spectrum::black(),
            };
        }
        self.marginal_eval(geom, wi, wo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::Texture;
    use crate::{Normal3f, Point2f, Point3f};
    use std::sync::Arc;

    fn geom() -> PointGeometry {
        PointGeometry::on_surface(
            Point3f::new(0.0, 0.0, 0.0),
            Normal3f::new(0.0, 0.0, 1.0),
            Point2f::new(0.25, 0.25),
        )
    }

    fn plain_mixture() -> MixtureMaterial {
        MixtureMaterial::new(
            DiffuseMaterial::new(Spectrum::rgb(0.5, 0.3, 0.2), None),
            GlossyMaterial::new(Spectrum::grey(0.4), 0.15, 0.15),
            None,
        )
    }

    fn alpha_mixture(alpha: f32) -> MixtureMaterial {
        let tex = Arc::new(Texture::Bitmap(crate::texture::BitmapTexture::new(
            1,
            1,
            vec![Spectrum::grey(0.5)],
            Some(vec![alpha]),
        )));
        MixtureMaterial::new(
            DiffuseMaterial::new(Spectrum::white(), Some(tex)),
            GlossyMaterial::new(Spectrum::grey(0.4), 0.15, 0.15),
            Some(MaskMaterial::new()),
        )
    }

    #[test]
    fn test_marginal_pdf_identity() {
        // pdf_mix = Σ_c p_sel(c)·p_c exactly, for any direction pair.
        let m = plain_mixture();
        let g = geom();
        let wi = Vector3f::new(0.2, 0.4, 0.89).normalize();
        let mut rng = Rng::seeded(61);
        for _ in 0..200 {
            let (u1, u2) = rng.uniform_2d();
            let wo = crate::sampling::uniform_sample_sphere(u1, u2);
            let wd = m.diffuse_weight(&g);
            let expected =
                wd * m.diffuse.pdf(&g, &wi, &wo) + (1.0 - wd) * m.glossy.pdf(&g, &wi, &wo);
            assert_eq!(m.pdf(&g, -1, &wi, &wo, false), expected);
        }
    }

    #[test]
    fn test_weight_is_marginal_ratio() {
        let m = plain_mixture();
        let g = geom();
        let wi = Vector3f::new(-0.1, 0.3, 0.95).normalize();
        let mut rng = Rng::seeded(62);
        for _ in 0..200 {
            if let Some(s) = m.sample(&mut rng, &g, &wi, TransDir::EL) {
                let expected =
                    m.eval(&g, s.comp, &wi, &s.wo, TransDir::EL, false) / m.pdf(&g, s.comp, &wi, &s.wo, false);
                assert!((s.weight.r - expected.r).abs() < 1e-4);
                assert!((s.weight.b - expected.b).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_alpha_half_plane_exclusivity() {
        let m = alpha_mixture(0.5);
        let g = geom();
        let wi = Vector3f::new(0.1, 0.2, 0.97).normalize();
        let above = Vector3f::new(-0.3, 0.1, 0.95).normalize();
        let below = Vector3f::new(-0.3, 0.1, -0.95).normalize();
        // Same half-plane: the alpha lobe contributes nothing.
        assert!(m.pdf(&g, -1, &wi, &above, true) > 0.0);
        assert_eq!(
            m.pdf(&g, -1, &wi, &above, true),
            m.pdf(&g, -1, &wi, &above, false)
        );
        // Opposite half-planes: only the alpha lobe survives.
        assert_eq!(m.pdf(&g, -1, &wi, &below, false), 0.0);
        assert_eq!(m.pdf(&g, -1, &wi, &below, true), 1.0);
        assert!(m.eval(&g, -1, &wi, &below, TransDir::EL, false).is_black());
        assert_eq!(
            m.eval(&g, -1, &wi, &below, TransDir::EL, true),
            Spectrum::white()
        );
    }

    #[test]
    fn test_alpha_lobe_selection_rate() {
        let m = alpha_mixture(0.25);
        let g = geom();
        let wi = Vector3f::new(0.0, 0.1, 0.99).normalize();
        let mut rng = Rng::seeded(63);
        let n = 20_000;
        let mut passed = 0;
        for _ in 0..n {
            if let Some(s) = m.sample(&mut rng, &g, &wi, TransDir::EL) {
                if s.comp == COMP_MASK {
                    assert!(m.is_specular(&g, s.comp));
                    passed += 1;
                }
            }
        }
        let rate = passed as f64 / n as f64;
        assert!((rate - 0.75).abs() < 0.02, "pass-through rate {}", rate);
    }
}
