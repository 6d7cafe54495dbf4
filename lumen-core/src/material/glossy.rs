use std::f32::consts::PI;

use crate::interaction::PointGeometry;
use crate::material::MaterialDirectionSample;
use crate::rng::Rng;
use crate::spectrum::Spectrum;
use crate::Vector3f;

/// Anisotropic GGX microfacet reflector with Smith masking-shadowing
/// and Schlick Fresnel on `Ks`. Directions are handled in the shading
/// frame; the lobe is two-sided by mirroring the frame toward `wi`.
#[derive(Debug)]
pub struct GlossyMaterial {
    ks: Spectrum,
    ax: f32,
    ay: f32,
}

impl GlossyMaterial {
    pub fn new(ks: Spectrum, ax: f32, ay: f32) -> GlossyMaterial {
        assert!(ax > 0.0 && ay > 0.0);
        GlossyMaterial { ks, ax, ay }
    }

    pub fn ks(&self) -> Spectrum {
        self.ks
    }

    fn distribution(&self, wh: &Vector3f) -> f32 {
        let e = (wh.x / self.ax) * (wh.x / self.ax)
            + (wh.y / self.ay) * (wh.y / self.ay)
            + wh.z * wh.z;
        1.0 / (PI * self.ax * self.ay * e * e)
    }

    fn lambda(&self, w: &Vector3f) -> f32 {
        if w.z == 0.0 {
            return 0.0;
        }
        let t = (self.ax * self.ax * w.x * w.x + self.ay * self.ay * w.y * w.y) / (w.z * w.z);
        (-1.0 + (1.0 + t).sqrt()) * 0.5
    }

    fn g1(&self, w: &Vector3f) -> f32 {
        1.0 / (1.0 + self.lambda(w))
    }

    fn g2(&self, wi: &Vector3f, wo: &Vector3f) -> f32 {
        1.0 / (1.0 + self.lambda(wi) + self.lambda(wo))
    }

    fn fresnel(&self, cos_d: f32) -> Spectrum {
        let c = 1.0 - cos_d;
        self.ks + (Spectrum::white() - self.ks) * (c * c * c * c * c)
    }

    /// Visible-normal sampling of the GGX distribution (Heitz 2018),
    /// view direction in the upper hemisphere.
    fn sample_vndf(&self, v: &Vector3f, u1: f32, u2: f32) -> Vector3f {
        let vh = Vector3f::new(self.ax * v.x, self.ay * v.y, v.z).normalize();
        let lensq = vh.x * vh.x + vh.y * vh.y;
        let t1 = if lensq > 0.0 {
            Vector3f::new(-vh.y, vh.x, 0.0) / lensq.sqrt()
        } else {
            Vector3f::new(1.0, 0.0, 0.0)
        };
        let t2 = vh.cross(&t1);
        let r = u1.sqrt();
        let phi = 2.0 * PI * u2;
        let p1 = r * phi.cos();
        let mut p2 = r * phi.sin();
        let s = 0.5 * (1.0 + vh.z);
        p2 = (1.0 - s) * (1.0 - p1 * p1).max(0.0).sqrt() + s * p2;
        let p3 = (1.0 - p1 * p1 - p2 * p2).max(0.0).sqrt();
        let nh = t1 * p1 + t2 * p2 + vh * p3;

        Vector3f::new(self.ax * nh.x, self.ay * nh.y, nh.z.max(1e-6)).normalize()
    }

    /// Local directions on the same side of the frame; `None` when the
    /// pair cannot carry energy.
    fn local_pair(
        &self,
        geom: &PointGeometry,
        wi: &Vector3f,
        wo: &Vector3f,
    ) -> Option<(Vector3f, Vector3f)> {
        let mut wi_l = geom.to_local(wi);
        let mut wo_l = geom.to_local(wo);
        if !crate::geometry::same_hemisphere(&wi_l, &wo_l) {
            return None;
        }
        if wi_l.z < 0.0 {
            wi_l.z = -wi_l.z;
            wo_l.z = -wo_l.z;
        }
        Some((wi_l, wo_l))
    }

    pub fn sample(
        &self,
        rng: &mut Rng,
        geom: &PointGeometry,
        wi: &Vector3f,
    ) -> Option<MaterialDirectionSample> {
        let flip = geom.n.dot(wi) < 0.0;
        let mut wi_l = geom.to_local(wi);
        if flip {
            wi_l.z = -wi_l.z;
        }
        if wi_l.z <= 0.0 {
            return None;
        }
        let (u1, u2) = rng.uniform_2d();
        let wh = self.sample_vndf(&wi_l, u1, u2);
        let wo_l = wh * (2.0 * wi_l.dot(&wh)) - wi_l;
        if wo_l.z <= 0.0 {
            return None;
        }
        // weight = f/p⊥ collapses to F·G2/G1 under VNDF sampling.
        let weight = self.fresnel(wi_l.dot(&wh)) * (self.g2(&wi_l, &wo_l) / self.g1(&wi_l));
        let mut wo_world = wo_l;
        if flip {
            wo_world.z = -wo_world.z;
        }

        Some(MaterialDirectionSample {
            wo: geom.to_world(&wo_world),
            comp: 0,
            weight,
        })
    }

    /// Projected solid angle density of the VNDF sampler.
    pub fn pdf(&self, geom: &PointGeometry, wi: &Vector3f, wo: &Vector3f) -> f32 {
        let (wi_l, wo_l) = match self.local_pair(geom, wi, wo) {
            Some(pair) => pair,
            None => return 0.0,
        };
        let wh = (wi_l + wo_l).normalize();
        // ω-density G1·D/(4 cosθi), projected at wo.
        self.g1(&wi_l) * self.distribution(&wh) / (4.0 * wi_l.z * wo_l.z)
    }

    pub fn eval(&self, geom: &PointGeometry, wi: &Vector3f, wo: &Vector3f) -> Spectrum {
        let (wi_l, wo_l) = match self.local_pair(geom, wi, wo) {
            Some(pair) => pair,
            None => return Spectrum::black(),
        };
        if wi_l.z == 0.0 || wo_l.z == 0.0 {
            return Spectrum::black();
        }
        let wh = wi_l + wo_l;
        if wh.length_squared() == 0.0 {
            return Spectrum::black();
        }
        let wh = wh.normalize();

        self.fresnel(wi_l.dot(&wh))
            * (self.distribution(&wh) * self.g2(&wi_l, &wo_l) / (4.0 * wi_l.z * wo_l.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Normal3f, Point2f, Point3f};

    fn geom() -> PointGeometry {
        PointGeometry::on_surface(
            Point3f::new(0.0, 0.0, 0.0),
            Normal3f::new(0.0, 0.0, 1.0),
            Point2f::new(0.0, 0.0),
        )
    }

    #[test]
    fn test_weight_equals_eval_over_pdf() {
        let m = GlossyMaterial::new(Spectrum::grey(0.8), 0.2, 0.05);
        let g = geom();
        let wi = Vector3f::new(0.4, -0.1, 0.91).normalize();
        let mut rng = Rng::seeded(51);
        for _ in 0..200 {
            if let Some(s) = m.sample(&mut rng, &g, &wi) {
                let pdf = m.pdf(&g, &wi, &s.wo);
                assert!(pdf > 0.0);
                let ratio = m.eval(&g, &wi, &s.wo) / pdf;
                assert!(
                    (ratio.r - s.weight.r).abs() < 1e-3 * ratio.r.max(1.0),
                    "{} vs {}",
                    ratio.r,
                    s.weight.r
                );
            }
        }
    }

    #[test]
    fn test_opposite_hemisphere_rejected() {
        let m = GlossyMaterial::new(Spectrum::grey(0.8), 0.1, 0.1);
        let g = geom();
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let below = Vector3f::new(0.2, 0.0, -0.98).normalize();
        assert_eq!(m.pdf(&g, &wi, &below), 0.0);
        assert!(m.eval(&g, &wi, &below).is_black());
    }

    #[test]
    fn test_rough_lobe_centers_on_mirror_direction() {
        let m = GlossyMaterial::new(Spectrum::white(), 0.05, 0.05);
        let g = geom();
        let wi = Vector3f::new(0.5, 0.0, 0.866).normalize();
        let mirror = crate::geometry::reflect(&wi, &g.n);
        let mut rng = Rng::seeded(52);
        let mut mean = Vector3f::new(0.0, 0.0, 0.0);
        let mut count = 0;
        for _ in 0..2000 {
            if let Some(s) = m.sample(&mut rng, &g, &wi) {
                mean += s.wo;
                count += 1;
            }
        }
        let mean = (mean / count as f32).normalize();
        assert!(mean.dot(&mirror) > 0.99, "lobe mean {:?}", mean);
    }
}
