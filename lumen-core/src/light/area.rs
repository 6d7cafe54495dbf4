use std::f32::consts::PI;
use std::sync::Arc;

use crate::interaction::{geometry_term, PointGeometry};
use crate::light::{DirectSample, EmissionRaySample};
use crate::mesh::TriangleMesh;
use crate::rng::Rng;
use crate::sampling::{cosine_sample_hemisphere, Distribution1D};
use crate::spectrum::Spectrum;
use crate::Vector3f;

/// One-sided diffuse emitter over a triangle mesh, sampled uniformly
/// by surface area.
#[derive(Debug)]
pub struct AreaLight {
    ke: Spectrum,
    mesh: Arc<TriangleMesh>,
    dist: Distribution1D,
    inv_area: f32,
}

impl AreaLight {
    pub fn new(ke: Spectrum, mesh: Arc<TriangleMesh>) -> AreaLight {
        let dist = mesh.area_distribution();
        let area = mesh.area();
        assert!(area > 0.0);

        AreaLight {
            ke,
            mesh,
            dist,
            inv_area: 1.0 / area,
        }
    }

    pub fn ke(&self) -> Spectrum {
        self.ke
    }

    pub fn eval(&self, light_geom: &PointGeometry, wo: &Vector3f) -> Spectrum {
        if light_geom.n.dot(wo) > 0.0 {
            self.ke
        } else {
            Spectrum::black()
        }
    }

    pub fn sample_direct(&self, rng: &mut Rng, ref_geom: &PointGeometry) -> Option<DirectSample> {
        let s = self.mesh.sample_point(
            &self.dist,
            rng.uniform_f32(),
            rng.uniform_f32(),
            rng.uniform_f32(),
        );
        if s.pdf == 0.0 {
            return None;
        }
        let geom = PointGeometry::on_surface(s.p, s.n, s.uv);
        let d = ref_geom.p - s.p;
        if d.length_squared() == 0.0 {
            return None;
        }
        let wo = d.normalize();
        let le = self.eval(&geom, &wo);
        if le.is_black() {
            return None;
        }
        // Area density to projected solid angle at the reference point.
        let g = geometry_term(ref_geom, &geom);
        if g == 0.0 {
            return None;
        }

        Some(DirectSample {
            geom,
            wo,
            pdf: s.pdf / g,
            le,
        })
    }

    pub fn pdf_direct(&self, ref_geom: &PointGeometry, light_geom: &PointGeometry) -> f32 {
        let g = geometry_term(ref_geom, light_geom);
        if g == 0.0 {
            return 0.0;
        }
        self.inv_area / g
    }

    /// Cosine-distributed emission ray off the front face.
    pub fn sample_ray(&self, rng: &mut Rng) -> Option<EmissionRaySample> {
        let s = self.mesh.sample_point(
            &self.dist,
            rng.uniform_f32(),
            rng.uniform_f32(),
            rng.uniform_f32(),
        );
        if s.pdf == 0.0 {
            return None;
        }
        let geom = PointGeometry::on_surface(s.p, s.n, s.uv);
        let (u1, u2) = rng.uniform_2d();
        let local = cosine_sample_hemisphere(u1, u2);
        if local.z == 0.0 {
            return None;
        }
        let wo = geom.to_world(&local);
        // Le·cosθ/(pA·pω) with pω = cosθ/π.
        let weight = self.ke * (PI / (s.pdf));

        Some(EmissionRaySample { geom, wo, weight })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Normal3f, Point2f, Point3f};

    fn quad_light() -> AreaLight {
        let mesh = Arc::new(TriangleMesh::new(
            vec![
                Point3f::new(-0.5, 0.0, -0.5),
                Point3f::new(0.5, 0.0, -0.5),
                Point3f::new(0.5, 0.0, 0.5),
                Point3f::new(-0.5, 0.0, 0.5),
            ],
            vec![
                Normal3f::new(0.0, 1.0, 0.0),
                Normal3f::new(0.0, 1.0, 0.0),
                Normal3f::new(0.0, 1.0, 0.0),
                Normal3f::new(0.0, 1.0, 0.0),
            ],
            vec![],
            vec![0, 1, 2, 0, 2, 3],
        ));
        AreaLight::new(Spectrum::grey(4.0), mesh)
    }

    fn ref_point() -> PointGeometry {
        PointGeometry::on_surface(
            Point3f::new(0.0, 2.0, 0.0),
            Normal3f::new(0.0, -1.0, 0.0),
            Point2f::new(0.0, 0.0),
        )
    }

    #[test]
    fn test_sample_matches_pdf_direct() {
        let light = quad_light();
        let r = ref_point();
        let mut rng = Rng::seeded(71);
        for _ in 0..500 {
            let s = light.sample_direct(&mut rng, &r).expect("front side");
            let pdf = light.pdf_direct(&r, &s.geom);
            assert!(
                (s.pdf - pdf).abs() < 1e-3 * pdf.max(1.0),
                "{} vs {}",
                s.pdf,
                pdf
            );
            // Light-to-reference convention.
            assert!(s.wo.y > 0.0);
        }
    }

    #[test]
    fn test_back_side_is_dark() {
        let light = quad_light();
        let below = PointGeometry::on_surface(
            Point3f::new(0.0, -2.0, 0.0),
            Normal3f::new(0.0, 1.0, 0.0),
            Point2f::new(0.0, 0.0),
        );
        let mut rng = Rng::seeded(72);
        for _ in 0..100 {
            assert!(light.sample_direct(&mut rng, &below).is_none());
        }
    }

    #[test]
    fn test_direct_estimator_is_unbiased() {
        // E[Le/pdf] equals the analytic irradiance integral factor
        // ∫ Le·G dA; verified against a long MC run of the same
        // integral with uniform area sampling.
        let light = quad_light();
        let r = ref_point();
        let mut rng = Rng::seeded(73);
        let n = 100_000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            if let Some(s) = light.sample_direct(&mut rng, &r) {
                sum += f64::from((s.le / s.pdf).r);
            }
        }
        let estimate = sum / n as f64;
        // Reference: quad of area 1 at distance 2, Le = 4. Exact
        // integral of G over the quad, computed numerically.
        let mut reference = 0.0f64;
        let steps = 200;
        for i in 0..steps {
            for j in 0..steps {
                let p = Point3f::new(
                    -0.5 + (i as f32 + 0.5) / steps as f32,
                    0.0,
                    -0.5 + (j as f32 + 0.5) / steps as f32,
                );
                let g = geometry_term(
                    &r,
                    &PointGeometry::on_surface(
                        p,
                        Normal3f::new(0.0, 1.0, 0.0),
                        Point2f::new(0.0, 0.0),
                    ),
                );
                reference += f64::from(4.0 * g) / (steps * steps) as f64;
            }
        }
        assert!(
            (estimate - reference).abs() < 0.01 * reference,
            "{} vs {}",
            estimate,
            reference
        );
    }
}
