use std::f32::consts::PI;
use std::sync::Arc;

use log::info;

use crate::interaction::PointGeometry;
use crate::light::{DirectSample, EmissionRaySample};
use crate::rng::Rng;
use crate::sampling::{
    concentric_sample_disk, uniform_sample_sphere, uniform_sphere_pdf, Distribution2D,
};
use crate::spectrum::Spectrum;
use crate::texture::Texture;
use crate::{Point2f, Point3f, Vector3f};

/// Resolution of the importance table built over the radiance map.
const DIST_WIDTH: usize = 256;
const DIST_HEIGHT: usize = 128;

/// Environment light over the whole sphere of directions, lat-long
/// mapped. Directional sampling is luminance-weighted when a radiance
/// map is attached, uniform otherwise.
#[derive(Debug)]
pub struct EnvLight {
    le: Spectrum,
    map: Option<Arc<Texture>>,
    dist: Option<Distribution2D>,
}

/// Lat-long coordinates of a world direction pointing toward the
/// environment: u from azimuth, v growing toward +z (the image top).
fn dir_to_uv(d: &Vector3f) -> Point2f {
    let theta = crate::geometry::spherical_theta(d);
    let phi = crate::geometry::spherical_phi(d);
    Point2f::new(phi / (2.0 * PI), 1.0 - theta / PI)
}

fn uv_to_dir(uv: &Point2f) -> Vector3f {
    let theta = (1.0 - uv.y) * PI;
    let phi = 2.0 * PI * uv.x;
    crate::geometry::spherical_direction(theta.sin(), theta.cos(), phi)
}

impl EnvLight {
    pub fn new(le: Spectrum, map: Option<Arc<Texture>>) -> EnvLight {
        let dist = map.as_ref().map(|map| {
            // Luminance table weighted by the lat-long sin θ Jacobian.
            let mut img = Vec::with_capacity(DIST_WIDTH * DIST_HEIGHT);
            for j in 0..DIST_HEIGHT {
                let v = (j as f32 + 0.5) / DIST_HEIGHT as f32;
                let sin_theta = ((1.0 - v) * PI).sin();
                for i in 0..DIST_WIDTH {
                    let u = (i as f32 + 0.5) / DIST_WIDTH as f32;
                    img.push(map.eval(&Point2f::new(u, v)).y() * sin_theta);
                }
            }
            info!(
                "Built environment sampling table ({}x{})",
                DIST_WIDTH, DIST_HEIGHT
            );
            Distribution2D::new(&img[..], DIST_WIDTH, DIST_HEIGHT)
        });

        EnvLight { le, map, dist }
    }

    /// Radiance arriving from the environment; the direction toward the
    /// environment is the negation of the geometry's propagation
    /// direction.
    pub fn eval(&self, light_geom: &PointGeometry) -> Spectrum {
        debug_assert!(light_geom.infinite);
        match self.map {
            Some(ref map) => self.le * map.eval(&dir_to_uv(&(-light_geom.wo).normalize())),
            None => self.le,
        }
    }

    /// Solid-angle density of the directional sampler for the direction
    /// `d` toward the environment.
    fn pdf_direction(&self, d: &Vector3f) -> f32 {
        match self.dist {
            Some(ref dist) => {
                let uv = dir_to_uv(d);
                let sin_theta = ((1.0 - uv.y) * PI).sin();
                if sin_theta == 0.0 {
                    0.0
                } else {
                    dist.pdf(&uv) / (2.0 * PI * PI * sin_theta)
                }
            }
            None => uniform_sphere_pdf(),
        }
    }

    pub fn sample_direct(&self, rng: &mut Rng, ref_geom: &PointGeometry) -> Option<DirectSample> {
        let (u1, u2) = rng.uniform_2d();
        let (d, pdf_dir) = match self.dist {
            Some(ref dist) => {
                let (uv, pdf_uv) = dist.sample_continuous(u1, u2);
                let sin_theta = ((1.0 - uv.y) * PI).sin();
                if pdf_uv == 0.0 || sin_theta == 0.0 {
                    return None;
                }
                (uv_to_dir(&uv), pdf_uv / (2.0 * PI * PI * sin_theta))
            }
            None => (uniform_sample_sphere(u1, u2), uniform_sphere_pdf()),
        };
        let geom = PointGeometry::infinite_direction(-d);
        let le = self.eval(&geom);
        if le.is_black() {
            return None;
        }
        // Project at the reference point unless its measure degenerates.
        let g = ref_geom.measure_cos(&d);
        if g == 0.0 {
            return None;
        }

        Some(DirectSample {
            geom,
            wo: -d,
            pdf: pdf_dir / g,
            le,
        })
    }

    pub fn pdf_direct(&self, ref_geom: &PointGeometry, wo: &Vector3f) -> f32 {
        let d = -wo.normalize();
        let g = ref_geom.measure_cos(&d);
        if g == 0.0 {
            return 0.0;
        }
        self.pdf_direction(&d) / g
    }

    /// Emission ray toward the scene: a direction sample plus a disk
    /// offset on the far side of the scene's bounding sphere.
    pub fn sample_ray(
        &self,
        rng: &mut Rng,
        world_center: Point3f,
        world_radius: f32,
    ) -> Option<EmissionRaySample> {
        let (u1, u2) = rng.uniform_2d();
        let (d, pdf_dir) = match self.dist {
            Some(ref dist) => {
                let (uv, pdf_uv) = dist.sample_continuous(u1, u2);
                let sin_theta = ((1.0 - uv.y) * PI).sin();
                if pdf_uv == 0.0 || sin_theta == 0.0 {
                    return None;
                }
                (uv_to_dir(&uv), pdf_uv / (2.0 * PI * PI * sin_theta))
            }
            None => (uniform_sample_sphere(u1, u2), uniform_sphere_pdf()),
        };
        let geom = PointGeometry::infinite_direction(-d);
        let le = self.eval(&geom);
        if le.is_black() {
            return None;
        }
        // Offset across a disk perpendicular to the chosen direction.
        let (v1, v2) = crate::geometry::coordinate_system(&d);
        let (u3, u4) = rng.uniform_2d();
        let disk = concentric_sample_disk(u3, u4);
        let origin =
            world_center + (v1 * disk.x + v2 * disk.y + d) * world_radius;
        let pdf_pos = 1.0 / (PI * world_radius * world_radius);
        let mut geom = geom;
        geom.p = origin;

        Some(EmissionRaySample {
            geom,
            wo: -d,
            weight: le / (pdf_dir * pdf_pos),
        })
    }
}
