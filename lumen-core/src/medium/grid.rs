use crate::bounds::Bounds3f;
use crate::medium::MediumDistanceSample;
use crate::phase::HenyeyGreenstein;
use crate::ray::Ray;
use crate::rng::Rng;
use crate::spectrum::Spectrum;
use crate::{clamp, lerp, Point3f};

/// Heterogeneous medium: a density grid modulating scalar base
/// coefficients inside a box. Distance sampling is delta tracking
/// against the grid majorant, transmittance is the (stochastic,
/// unbiased) ratio-tracking estimator.
#[derive(Debug)]
pub struct GridMedium {
    bounds: Bounds3f,
    nx: usize,
    ny: usize,
    nz: usize,
    density: Vec<f32>,
    sigma_a: f32,
    sigma_s: f32,
    sigma_t: f32,
    /// Majorant extinction over the whole grid.
    majorant: f32,
    phase: HenyeyGreenstein,
}

impl GridMedium {
    pub fn new(
        bounds: Bounds3f,
        nx: usize,
        ny: usize,
        nz: usize,
        density: Vec<f32>,
        sigma_a: f32,
        sigma_s: f32,
        g: f32,
    ) -> GridMedium {
        assert_eq!(density.len(), nx * ny * nz);
        let sigma_t = sigma_a + sigma_s;
        let max_density = density.iter().cloned().fold(0.0f32, f32::max);

        GridMedium {
            bounds,
            nx,
            ny,
            nz,
            density,
            sigma_a,
            sigma_s,
            sigma_t,
            majorant: max_density * sigma_t,
            phase: HenyeyGreenstein::new(g),
        }
    }

    pub fn phase(&self) -> &HenyeyGreenstein {
        &self.phase
    }

    fn grid_value(&self, ix: isize, iy: isize, iz: isize) -> f32 {
        if ix < 0
            || iy < 0
            || iz < 0
            || ix >= self.nx as isize
            || iy >= self.ny as isize
            || iz >= self.nz as isize
        {
            return 0.0;
        }
        self.density[(iz as usize * self.ny + iy as usize) * self.nx + ix as usize]
    }

    /// Trilinearly interpolated density at a world-space point.
    fn density_at(&self, p: &Point3f) -> f32 {
        let d = self.bounds.diagonal();
        let rel = Point3f::new(
            (p.x - self.bounds.p_min.x) / d.x,
            (p.y - self.bounds.p_min.y) / d.y,
            (p.z - self.bounds.p_min.z) / d.z,
        );
        let gx = rel.x * self.nx as f32 - 0.5;
        let gy = rel.y * self.ny as f32 - 0.5;
        let gz = rel.z * self.nz as f32 - 0.5;
        let (x0, y0, z0) = (gx.floor(), gy.floor(), gz.floor());
        let (dx, dy, dz) = (gx - x0, gy - y0, gz - z0);
        let (ix, iy, iz) = (x0 as isize, y0 as isize, z0 as isize);

        let d00 = lerp(
            dx,
            self.grid_value(ix, iy, iz),
            self.grid_value(ix + 1, iy, iz),
        );
        let d10 = lerp(
            dx,
            self.grid_value(ix, iy + 1, iz),
            self.grid_value(ix + 1, iy + 1, iz),
        );
        let d01 = lerp(
            dx,
            self.grid_value(ix, iy, iz + 1),
            self.grid_value(ix + 1, iy, iz + 1),
        );
        let d11 = lerp(
            dx,
            self.grid_value(ix, iy + 1, iz + 1),
            self.grid_value(ix + 1, iy + 1, iz + 1),
        );

        lerp(dz, lerp(dy, d00, d10), lerp(dy, d01, d11))
    }

    /// Clip [tmin, tmax] to the grid bounds.
    fn segment(&self, ray: &Ray, tmin: f32, tmax: f32) -> Option<(f32, f32)> {
        self.bounds.intersect_p(ray, tmin, tmax)
    }

    pub fn sample_distance(
        &self,
        rng: &mut Rng,
        ray: &Ray,
        tmin: f32,
        tmax: f32,
    ) -> MediumDistanceSample {
        let pass = MediumDistanceSample {
            t: tmax,
            weight: Spectrum::white(),
            scattered: false,
        };
        if self.majorant == 0.0 {
            return pass;
        }
        let (t0, t1) = match self.segment(ray, tmin, tmax) {
            Some(seg) => seg,
            None => return pass,
        };
        // Delta tracking: tentative collisions at majorant rate, real
        // with probability density/majorant.
        let mut t = t0;
        loop {
            t -= (1.0 - rng.uniform_f32()).ln() / self.majorant;
            if t >= t1 {
                return pass;
            }
            let d = self.density_at(&ray.at(t));
            if rng.uniform_f32() < d * self.sigma_t / self.majorant {
                let albedo = if self.sigma_t > 0.0 {
                    self.sigma_s / self.sigma_t
                } else {
                    0.0
                };
                return MediumDistanceSample {
                    t,
                    weight: Spectrum::grey(albedo),
                    scattered: true,
                };
            }
        }
    }

    pub fn eval_transmittance(&self, rng: &mut Rng, ray: &Ray, tmin: f32, tmax: f32) -> Spectrum {
        if self.majorant == 0.0 {
            return Spectrum::white();
        }
        let (t0, t1) = match self.segment(ray, tmin, tmax) {
            Some(seg) => seg,
            None => return Spectrum::white(),
        };
        // Ratio tracking.
        let mut tr = 1.0f32;
        let mut t = t0;
        loop {
            t -= (1.0 - rng.uniform_f32()).ln() / self.majorant;
            if t >= t1 {
                break;
            }
            let d = self.density_at(&ray.at(t));
            tr *= 1.0 - clamp(d * self.sigma_t / self.majorant, 0.0, 1.0);
            if tr == 0.0 {
                break;
            }
        }

        Spectrum::grey(tr)
    }
}
