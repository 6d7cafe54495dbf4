use anyhow::Result;
use log::debug;
use num::zero;

use crate::bounds::Bounds2f;
use crate::film::Film;
use crate::integrator::pt::{parse_image_sample_mode, pixel_window};
use crate::integrator::{
    make_scheduler, parse_sched_config, rescale_film, ImageSampleMode, Integrator, RenderStats,
    SchedConfig,
};
use crate::interaction::InteractionKind;
use crate::paramset::Props;
use crate::rng::Rng;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::{Point2f, Vector3f};

/// Volumetric path tracer. The walk samples direction and distance
/// explicitly, so path vertices may land inside participating media.
/// Direct light connections are weighted by a transmittance estimate
/// instead of binary visibility, and emissive hits only contribute on
/// edges next-event estimation could not have sampled (there is no
/// direction/distance MIS here).
pub struct VolPathIntegrator {
    image_sample_mode: ImageSampleMode,
    max_verts: u32,
    rr_prob: f32,
    seed: Option<u64>,
    sched: SchedConfig,
}

impl VolPathIntegrator {
    pub fn create(props: &Props) -> Result<Box<dyn Integrator>> {
        let image_sample_mode = parse_image_sample_mode(props)?;
        let max_verts = props.find_one_int("max_verts", 20).max(1) as u32;
        let rr_prob = props.find_one_float("rr_prob", 0.2);
        let seed = props.find_int("seed").map(|s| s as u64);
        let sched = parse_sched_config(props, image_sample_mode)?;
        debug!(
            "volpt: image_sample_mode={:?}, max_verts={}, rr_prob={}",
            image_sample_mode, max_verts, rr_prob
        );

        Ok(Box::new(VolPathIntegrator {
            image_sample_mode,
            max_verts,
            rr_prob,
            seed,
            sched,
        }))
    }

    fn sample_walk(
        &self,
        scene: &Scene,
        film: &Film,
        rng: &mut Rng,
        window: Bounds2f,
        aspect: f32,
    ) {
        let mut wi: Vector3f = zero();
        let mut sp = scene.camera_terminator(window, aspect);
        let mut throughput = Spectrum::white();
        let mut raster_pos = Point2f::new(0.0, 0.0);
        // Whether the previous vertex ran next-event estimation,
        // covering the edge a direct emissive hit would double count.
        let mut nee_prev = false;

        for length in 0..self.max_verts {
            let s = match scene.sample_direction(rng, &sp, &wi) {
                Some(s) if !s.weight.is_black() => s,
                _ => break,
            };
            if length == 0 {
                raster_pos = match scene.raster_position(&s.wo, aspect) {
                    Some(rp) => rp,
                    None => break,
                };
            }

            let sd = match scene.sample_distance(rng, &sp, &s.wo) {
                Some(sd) if !sd.weight.is_black() => sd,
                _ => break,
            };
            throughput *= s.weight * sd.weight;
            if !throughput.is_finite() {
                break;
            }

            // Emission carried by the sampled edge itself.
            if scene.is_light(&sd.sp) && !nee_prev {
                let spl = sd.sp.as_type(InteractionKind::LightEndpoint);
                let fs = scene.eval_contrb_endpoint(&spl, &-s.wo);
                film.splat(&raster_pos, throughput * fs);
            }
            if sd.sp.geom.infinite {
                break;
            }

            // Next-event estimation with stochastic transmittance.
            nee_prev = !scene.is_specular(&sd.sp, -1);
            if nee_prev {
                if let Some(sl) = scene.sample_direct_light(rng, &sd.sp) {
                    let tr = scene.eval_transmittance(rng, &sd.sp, &sl.sp);
                    if !tr.is_black() {
                        let fs = scene.eval_contrb(&sd.sp, -1, &-s.wo, &-sl.wo);
                        film.splat(&raster_pos, throughput * tr * fs * sl.weight);
                    }
                }
            }

            if length > 5 {
                let q = self.rr_prob.max(1.0 - throughput.max_component_value());
                if rng.uniform_f32() < q {
                    break;
                }
                throughput /= 1.0 - q;
            }

            wi = -s.wo;
            sp = sd.sp;
        }
    }
}

impl Integrator for VolPathIntegrator {
    fn render(&self, scene: &Scene, film: &Film) -> Result<RenderStats> {
        scene.require_renderable()?;
        let (w, h) = (film.width(), film.height());
        let aspect = film.aspect();
        let sched = make_scheduler(&self.sched, self.image_sample_mode, film);
        film.clear();

        let processed = sched.run(self.seed, |task, _tid, rng| {
            let window = match self.image_sample_mode {
                ImageSampleMode::Pixel => {
                    let (x, y) = sched.pixel_for_task(task).expect("pixel scheduling");
                    pixel_window(x, y, w, h)
                }
                ImageSampleMode::Image => Bounds2f::unit(),
            };
            self.sample_walk(scene, film, rng, window, aspect);
        });
        rescale_film(film, self.image_sample_mode, processed);

        Ok(RenderStats { processed })
    }
}
