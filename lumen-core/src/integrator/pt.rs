use std::f32::INFINITY;

use anyhow::Result;
use log::debug;
use num::zero;

use crate::bounds::Bounds2f;
use crate::film::Film;
use crate::integrator::{
    make_scheduler, parse_sched_config, rescale_film, Integrator, RenderStats, SchedConfig,
};
use crate::interaction::InteractionKind;
use crate::paramset::Props;
use crate::rng::Rng;
use crate::sampling::balance_heuristic;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::{Error, Point2f, Vector3f, RAY_EPSILON};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PtMode {
    Naive,
    Nee,
    Mis,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ImageSampleMode {
    /// One pixel per task, its raster window fixed.
    Pixel,
    /// One sample per task, raster position drawn over the whole image.
    Image,
}

/// Unidirectional path tracer: naïve, next-event estimation, or both
/// strategies combined with the balance heuristic.
pub struct PathIntegrator {
    mode: PtMode,
    image_sample_mode: ImageSampleMode,
    max_length: u32,
    seed: Option<u64>,
    sched: SchedConfig,
}

impl PathIntegrator {
    pub fn create(props: &Props) -> Result<Box<dyn Integrator>> {
        let mode = match props.find_one_string("mode", "mis").as_str() {
            "naive" => PtMode::Naive,
            "nee" => PtMode::Nee,
            "mis" => PtMode::Mis,
            other => {
                return Err(Error::InvalidArgument(format!("unknown pt mode '{}'", other)).into())
            }
        };
        let image_sample_mode = parse_image_sample_mode(props)?;
        let max_length = props.find_one_int("max_length", 6).max(1) as u32;
        let seed = props.find_int("seed").map(|s| s as u64);
        let sched = parse_sched_config(props, image_sample_mode)?;
        debug!(
            "pt: mode={:?}, image_sample_mode={:?}, max_length={}",
            mode, image_sample_mode, max_length
        );

        Ok(Box::new(PathIntegrator {
            mode,
            image_sample_mode,
            max_length,
            seed,
            sched,
        }))
    }

    /// One Monte Carlo walk of up to `max_length` vertices, splatting
    /// its contributions into the film.
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

        for length in 0..self.max_length {
            let s = match scene.sample_ray(rng, &sp, &wi) {
                Some(s) if !s.weight.is_black() => s,
                _ => break,
            };
            if length == 0 {
                raster_pos = match scene.raster_position(&s.wo, aspect) {
                    Some(rp) => rp,
                    None => break,
                };
            }

            // Next-event estimation. On the primary vertex it is only
            // possible when the raster position is free to move.
            let nee_enabled = self.mode != PtMode::Naive
                && !scene.is_specular(&s.sp, s.comp)
                && (self.image_sample_mode == ImageSampleMode::Image || length > 0);
            if nee_enabled {
                if let Some(sl) = scene.sample_direct_light(rng, &s.sp) {
                    if scene.visible(&s.sp, &sl.sp) {
                        let rp = if length == 0 {
                            scene.raster_position(&-sl.wo, aspect)
                        } else {
                            Some(raster_pos)
                        };
                        if let Some(rp) = rp {
                            let direct_samplable = !scene.is_specular(&sl.sp, sl.comp)
                                && !sl.sp.geom.degenerated;
                            let fs = scene.eval_contrb(&s.sp, s.comp, &wi, &-sl.wo);
                            let misw = if self.mode == PtMode::Nee || !direct_samplable {
                                1.0
                            } else {
                                balance_heuristic(
                                    scene.pdf_direct(&s.sp, &sl.sp, sl.comp, &sl.wo),
                                    scene.pdf_direction(&s.sp, s.comp, &wi, &-sl.wo),
                                )
                            };
                            film.splat(&rp, throughput * fs * sl.weight * misw);
                        }
                    }
                }
            }

            let hit = match scene.intersect(&s.ray(), RAY_EPSILON, INFINITY) {
                Some(hit) => hit,
                None => break,
            };
            throughput *= s.weight;
            if !throughput.is_finite() {
                break;
            }

            // Emission picked up by the sampled direction itself.
            let direct_hit = scene.is_light(&hit) && (self.mode != PtMode::Nee || !nee_enabled);
            if direct_hit {
                let spl = hit.as_type(InteractionKind::LightEndpoint);
                let fs = scene.eval_contrb_endpoint(&spl, &-s.wo);
                let misw = if self.mode == PtMode::Naive || !nee_enabled {
                    1.0
                } else {
                    balance_heuristic(
                        scene.pdf_direction(&s.sp, s.comp, &wi, &s.wo),
                        scene.pdf_direct(&s.sp, &spl, -1, &-s.wo),
                    )
                };
                film.splat(&raster_pos, throughput * fs * misw);
            }

            // Russian roulette once the path is established.
            if length > 3 {
                let q = (1.0 - throughput.max_component_value()).max(0.2);
                if rng.uniform_f32() < q {
                    break;
                }
                throughput /= 1.0 - q;
            }

            wi = -s.wo;
            sp = hit;
        }
    }
}

impl Integrator for PathIntegrator {
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

/// Raster window of a single pixel.
pub(crate) fn pixel_window(x: usize, y: usize, w: usize, h: usize) -> Bounds2f {
    Bounds2f::from_points(
        Point2f::new(x as f32 / w as f32, y as f32 / h as f32),
        Point2f::new((x + 1) as f32 / w as f32, (y + 1) as f32 / h as f32),
    )
}

pub(crate) fn parse_image_sample_mode(props: &Props) -> Result<ImageSampleMode> {
    match props.find_one_string("image_sample_mode", "pixel").as_str() {
        "pixel" => Ok(ImageSampleMode::Pixel),
        "image" => Ok(ImageSampleMode::Image),
        other => {
            Err(Error::InvalidArgument(format!("unknown image sample mode '{}'", other)).into())
        }
    }
}
