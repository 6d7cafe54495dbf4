use anyhow::Result;

use crate::film::Film;
use crate::paramset::Props;
use crate::scene::Scene;
use crate::sched::Scheduler;
use crate::Error;

mod pt;
mod volpt;

pub use self::pt::{ImageSampleMode, PathIntegrator, PtMode};
pub use self::volpt::VolPathIntegrator;

#[derive(Debug, Copy, Clone)]
pub struct RenderStats {
    pub processed: u64,
}

/// A rendering pass over a scene into a film.
pub trait Integrator: Send + Sync {
    fn render(&self, scene: &Scene, film: &Film) -> Result<RenderStats>;
}

/// Factory keyed by integrator name.
pub fn create(name: &str, props: &Props) -> Result<Box<dyn Integrator>> {
    match name {
        "pt" => PathIntegrator::create(props),
        "volpt" => VolPathIntegrator::create(props),
        other => Err(Error::InvalidArgument(format!("unknown integrator '{}'", other)).into()),
    }
}

/// Scheduler parameters resolved at integrator construction. The
/// explicit `scheduler` key must agree with the image-sampling mode.
#[derive(Debug, Copy, Clone)]
pub(crate) struct SchedConfig {
    spp: u64,
    spi: u64,
    workers: usize,
}

pub(crate) fn parse_sched_config(props: &Props, mode: ImageSampleMode) -> Result<SchedConfig> {
    let default_backend = match mode {
        ImageSampleMode::Pixel => "spp",
        ImageSampleMode::Image => "spi",
    };
    let backend = props.find_one_string("scheduler", default_backend);
    let compatible = matches!(
        (backend.as_str(), mode),
        ("spp", ImageSampleMode::Pixel) | ("spi", ImageSampleMode::Image)
    );
    if !compatible {
        return Err(Error::InvalidArgument(format!(
            "scheduler '{}' does not drive image sample mode {:?}",
            backend, mode
        ))
        .into());
    }

    Ok(SchedConfig {
        spp: props.find_one_int("spp", 1).max(1) as u64,
        spi: props.find_one_int("spi", 1).max(1) as u64,
        workers: props.find_one_int("workers", 0).max(0) as usize,
    })
}

pub(crate) fn make_scheduler(cfg: &SchedConfig, mode: ImageSampleMode, film: &Film) -> Scheduler {
    match mode {
        ImageSampleMode::Pixel => {
            Scheduler::samples_per_pixel(film.width(), film.height(), cfg.spp, cfg.workers)
        }
        ImageSampleMode::Image => Scheduler::samples_per_image(cfg.spi, cfg.workers),
    }
}

/// Final film normalisation after a pass: by processed samples per
/// pixel under pixel scheduling, by W·H over total samples otherwise.
pub(crate) fn rescale_film(film: &Film, mode: ImageSampleMode, processed: u64) {
    if processed == 0 {
        return;
    }
    let pixels = (film.width() * film.height()) as f32;
    match mode {
        ImageSampleMode::Pixel => {
            let spp_processed = processed as f32 / pixels;
            film.rescale(1.0 / spp_processed);
        }
        ImageSampleMode::Image => {
            film.rescale(pixels / processed as f32);
        }
    }
}
