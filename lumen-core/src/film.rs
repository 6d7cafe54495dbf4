use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use log::warn;

use crate::imageio;
use crate::spectrum::Spectrum;
use crate::{clamp, Point2f};

/// f32 bits behind an atomic u32, accumulated with a CAS loop. Splats
/// from concurrent workers interleave without locks.
#[derive(Default)]
struct AtomicFloat {
    bits: AtomicU32,
}

impl AtomicFloat {
    fn load(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    fn store(&self, v: f32) {
        self.bits.store(v.to_bits(), Ordering::Relaxed);
    }

    fn add(&self, v: f32) {
        let mut old = self.bits.load(Ordering::Relaxed);
        loop {
            let new = (f32::from_bits(old) + v).to_bits();
            match self
                .bits
                .compare_exchange_weak(old, new, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(cur) => old = cur,
            }
        }
    }
}

/// Accumulation buffer in linear radiance. `splat` is the only
/// operation used during a render pass; `rescale` and `clear` are
/// single-threaded phase operations.
pub struct Film {
    width: usize,
    height: usize,
    pixels: Vec<[AtomicFloat; 3]>,
}

impl Film {
    pub fn new(width: usize, height: usize) -> Film {
        assert!(width > 0 && height > 0);
        let mut pixels = Vec::with_capacity(width * height);
        pixels.resize_with(width * height, Default::default);

        Film {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Accumulate `v` into the pixel containing raster position
    /// `rp ∈ [0,1]²`. Non-finite contributions are dropped.
    pub fn splat(&self, rp: &Point2f, v: Spectrum) {
        if !v.is_finite() {
            warn!("Dropping non-finite splat {} at {}", v, rp);
            return;
        }
        let x = clamp((rp.x * self.width as f32) as isize, 0, self.width as isize - 1) as usize;
        let y = clamp(
            (rp.y * self.height as f32) as isize,
            0,
            self.height as isize - 1,
        ) as usize;
        // Raster y grows upward, rows are stored top-down.
        let pixel = &self.pixels[(self.height - 1 - y) * self.width + x];
        pixel[0].add(v.r);
        pixel[1].add(v.g);
        pixel[2].add(v.b);
    }

    pub fn rescale(&self, s: f32) {
        for p in &self.pixels {
            for c in p {
                c.store(c.load() * s);
            }
        }
    }

    pub fn clear(&self) {
        for p in &self.pixels {
            for c in p {
                c.store(0.0);
            }
        }
    }

    /// Pixel value with (0, 0) at the bottom-left raster corner.
    pub fn pixel(&self, x: usize, y: usize) -> Spectrum {
        let p = &self.pixels[(self.height - 1 - y) * self.width + x];
        Spectrum::rgb(p[0].load(), p[1].load(), p[2].load())
    }

    /// Row-major copy, top row first (image order).
    pub fn to_vec(&self) -> Vec<Spectrum> {
        self.pixels
            .iter()
            .map(|p| Spectrum::rgb(p[0].load(), p[1].load(), p[2].load()))
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        imageio::write_image(path, &self.to_vec(), self.width, self.height)
    }
}
