use std::fmt;
use std::path::Path;

use anyhow::Result;
use log::info;

use crate::imageio;
use crate::spectrum::Spectrum;
use crate::Point2f;

/// Image-backed texture with an optional alpha channel. Lookup is
/// bilinear with repeat wrapping; v grows upward.
pub struct BitmapTexture {
    width: usize,
    height: usize,
    pixels: Vec<Spectrum>,
    alpha: Option<Vec<f32>>,
}

impl BitmapTexture {
    pub fn new(
        width: usize,
        height: usize,
        pixels: Vec<Spectrum>,
        alpha: Option<Vec<f32>>,
    ) -> BitmapTexture {
        assert_eq!(pixels.len(), width * height);
        if let Some(ref a) = alpha {
            assert_eq!(a.len(), width * height);
        }
        BitmapTexture {
            width,
            height,
            pixels,
            alpha,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<BitmapTexture> {
        let img = imageio::read_image(path.as_ref())?;
        info!(
            "Loaded texture {} ({}x{}, alpha: {})",
            path.as_ref().display(),
            img.width,
            img.height,
            img.alpha.is_some()
        );
        Ok(BitmapTexture::new(
            img.width,
            img.height,
            img.pixels,
            img.alpha,
        ))
    }

    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    pub fn eval(&self, uv: &Point2f) -> Spectrum {
        self.bilinear(uv, |i| self.pixels[i], |a, b, t| a * (1.0 - t) + b * t)
    }

    pub fn eval_alpha(&self, uv: &Point2f) -> f32 {
        match self.alpha {
            Some(ref alpha) => self.bilinear(uv, |i| alpha[i], |a, b, t| a * (1.0 - t) + b * t),
            None => 1.0,
        }
    }

    fn bilinear<T, F, L>(&self, uv: &Point2f, fetch: F, lerp: L) -> T
    where
        T: Copy,
        F: Fn(usize) -> T,
        L: Fn(T, T, f32) -> T,
    {
        // Continuous coordinates with row 0 at the top of the image.
        let x = uv.x.rem_euclid(1.0) * self.width as f32 - 0.5;
        let y = (1.0 - uv.y.rem_euclid(1.0)) * self.height as f32 - 0.5;
        let x0 = x.floor();
        let y0 = y.floor();
        let dx = x - x0;
        let dy = y - y0;
        let wrap = |v: i64, n: usize| -> usize { v.rem_euclid(n as i64) as usize };
        let ix0 = wrap(x0 as i64, self.width);
        let ix1 = wrap(x0 as i64 + 1, self.width);
        let iy0 = wrap(y0 as i64, self.height);
        let iy1 = wrap(y0 as i64 + 1, self.height);
        let t00 = fetch(iy0 * self.width + ix0);
        let t10 = fetch(iy0 * self.width + ix1);
        let t01 = fetch(iy1 * self.width + ix0);
        let t11 = fetch(iy1 * self.width + ix1);

        lerp(lerp(t00, t10, dx), lerp(t01, t11, dx), dy)
    }
}

impl fmt::Debug for BitmapTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapTexture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("alpha", &self.alpha.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_texel() {
        let t = BitmapTexture::new(1, 1, vec![Spectrum::rgb(0.2, 0.4, 0.6)], None);
        let s = t.eval(&Point2f::new(0.7, 0.3));
        assert!((s.r - 0.2).abs() < 1e-6);
        assert_eq!(t.eval_alpha(&Point2f::new(0.5, 0.5)), 1.0);
        assert!(!t.has_alpha());
    }

    #[test]
    fn test_alpha_lookup() {
        let px = vec![Spectrum::white(); 4];
        let t = BitmapTexture::new(2, 2, px, Some(vec![0.0, 0.0, 1.0, 1.0]));
        assert!(t.has_alpha());
        // Bottom row of the image is the low-v half.
        assert!(t.eval_alpha(&Point2f::new(0.25, 0.25)) > 0.5);
        assert!(t.eval_alpha(&Point2f::new(0.25, 0.75)) < 0.5);
    }
}
