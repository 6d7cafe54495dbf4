use crate::spectrum::Spectrum;
use crate::Point2f;

mod bitmap;
mod checkerboard;
mod constant;

pub use self::bitmap::BitmapTexture;
pub use self::checkerboard::CheckerboardTexture;
pub use self::constant::ConstantTexture;

/// Texture attached to a material or an environment light.
#[derive(Debug)]
pub enum Texture {
    Constant(ConstantTexture),
    Checkerboard(CheckerboardTexture),
    Bitmap(BitmapTexture),
}

impl Texture {
    pub fn constant(value: Spectrum) -> Texture {
        Texture::Constant(ConstantTexture::new(value))
    }

    pub fn eval(&self, uv: &Point2f) -> Spectrum {
        match self {
            Texture::Constant(t) => t.eval(),
            Texture::Checkerboard(t) => t.eval(uv),
            Texture::Bitmap(t) => t.eval(uv),
        }
    }

    /// Alpha component at `uv`; 1 for textures without an alpha channel.
    pub fn eval_alpha(&self, uv: &Point2f) -> f32 {
        match self {
            Texture::Bitmap(t) => t.eval_alpha(uv),
            _ => 1.0,
        }
    }

    pub fn has_alpha(&self) -> bool {
        match self {
            Texture::Bitmap(t) => t.has_alpha(),
            _ => false,
        }
    }
}
