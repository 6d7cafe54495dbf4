use std::f32;
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Sub};

use crate::clamp;

/// Linear RGB spectrum.
#[derive(Debug, Copy, PartialEq, Clone, Default)]
pub struct Spectrum {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Spectrum {
    pub fn rgb(r: f32, g: f32, b: f32) -> Spectrum {
        Spectrum { r, g, b }
    }

    /// RGB spectrum where all the components have the same value.
    pub fn grey(v: f32) -> Spectrum {
        Spectrum { r: v, g: v, b: v }
    }

    pub fn white() -> Spectrum {
        Spectrum::grey(1.0)
    }

    pub fn black() -> Spectrum {
        Spectrum::grey(0.0)
    }

    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    pub fn has_nan(&self) -> bool {
        self.r.is_nan() || self.g.is_nan() || self.b.is_nan()
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    pub fn max_component_value(&self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    /// Luminance of the spectrum.
    pub fn y(&self) -> f32 {
        0.212_671 * self.r + 0.715_160 * self.g + 0.072_169 * self.b
    }

    pub fn sqrt(&self) -> Spectrum {
        Spectrum::rgb(self.r.sqrt(), self.g.sqrt(), self.b.sqrt())
    }

    pub fn exp(&self) -> Spectrum {
        Spectrum::rgb(self.r.exp(), self.g.exp(), self.b.exp())
    }

    /// Convert this linear spectrum to non-linear sRGB bytes.
    pub fn to_srgb(self) -> [u8; 3] {
        let a = 0.055f32;
        let b = 1f32 / 2.4;
        let mut srgb = [0; 3];
        for i in 0..3 {
            let v = if self[i] <= 0.003_130_8 {
                12.92 * self[i]
            } else {
                (1.0 + a) * f32::powf(self[i], b) - a
            };
            srgb[i] = clamp(v * 255.0 + 0.5, 0.0, 255.0) as u8;
        }
        srgb
    }

    /// Convert non-linear sRGB bytes to a linear spectrum.
    pub fn from_srgb(rgb: [u8; 3]) -> Spectrum {
        fn convert(v: u8) -> f32 {
            let v = f32::from(v) / 255.0;
            if v <= 0.040_45 {
                v / 12.92
            } else {
                f32::powf((v + 0.055) / 1.055, 2.4)
            }
        }

        Spectrum::rgb(convert(rgb[0]), convert(rgb[1]), convert(rgb[2]))
    }
}

impl Add for Spectrum {
    type Output = Spectrum;
    fn add(self, rhs: Spectrum) -> Spectrum {
        Spectrum::rgb(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl AddAssign for Spectrum {
    fn add_assign(&mut self, rhs: Spectrum) {
        *self = *self + rhs;
    }
}

impl Sub for Spectrum {
    type Output = Spectrum;
    fn sub(self, rhs: Spectrum) -> Spectrum {
        Spectrum::rgb(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b)
    }
}

impl Mul for Spectrum {
    type Output = Spectrum;
    fn mul(self, rhs: Spectrum) -> Spectrum {
        Spectrum::rgb(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl MulAssign for Spectrum {
    fn mul_assign(&mut self, rhs: Spectrum) {
        *self = *self * rhs;
    }
}

impl Mul<f32> for Spectrum {
    type Output = Spectrum;
    fn mul(self, rhs: f32) -> Spectrum {
        Spectrum::rgb(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Mul<Spectrum> for f32 {
    type Output = Spectrum;
    fn mul(self, rhs: Spectrum) -> Spectrum {
        rhs * self
    }
}

impl MulAssign<f32> for Spectrum {
    fn mul_assign(&mut self, rhs: f32) {
        *self = *self * rhs;
    }
}

impl Div for Spectrum {
    type Output = Spectrum;
    fn div(self, rhs: Spectrum) -> Spectrum {
        Spectrum::rgb(self.r / rhs.r, self.g / rhs.g, self.b / rhs.b)
    }
}

impl Div<f32> for Spectrum {
    type Output = Spectrum;
    fn div(self, rhs: f32) -> Spectrum {
        Spectrum::rgb(self.r / rhs, self.g / rhs, self.b / rhs)
    }
}

impl DivAssign<f32> for Spectrum {
    fn div_assign(&mut self, rhs: f32) {
        *self = *self / rhs;
    }
}

impl Index<usize> for Spectrum {
    type Output = f32;
    fn index(&self, i: usize) -> &f32 {
        match i {
            0 => &self.r,
            1 => &self.g,
            2 => &self.b,
            _ => panic!("invalid index into spectrum: {}", i),
        }
    }
}

impl fmt::Display for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luminance() {
        assert!((Spectrum::white().y() - 1.0).abs() < 1e-5);
        assert_eq!(Spectrum::black().y(), 0.0);
    }

    #[test]
    fn test_srgb_round_trip() {
        let s = Spectrum::rgb(0.25, 0.5, 0.75);
        let back = Spectrum::from_srgb(s.to_srgb());
        assert!((back.r - s.r).abs() < 0.01);
        assert!((back.g - s.g).abs() < 0.01);
        assert!((back.b - s.b).abs() < 0.01);
    }

    #[test]
    fn test_nan_detection() {
        let mut s = Spectrum::white();
        assert!(!s.has_nan() && s.is_finite());
        s.g = f32::NAN;
        assert!(s.has_nan());
        s.g = f32::INFINITY;
        assert!(!s.is_finite());
    }
}
