use crate::sampling::Distribution1D;
use crate::{clamp, Point2f};

/// Piecewise-constant 2-D distribution: per-row conditionals plus the
/// row marginal. Used for texture-weighted environment sampling.
#[derive(Debug)]
pub struct Distribution2D {
    p_conditional_v: Vec<Distribution1D>,
    p_marginal: Distribution1D,
}

impl Distribution2D {
    pub fn new(func: &[f32], nu: usize, nv: usize) -> Distribution2D {
        assert_eq!(func.len(), nu * nv);
        let p_conditional_v: Vec<Distribution1D> = (0..nv)
            .map(|v| Distribution1D::new(&func[v * nu..(v + 1) * nu]))
            .collect();
        let marginal_func: Vec<f32> = p_conditional_v.iter().map(|d| d.func_int).collect();
        let p_marginal = Distribution1D::new(&marginal_func[..]);

        Distribution2D {
            p_conditional_v,
            p_marginal,
        }
    }

    pub fn sample_continuous(&self, u1: f32, u2: f32) -> (Point2f, f32) {
        let (d1, pdf1, v) = self.p_marginal.sample_continuous(u2);
        let (d0, pdf0, _) = self.p_conditional_v[v].sample_continuous(u1);

        (Point2f::new(d0, d1), pdf0 * pdf1)
    }

    pub fn pdf(&self, p: &Point2f) -> f32 {
        let nu = self.p_conditional_v[0].count();
        let nv = self.p_marginal.count();
        let iu = clamp((p.x * nu as f32) as usize, 0, nu - 1);
        let iv = clamp((p.y * nv as f32) as usize, 0, nv - 1);
        if self.p_marginal.func_int > 0.0 {
            self.p_conditional_v[iv].func[iu] / self.p_marginal.func_int
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_integrates_to_one() {
        let func = [1.0, 3.0, 0.5, 1.5, 2.0, 4.0];
        let distrib = Distribution2D::new(&func[..], 3, 2);
        // Sum of pdf over cells times the cell area is 1.
        let mut total = 0.0;
        for v in 0..2 {
            for u in 0..3 {
                let p = Point2f::new((u as f32 + 0.5) / 3.0, (v as f32 + 0.5) / 2.0);
                total += distrib.pdf(&p) / 6.0;
            }
        }
        assert!((total - 1.0).abs() < 1e-5);
    }
}
