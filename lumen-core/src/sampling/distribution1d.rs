use crate::find_interval;

/// Piecewise-constant 1-D distribution.
#[derive(Debug)]
pub struct Distribution1D {
    pub func: Vec<f32>,
    cdf: Vec<f32>,
    pub func_int: f32,
}

impl Distribution1D {
    pub fn new(f: &[f32]) -> Distribution1D {
        let n = f.len();
        assert!(n > 0);
        let func = Vec::from(f);
        let mut cdf = vec![0.0; n + 1];
        for i in 1..=n {
            cdf[i] = cdf[i - 1] + func[i - 1] / n as f32;
        }
        let func_int = cdf[n];
        if func_int == 0.0 {
            // Degenerate function; fall back to the uniform CDF.
            cdf.iter_mut()
                .enumerate()
                .skip(1)
                .for_each(|(i, v)| *v = i as f32 / n as f32);
        } else {
            cdf.iter_mut().skip(1).for_each(|v| *v /= func_int);
        }

        Distribution1D {
            func,
            cdf,
            func_int,
        }
    }

    pub fn count(&self) -> usize {
        self.func.len()
    }

    /// Sample x ∈ [0,1). Returns (x, pdf, bucket index).
    pub fn sample_continuous(&self, u: f32) -> (f32, f32, usize) {
        let offset = find_interval(self.cdf.len(), |i| self.cdf[i] <= u);
        let mut du = u - self.cdf[offset];
        if self.cdf[offset + 1] - self.cdf[offset] > 0.0 {
            du /= self.cdf[offset + 1] - self.cdf[offset];
        }
        let pdf = if self.func_int > 0.0 {
            self.func[offset] / self.func_int
        } else {
            0.0
        };
        let x = (offset as f32 + du) / self.count() as f32;

        (x, pdf, offset)
    }

    /// Sample a bucket. Returns (index, probability mass).
    pub fn sample_discrete(&self, u: f32) -> (usize, f32) {
        let offset = find_interval(self.cdf.len(), |i| self.cdf[i] <= u);
        let pdf = self.discrete_pdf(offset);

        (offset, pdf)
    }

    pub fn discrete_pdf(&self, index: usize) -> f32 {
        if self.func_int > 0.0 {
            self.func[index] / (self.func_int * self.count() as f32)
        } else {
            1.0 / self.count() as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ONE_MINUS_EPSILON;

    #[test]
    fn test_discrete() {
        let func = [0.0, 1.0, 0.0, 3.0];
        let distrib = Distribution1D::new(&func[..]);

        assert_eq!(4, distrib.count());
        assert_eq!((1, 0.25), distrib.sample_discrete(0.0));
        assert_eq!((1, 0.25), distrib.sample_discrete(0.24999));
        assert_eq!((3, 0.75), distrib.sample_discrete(0.250001));
        assert_eq!((3, 0.75), distrib.sample_discrete(ONE_MINUS_EPSILON));
    }

    #[test]
    fn test_continuous_uniform_fallback() {
        let distrib = Distribution1D::new(&[0.0, 0.0]);
        let (x, _, _) = distrib.sample_continuous(0.5);
        assert!((x - 0.5).abs() < 1e-6);
    }
}
