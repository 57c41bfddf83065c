use crate::common::defs::*;
use crate::error::{MdpError, Result};
use rand::prelude::*;
use rand_distr::Normal;

/// Source of the jitter added to rendered trajectory points. It never
/// influences transitions or rewards.
pub trait NoiseSource {
    fn sample(&mut self) -> Continous;
}

/// Zero-mean Gaussian jitter.
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    rng: StdRng,
    normal: Normal<Continous>,
}

impl GaussianNoise {
    pub fn new(std: Continous, seed: Option<u64>) -> Result<Self> {
        let normal = Normal::new(0., std)
            .map_err(|e| MdpError::invalid(format!("noise std {std}: {e}")))?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self { rng, normal })
    }
}

impl NoiseSource for GaussianNoise {
    fn sample(&mut self) -> Continous {
        self.normal.sample(&mut self.rng)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl NoiseSource for NoNoise {
    fn sample(&mut self) -> Continous {
        0.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;

    #[test]
    fn seeded_noise_is_reproducible() {
        let a = &mut GaussianNoise::new(0.03, Some(2718)).unwrap();
        let b = &mut GaussianNoise::new(0.03, Some(2718)).unwrap();
        for _ in 0..10 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn gaussian_noise_has_requested_spread() {
        let noise = &mut GaussianNoise::new(0.03, Some(1)).unwrap();
        let n = 20000;
        let xs = (0..n).map(|_| noise.sample()).collect::<Vec<_>>();
        let mean = xs.iter().sum::<f64>() / n as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;

        assert_float_eq!(mean, 0., abs <= 1e-3);
        assert_float_eq!(var.sqrt(), 0.03, abs <= 1e-3);
    }

    #[test]
    fn invalid_std_is_rejected() {
        assert!(GaussianNoise::new(f64::NAN, None).is_err());
    }
}
