//! Filtering algorithms for sensor data

use crate::error::{Error, Result};

/// Smoothing coefficient shared by every relayed variable
pub const DEFAULT_ALPHA: f64 = 0.3;

/// A generic filter interface
pub trait Filter<T> {
    /// Fold one sample into the filter state and return the filtered value
    fn update(&mut self, sample: T) -> T;
}

/// Exponentially weighted moving average.
///
/// `average(i) = alpha * x(i) + (1 - alpha) * average(i - 1)`, seeded with the
/// first sample instead of zero. Samples are not range checked, so a NaN or
/// out-of-range input propagates into the average.
#[derive(Debug, Clone, PartialEq)]
pub struct Ewma {
    alpha: f64,
    average: Option<f64>,
    samples: u64,
}

impl Ewma {
    /// Create a new filter, rejecting alpha outside (0, 1]
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(Error::InvalidAlpha(alpha));
        }

        Ok(Ewma {
            alpha,
            average: None,
            samples: 0,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Current smoothed value, `None` until the first sample
    pub fn average(&self) -> Option<f64> {
        self.average
    }

    /// Number of samples folded so far
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Forget the average so the next sample seeds the filter again
    pub fn reset(&mut self) {
        self.average = None;
        self.samples = 0;
    }
}

impl Default for Ewma {
    fn default() -> Self {
        Ewma {
            alpha: DEFAULT_ALPHA,
            average: None,
            samples: 0,
        }
    }
}

impl Filter<f64> for Ewma {
    fn update(&mut self, sample: f64) -> f64 {
        let average = match self.average {
            Some(previous) => self.alpha * sample + (1.0 - self.alpha) * previous,
            None => sample,
        };

        self.average = Some(average);
        self.samples += 1;
        average
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn fold(alpha: f64, samples: &[f64]) -> f64 {
        let mut average = samples[0];
        for x in &samples[1..] {
            average = alpha * x + (1.0 - alpha) * average;
        }
        average
    }

    #[test]
    fn test_default_alpha() {
        let ewma = Ewma::default();
        assert_eq!(ewma.alpha(), DEFAULT_ALPHA);
        assert_eq!(ewma.average(), None);
        assert_eq!(ewma.samples(), 0);
    }

    #[test]
    fn test_invalid_alpha() {
        assert!(matches!(Ewma::new(0.0), Err(Error::InvalidAlpha(_))));
        assert!(matches!(Ewma::new(-0.5), Err(Error::InvalidAlpha(_))));
        assert!(matches!(Ewma::new(1.5), Err(Error::InvalidAlpha(_))));
        assert!(matches!(Ewma::new(f64::NAN), Err(Error::InvalidAlpha(_))));
        assert!(Ewma::new(1.0).is_ok());
        assert!(Ewma::new(f64::MIN_POSITIVE).is_ok());
    }

    #[test]
    fn test_first_sample_seeds_average() {
        for alpha in [0.01, 0.3, 0.5, 1.0] {
            let mut ewma = Ewma::new(alpha).unwrap();
            assert_eq!(ewma.update(42.5), 42.5);
            assert_eq!(ewma.average(), Some(42.5));
        }
    }

    #[test]
    fn test_sequence_matches_fold() {
        let samples = [3.0, -1.5, 8.25, 8.25, 0.0, 100.0, 12.0];
        for alpha in [0.05, 0.3, 0.75, 1.0] {
            let mut ewma = Ewma::new(alpha).unwrap();
            for x in samples {
                ewma.update(x);
            }
            let expected = fold(alpha, &samples);
            assert!((ewma.average().unwrap() - expected).abs() < EPS);
            assert_eq!(ewma.samples(), samples.len() as u64);
        }
    }

    #[test]
    fn test_known_values() {
        let mut ewma = Ewma::default();
        assert!((ewma.update(10.0) - 10.0).abs() < EPS);
        assert!((ewma.update(20.0) - 13.0).abs() < EPS);
        assert!((ewma.update(20.0) - 15.1).abs() < EPS);
    }

    #[test]
    fn test_alpha_one_tracks_latest() {
        let mut ewma = Ewma::new(1.0).unwrap();
        ewma.update(5.0);
        assert_eq!(ewma.update(-7.0), -7.0);
    }

    #[test]
    fn test_converges_to_constant() {
        for alpha in [0.01, 0.3, 1.0] {
            let mut ewma = Ewma::new(alpha).unwrap();
            ewma.update(100.0);
            for _ in 0..5000 {
                ewma.update(20.0);
            }
            assert!((ewma.average().unwrap() - 20.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_independent_instances() {
        let mut a = Ewma::default();
        let mut b = Ewma::default();
        a.update(1.0);
        b.update(1000.0);
        a.update(2.0);
        b.update(2000.0);
        assert!((a.average().unwrap() - fold(DEFAULT_ALPHA, &[1.0, 2.0])).abs() < EPS);
        assert!((b.average().unwrap() - fold(DEFAULT_ALPHA, &[1000.0, 2000.0])).abs() < EPS);
    }

    #[test]
    fn test_nan_propagates() {
        let mut ewma = Ewma::default();
        ewma.update(1.0);
        assert!(ewma.update(f64::NAN).is_nan());
    }

    #[test]
    fn test_reset_reseeds() {
        let mut ewma = Ewma::default();
        ewma.update(1.0);
        ewma.update(9.0);
        ewma.reset();
        assert_eq!(ewma.average(), None);
        assert_eq!(ewma.update(4.0), 4.0);
    }
}
