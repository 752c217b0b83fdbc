//! Probabilistic admission of page views.

use rand::Rng;

use crate::config::PageConfig;

/// Admits one page view in `F` on average.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SamplingGate {
    factor: Option<f64>,
}

impl SamplingGate {
    /// Create a gate for a sampling factor.
    pub fn new(factor: Option<f64>) -> Self {
        Self { factor }
    }

    /// Gate configured from the page's `samplingFactor`.
    pub fn from_config(config: &PageConfig) -> Self {
        Self::new(config.sampling_factor)
    }

    /// The factor if it can admit anything (finite and at least 1).
    fn effective_factor(&self) -> Option<f64> {
        self.factor.filter(|f| f.is_finite() && *f >= 1.0)
    }

    /// Probability that a single page view is admitted.
    pub fn probability(&self) -> f64 {
        self.effective_factor().map_or(0.0, |f| 1.0 / f)
    }

    /// Flip the coin for one page view.
    pub fn admits<R: Rng>(&self, rng: &mut R) -> bool {
        match self.effective_factor() {
            Some(factor) => (rng.gen::<f64>() * factor).floor() == 0.0,
            None => false,
        }
    }
}
