use rand::Rng;
use std::time::Duration;

/// Closed interval a trial delay is drawn from.
///
/// Construction does not validate ordering; `ExperimentConfig` rejects
/// inverted ranges before a run starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterRange {
    pub min: Duration,
    pub max: Duration,
}

impl JitterRange {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn fixed(width: Duration) -> Self {
        Self {
            min: width,
            max: width,
        }
    }

    /// Draws a delay uniformly from `[min, max]`, both ends included.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let secs = rng.random_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}
