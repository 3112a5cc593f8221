//! Randomized pauses between requests.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::time::secs_to_duration;

/// An inclusive `[min, max]` pause interval in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PauseRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl PauseRange {
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// A fixed pause of `secs`.
    pub fn fixed(secs: f64) -> Self {
        Self::new(secs, secs)
    }

    pub fn min(&self) -> Duration {
        secs_to_duration(self.min_secs)
    }

    /// Draw a uniformly random duration from the interval.
    pub fn sample(&self) -> Duration {
        let lo = self.min_secs.max(0.0);
        let hi = self.max_secs.max(lo);
        if !hi.is_finite() || hi <= lo {
            return secs_to_duration(lo);
        }
        secs_to_duration(rand::thread_rng().gen_range(lo..=hi))
    }

    /// Sleep for a random duration from the interval.
    pub async fn pause(&self) {
        tokio::time::sleep(self.sample()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_stay_in_range() {
        let range = PauseRange::new(1.0, 2.0);
        for _ in 0..100 {
            let d = range.sample();
            assert!(d >= Duration::from_secs(1) && d <= Duration::from_secs(2));
        }
    }

    #[test]
    fn inverted_range_collapses_to_min() {
        assert_eq!(PauseRange::new(3.0, 1.0).sample(), Duration::from_secs(3));
        assert_eq!(PauseRange::fixed(0.5).sample(), Duration::from_millis(500));
    }

    #[test]
    fn out_of_range_seconds_do_not_panic() {
        let huge = PauseRange::new(1.0, 1e300);
        assert!(huge.sample() >= Duration::from_secs(1));
        assert_eq!(PauseRange::new(1.0, f64::INFINITY).sample(), Duration::from_secs(1));
        assert_eq!(PauseRange::new(f64::NAN, f64::NAN).min(), Duration::ZERO);
    }
}
