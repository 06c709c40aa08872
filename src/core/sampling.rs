//! Deterministic periodic sampling
//!
//! Sampling keeps one entry out of every `round(1 / rate)` entries that pass
//! the level filter. The decision depends only on a shared counter, so a
//! given call sequence always samples the same entries.
//!
//! # Example
//!
//! ```
//! use rust_log_engine::LogSampler;
//!
//! let sampler = LogSampler::new(0.25);
//! let kept = (0..100).filter(|_| sampler.should_sample()).count();
//! assert_eq!(kept, 25);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Periodic sampler shared by every thread logging through one logger
#[derive(Debug)]
pub struct LogSampler {
    /// Keep one call in `period`; 1 disables sampling
    period: u64,
    counter: AtomicU64,
}

impl LogSampler {
    /// Create a sampler for `rate`.
    ///
    /// Rates at or above 1.0 keep everything. Callers validate that the
    /// rate is finite and positive before getting here.
    pub fn new(rate: f64) -> Self {
        Self {
            period: Self::period_for(rate),
            counter: AtomicU64::new(0),
        }
    }

    /// Number of calls per kept entry for `rate`
    pub fn period_for(rate: f64) -> u64 {
        if rate >= 1.0 || rate.is_nan() {
            return 1;
        }
        let period = (1.0 / rate).round();
        if period.is_finite() && period >= 1.0 {
            period as u64
        } else {
            u64::MAX
        }
    }

    #[inline]
    pub fn period(&self) -> u64 {
        self.period
    }

    /// Decide whether the current call is kept.
    ///
    /// Every call advances the counter, kept or not; the n-th call (counting
    /// from one) is kept iff n is a multiple of the period.
    #[inline]
    pub fn should_sample(&self) -> bool {
        if self.period == 1 {
            return true;
        }
        let n = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        n % self.period == 0
    }

    /// Number of calls that reached the sampler
    pub fn calls(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_full_rate_keeps_everything() {
        let sampler = LogSampler::new(1.0);
        assert!((0..1000).all(|_| sampler.should_sample()));

        let sampler = LogSampler::new(2.5);
        assert_eq!(sampler.period(), 1);
    }

    #[test]
    fn test_period_rounding() {
        assert_eq!(LogSampler::period_for(0.5), 2);
        assert_eq!(LogSampler::period_for(0.3), 3);
        assert_eq!(LogSampler::period_for(0.4), 3);
        assert_eq!(LogSampler::period_for(0.1), 10);
        assert_eq!(LogSampler::period_for(0.0), u64::MAX);
    }

    #[test]
    fn test_integer_division_semantics() {
        let sampler = LogSampler::new(0.1);
        let kept = (0..105).filter(|_| sampler.should_sample()).count();
        assert_eq!(kept, 10);
        assert_eq!(sampler.calls(), 105);
    }

    #[test]
    fn test_pattern_is_periodic() {
        let sampler = LogSampler::new(0.25);
        let pattern: Vec<bool> = (0..8).map(|_| sampler.should_sample()).collect();
        assert_eq!(
            pattern,
            vec![false, false, false, true, false, false, false, true]
        );
    }

    #[test]
    fn test_concurrent_callers_share_counter() {
        let sampler = Arc::new(LogSampler::new(0.2));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sampler = Arc::clone(&sampler);
                thread::spawn(move || (0..250).filter(|_| sampler.should_sample()).count())
            })
            .collect();

        let kept: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(kept, 200);
    }
}
