//! Bounded-history accumulator over one sanitized scalar.

use crate::value::{ParseOpts, Scalar, Value};

/// Number of historical samples a metric retains.
pub const HISTORY_LEN: usize = 100;

/// One signal metric: current value, a rolling 100-sample history, and
/// incrementally tracked min/max.
///
/// Min and max are seeded on the first successful update and only ever
/// widened by comparison against new samples; they are not recomputed when
/// an old sample falls out of the ring, so after 100+ updates they can
/// refer to a sample no longer in the history. Exact sliding-window
/// extremes are not required here.
#[derive(Debug, Clone, Default)]
pub struct Metric<T: Scalar> {
    value: Value<T>,
    history: Vec<T>,
    oldest: usize,
    min: T,
    max: T,
}

impl<T: Scalar> Metric<T> {
    /// Parse and record one sample. A failed parse changes nothing and
    /// returns false; the history only ever holds good samples.
    pub fn update(&mut self, raw: &str, opts: ParseOpts<'_>) -> bool {
        if !self.value.set(raw, opts) {
            return false;
        }

        let v = self.value.get();

        if self.history.len() >= HISTORY_LEN {
            // Overwrite the oldest slot instead of shifting the whole ring.
            self.history[self.oldest] = v;
            self.oldest = (self.oldest + 1) % HISTORY_LEN;
        } else {
            self.history.push(v);
        }

        if self.value.updates() == 1 || v > self.max {
            self.max = v;
        }
        if self.value.updates() == 1 || v < self.min {
            self.min = v;
        }

        true
    }

    /// Whether at least one update ever succeeded.
    pub fn ok(&self) -> bool {
        self.value.ok()
    }

    pub fn updates(&self) -> u32 {
        self.value.updates()
    }

    pub fn current(&self) -> T {
        self.value.get()
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    /// Arithmetic mean of the samples currently in the history buffer.
    pub fn average(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().map(|v| v.as_f64()).sum::<f64>() / self.history.len() as f64
    }

    #[cfg(test)]
    pub(crate) fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_seeded_on_first_update() {
        let mut m = Metric::<f32>::default();
        assert!(m.update("-90.5", ParseOpts::new()));
        assert_eq!(m.current(), -90.5);
        assert_eq!(m.min(), -90.5);
        assert_eq!(m.max(), -90.5);
        assert_eq!(m.average(), -90.5f32 as f64);
    }

    #[test]
    fn min_max_track_extremes() {
        let mut m = Metric::<f32>::default();
        m.update("-90.0", ParseOpts::new());
        m.update("-80.0", ParseOpts::new());
        m.update("-95.0", ParseOpts::new());
        m.update("-85.0", ParseOpts::new());
        assert_eq!(m.current(), -85.0);
        assert_eq!(m.min(), -95.0);
        assert_eq!(m.max(), -80.0);
    }

    #[test]
    fn average_of_identical_samples_is_exact() {
        let mut m = Metric::<f32>::default();
        for _ in 0..100 {
            assert!(m.update("-90", ParseOpts::new()));
        }
        assert_eq!(m.average(), -90.0);
        assert_eq!(m.min(), -90.0);
        assert_eq!(m.max(), -90.0);
        assert_eq!(m.history_len(), 100);
    }

    #[test]
    fn history_caps_at_100_and_evicts_oldest() {
        let mut m = Metric::<i32>::default();
        m.update("1000", ParseOpts::new());
        for _ in 0..100 {
            m.update("10", ParseOpts::new());
        }
        // 101 updates: the ring still holds 100 samples and the initial
        // 1000 has been overwritten, so the average is exactly 10.
        assert_eq!(m.history_len(), 100);
        assert_eq!(m.updates(), 101);
        assert_eq!(m.average(), 10.0);
        // The evicted sample is still allowed to pin max.
        assert_eq!(m.max(), 1000);
    }

    #[test]
    fn failed_update_changes_nothing() {
        let mut m = Metric::<i32>::default();
        m.update("-70", ParseOpts::new());
        assert!(!m.update("", ParseOpts::new()));
        assert!(!m.update("n/a", ParseOpts::new()));
        assert_eq!(m.updates(), 1);
        assert_eq!(m.current(), -70);
        assert_eq!(m.average(), -70.0);
    }

    #[test]
    fn never_updated_metric_reports_zero_average() {
        let m = Metric::<f32>::default();
        assert!(!m.ok());
        assert_eq!(m.average(), 0.0);
    }
}
