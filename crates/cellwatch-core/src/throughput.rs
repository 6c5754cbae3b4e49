//! Throughput derived from the router's cumulative byte counters.

use std::time::Instant;

/// Rate gauge over a monotonically sampled byte counter.
///
/// The first sample only primes the state; every later sample yields
/// bytes/second from the delta against the previous one and the elapsed
/// wall time.
#[derive(Debug, Default)]
pub struct ThroughputGauge {
    last_value: i64,
    last_update: Option<Instant>,
    rate: f64,
    updates: u64,
}

impl ThroughputGauge {
    pub fn update(&mut self, counter: i64) {
        if let Some(last) = self.last_update {
            let elapsed = last.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                self.rate = (counter - self.last_value) as f64 / elapsed;
            }
        }
        self.last_value = counter;
        self.last_update = Some(Instant::now());
        self.updates += 1;
    }

    /// Tolerant string entry point; unparseable input counts as -1, the
    /// same way the router reports broken counters.
    pub fn update_str(&mut self, raw: &str) {
        self.update(raw.trim().parse().unwrap_or(-1));
    }

    /// Bytes per second; 0.0 until two samples have arrived.
    pub fn bytes_per_sec(&self) -> f64 {
        self.rate
    }

    pub fn mbits_per_sec(&self) -> f64 {
        self.rate * 8.0 / (1024.0 * 1024.0)
    }

    /// Whether a rate has actually been computed yet.
    pub fn ok(&self) -> bool {
        self.updates > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_only_primes() {
        let mut g = ThroughputGauge::default();
        g.update(1_000_000);
        assert!(!g.ok());
        assert_eq!(g.bytes_per_sec(), 0.0);
    }

    #[test]
    fn rate_is_positive_after_growth() {
        let mut g = ThroughputGauge::default();
        g.update(1_000_000);
        std::thread::sleep(std::time::Duration::from_millis(20));
        g.update(2_000_000);
        assert!(g.ok());
        assert!(g.bytes_per_sec() > 0.0);
        assert!(g.mbits_per_sec() > g.bytes_per_sec() * 8.0 / (1024.0 * 1024.0) - 1e-9);
    }

    #[test]
    fn string_entry_point_tolerates_garbage() {
        let mut g = ThroughputGauge::default();
        g.update_str("not a number");
        g.update_str("12345");
        assert!(g.ok());
    }
}
