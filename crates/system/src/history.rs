//! Sliding-window throughput estimation over cumulative I/O counters.
//!
//! The window holds the last few [`Sample`]s. A rate is the delta between the
//! oldest and newest retained sample divided by the wall-clock time between
//! them, so short bursts are smoothed over the whole window.

use nodestat_core::RateSnapshot;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// The four cumulative counters tracked by the window, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub disk_read: u64,
    pub disk_write: u64,
    pub net_in: u64,
    pub net_out: u64,
}

/// One timestamped reading of [`Counters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub at: Instant,
    pub counters: Counters,
}

/// Window size and clamping policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateConfig {
    /// Maximum number of retained samples (at least 2).
    pub capacity: usize,
    /// Floor applied to the elapsed time between oldest and newest sample.
    pub min_elapsed: Duration,
    /// Smallest rate reported for a counter that moved at all.
    pub min_rate: f64,
}

impl RateConfig {
    pub const DEFAULT_CAPACITY: usize = 5;
    pub const DEFAULT_MIN_ELAPSED: Duration = Duration::from_millis(100);
    pub const DEFAULT_MIN_RATE: f64 = 0.01;

    /// Build a config from raw settings, replacing unusable values.
    ///
    /// Capacity is raised to 2; a non-finite or non-positive elapsed floor and
    /// a non-finite or negative minimum rate fall back to the defaults.
    pub fn new(capacity: usize, min_elapsed_secs: f64, min_rate: f64) -> Self {
        let min_elapsed = Duration::try_from_secs_f64(min_elapsed_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Self::DEFAULT_MIN_ELAPSED);
        let min_rate = if min_rate.is_finite() && min_rate >= 0.0 {
            min_rate
        } else {
            Self::DEFAULT_MIN_RATE
        };

        Self {
            capacity: capacity.max(2),
            min_elapsed,
            min_rate,
        }
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            min_elapsed: Self::DEFAULT_MIN_ELAPSED,
            min_rate: Self::DEFAULT_MIN_RATE,
        }
    }
}

#[derive(Debug)]
struct Window {
    samples: VecDeque<Sample>,
    /// `true` until the first sample has been recorded.
    first_run: bool,
}

/// Bounded history of counter samples plus the rate computation over it.
///
/// All access goes through [`record`](Self::record), [`rates`](Self::rates)
/// and [`ingest`](Self::ingest), each of which holds the internal lock for
/// the duration of the call only.
#[derive(Debug)]
pub struct RateEstimator {
    config: RateConfig,
    window: Mutex<Window>,
}

static GLOBAL: OnceLock<Arc<RateEstimator>> = OnceLock::new();

impl RateEstimator {
    pub fn new(config: RateConfig) -> Self {
        Self {
            window: Mutex::new(Window {
                samples: VecDeque::with_capacity(config.capacity + 1),
                first_run: true,
            }),
            config,
        }
    }

    /// Process-wide instance with the default policy.
    pub fn global() -> Arc<Self> {
        Self::global_with(RateConfig::default())
    }

    /// Process-wide instance, created with `config` on the first call.
    ///
    /// Later calls return the existing instance and ignore `config`.
    pub fn global_with(config: RateConfig) -> Arc<Self> {
        GLOBAL
            .get_or_init(|| {
                tracing::debug!(?config, "initializing global rate estimator");
                Arc::new(Self::new(config))
            })
            .clone()
    }

    pub fn config(&self) -> &RateConfig {
        &self.config
    }

    /// Number of samples currently retained.
    pub fn len(&self) -> usize {
        self.window.lock().samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a sample, evicting the oldest if the window is full.
    pub fn record(&self, at: Instant, counters: Counters) {
        let mut window = self.window.lock();
        self.push(&mut window, Sample { at, counters });
    }

    /// Current rates over the retained window.
    pub fn rates(&self) -> RateSnapshot {
        let window = self.window.lock();
        compute(&window.samples, &self.config)
    }

    /// Record a sample and return the rates it yields, atomically.
    ///
    /// The very first sample ever recorded yields zero rates.
    pub fn ingest(&self, at: Instant, counters: Counters) -> RateSnapshot {
        let mut window = self.window.lock();
        if self.push(&mut window, Sample { at, counters }) {
            return RateSnapshot::default();
        }
        compute(&window.samples, &self.config)
    }

    /// Returns `true` if this was the first sample ever recorded.
    fn push(&self, window: &mut Window, sample: Sample) -> bool {
        window.samples.push_back(sample);
        if window.samples.len() > self.config.capacity {
            window.samples.pop_front();
        }
        std::mem::replace(&mut window.first_run, false)
    }
}

fn compute(samples: &VecDeque<Sample>, config: &RateConfig) -> RateSnapshot {
    if samples.len() < 2 {
        return RateSnapshot::default();
    }
    let (Some(oldest), Some(newest)) = (samples.front(), samples.back()) else {
        return RateSnapshot::default();
    };

    let elapsed = newest
        .at
        .saturating_duration_since(oldest.at)
        .max(config.min_elapsed)
        .as_secs_f64();

    let (old, new) = (&oldest.counters, &newest.counters);
    let rate = |from: u64, to: u64| counter_rate(from, to, elapsed, config.min_rate);

    RateSnapshot {
        disk_read: rate(old.disk_read, new.disk_read),
        disk_write: rate(old.disk_write, new.disk_write),
        net_in: rate(old.net_in, new.net_in),
        net_out: rate(old.net_out, new.net_out),
    }
}

/// Rate of one counter between two readings.
///
/// A counter that went backwards is assumed to have restarted from zero, so
/// its newest absolute value is taken as the delta. This also covers a stale
/// read that briefly reports a lower value.
fn counter_rate(from: u64, to: u64, elapsed_secs: f64, min_rate: f64) -> f64 {
    let delta = if to >= from { to - from } else { to };
    if delta == 0 {
        return 0.0;
    }
    (delta as f64 / elapsed_secs).max(min_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    fn counters(disk_read: u64, disk_write: u64, net_in: u64, net_out: u64) -> Counters {
        Counters {
            disk_read,
            disk_write,
            net_in,
            net_out,
        }
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let est = RateEstimator::new(RateConfig::default());
        let t0 = Instant::now();
        for i in 0..12u64 {
            est.record(t0 + secs(i as f64), counters(i, i, i, i));
            assert_eq!(est.len(), (i as usize + 1).min(5));
        }
    }

    #[test]
    fn sixth_record_evicts_the_oldest() {
        let est = RateEstimator::new(RateConfig::default());
        let t0 = Instant::now();
        for i in 0..6u64 {
            est.record(t0 + secs(i as f64), counters(i * 100, 0, 0, 0));
        }
        assert_eq!(est.len(), 5);
        // Window now spans samples 1..=5: (500 - 100) / 4s.
        assert!(close(est.rates().disk_read, 100.0));
    }

    #[test]
    fn fewer_than_two_samples_is_zero() {
        let est = RateEstimator::new(RateConfig::default());
        assert_eq!(est.rates(), RateSnapshot::default());

        est.record(Instant::now(), counters(10, 20, 30, 40));
        assert_eq!(est.rates(), RateSnapshot::default());
    }

    #[test]
    fn first_ingest_is_zero_regardless_of_values() {
        let est = RateEstimator::new(RateConfig::default());
        let rates = est.ingest(Instant::now(), counters(u64::MAX, 1, 2, 3));
        assert_eq!(rates, RateSnapshot::default());
        assert_eq!(est.rates(), RateSnapshot::default());
    }

    #[test]
    fn steady_counters_give_delta_over_time() {
        let est = RateEstimator::new(RateConfig::default());
        let t0 = Instant::now();
        est.ingest(t0, counters(1_000, 2_000, 3_000, 4_000));
        let rates = est.ingest(t0 + secs(4.0), counters(5_000, 2_400, 3_002, 44_000));

        assert!(close(rates.disk_read, 1_000.0));
        assert!(close(rates.disk_write, 100.0));
        assert!(close(rates.net_in, 0.5));
        assert!(close(rates.net_out, 10_000.0));
    }

    #[test]
    fn hundred_to_hundred_fifty_mib_over_ten_seconds() {
        let est = RateEstimator::new(RateConfig::default());
        let t0 = Instant::now();
        est.record(t0, counters(100 * MIB, 0, 0, 0));
        est.record(t0 + secs(10.0), counters(150 * MIB, 0, 0, 0));

        let rates = est.rates();
        assert!(close(rates.disk_read, 5_242_880.0));
        assert!(close(rates.disk_read / MIB as f64, 5.0));
        assert_eq!(rates.disk_write, 0.0);
    }

    #[test]
    fn counter_reset_uses_newest_value() {
        let est = RateEstimator::new(RateConfig::default());
        let t0 = Instant::now();
        est.record(t0, counters(9_000, 0, 500, 0));
        est.record(t0 + secs(2.0), counters(400, 0, 100, 0));

        let rates = est.rates();
        assert!(close(rates.disk_read, 200.0));
        assert!(close(rates.net_in, 50.0));
        assert!(rates.disk_read >= 0.0 && rates.net_in >= 0.0);
    }

    #[test]
    fn reset_to_zero_reports_no_activity() {
        let est = RateEstimator::new(RateConfig::default());
        let t0 = Instant::now();
        est.record(t0, counters(9_000, 0, 0, 0));
        est.record(t0 + secs(1.0), counters(0, 0, 0, 0));
        assert_eq!(est.rates().disk_read, 0.0);
    }

    #[test]
    fn slow_activity_is_floored_to_min_rate() {
        let est = RateEstimator::new(RateConfig::default());
        let t0 = Instant::now();
        est.record(t0, counters(0, 0, 10, 0));
        est.record(t0 + secs(1_000.0), counters(1, 0, 10, 0));

        let rates = est.rates();
        assert_eq!(rates.disk_read, 0.01);
        assert_eq!(rates.net_in, 0.0);
    }

    #[test]
    fn close_samples_divide_by_elapsed_floor() {
        let est = RateEstimator::new(RateConfig::default());
        let t0 = Instant::now();
        est.record(t0, counters(0, 0, 0, 0));
        est.record(t0 + Duration::from_millis(20), counters(10, 0, 0, 0));
        assert!(close(est.rates().disk_read, 100.0));

        let same_instant = RateEstimator::new(RateConfig::default());
        same_instant.record(t0, counters(0, 0, 0, 0));
        same_instant.record(t0, counters(0, 0, 0, 5));
        assert!(close(same_instant.rates().net_out, 50.0));
    }

    #[test]
    fn backwards_clock_uses_elapsed_floor() {
        let est = RateEstimator::new(RateConfig::default());
        let t0 = Instant::now() + secs(5.0);
        est.record(t0, counters(0, 0, 0, 0));
        est.record(t0 - secs(1.0), counters(0, 1, 0, 0));
        assert!(close(est.rates().disk_write, 10.0));
    }

    #[test]
    fn rates_are_zero_only_for_unchanged_counters() {
        let est = RateEstimator::new(RateConfig::default());
        let t0 = Instant::now();
        est.record(t0, counters(5, 5, 5, 5));
        est.record(t0 + secs(100_000.0), counters(6, 5, 4, 5));

        let rates = est.rates();
        assert!(rates.disk_read > 0.0);
        assert_eq!(rates.disk_write, 0.0);
        assert!(rates.net_in > 0.0);
        assert_eq!(rates.net_out, 0.0);
    }

    #[test]
    fn config_sanitizes_bad_values() {
        let config = RateConfig::new(1, -3.0, f64::NAN);
        assert_eq!(config.capacity, 2);
        assert_eq!(config.min_elapsed, RateConfig::DEFAULT_MIN_ELAPSED);
        assert_eq!(config.min_rate, RateConfig::DEFAULT_MIN_RATE);

        let config = RateConfig::new(10, 0.5, 1.0);
        assert_eq!(config.capacity, 10);
        assert_eq!(config.min_elapsed, Duration::from_millis(500));
        assert_eq!(config.min_rate, 1.0);
    }

    #[test]
    fn custom_policy_is_applied() {
        let est = RateEstimator::new(RateConfig::new(2, 1.0, 3.0));
        let t0 = Instant::now();
        est.record(t0, counters(0, 0, 0, 0));
        est.record(t0 + secs(0.2), counters(1, 0, 0, 0));
        est.record(t0 + secs(0.4), counters(2, 0, 0, 0));

        assert_eq!(est.len(), 2);
        // delta 1 over the 1s floor is below the 3.0 minimum.
        assert_eq!(est.rates().disk_read, 3.0);
    }

    #[test]
    fn global_instance_is_shared() {
        let a = RateEstimator::global();
        let b = RateEstimator::global_with(RateConfig::new(50, 2.0, 1.0));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.config(), &RateConfig::default());
    }

    #[test]
    fn concurrent_ingest_keeps_window_bounded() {
        let est = Arc::new(RateEstimator::new(RateConfig::default()));
        let t0 = Instant::now();

        let handles: Vec<_> = (0..8u64)
            .map(|worker| {
                let est = Arc::clone(&est);
                std::thread::spawn(move || {
                    for i in 0..100u64 {
                        let n = worker * 1_000 + i;
                        let rates = est.ingest(t0 + secs(n as f64), counters(n, n, n, n));
                        assert!(rates.disk_read >= 0.0);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(est.len(), 5);
    }
}
