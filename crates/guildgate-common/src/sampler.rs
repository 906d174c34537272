//! Windowed rate sampler — a smoothed "ticks per second" liveness gauge.
//!
//! A background task ticks `target_rate` times per second. Each tick measures
//! the real time since the previous one, converts it to an instantaneous rate,
//! clamps it to the target, and pushes it into a ring buffer of
//! `history_length` samples. A stalled event loop shows up as a sagging average.
//!
//! One sampler per monitored rate lives in the server's shared state for the
//! whole process. Tick and queries share a single mutex.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::SamplerConfig;

/// Share of the target rate at or above which the gauge is healthy.
pub const GOOD_RATIO: f64 = 0.90;
/// Share of the target rate at or above which the gauge is degraded but acceptable.
pub const WARNING_RATIO: f64 = 0.75;

/// Health band for a rate value, relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateBand {
    Good,
    Warning,
    Poor,
}

impl RateBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Uninitialized,
    Running,
}

struct RateWindow {
    samples: VecDeque<f64>,
    last_tick: Instant,
}

struct Inner {
    target_rate: f64,
    history_length: usize,
    window: Mutex<RateWindow>,
    running: AtomicBool,
}

/// Cheap to clone; all clones share one window.
#[derive(Clone)]
pub struct RateSampler {
    inner: Arc<Inner>,
}

impl RateSampler {
    pub fn new(config: &SamplerConfig) -> Self {
        let history_length = config.history_length.max(1);
        Self {
            inner: Arc::new(Inner {
                target_rate: f64::from(config.target_rate.max(1)),
                history_length,
                window: Mutex::new(RateWindow {
                    samples: VecDeque::with_capacity(history_length + 1),
                    last_tick: Instant::now(),
                }),
                running: AtomicBool::new(false),
            }),
        }
    }

    pub fn target_rate(&self) -> f64 {
        self.inner.target_rate
    }

    pub fn history_length(&self) -> usize {
        self.inner.history_length
    }

    /// Time between ticks: `1000 / target_rate` milliseconds.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.inner.target_rate)
    }

    pub fn state(&self) -> SamplerState {
        if self.inner.running.load(Ordering::Acquire) {
            SamplerState::Running
        } else {
            SamplerState::Uninitialized
        }
    }

    /// Start ticking on the current tokio runtime.
    ///
    /// Only the first call spawns; later calls return `None`. Aborting the
    /// returned handle stops the sampler.
    pub fn spawn(&self) -> Option<JoinHandle<()>> {
        if self.inner.running.swap(true, Ordering::AcqRel) {
            return None;
        }

        let period = self.period();
        self.window().last_tick = Instant::now();
        tracing::info!(
            target_rate = self.inner.target_rate,
            history_length = self.inner.history_length,
            period_ms = period.as_millis() as u64,
            "Rate sampler started"
        );

        let sampler = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                sampler.record_tick_at(Instant::now());
            }
        }))
    }

    /// Apply one tick observed at `now`; returns the sample that was stored.
    pub fn record_tick_at(&self, now: Instant) -> f64 {
        let target = self.inner.target_rate;
        let mut window = self.window();

        let elapsed_ms = now.saturating_duration_since(window.last_tick).as_secs_f64() * 1000.0;
        let sample = if elapsed_ms > 0.0 {
            (1000.0 / elapsed_ms).min(target)
        } else {
            target
        };

        window.samples.push_back(sample);
        while window.samples.len() > self.inner.history_length {
            window.samples.pop_front();
        }
        window.last_tick = now;

        if sample < target * WARNING_RATIO {
            tracing::trace!(sample, elapsed_ms, "Tick arrived late");
        }
        sample
    }

    /// Mean of the most recent `min(duration, history_length)` samples, two decimals.
    ///
    /// Returns the target rate when there is nothing to average yet.
    pub fn average(&self, duration: usize) -> f64 {
        let window = self.window();
        let take = duration
            .min(self.inner.history_length)
            .min(window.samples.len());
        if take == 0 {
            return self.inner.target_rate;
        }

        let sum: f64 = window.samples.iter().rev().take(take).sum();
        round2(sum / take as f64)
    }

    pub fn band(&self, rate: f64) -> RateBand {
        let target = self.inner.target_rate;
        if rate >= target * GOOD_RATIO {
            RateBand::Good
        } else if rate >= target * WARNING_RATIO {
            RateBand::Warning
        } else {
            RateBand::Poor
        }
    }

    pub fn latest(&self) -> Option<f64> {
        self.window().samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.window().samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window().samples.is_empty()
    }

    /// Copy of the buffer, oldest first.
    pub fn snapshot(&self) -> Vec<f64> {
        self.window().samples.iter().copied().collect()
    }

    fn window(&self) -> MutexGuard<'_, RateWindow> {
        // A panic while holding the lock cannot leave the deque half-written
        self.inner
            .window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
