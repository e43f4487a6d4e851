//! Per-route latency statistics.
//!
//! # Responsibilities
//! - Track min/max/total/count per route label
//! - Render a stable text snapshot for `/internal/stats`
//!
//! # Design Decisions
//! - One lock per label; recorders on different routes never contend
//! - Labels are created during route registration, so the label map itself
//!   is immutable once traffic starts and is read without locking
//! - `min == 0` means "unset" and is overwritten by the first nonzero sample

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Sample {
    min: Duration,
    max: Duration,
    total: Duration,
    count: u64,
}

/// Point-in-time view of one latency record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySnapshot {
    pub min: Duration,
    pub max: Duration,
    pub total: Duration,
    pub count: u64,
}

impl LatencySnapshot {
    /// `total / count`, or `None` before the first sample.
    pub fn mean(&self) -> Option<Duration> {
        if self.count == 0 {
            None
        } else {
            let nanos = self.total.as_nanos() / u128::from(self.count);
            Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
        }
    }
}

/// Running latency accumulator for one route.
#[derive(Debug, Default)]
pub struct LatencyRecord {
    sample: Mutex<Sample>,
}

impl LatencyRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation into the record.
    pub fn update(&self, d: Duration) {
        let mut s = self.sample.lock();
        if s.min.is_zero() || s.min > d {
            s.min = d;
        }
        if s.max < d {
            s.max = d;
        }
        s.total = s.total.saturating_add(d);
        s.count = s.count.saturating_add(1);
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        let s = *self.sample.lock();
        LatencySnapshot {
            min: s.min,
            max: s.max,
            total: s.total,
            count: s.count,
        }
    }

    fn render(&self) -> String {
        let snap = self.snapshot();
        match snap.mean() {
            Some(mean) => format!(
                "{{\"min\":{:?}, \"max\":{:?}, \"med\":{:?}}}",
                snap.min, snap.max, mean
            ),
            None => "insufficient data".to_string(),
        }
    }
}

/// Collection of latency records keyed by route label.
#[derive(Debug, Default)]
pub struct StatsCollector {
    records: BTreeMap<String, Arc<LatencyRecord>>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the record for `label`, or return the existing one.
    ///
    /// Called while routes are registered, before traffic.
    pub fn register(&mut self, label: impl Into<String>) -> Arc<LatencyRecord> {
        self.records
            .entry(label.into())
            .or_insert_with(|| Arc::new(LatencyRecord::new()))
            .clone()
    }

    /// Record one observation for `label`. Unknown labels are ignored.
    pub fn record(&self, label: &str, d: Duration) {
        match self.records.get(label) {
            Some(record) => record.update(d),
            None => tracing::debug!(label = %label, "Latency sample for unregistered label dropped"),
        }
    }

    pub fn get(&self, label: &str) -> Option<&Arc<LatencyRecord>> {
        self.records.get(label)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One `label: stats` line per record, sorted by label.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (label, record) in &self.records {
            let _ = writeln!(out, "{}: {}", label, record.render());
        }
        out
    }
}

/// Logs how long a scope took when dropped.
///
/// ```ignore
/// let _timer = Elapsed::new("rebuild index");
/// ```
#[derive(Debug)]
pub struct Elapsed {
    what: &'static str,
    start: Instant,
}

impl Elapsed {
    pub fn new(what: &'static str) -> Self {
        Self {
            what,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Elapsed {
    fn drop(&mut self) {
        tracing::debug!(what = self.what, elapsed = ?self.start.elapsed(), "Scope finished");
    }
}
