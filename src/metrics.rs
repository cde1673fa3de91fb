//! Threat Metrics Aggregator
//!
//! Rolling window of fabricated threat counters sampled on a fixed cadence
//! while a simulation is active. Counters are cumulative within a run and
//! never decrease; response time is an independent draw each sample.

use crate::catalog::AGENT_ROSTER;
use crate::log::BoundedLog;
use chrono::{DateTime, Utc};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Window size, matching the dashboard's 100-point history.
pub const METRICS_WINDOW: usize = 100;

/// Sampling period while a simulation is running.
pub const METRICS_TICK_MS: u64 = 1500;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ThreatMetricSample {
    pub timestamp: DateTime<Utc>,
    pub threats_detected: u64,
    pub threats_blocked: u64,
    pub active_agents: usize,
    pub response_time_ms: u64,
}

/// Derive the next sample from the previous one.
///
/// The first sample is seeded from small random draws rather than zero so
/// the demo opens with plausible non-zero counters. `threats_blocked` is
/// clamped to `threats_detected`; the counters otherwise only grow.
pub fn next_sample<R: Rng + ?Sized>(
    rng: &mut R,
    previous: Option<&ThreatMetricSample>,
    timestamp: DateTime<Utc>,
) -> ThreatMetricSample {
    let (threats_detected, threats_blocked) = match previous {
        Some(prev) => (
            prev.threats_detected + rng.random_range(0..3),
            prev.threats_blocked + rng.random_range(0..2),
        ),
        None => (rng.random_range(0..10), rng.random_range(0..8)),
    };

    ThreatMetricSample {
        timestamp,
        threats_detected,
        threats_blocked: threats_blocked.min(threats_detected),
        active_agents: AGENT_ROSTER.len(),
        response_time_ms: rng.random_range(10..60),
    }
}

/// Owns the bounded sample history and the sampling operation.
#[derive(Debug, Clone)]
pub struct MetricsWindow {
    samples: BoundedLog<ThreatMetricSample>,
}

impl MetricsWindow {
    pub fn new() -> Self {
        Self {
            samples: BoundedLog::with_capacity(METRICS_WINDOW),
        }
    }

    /// Append the next sample, evicting the oldest past the window cap.
    pub fn record<R: Rng + ?Sized>(&mut self, rng: &mut R, timestamp: DateTime<Utc>) {
        let sample = next_sample(rng, self.samples.latest(), timestamp);
        self.samples.push(sample);
    }

    pub fn latest(&self) -> Option<&ThreatMetricSample> {
        self.samples.latest()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThreatMetricSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn to_vec(&self) -> Vec<ThreatMetricSample> {
        self.samples.to_vec()
    }
}

impl Default for MetricsWindow {
    fn default() -> Self {
        Self::new()
    }
}
