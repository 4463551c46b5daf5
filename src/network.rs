//! Live network throughput for the speed overlay.

use std::time::{Duration, Instant};

use sysinfo::Networks;
use tracing::debug;

use crate::utils;

pub const SAMPLE_EVERY: Duration = Duration::from_secs(1);

/// Cumulative byte counters summed over all interfaces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub received: u64,
    pub transmitted: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Throughput {
    pub down_bps: f64,
    pub up_bps: f64,
}

impl Throughput {
    /// Rate between two samples. Counters that went backwards (an interface
    /// was reset or removed) read as zero.
    pub fn between(earlier: Counters, later: Counters, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        if secs <= 0.0 {
            return Self::default();
        }
        Self {
            down_bps: later.received.saturating_sub(earlier.received) as f64 / secs,
            up_bps: later.transmitted.saturating_sub(earlier.transmitted) as f64 / secs,
        }
    }
}

pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{}/s", utils::format_size(bytes_per_sec.max(0.0).round() as u64))
}

pub struct NetworkMeter {
    networks: Networks,
    last: Counters,
    sampled_at: Instant,
    current: Option<Throughput>,
}

impl Default for NetworkMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkMeter {
    pub fn new() -> Self {
        let networks = Networks::new_with_refreshed_list();
        let last = totals(&networks);
        Self {
            networks,
            last,
            sampled_at: Instant::now(),
            current: None,
        }
    }

    /// `None` until the first full sample interval has passed.
    pub fn current(&self) -> Option<Throughput> {
        self.current
    }

    /// Call this from the eframe update loop. Samples at most once a second.
    pub fn tick(&mut self) {
        let elapsed = self.sampled_at.elapsed();
        if elapsed < SAMPLE_EVERY {
            return;
        }
        self.networks.refresh(true);
        let now = totals(&self.networks);
        let rate = Throughput::between(self.last, now, elapsed);
        debug!(down = rate.down_bps, up = rate.up_bps, "network sample");
        self.current = Some(rate);
        self.last = now;
        self.sampled_at = Instant::now();
    }
}

fn totals(networks: &Networks) -> Counters {
    networks
        .list()
        .values()
        .fold(Counters::default(), |acc, data| Counters {
            received: acc.received.saturating_add(data.total_received()),
            transmitted: acc.transmitted.saturating_add(data.total_transmitted()),
        })
}
