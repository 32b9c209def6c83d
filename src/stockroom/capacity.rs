//! # Capacity Accounting
//!
//! Storage usage is an estimate, not a byte-exact count: every key and value is
//! charged two bytes per UTF-16 code unit, the way browser storage quotas are
//! usually reasoned about. The quota is a fixed configured ceiling.
//!
//! The "nearly full" warning is edge-triggered: [`CapacityMonitor::observe`]
//! fires once when usage crosses above the threshold and stays quiet while it
//! remains there. Dropping back to or below the threshold re-arms it.

use serde::Serialize;
use std::fmt;

pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_WARN_THRESHOLD_PERCENT: f64 = 85.0;

/// Accounted size of one stored entry.
pub fn entry_bytes(key: &str, value: &str) -> u64 {
    let units = key.encode_utf16().count() + value.encode_utf16().count();
    units as u64 * 2
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapacityUsage {
    pub used_bytes: u64,
    pub quota_bytes: u64,
    pub percentage: f64,
}

impl CapacityUsage {
    pub fn new(used_bytes: u64, quota_bytes: u64) -> Self {
        let percentage = if quota_bytes == 0 {
            100.0
        } else {
            used_bytes as f64 / quota_bytes as f64 * 100.0
        };
        Self {
            used_bytes,
            quota_bytes,
            percentage,
        }
    }
}

impl fmt::Display for CapacityUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} used ({:.1}%)",
            format_bytes(self.used_bytes),
            format_bytes(self.quota_bytes),
            self.percentage
        )
    }
}

pub struct CapacityMonitor {
    quota_bytes: u64,
    warn_threshold: f64,
    above_threshold: bool,
}

impl Default for CapacityMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA_BYTES, DEFAULT_WARN_THRESHOLD_PERCENT)
    }
}

impl CapacityMonitor {
    pub fn new(quota_bytes: u64, warn_threshold: f64) -> Self {
        Self {
            quota_bytes,
            warn_threshold,
            above_threshold: false,
        }
    }

    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    /// Measure a snapshot of every persisted key. Pure; does not touch the latch.
    pub fn usage<K, V>(&self, entries: &[(K, V)]) -> CapacityUsage
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let used = entries
            .iter()
            .map(|(k, v)| entry_bytes(k.as_ref(), v.as_ref()))
            .sum();
        CapacityUsage::new(used, self.quota_bytes)
    }

    /// Feed a fresh measurement through the threshold latch.
    /// Returns `true` only on the transition into the above-threshold state.
    pub fn observe(&mut self, usage: &CapacityUsage) -> bool {
        let above = usage.percentage > self.warn_threshold;
        let crossed = above && !self.above_threshold;
        self.above_threshold = above;
        crossed
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let b = bytes as f64;
    if b >= MIB {
        format!("{:.2} MB", b / MIB)
    } else if b >= KIB {
        format!("{:.2} KB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}
