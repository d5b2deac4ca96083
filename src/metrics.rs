//! Request metrics for the churn prediction service.

use crate::types::assessment::RiskTier;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector shared by all request handlers
pub struct ServiceMetrics {
    /// Successful predictions
    pub predictions: AtomicU64,
    /// Requests rejected because the record was invalid
    pub rejected_records: AtomicU64,
    /// Requests that failed during scoring or while the service was disabled
    pub failures: AtomicU64,
    /// Predictions by risk tier
    by_tier: RwLock<HashMap<RiskTier, u64>>,
    /// Prediction latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Churn probability distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    start_time: Instant,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            rejected_records: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            by_tier: RwLock::new(HashMap::new()),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, latency: Duration, probability: f64, tier: RiskTier) {
        self.predictions.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.latencies.write() {
            times.push(latency.as_micros() as u64);
            // Keep only the most recent samples
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (probability * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut by_tier) = self.by_tier.write() {
            *by_tier.entry(tier).or_insert(0) += 1;
        }
    }

    pub fn record_rejected(&self) {
        self.rejected_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Latency percentiles over the retained samples
    pub fn latency_stats(&self) -> LatencyStats {
        let mut sorted = read(&self.latencies).clone();
        if sorted.is_empty() {
            return LatencyStats::default();
        }
        sorted.sort_unstable();

        let count = sorted.len();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sorted.iter().sum::<u64>() / count as u64,
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let by_tier = read(&self.by_tier);
        let tier_count = |tier: RiskTier| by_tier.get(&tier).copied().unwrap_or(0);

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            predictions: self.predictions.load(Ordering::Relaxed),
            rejected_records: self.rejected_records.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            high: tier_count(RiskTier::High),
            medium: tier_count(RiskTier::Medium),
            low: tier_count(RiskTier::Low),
            score_distribution: *read(&self.score_buckets),
            latency: self.latency_stats(),
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let total = snapshot.predictions;
        let pct = |n: u64| {
            if total > 0 {
                n as f64 / total as f64 * 100.0
            } else {
                0.0
            }
        };

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              CHURN RADAR - SERVICE METRICS SUMMARY           ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Predictions: {:>8}  │  Rejected: {:>6}  │  Failed: {:>6} ║",
            total, snapshot.rejected_records, snapshot.failures
        );
        info!(
            "║ Latency (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5}      ║",
            snapshot.latency.mean_us,
            snapshot.latency.p50_us,
            snapshot.latency.p95_us,
            snapshot.latency.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Tiers: high {:>6} ({:>5.1}%)  medium {:>6} ({:>5.1}%)  low {:>6} ({:>5.1}%)",
            snapshot.high,
            pct(snapshot.high),
            snapshot.medium,
            pct(snapshot.medium),
            snapshot.low,
            pct(snapshot.low)
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Churn Probability Distribution:                              ║");
        for (i, &count) in snapshot.score_distribution.iter().enumerate() {
            let bar = "█".repeat(((pct(count) / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct(count),
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Point-in-time view served on `/api/stats`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub predictions: u64,
    pub rejected_records: u64,
    pub failures: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub score_distribution: [u64; 10],
    pub latency: LatencyStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), 0.85, RiskTier::High);
        metrics.record_prediction(Duration::from_micros(300), 0.10, RiskTier::Low);
        metrics.record_prediction(Duration::from_micros(200), 1.0, RiskTier::High);
        metrics.record_rejected();
        metrics.record_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.predictions, 3);
        assert_eq!(snapshot.rejected_records, 1);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.high, 2);
        assert_eq!(snapshot.medium, 0);
        assert_eq!(snapshot.low, 1);
        assert_eq!(snapshot.score_distribution[8], 1);
        assert_eq!(snapshot.score_distribution[9], 1);
        assert_eq!(snapshot.score_distribution[1], 1);
    }

    #[test]
    fn test_latency_stats() {
        let metrics = ServiceMetrics::new();
        assert_eq!(metrics.latency_stats().count, 0);

        for us in [100, 200, 300, 400] {
            metrics.record_prediction(Duration::from_micros(us), 0.5, RiskTier::Medium);
        }

        let stats = metrics.latency_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.p50_us, 300);
        assert_eq!(stats.max_us, 400);
    }
}
