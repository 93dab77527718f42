//! Rolling metrics, alert thresholds, and trend/capacity projections (C9).
//!
//! System sampling follows `SystemMetricsCollector` in
//! `brain-infra::performance_monitor` (refresh-then-read against a single
//! long-lived `sysinfo::System`); the rolling windows and projection math
//! are new, since the teacher tracked point-in-time snapshots rather than
//! trends (`SPEC_FULL.md` §4.9).

use brain_types::{AlertThresholds, AnalyticsConfig};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use sysinfo::System;
use tokio::sync::RwLock;

#[derive(Debug, Clone, serde::Serialize)]
pub struct SystemSnapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu_usage_percent: f64,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub process_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Alert {
    pub name: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub triggered_at: DateTime<Utc>,
}

/// A fixed-capacity time series. Oldest samples drop off once
/// `max_entries` is reached, same retention model as the cache's LRU.
pub struct RollingWindow {
    samples: VecDeque<(DateTime<Utc>, f64)>,
    max_entries: usize,
}

impl RollingWindow {
    pub fn new(max_entries: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_entries.min(4096)),
            max_entries: max_entries.max(1),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.samples.push_back((Utc::now(), value));
        while self.samples.len() > self.max_entries {
            self.samples.pop_front();
        }
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|(_, v)| v).sum::<f64>() / self.samples.len() as f64
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().map(|(_, v)| *v)
    }

    /// Ordinary-least-squares slope of value against sample index, in units
    /// per sample. Positive means the metric is trending up.
    pub fn trend_slope(&self) -> f64 {
        let n = self.samples.len();
        if n < 2 {
            return 0.0;
        }
        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = self.mean();

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, (_, y)) in self.samples.iter().enumerate() {
            let dx = xs[i] - mean_x;
            numerator += dx * (y - mean_y);
            denominator += dx * dx;
        }
        if denominator.abs() < f64::EPSILON {
            0.0
        } else {
            numerator / denominator
        }
    }

    /// Samples until `capacity` is crossed at the current trend, or `None`
    /// if the trend is flat/moving away from capacity.
    pub fn samples_until_capacity(&self, capacity: f64) -> Option<f64> {
        let slope = self.trend_slope();
        let latest = self.latest()?;
        if slope <= 0.0 || latest >= capacity {
            return None;
        }
        Some((capacity - latest) / slope)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    cache_hit_rate: RwLock<RollingWindow>,
    response_time_ms: RwLock<RollingWindow>,
    error_rate: RwLock<RollingWindow>,
    system: Mutex<System>,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        let mut system = System::new_all();
        system.refresh_all();
        let capacity = config.max_history_entries;
        Self {
            cache_hit_rate: RwLock::new(RollingWindow::new(capacity)),
            response_time_ms: RwLock::new(RollingWindow::new(capacity)),
            error_rate: RwLock::new(RollingWindow::new(capacity)),
            system: Mutex::new(system),
            config,
        }
    }

    pub async fn record_cache_hit_rate(&self, hit_rate_percent: f64) {
        self.cache_hit_rate.write().await.push(hit_rate_percent);
    }

    pub async fn record_response_time(&self, millis: f64) {
        self.response_time_ms.write().await.push(millis);
    }

    pub async fn record_error_rate(&self, error_rate_percent: f64) {
        self.error_rate.write().await.push(error_rate_percent);
    }

    pub fn sample_system(&self) -> SystemSnapshot {
        let mut system = self.system.lock().unwrap_or_else(|e| e.into_inner());
        system.refresh_all();
        SystemSnapshot {
            timestamp: Utc::now(),
            cpu_usage_percent: system.global_cpu_info().cpu_usage() as f64,
            memory_used_bytes: system.used_memory(),
            memory_total_bytes: system.total_memory(),
            process_count: system.processes().len(),
        }
    }

    /// Evaluate the configured alert thresholds against the current rolling
    /// averages (`SPEC_FULL.md` §4.9).
    pub async fn check_alerts(&self) -> Vec<Alert> {
        let thresholds: &AlertThresholds = &self.config.alert_thresholds;
        let mut alerts = Vec::new();
        let now = Utc::now();

        let error_rate = self.error_rate.read().await.mean();
        if error_rate > thresholds.error_rate_percent {
            alerts.push(Alert {
                name: "error_rate".to_string(),
                severity: AlertSeverity::Critical,
                message: format!(
                    "error rate {:.1}% exceeds threshold {:.1}%",
                    error_rate, thresholds.error_rate_percent
                ),
                triggered_at: now,
            });
        }

        let response_time = self.response_time_ms.read().await.mean();
        if response_time > thresholds.response_time_ms {
            alerts.push(Alert {
                name: "response_time".to_string(),
                severity: AlertSeverity::Warning,
                message: format!(
                    "average response time {:.0}ms exceeds threshold {:.0}ms",
                    response_time, thresholds.response_time_ms
                ),
                triggered_at: now,
            });
        }

        let hit_rate = self.cache_hit_rate.read().await;
        if !hit_rate.is_empty() && hit_rate.mean() < thresholds.cache_hit_rate_floor_percent {
            alerts.push(Alert {
                name: "cache_hit_rate".to_string(),
                severity: AlertSeverity::Warning,
                message: format!(
                    "cache hit rate {:.1}% below floor {:.1}%",
                    hit_rate.mean(),
                    thresholds.cache_hit_rate_floor_percent
                ),
                triggered_at: now,
            });
        }

        alerts
    }

    /// Project how many future samples until response time would cross its
    /// alert threshold at the current trend, for capacity planning.
    pub async fn response_time_capacity_projection(&self) -> Option<f64> {
        self.response_time_ms
            .read()
            .await
            .samples_until_capacity(self.config.alert_thresholds.response_time_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_window_drops_oldest_past_capacity() {
        let mut window = RollingWindow::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            window.push(v);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.latest(), Some(4.0));
    }

    #[test]
    fn trend_slope_is_positive_for_increasing_series() {
        let mut window = RollingWindow::new(10);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            window.push(v);
        }
        assert!(window.trend_slope() > 0.0);
    }

    #[test]
    fn flat_series_has_no_capacity_projection() {
        let mut window = RollingWindow::new(10);
        for _ in 0..5 {
            window.push(50.0);
        }
        assert_eq!(window.samples_until_capacity(100.0), None);
    }

    #[tokio::test]
    async fn error_rate_above_threshold_raises_critical_alert() {
        let engine = AnalyticsEngine::new(AnalyticsConfig::default());
        for _ in 0..5 {
            engine.record_error_rate(20.0).await;
        }
        let alerts = engine.check_alerts().await;
        assert!(alerts.iter().any(|a| a.name == "error_rate" && a.severity == AlertSeverity::Critical));
    }

    #[tokio::test]
    async fn healthy_metrics_raise_no_alerts() {
        let engine = AnalyticsEngine::new(AnalyticsConfig::default());
        engine.record_error_rate(0.1).await;
        engine.record_response_time(50.0).await;
        engine.record_cache_hit_rate(90.0).await;
        let alerts = engine.check_alerts().await;
        assert!(alerts.is_empty());
    }
}
