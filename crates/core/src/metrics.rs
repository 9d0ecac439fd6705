//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Connectability checks (cache lookups, probes)
//! - Session history queries

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Connectability
// =============================================================================

/// Connectability checks by outcome.
pub static CONNECTABLE_CHECKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "seedwatch_connectable_checks_total",
            "Total peer connectability checks",
        ),
        &["result"], // "connectable", "not_connectable", "disabled", "malformed", "deadline"
    )
    .unwrap()
});

/// Probe result cache lookups.
pub static CONNECTABLE_CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "seedwatch_connectable_cache_lookups_total",
            "Connectability cache lookups by outcome",
        ),
        &["outcome"], // "hit", "miss", "stale", "error", "undecodable"
    )
    .unwrap()
});

/// Active network probes.
pub static CONNECTABLE_PROBES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "seedwatch_connectable_probes_total",
            "Active TCP probes by result",
        ),
        &["result"], // "connectable", "unreachable", "timeout"
    )
    .unwrap()
});

/// Probe duration in seconds.
pub static CONNECTABLE_PROBE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "seedwatch_connectable_probe_duration_seconds",
            "Duration of active TCP probes",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// History queries
// =============================================================================

/// History queries by status.
pub static HISTORY_QUERIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "seedwatch_history_queries_total",
            "Total session history queries",
        ),
        &["status"], // "ok", "invalid", "timeout", "error"
    )
    .unwrap()
});

/// History query duration in seconds.
pub static HISTORY_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "seedwatch_history_query_duration_seconds",
            "Duration of session history queries",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CONNECTABLE_CHECKS.clone()),
        Box::new(CONNECTABLE_CACHE_LOOKUPS.clone()),
        Box::new(CONNECTABLE_PROBES.clone()),
        Box::new(CONNECTABLE_PROBE_DURATION.clone()),
        Box::new(HISTORY_QUERIES.clone()),
        Box::new(HISTORY_QUERY_DURATION.clone()),
    ]
}
