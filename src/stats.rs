//! Duration statistics aggregation
//!
//! Reduces one category's duration samples into per-occurrence
//! descriptive statistics and two rankings (by total time and by mean
//! time). Sums and means go through Trueno vectors; the population
//! variance is computed in closed form.

use crate::matcher::DurationSample;
use std::collections::HashMap;
use thiserror::Error;

/// Defensive guard for statistics over zero samples. Aggregation only
/// creates an occurrence once a sample exists, so this never fires from
/// [`aggregate`]; it exists so a divide-by-zero cannot be introduced by
/// future callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot compute statistics over an empty sample set")]
pub struct EmptySampleSet;

/// Descriptive statistics for one occurrence name.
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceStats {
    /// Number of matched entry/exit pairs.
    pub execution_count: u64,
    /// Arithmetic mean of the samples, microseconds, unrounded.
    pub mean_us: f64,
    /// Population standard deviation (divide by N), rounded to 2 decimal
    /// places. Rounding is applied only here, never to intermediates.
    pub stdev_us: f64,
    pub min_us: i64,
    pub max_us: i64,
    /// Sum of all samples divided by 1000.
    pub total_ms: f64,
}

impl OccurrenceStats {
    /// Compute statistics over one occurrence's samples.
    pub fn from_samples(samples: &[i64]) -> Result<Self, EmptySampleSet> {
        if samples.is_empty() {
            return Err(EmptySampleSet);
        }

        let values: Vec<f32> = samples.iter().map(|&s| s as f32).collect();
        let v = trueno::Vector::from_slice(&values);
        let mean = v.mean().unwrap_or(0.0);
        let total = v.sum().unwrap_or(0.0);

        // Population form: mean of squared deviations, divide by N
        let variance = values
            .iter()
            .map(|&d| {
                let dev = (d - mean) as f64;
                dev * dev
            })
            .sum::<f64>()
            / samples.len() as f64;
        let stdev_us = (variance.sqrt() * 100.0).round() / 100.0;

        Ok(Self {
            execution_count: samples.len() as u64,
            mean_us: mean as f64,
            stdev_us,
            min_us: samples.iter().copied().min().unwrap_or(0),
            max_us: samples.iter().copied().max().unwrap_or(0),
            total_ms: total as f64 / 1000.0,
        })
    }
}

/// Aggregated results for one category: per-occurrence statistics plus
/// both rankings, descending. Tie order among equal values is
/// unspecified.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBundle {
    /// Occurrence-type label, e.g. "RP_EVENT".
    pub occurrence_type: String,
    pub stats: HashMap<String, OccurrenceStats>,
    pub by_total: Vec<String>,
    pub by_mean: Vec<String>,
}

/// Summary totals across all occurrences of a bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleTotals {
    pub total_executions: u64,
    pub total_time_ms: f64,
}

impl ReportBundle {
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Sum executions and total time across every occurrence.
    pub fn totals(&self) -> BundleTotals {
        if self.stats.is_empty() {
            return BundleTotals {
                total_executions: 0,
                total_time_ms: 0.0,
            };
        }

        let counts: Vec<f32> = self.stats.values().map(|s| s.execution_count as f32).collect();
        let times: Vec<f32> = self.stats.values().map(|s| s.total_ms as f32).collect();

        let total_executions = trueno::Vector::from_slice(&counts).sum().unwrap_or(0.0) as u64;
        let total_time_ms = trueno::Vector::from_slice(&times).sum().unwrap_or(0.0) as f64;

        BundleTotals {
            total_executions,
            total_time_ms,
        }
    }
}

/// Reduce one category's duration samples into a report bundle.
pub fn aggregate(occurrence_type: &str, samples: &[DurationSample]) -> ReportBundle {
    let mut grouped: HashMap<String, Vec<i64>> = HashMap::new();
    for sample in samples {
        grouped
            .entry(sample.occurrence.clone())
            .or_default()
            .push(sample.elapsed_us);
    }

    let mut stats = HashMap::new();
    for (name, values) in &grouped {
        match OccurrenceStats::from_samples(values) {
            Ok(occurrence_stats) => {
                stats.insert(name.clone(), occurrence_stats);
            }
            Err(err) => {
                // Unreachable through grouping; kept as the guard policy
                tracing::warn!(occurrence = %name, error = %err, "dropping occurrence");
            }
        }
    }

    let by_total = rank_by(&stats, |s| s.total_ms);
    let by_mean = rank_by(&stats, |s| s.mean_us);

    ReportBundle {
        occurrence_type: occurrence_type.to_string(),
        stats,
        by_total,
        by_mean,
    }
}

/// Occurrence names sorted descending by a metric.
fn rank_by<F>(stats: &HashMap<String, OccurrenceStats>, metric: F) -> Vec<String>
where
    F: Fn(&OccurrenceStats) -> f64,
{
    let mut ranked: Vec<(&String, f64)> = stats.iter().map(|(name, s)| (name, metric(s))).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.into_iter().map(|(name, _)| name.clone()).collect()
}
