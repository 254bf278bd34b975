//! JSON output format for profiler reports
//!
//! Exposes the same numbers as the text report in a machine-parseable
//! document, plus the run counters the text renderer only logs.

use crate::analyzer::AnalysisReport;
use crate::stats::ReportBundle;
use serde::{Deserialize, Serialize};

/// Statistics for one occurrence name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOccurrenceStats {
    pub occurrence: String,
    pub executions: u64,
    pub mean_us: f64,
    pub std_dev_us: f64,
    pub min_us: i64,
    pub max_us: i64,
    pub total_ms: f64,
}

/// One category's report block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonCategoryReport {
    /// Occurrence-type label (e.g. "RP_EVENT")
    pub occurrence_type: String,
    /// Per-occurrence statistics, in by-total order
    pub occurrences: Vec<JsonOccurrenceStats>,
    pub sorted_by_total: Vec<String>,
    pub sorted_by_mean: Vec<String>,
}

/// Run-level counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSummary {
    pub total_lines: u64,
    pub parsed_records: u64,
    pub var_mod_skipped: u64,
    pub malformed_lines: u64,
    pub unrecognized_records: u64,
    pub unmatched_exits: u64,
    pub unmatched_entries: u64,
}

/// Root JSON output structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub categories: Vec<JsonCategoryReport>,
    pub summary: JsonSummary,
}

impl JsonCategoryReport {
    /// Build one category block from a report bundle. Occurrences are
    /// listed in by-total order so the document is deterministic.
    pub fn from_bundle(bundle: &ReportBundle) -> Self {
        let occurrences = bundle
            .by_total
            .iter()
            .filter_map(|name| {
                bundle.stats.get(name).map(|stats| JsonOccurrenceStats {
                    occurrence: name.clone(),
                    executions: stats.execution_count,
                    mean_us: stats.mean_us,
                    std_dev_us: stats.stdev_us,
                    min_us: stats.min_us,
                    max_us: stats.max_us,
                    total_ms: stats.total_ms,
                })
            })
            .collect();

        Self {
            occurrence_type: bundle.occurrence_type.clone(),
            occurrences,
            sorted_by_total: bundle.by_total.clone(),
            sorted_by_mean: bundle.by_mean.clone(),
        }
    }
}

impl JsonReport {
    /// Build the full document from one run's results.
    pub fn from_report(report: &AnalysisReport) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "ruleprof-json-v1".to_string(),
            categories: report
                .bundles
                .iter()
                .map(JsonCategoryReport::from_bundle)
                .collect(),
            summary: JsonSummary {
                total_lines: report.parse_summary.total_lines,
                parsed_records: report.parse_summary.parsed,
                var_mod_skipped: report.parse_summary.var_mod_skipped,
                malformed_lines: report.parse_summary.malformed,
                unrecognized_records: report.parse_summary.unrecognized,
                unmatched_exits: report.unmatched_exits,
                unmatched_entries: report.unmatched_entries,
            },
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
