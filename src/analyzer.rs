//! End-to-end analysis pipeline
//!
//! Drives one batch run: parse the candidate lines, correlate entries
//! with exits per category, aggregate duration samples into report
//! bundles. Single-threaded and synchronous; all records for a run are
//! held in memory and nothing survives past the run.

use crate::filter::CategoryFilter;
use crate::matcher::{correlate, MatchStrategy};
use crate::parser::{parse_lines, ParseSummary};
use crate::record::Category;
use crate::stats::{aggregate, ReportBundle};

/// Configuration for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    pub filter: CategoryFilter,
    pub strategy: MatchStrategy,
}

/// Everything one run produces: a bundle per selected category plus the
/// run counters.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub bundles: Vec<ReportBundle>,
    pub parse_summary: ParseSummary,
    pub unmatched_exits: u64,
    pub unmatched_entries: u64,
}

/// Analyze a batch of trace lines.
pub fn analyze<'a, I>(lines: I, config: &AnalyzerConfig) -> AnalysisReport
where
    I: IntoIterator<Item = &'a str>,
{
    let (records, parse_summary) = parse_lines(lines);

    let mut bundles = Vec::new();
    let mut unmatched_exits = 0;
    let mut unmatched_entries = 0;

    for category in Category::ALL {
        if !config.filter.should_report(category) {
            continue;
        }
        let outcome = correlate(records.list_for(category), category, config.strategy);
        if outcome.unmatched_exits > 0 || outcome.unmatched_entries > 0 {
            tracing::warn!(
                category = %category,
                unmatched_exits = outcome.unmatched_exits,
                unmatched_entries = outcome.unmatched_entries,
                "trace contains unpaired records"
            );
        }
        unmatched_exits += outcome.unmatched_exits;
        unmatched_entries += outcome.unmatched_entries;
        bundles.push(aggregate(category.label(), &outcome.samples));
    }

    if parse_summary.malformed > 0 {
        tracing::warn!(
            malformed = parse_summary.malformed,
            "some trace lines were rejected"
        );
    }

    AnalysisReport {
        bundles,
        parse_summary,
        unmatched_exits,
        unmatched_entries,
    }
}
