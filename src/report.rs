//! Text report rendering
//!
//! Formats one report bundle per category in the classic banner layout:
//! an 80-column header naming the occurrence type, the two ranking lines,
//! then a detail block per occurrence in by-mean order.

use crate::stats::ReportBundle;
use std::io::{self, Write};

const WIDE_RULE: usize = 80;
const NARROW_RULE: usize = 40;

/// Render one category's report block.
pub fn render<W: Write>(out: &mut W, bundle: &ReportBundle) -> io::Result<()> {
    let heading = format!(" Data for Occurrence Type: {} ", bundle.occurrence_type);
    let padding = "=".repeat(WIDE_RULE.saturating_sub(heading.len()) / 2);

    writeln!(out, "{}", "=".repeat(WIDE_RULE))?;
    writeln!(out, "{}{}{}", padding, heading, padding)?;
    writeln!(out, "{}", "=".repeat(WIDE_RULE))?;
    writeln!(
        out,
        "Occurrences sorted by total time: {}",
        bundle.by_total.join(", ")
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "Occurrences sorted by mean time: {}",
        bundle.by_mean.join(", ")
    )?;
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(NARROW_RULE))?;

    for name in &bundle.by_mean {
        // by_mean is built from the stats map, so the lookup always hits
        let stats = match bundle.stats.get(name) {
            Some(stats) => stats,
            None => continue,
        };
        writeln!(
            out,
            "Type: {}\tOccurrence: {}",
            bundle.occurrence_type, name
        )?;
        writeln!(out, "\tExecution Count: {}", stats.execution_count)?;
        writeln!(out, "\tTotal Time: {:.3}ms", stats.total_ms)?;
        writeln!(out, "\tMean Execution Time:\t{:.2}us", stats.mean_us)?;
        writeln!(out, "\tStandard Deviation:\t{:.2}", stats.stdev_us)?;
        writeln!(out, "\tMax Execution Time:\t{}us", stats.max_us)?;
        writeln!(out, "\tMin Execution Time:\t{}us", stats.min_us)?;
        writeln!(out, "{}", "=".repeat(NARROW_RULE))?;
    }

    writeln!(out, "{}", "=".repeat(WIDE_RULE))?;
    writeln!(out)?;
    Ok(())
}

/// Render every bundle of a run in sequence.
pub fn render_all<W: Write>(out: &mut W, bundles: &[ReportBundle]) -> io::Result<()> {
    for bundle in bundles {
        render(out, bundle)?;
    }
    Ok(())
}
