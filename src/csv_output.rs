//! CSV output format for profiler reports
//!
//! One row per occurrence across all categories, for spreadsheet
//! analysis and machine parsing.

use crate::stats::ReportBundle;

/// CSV statistics output formatter.
#[derive(Debug, Default)]
pub struct CsvStatsOutput {
    rows: Vec<CsvStatRow>,
}

#[derive(Debug, Clone)]
pub struct CsvStatRow {
    pub occurrence_type: String,
    pub occurrence: String,
    pub executions: u64,
    pub total_ms: f64,
    pub mean_us: f64,
    pub std_dev_us: f64,
    pub min_us: i64,
    pub max_us: i64,
}

impl CsvStatsOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every occurrence of a bundle, in by-total order.
    pub fn add_bundle(&mut self, bundle: &ReportBundle) {
        for name in &bundle.by_total {
            if let Some(stats) = bundle.stats.get(name) {
                self.rows.push(CsvStatRow {
                    occurrence_type: bundle.occurrence_type.clone(),
                    occurrence: name.clone(),
                    executions: stats.execution_count,
                    total_ms: stats.total_ms,
                    mean_us: stats.mean_us,
                    std_dev_us: stats.stdev_us,
                    min_us: stats.min_us,
                    max_us: stats.max_us,
                });
            }
        }
    }

    fn header() -> &'static str {
        "occurrence_type,occurrence,executions,total_ms,mean_us,std_dev_us,min_us,max_us"
    }

    /// Escape CSV field (handle commas, quotes, newlines).
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_row(row: &CsvStatRow) -> String {
        [
            Self::escape_field(&row.occurrence_type),
            Self::escape_field(&row.occurrence),
            row.executions.to_string(),
            format!("{:.3}", row.total_ms),
            format!("{:.2}", row.mean_us),
            format!("{:.2}", row.std_dev_us),
            row.min_us.to_string(),
            row.max_us.to_string(),
        ]
        .join(",")
    }

    /// Generate CSV output as string.
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(Self::header());
        output.push('\n');
        for row in &self.rows {
            output.push_str(&Self::format_row(row));
            output.push('\n');
        }
        output
    }
}
