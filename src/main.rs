use anyhow::Result;
use clap::Parser;
use ruleprof::{
    analyzer::{self, AnalyzerConfig},
    cli::{Cli, OutputFormat},
    csv_output::CsvStatsOutput,
    extract::{profiler_lines, LineSource},
    filter::CategoryFilter,
    json_output::JsonReport,
    matcher::MatchStrategy,
    report,
};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Resolve the line source from the mutually exclusive input arguments.
fn resolve_source(file: Option<PathBuf>, extract_cmd: Option<String>) -> Result<LineSource> {
    match (file, extract_cmd) {
        (Some(_), Some(_)) => {
            anyhow::bail!("Cannot specify both FILE and --extract-cmd. Choose one.");
        }
        (None, Some(cmd)) => Ok(LineSource::Command(cmd)),
        (Some(path), None) if path.as_os_str() == "-" => Ok(LineSource::Stdin),
        (Some(path), None) => Ok(LineSource::File(path)),
        (None, None) => Ok(LineSource::Stdin),
    }
}

fn render_report<W: Write>(
    out: &mut W,
    format: OutputFormat,
    report: &analyzer::AnalysisReport,
) -> Result<()> {
    match format {
        OutputFormat::Text => report::render_all(out, &report.bundles)?,
        OutputFormat::Json => {
            let json = JsonReport::from_report(report).to_json()?;
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Csv => {
            let mut csv = CsvStatsOutput::new();
            for bundle in &report.bundles {
                csv.add_bundle(bundle);
            }
            write!(out, "{}", csv.to_csv())?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    // Parse filter expression if provided
    let filter = if let Some(expr) = args.filter {
        CategoryFilter::from_expr(&expr)?
    } else {
        CategoryFilter::all()
    };

    let strategy = if args.consume_entries {
        MatchStrategy::ConsumeOnMatch
    } else {
        MatchStrategy::NearestScan
    };

    let source = resolve_source(args.file, args.extract_cmd)?;

    // The one blocking external step; any failure here is fatal
    let mut lines = source.read_lines()?;
    if !args.no_prefilter {
        lines = profiler_lines(lines);
    }

    let config = AnalyzerConfig { filter, strategy };
    let analysis = analyzer::analyze(lines.iter().map(String::as_str), &config);

    match args.output {
        Some(path) => {
            let mut file = std::fs::File::create(&path)?;
            render_report(&mut file, args.format, &analysis)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            render_report(&mut handle, args.format, &analysis)?;
        }
    }

    Ok(())
}
