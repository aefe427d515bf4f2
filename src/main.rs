use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mempat::histogram::{DEFAULT_PRECISE_EXTRA, MAX_PRECISE_EXTRA};
use mempat::stats::{self, Expression, OutputTemplate, DEFAULT_TEMPLATE};
use mempat::{
    read_trace_file, write_report, Analysis, AnalysisConfig, ReportFormat, SizeFrequencies,
    TraceLayout,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mempat", about = "Allocation trace size histograms and waste accounting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bin the allocations of a trace and report allocator waste.
    Histogram {
        /// Trace file (delimited text, one allocation per line).
        trace: PathBuf,
        /// Report layout.
        #[arg(long, value_enum, default_value_t = ReportFormat::Human)]
        format: ReportFormat,
        /// Per-object overhead, in bytes, charged to scanned objects in precise mode.
        #[arg(
            long,
            default_value_t = DEFAULT_PRECISE_EXTRA,
            value_parser = clap::value_parser!(u64).range(0..=MAX_PRECISE_EXTRA)
        )]
        extra: u64,
        /// 0-based column holding the requested size.
        #[arg(long, default_value_t = 3)]
        size_column: usize,
        /// 0-based column holding the no-scan flag.
        #[arg(long, default_value_t = 6)]
        no_scan_column: usize,
        /// Field separator.
        #[arg(long, default_value_t = ',')]
        delimiter: char,
        /// The trace has no header line.
        #[arg(long)]
        no_header: bool,
    },
    /// Evaluate an expression over the columns of stdin and summarise it.
    Stats {
        /// Arithmetic over `$1`, `$2`, … column references.
        #[arg(default_value = "$1")]
        expression: String,
        /// Output template with `{min}`, `{mean}`, `{max}` and `{std}` placeholders.
        #[arg(default_value = DEFAULT_TEMPLATE)]
        template: String,
        /// Field separator of the input rows.
        #[arg(default_value = ",")]
        separator: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MEMPAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Histogram {
            trace,
            format,
            extra,
            size_column,
            no_scan_column,
            delimiter,
            no_header,
        } => {
            let layout = TraceLayout {
                size_column,
                no_scan_column,
                delimiter,
                has_header: !no_header,
            };
            run_histogram(trace, &layout, format, extra)?
        }
        Commands::Stats {
            expression,
            template,
            separator,
        } => run_stats(&expression, &template, &separator)?,
    }

    Ok(())
}

fn run_histogram(
    trace_path: PathBuf,
    layout: &TraceLayout,
    format: ReportFormat,
    extra: u64,
) -> Result<()> {
    let records = read_trace_file(&trace_path, layout)
        .with_context(|| format!("failed to load trace from {}", trace_path.display()))?;
    let freqs = SizeFrequencies::from_records(&records);
    let config = AnalysisConfig::with_precise_extra(extra)?;
    let analysis = Analysis::run(&freqs, &config).context("failed to compute waste")?;

    let stdout = io::stdout();
    write_report(&mut stdout.lock(), &analysis, format).context("failed to write report")?;
    Ok(())
}

fn run_stats(expression: &str, template: &str, separator: &str) -> Result<()> {
    let expression = Expression::parse(expression)
        .with_context(|| format!("invalid expression '{}'", expression))?;
    let template = OutputTemplate::parse(template)?;

    let stdin = io::stdin();
    let summary = stats::summarize(BufReader::new(stdin.lock()), &expression, separator)
        .context("failed to summarise input")?;

    println!("{}", template.render(&summary));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn extra_of(args: &[&str]) -> Result<u64, clap::Error> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Commands::Histogram { extra, .. } => Ok(extra),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn extra_is_limited_to_one_page() {
        assert_eq!(extra_of(&["mempat", "histogram", "t.csv"]).unwrap(), 4);
        assert_eq!(
            extra_of(&["mempat", "histogram", "t.csv", "--extra", "4096"]).unwrap(),
            4096
        );
        assert!(extra_of(&["mempat", "histogram", "t.csv", "--extra", "4097"]).is_err());
        assert!(extra_of(&["mempat", "histogram", "t.csv", "--extra", "18446744073709551615"]).is_err());
    }
}
