//! Report rendering.
//!
//! Two layouts are supported: a prose report with grouped digits, binary
//! byte units and percentages, and a tab-separated layout meant for
//! spreadsheets.

mod format;
mod human;
mod tsv;

pub use format::{byte_size, grouped, percentage};

use std::io::{self, Write};

use clap::ValueEnum;

use crate::histogram::Analysis;

/// Output layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable prose with percentages.
    #[default]
    Human,
    /// Tab-separated tables.
    Tsv,
}

/// Render an analysis into a string.
pub fn render(analysis: &Analysis, format: ReportFormat) -> String {
    match format {
        ReportFormat::Human => human::render(analysis),
        ReportFormat::Tsv => tsv::render(analysis),
    }
}

/// Render an analysis into `writer`.
pub fn write_report<W: Write>(
    writer: &mut W,
    analysis: &Analysis,
    format: ReportFormat,
) -> io::Result<()> {
    writer.write_all(render(analysis, format).as_bytes())?;
    writer.flush()
}
