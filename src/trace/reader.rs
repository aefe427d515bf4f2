use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use super::{Record, Tracking};

/// Errors produced while reading a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Underlying reader failed.
    #[error("failed to read trace: {0}")]
    Io(#[from] io::Error),

    /// A line could not be split or parsed into a record.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number within the input.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// The size column held a non-positive value.
    #[error("invalid allocation size {size} on line {line}: sizes must be positive")]
    InvalidSize {
        /// 1-based line number within the input.
        line: usize,
        /// Offending size as written in the trace.
        size: i64,
    },
}

impl TraceError {
    fn malformed(line: usize, reason: impl Into<String>) -> Self {
        TraceError::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }
}

/// Column layout of a trace file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLayout {
    /// 0-based column holding the requested size.
    pub size_column: usize,
    /// 0-based column holding the no-scan flag.
    pub no_scan_column: usize,
    /// Field separator.
    pub delimiter: char,
    /// Whether the first line is a header to skip.
    pub has_header: bool,
}

impl Default for TraceLayout {
    fn default() -> Self {
        Self {
            size_column: 3,
            no_scan_column: 6,
            delimiter: ',',
            has_header: true,
        }
    }
}

impl TraceLayout {
    fn parse_line(&self, line_no: usize, line: &str) -> Result<Record, TraceError> {
        let fields: Vec<&str> = line.split(self.delimiter).map(str::trim).collect();
        let field = |column: usize, name: &'static str| column_field(&fields, column, name, line_no);

        let size_str = field(self.size_column, "size")?;
        let size: i64 = size_str.parse().map_err(|_| {
            TraceError::malformed(line_no, format!("size '{}' is not an integer", size_str))
        })?;
        if size <= 0 {
            return Err(TraceError::InvalidSize {
                line: line_no,
                size,
            });
        }

        let flag_str = field(self.no_scan_column, "no-scan")?;
        let flag: i64 = flag_str.parse().map_err(|_| {
            TraceError::malformed(
                line_no,
                format!("no-scan flag '{}' is not an integer", flag_str),
            )
        })?;

        // size > 0 was checked above
        Record::new(size as u64, Tracking::from_no_scan_flag(flag))
            .map_err(|e| TraceError::malformed(line_no, e.to_string()))
    }
}

fn column_field<'a>(
    fields: &[&'a str],
    column: usize,
    name: &str,
    line_no: usize,
) -> Result<&'a str, TraceError> {
    fields.get(column).copied().ok_or_else(|| {
        TraceError::malformed(
            line_no,
            format!(
                "missing {} column {} (found {} fields)",
                name,
                column,
                fields.len()
            ),
        )
    })
}

/// Read every record from a trace stream.
pub fn read_trace<R: BufRead>(reader: R, layout: &TraceLayout) -> Result<Vec<Record>, TraceError> {
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if idx == 0 && layout.has_header {
            debug!(header = %line.trim_end(), "skipping trace header");
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        records.push(layout.parse_line(line_no, &line)?);
    }

    info!(records = records.len(), "read allocation trace");
    Ok(records)
}

/// Open `path` and read every record from it.
pub fn read_trace_file<P: AsRef<Path>>(
    path: P,
    layout: &TraceLayout,
) -> Result<Vec<Record>, TraceError> {
    let file = File::open(path.as_ref())?;
    read_trace(BufReader::new(file), layout)
}
