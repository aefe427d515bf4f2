//! Column-expression statistics.
//!
//! Evaluates an arithmetic [`Expression`] over every row of a delimited
//! stream and summarises the results as min / mean / max / standard
//! deviation, rendered through an [`OutputTemplate`].

mod expression;
mod template;

pub use expression::{Expression, ExpressionError};
pub use template::{OutputTemplate, Statistic, DEFAULT_TEMPLATE};

use std::io::{self, BufRead};

use thiserror::Error;
use tracing::{debug, info};

/// Errors from reading rows and summarising them.
#[derive(Debug, Error)]
pub enum StatsError {
    /// Underlying reader failed.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    /// The field separator was empty.
    #[error("field separator must not be empty")]
    EmptySeparator,

    /// A field of a data row is not a number.
    #[error("line {line}: field {field} ('{text}') is not a number")]
    InvalidField {
        /// 1-based line number.
        line: usize,
        /// 1-based field number.
        field: usize,
        /// Field text.
        text: String,
    },

    /// The expression failed on a data row.
    #[error("line {line}: {source}")]
    Expression {
        /// 1-based line number.
        line: usize,
        /// Evaluation failure.
        #[source]
        source: ExpressionError,
    },

    /// No row produced a value.
    #[error("no values to summarise")]
    NoValues,

    /// The output template is malformed.
    #[error("invalid output template: {0}")]
    Template(String),
}

/// Descriptive statistics over a non-empty sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Smallest value.
    pub min: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Largest value.
    pub max: f64,
    /// Sample standard deviation (`n - 1` denominator); zero for one value.
    pub std: f64,
}

impl Summary {
    /// Summarise `values`, or `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / n;
        let std = if values.len() > 1 {
            let sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (sq / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Some(Self {
            min,
            mean,
            max,
            std,
        })
    }

    /// Value of one statistic.
    pub fn get(&self, stat: Statistic) -> f64 {
        match stat {
            Statistic::Min => self.min,
            Statistic::Mean => self.mean,
            Statistic::Max => self.max,
            Statistic::Std => self.std,
        }
    }
}

fn evaluate_row(
    line_no: usize,
    line: &str,
    expression: &Expression,
    separator: &str,
) -> Result<f64, StatsError> {
    let fields = line
        .split(separator)
        .enumerate()
        .map(|(i, text)| {
            let text = text.trim();
            text.parse::<f64>().map_err(|_| StatsError::InvalidField {
                line: line_no,
                field: i + 1,
                text: text.to_string(),
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    expression
        .evaluate(&fields)
        .map_err(|source| StatsError::Expression {
            line: line_no,
            source,
        })
}

/// Evaluate `expression` on every non-blank row of `reader`.
///
/// A first line that does not evaluate is treated as a header and skipped;
/// failures on any later line abort.
pub fn collect_values<R: BufRead>(
    reader: R,
    expression: &Expression,
    separator: &str,
) -> Result<Vec<f64>, StatsError> {
    if separator.is_empty() {
        return Err(StatsError::EmptySeparator);
    }

    let mut values = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match evaluate_row(idx + 1, line, expression, separator) {
            Ok(value) => values.push(value),
            Err(err) if idx == 0 => debug!(%err, "skipping header line"),
            Err(err) => return Err(err),
        }
    }

    info!(rows = values.len(), "evaluated expression");
    Ok(values)
}

/// Read every row and summarise the expression values.
pub fn summarize<R: BufRead>(
    reader: R,
    expression: &Expression,
    separator: &str,
) -> Result<Summary, StatsError> {
    let values = collect_values(reader, expression, separator)?;
    Summary::from_values(&values).ok_or(StatsError::NoValues)
}
