//! # Allocation Trace Analysis
//!
//! This library summarises allocation traces: what sizes a program asked
//! for, and how many bytes a power-of-two bin allocator would lose to
//! internal fragmentation while serving them.
//!
//! ## Pipeline
//!
//! 1. **Trace reading**: delimited text → [`Record`]s (size + tracking mode)
//! 2. **Frequency tables**: one exact-size table per tracking mode
//! 3. **Request summary**: objects and bytes per bin of the 16..=4096 ladder
//! 4. **Waste reports**: conservative and precise (per-object overhead) accounting
//! 5. **Rendering**: human-readable or tab-separated reports
//!
//! ## Usage Example
//!
//! ```
//! use mempat::{Analysis, AnalysisConfig, Record, SizeFrequencies, WasteMode};
//!
//! let records = vec![
//!     Record::no_scan(10).unwrap(),
//!     Record::no_scan(20).unwrap(),
//!     Record::no_scan(4097).unwrap(),
//! ];
//! let freqs = SizeFrequencies::from_records(&records);
//! let analysis = Analysis::run(&freqs, &AnalysisConfig::default()).unwrap();
//!
//! let conservative = &analysis.waste[0];
//! assert_eq!(conservative.mode, WasteMode::Conservative);
//! assert_eq!(conservative.total_wasted(), 6 + 12 + 1);
//! ```
//!
//! The [`stats`] module is a separate tool: it evaluates an arithmetic
//! expression over the columns of each input row and reports
//! min / mean / max / standard deviation.

#![warn(missing_docs, missing_debug_implementations)]

pub mod histogram; // Bin ladder, frequency tables, waste model
pub mod report;    // Human and TSV rendering
pub mod stats;     // Column-expression statistics
pub mod trace;     // Trace records and reader

// Re-exports for convenience
pub use histogram::{
    Analysis, AnalysisConfig, RequestSummary, SizeFrequencies, Totals, WasteError, WasteMode,
    WasteReport,
};
pub use report::{render, write_report, ReportFormat};
pub use trace::{read_trace, read_trace_file, Record, TraceError, TraceLayout, Tracking};
