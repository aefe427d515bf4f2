//! Allocation trace input.
//!
//! A trace is a delimited text file with one allocation event per line.
//! Only two columns matter here: the requested size and the "no-scan" flag
//! telling whether the object was allocated without type information.

mod reader;
mod record;

pub use reader::{read_trace, read_trace_file, TraceError, TraceLayout};
pub use record::{Record, RecordError, Tracking};
