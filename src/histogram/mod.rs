//! Allocation size histogram and waste model.
//!
//! Records are folded into exact-size frequency tables once, then reduced
//! against a fixed ladder of power-of-two bins:
//!
//! 1. **Request summary**: objects and bytes per bin, incremental over the ladder
//! 2. **Waste reports**: bytes lost to bin rounding, one report per [`WasteMode`]
//!
//! ```
//! use mempat::histogram::{Analysis, AnalysisConfig, SizeFrequencies};
//! use mempat::trace::Record;
//!
//! let records = [Record::no_scan(10).unwrap(), Record::no_scan(4097).unwrap()];
//! let freqs = SizeFrequencies::from_records(&records);
//! let analysis = Analysis::run(&freqs, &AnalysisConfig::default()).unwrap();
//! assert_eq!(analysis.waste[0].total_wasted(), 6 + 1);
//! ```

mod bins;
mod frequency;
mod summary;
mod waste;

pub use bins::{bin_for, ladder, Bin, BinSlot, BIN_CAPACITIES, NUM_BINS, PAGE_SIZE};
pub use frequency::{SizeFrequencies, Totals};
pub use summary::{BinUsage, RequestSummary};
pub use waste::{
    bin_waste, overflow_waste, BinWaste, OverflowWaste, WasteError, WasteMode, WasteReport,
    DEFAULT_PRECISE_EXTRA, MAX_PRECISE_EXTRA,
};

use tracing::debug;

/// `part` as a percentage of `total`, or `None` when `total` is zero.
pub fn percent<T: Into<u128>>(part: T, total: T) -> Option<f64> {
    let total = total.into();
    if total == 0 {
        None
    } else {
        Some(part.into() as f64 / total as f64 * 100.0)
    }
}

/// Which waste reports to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Accounting modes, in report order.
    pub modes: Vec<WasteMode>,
}

impl AnalysisConfig {
    /// Conservative accounting plus precise accounting with `extra` bytes of overhead.
    pub fn with_precise_extra(extra: u64) -> Result<Self, WasteError> {
        Ok(Self {
            modes: vec![WasteMode::Conservative, WasteMode::precise(extra)?],
        })
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            modes: vec![WasteMode::Conservative, WasteMode::default_precise()],
        }
    }
}

/// Request summary together with its waste reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// What was requested.
    pub summary: RequestSummary,
    /// One report per configured mode.
    pub waste: Vec<WasteReport>,
}

impl Analysis {
    /// Reduce frequency tables into a full analysis.
    pub fn run(freqs: &SizeFrequencies, config: &AnalysisConfig) -> Result<Self, WasteError> {
        let summary = RequestSummary::from_frequencies(freqs);
        let waste = config
            .modes
            .iter()
            .map(|&mode| {
                let report = WasteReport::compute(freqs, &summary, mode)?;
                debug!(
                    mode = mode.label(),
                    extra = mode.extra(),
                    wasted = %report.total_wasted(),
                    allocated = %report.total_allocated(),
                    "computed waste report"
                );
                Ok(report)
            })
            .collect::<Result<Vec<_>, WasteError>>()?;

        Ok(Self { summary, waste })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_zero_total_is_undefined() {
        assert_eq!(percent(0u64, 0), None);
        assert_eq!(percent(1u64, 4), Some(25.0));
        assert_eq!(percent(u128::MAX, u128::MAX), Some(100.0));
    }

    #[test]
    fn default_config_runs_both_modes() {
        let config = AnalysisConfig::default();
        assert_eq!(
            config.modes,
            vec![WasteMode::Conservative, WasteMode::Precise { extra: 4 }]
        );
        let analysis = Analysis::run(&SizeFrequencies::new(), &config).unwrap();
        assert_eq!(analysis.waste.len(), 2);
        assert_eq!(analysis.summary.total(), Totals::default());
    }

    #[test]
    fn oversized_overhead_is_rejected_up_front() {
        assert_eq!(
            AnalysisConfig::with_precise_extra(8).unwrap().modes[1],
            WasteMode::Precise { extra: 8 }
        );
        assert!(matches!(
            AnalysisConfig::with_precise_extra(u64::MAX),
            Err(WasteError::ExtraTooLarge { .. })
        ));
    }
}
