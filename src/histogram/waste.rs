//! Internal fragmentation model.
//!
//! Both accounting modes share the same reductions; conservative accounting
//! is precise accounting with zero bytes of per-object overhead. All byte
//! quantities are `u128` and every product or sum is checked, so absurd
//! overheads or sizes surface as [`WasteError::Overflow`].

use thiserror::Error;

use crate::trace::Tracking;

use super::{percent, Bin, RequestSummary, SizeFrequencies, PAGE_SIZE};

/// Per-object bookkeeping overhead assumed by [`WasteMode::default_precise`].
pub const DEFAULT_PRECISE_EXTRA: u64 = 4;

/// Largest overhead accepted by [`WasteMode::precise`]: one page.
pub const MAX_PRECISE_EXTRA: u64 = PAGE_SIZE;

/// Errors raised while charging waste.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WasteError {
    /// Overhead outside `0..=MAX_PRECISE_EXTRA`.
    #[error("per-object overhead {extra} exceeds the maximum of {max} bytes")]
    ExtraTooLarge {
        /// Requested overhead.
        extra: u64,
        /// Largest accepted overhead.
        max: u64,
    },

    /// A byte count does not fit in 128 bits.
    #[error("byte count overflow while computing {context}")]
    Overflow {
        /// Which quantity overflowed.
        context: &'static str,
    },
}

fn overflow(context: &'static str) -> WasteError {
    WasteError::Overflow { context }
}

/// Policy for charging waste to precisely tracked objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WasteMode {
    /// No tracking overhead: waste is the unused tail of the bin.
    Conservative,
    /// Scanned objects carry `extra` bytes of overhead.
    Precise {
        /// Overhead bytes appended to every scanned object.
        extra: u64,
    },
}

impl WasteMode {
    /// Precise accounting with the default 4-byte overhead.
    pub fn default_precise() -> Self {
        WasteMode::Precise {
            extra: DEFAULT_PRECISE_EXTRA,
        }
    }

    /// Precise accounting with `extra` bytes of overhead, at most one page.
    pub fn precise(extra: u64) -> Result<Self, WasteError> {
        if extra > MAX_PRECISE_EXTRA {
            return Err(WasteError::ExtraTooLarge {
                extra,
                max: MAX_PRECISE_EXTRA,
            });
        }
        Ok(WasteMode::Precise { extra })
    }

    /// Overhead bytes charged to scanned objects.
    pub fn extra(&self) -> u64 {
        match self {
            WasteMode::Conservative => 0,
            WasteMode::Precise { extra } => *extra,
        }
    }

    /// Name used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            WasteMode::Conservative => "Conservative",
            WasteMode::Precise { .. } => "Precise",
        }
    }
}

fn charge(
    mut pairs: impl Iterator<Item = (u64, u64)>,
    per_object: impl Fn(u128) -> Option<u128>,
    context: &'static str,
) -> Result<u128, WasteError> {
    pairs.try_fold(0u128, |total, (size, freq)| {
        per_object(u128::from(size))
            .and_then(|w| w.checked_mul(u128::from(freq)))
            .and_then(|w| total.checked_add(w))
            .ok_or_else(|| overflow(context))
    })
}

/// Bytes wasted by objects that land in `bin`.
///
/// An untracked object of size `i` wastes `capacity - i`. A scanned object
/// wastes the same unless its `extra` overhead no longer fits the bin, in
/// which case it is charged `2 * capacity - i`: the rest of its own bin and
/// the rest of the next one it spills into.
pub fn bin_waste(freqs: &SizeFrequencies, bin: Bin, extra: u64) -> Result<u128, WasteError> {
    let end = u128::from(bin.capacity);
    let extra = u128::from(extra);
    let range = bin.lower..=bin.capacity;

    let untracked = charge(
        freqs.range(Tracking::NoScan, range.clone()),
        |size| end.checked_sub(size),
        "bin waste",
    )?;

    let scanned = charge(
        freqs.range(Tracking::Scanned, range),
        |size| {
            if size + extra <= end {
                end.checked_sub(size)
            } else {
                (2 * end).checked_sub(size)
            }
        },
        "bin waste",
    )?;

    untracked
        .checked_add(scanned)
        .ok_or_else(|| overflow("bin waste"))
}

/// Bytes wasted by objects larger than a page.
///
/// Untracked objects waste `size % PAGE_SIZE`. Scanned objects have the
/// overhead added before the page remainder is taken, and the overhead
/// itself is counted as waste too. When the overhead wraps the remainder
/// past a page boundary that charge can fall below the untracked one; a
/// scanned object is never charged less than `size % PAGE_SIZE`.
pub fn overflow_waste(freqs: &SizeFrequencies, extra: u64) -> Result<u128, WasteError> {
    let page = u128::from(PAGE_SIZE);
    let extra = u128::from(extra);
    let above_page = PAGE_SIZE + 1..=u64::MAX;

    let untracked = charge(
        freqs.range(Tracking::NoScan, above_page.clone()),
        |size| Some(size % page),
        "overflow waste",
    )?;

    let scanned = charge(
        freqs.range(Tracking::Scanned, above_page),
        |size| {
            let with_overhead = ((size + extra) % page).checked_add(extra)?;
            Some(with_overhead.max(size % page))
        },
        "overflow waste",
    )?;

    untracked
        .checked_add(scanned)
        .ok_or_else(|| overflow("overflow waste"))
}

/// Waste charged to one ladder bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinWaste {
    /// The bin.
    pub bin: Bin,
    /// Objects requested in this bin.
    pub objects: u64,
    /// Wasted bytes.
    pub wasted: u128,
}

/// Waste charged to requests larger than a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverflowWaste {
    /// Objects larger than a page.
    pub objects: u64,
    /// Wasted bytes.
    pub wasted: u128,
}

/// Waste breakdown under one [`WasteMode`].
#[derive(Debug, Clone, PartialEq)]
pub struct WasteReport {
    /// Accounting mode.
    pub mode: WasteMode,
    /// Bytes requested by the whole trace.
    pub requested_bytes: u128,
    /// Per-bin waste, ascending.
    pub bins: Vec<BinWaste>,
    /// Waste above a page.
    pub overflow: OverflowWaste,
    wasted: u128,
    allocated: u128,
}

impl WasteReport {
    /// Charge waste for every bin and the overflow bucket.
    pub fn compute(
        freqs: &SizeFrequencies,
        summary: &RequestSummary,
        mode: WasteMode,
    ) -> Result<Self, WasteError> {
        let extra = mode.extra();
        let bins = summary
            .bins
            .iter()
            .map(|usage| {
                Ok(BinWaste {
                    bin: usage.bin,
                    objects: usage.usage.objects,
                    wasted: bin_waste(freqs, usage.bin, extra)?,
                })
            })
            .collect::<Result<Vec<_>, WasteError>>()?;
        let overflow_bucket = OverflowWaste {
            objects: summary.overflow.objects,
            wasted: overflow_waste(freqs, extra)?,
        };

        let wasted = bins
            .iter()
            .map(|b| b.wasted)
            .try_fold(overflow_bucket.wasted, u128::checked_add)
            .ok_or_else(|| overflow("total waste"))?;
        let requested_bytes = summary.total().bytes;
        let allocated = requested_bytes
            .checked_add(wasted)
            .ok_or_else(|| overflow("allocated bytes"))?;

        Ok(Self {
            mode,
            requested_bytes,
            bins,
            overflow: overflow_bucket,
            wasted,
            allocated,
        })
    }

    /// Total wasted bytes, overflow included.
    pub fn total_wasted(&self) -> u128 {
        self.wasted
    }

    /// Requested plus wasted bytes.
    pub fn total_allocated(&self) -> u128 {
        self.allocated
    }

    /// Wasted bytes as a percentage of allocated bytes.
    pub fn wasted_percent(&self) -> Option<f64> {
        percent(self.wasted, self.allocated)
    }

    /// `wasted` as a percentage of the total waste.
    pub fn share(&self, wasted: u128) -> Option<f64> {
        percent(wasted, self.wasted)
    }

    /// Running share of total waste up to and including each ladder bin.
    pub fn cumulative_shares(&self) -> Vec<Option<f64>> {
        let mut running = 0u128;
        self.bins
            .iter()
            .map(|b| {
                // bounded by the checked total
                running += b.wasted;
                percent(running, self.wasted)
            })
            .collect()
    }
}
