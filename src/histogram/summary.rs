use crate::trace::Tracking;

use super::{ladder, Bin, SizeFrequencies, Totals};

/// Requested objects and bytes that fall in one bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinUsage {
    /// The bin.
    pub bin: Bin,
    /// Objects in `bin.lower..=bin.capacity` and their requested bytes.
    pub usage: Totals,
}

/// What the trace asked the allocator for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    /// Precisely tracked objects.
    pub scanned: Totals,
    /// Untracked objects.
    pub no_scan: Totals,
    /// Number of distinct requested sizes.
    pub distinct_sizes: usize,
    /// Incremental usage per ladder bin, ascending.
    pub bins: Vec<BinUsage>,
    /// Requests larger than a page.
    pub overflow: Totals,
}

impl RequestSummary {
    /// Reduce frequency tables into per-bin usage.
    pub fn from_frequencies(freqs: &SizeFrequencies) -> Self {
        let bins = ladder()
            .map(|bin| BinUsage {
                bin,
                usage: freqs.range_totals(bin.lower..=bin.capacity),
            })
            .collect();

        Self {
            scanned: freqs.totals(Tracking::Scanned),
            no_scan: freqs.totals(Tracking::NoScan),
            distinct_sizes: freqs.distinct_sizes(),
            bins,
            overflow: freqs.overflow_totals(),
        }
    }

    /// Totals for one tracking mode.
    pub fn by_tracking(&self, tracking: Tracking) -> Totals {
        match tracking {
            Tracking::Scanned => self.scanned,
            Tracking::NoScan => self.no_scan,
        }
    }

    /// Totals over the whole trace.
    pub fn total(&self) -> Totals {
        self.scanned + self.no_scan
    }

    /// Running totals up to and including each ladder bin.
    pub fn cumulative(&self) -> Vec<Totals> {
        self.bins
            .iter()
            .scan(Totals::default(), |running, usage| {
                *running += usage.usage;
                Some(*running)
            })
            .collect()
    }

    /// Usage of the ladder bin with the given capacity.
    pub fn bin(&self, capacity: u64) -> Option<&BinUsage> {
        self.bins.iter().find(|usage| usage.bin.capacity == capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Record;

    #[test]
    fn usage_is_incremental_per_bin() {
        let freqs: SizeFrequencies = [
            Record::no_scan(10).unwrap(),
            Record::no_scan(16).unwrap(),
            Record::scanned(17).unwrap(),
            Record::scanned(4096).unwrap(),
            Record::no_scan(4097).unwrap(),
        ]
        .into_iter()
        .collect();

        let summary = RequestSummary::from_frequencies(&freqs);
        assert_eq!(summary.bin(16).unwrap().usage, Totals { objects: 2, bytes: 26 });
        assert_eq!(summary.bin(32).unwrap().usage, Totals { objects: 1, bytes: 17 });
        assert_eq!(summary.bin(64).unwrap().usage, Totals::default());
        assert_eq!(summary.bin(4096).unwrap().usage, Totals { objects: 1, bytes: 4096 });
        assert_eq!(summary.overflow, Totals { objects: 1, bytes: 4097 });
        assert_eq!(summary.distinct_sizes, 5);

        let cumulative = summary.cumulative();
        assert_eq!(cumulative[1], Totals { objects: 3, bytes: 43 });
        assert_eq!(
            *cumulative.last().unwrap() + summary.overflow,
            summary.total()
        );
    }
}
