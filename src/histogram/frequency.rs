use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, RangeInclusive};

use crate::trace::{Record, Tracking};

use super::PAGE_SIZE;

/// Object count and requested bytes for some slice of the trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Number of objects.
    pub objects: u64,
    /// Sum of their requested sizes.
    pub bytes: u128,
}

impl Totals {
    // A u64 size times a u64 count always fits in 128 bits; the object count
    // is bounded by the records held in memory.
    fn observe(&mut self, size: u64, freq: u64) {
        self.objects += freq;
        self.bytes += u128::from(size) * u128::from(freq);
    }
}

impl Add for Totals {
    type Output = Totals;

    fn add(self, rhs: Totals) -> Totals {
        Totals {
            objects: self.objects + rhs.objects,
            bytes: self.bytes + rhs.bytes,
        }
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, rhs: Totals) {
        *self = *self + rhs;
    }
}

/// Exact-size frequency tables, one per [`Tracking`] mode.
///
/// Every record is counted in exactly one table. Sizes are kept ordered so
/// bin ranges can be summed without scanning every observed size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeFrequencies {
    tables: [BTreeMap<u64, u64>; 2],
}

impl SizeFrequencies {
    /// Empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tables from a full set of records.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut freqs = Self::new();
        for record in records {
            freqs.record(record);
        }
        freqs
    }

    /// Count one record.
    pub fn record(&mut self, record: &Record) {
        *self.tables[record.tracking().index()]
            .entry(record.size())
            .or_insert(0) += 1;
    }

    /// Number of records of exactly `size` bytes under `tracking`.
    pub fn frequency(&self, tracking: Tracking, size: u64) -> u64 {
        self.table(tracking).get(&size).copied().unwrap_or(0)
    }

    /// `(size, count)` pairs for one tracking mode, ascending by size.
    pub fn iter(&self, tracking: Tracking) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.table(tracking).iter().map(|(&size, &freq)| (size, freq))
    }

    /// `(size, count)` pairs with sizes in `range`, for one tracking mode.
    pub fn range(
        &self,
        tracking: Tracking,
        range: RangeInclusive<u64>,
    ) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.table(tracking)
            .range(range)
            .map(|(&size, &freq)| (size, freq))
    }

    /// Totals for one tracking mode.
    pub fn totals(&self, tracking: Tracking) -> Totals {
        self.sum(self.iter(tracking))
    }

    /// Totals over both tables.
    pub fn combined_totals(&self) -> Totals {
        Tracking::ALL
            .into_iter()
            .map(|tracking| self.totals(tracking))
            .fold(Totals::default(), Add::add)
    }

    /// Totals over both tables for sizes in `range`.
    pub fn range_totals(&self, range: RangeInclusive<u64>) -> Totals {
        Tracking::ALL
            .into_iter()
            .map(|tracking| self.sum(self.range(tracking, range.clone())))
            .fold(Totals::default(), Add::add)
    }

    /// Totals over both tables for sizes larger than a page.
    pub fn overflow_totals(&self) -> Totals {
        self.range_totals(PAGE_SIZE + 1..=u64::MAX)
    }

    /// Number of distinct sizes seen across both tables.
    pub fn distinct_sizes(&self) -> usize {
        let [scanned, no_scan] = &self.tables;
        scanned.len() + no_scan.keys().filter(|size| !scanned.contains_key(size)).count()
    }

    /// Whether no records were counted.
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(BTreeMap::is_empty)
    }

    fn table(&self, tracking: Tracking) -> &BTreeMap<u64, u64> {
        &self.tables[tracking.index()]
    }

    fn sum(&self, pairs: impl Iterator<Item = (u64, u64)>) -> Totals {
        let mut totals = Totals::default();
        for (size, freq) in pairs {
            totals.observe(size, freq);
        }
        totals
    }
}

impl Extend<Record> for SizeFrequencies {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.record(&record);
        }
    }
}

impl FromIterator<Record> for SizeFrequencies {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        let mut freqs = Self::new();
        freqs.extend(iter);
        freqs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SizeFrequencies {
        [
            Record::no_scan(10).unwrap(),
            Record::no_scan(10).unwrap(),
            Record::scanned(10).unwrap(),
            Record::scanned(48).unwrap(),
            Record::no_scan(5000).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn tables_are_split_by_tracking() {
        let freqs = sample();
        assert_eq!(freqs.frequency(Tracking::NoScan, 10), 2);
        assert_eq!(freqs.frequency(Tracking::Scanned, 10), 1);
        assert_eq!(freqs.frequency(Tracking::Scanned, 5000), 0);
        assert_eq!(
            freqs.totals(Tracking::NoScan),
            Totals { objects: 3, bytes: 5020 }
        );
        assert_eq!(
            freqs.totals(Tracking::Scanned),
            Totals { objects: 2, bytes: 58 }
        );
        assert_eq!(
            freqs.combined_totals(),
            Totals { objects: 5, bytes: 5078 }
        );
    }

    #[test]
    fn distinct_sizes_counts_shared_sizes_once() {
        assert_eq!(sample().distinct_sizes(), 3);
        assert_eq!(SizeFrequencies::new().distinct_sizes(), 0);
    }

    #[test]
    fn range_and_overflow_totals() {
        let freqs = sample();
        assert_eq!(freqs.range_totals(1..=16), Totals { objects: 3, bytes: 30 });
        assert_eq!(freqs.range_totals(33..=64), Totals { objects: 1, bytes: 48 });
        assert_eq!(freqs.overflow_totals(), Totals { objects: 1, bytes: 5000 });
    }

    #[test]
    fn byte_totals_do_not_wrap_at_64_bits() {
        let big = u64::MAX / 2;
        let freqs: SizeFrequencies = (0..3).map(|_| Record::no_scan(big).unwrap()).collect();
        let expected = Totals {
            objects: 3,
            bytes: 3 * u128::from(big),
        };
        assert_eq!(freqs.totals(Tracking::NoScan), expected);
        assert_eq!(freqs.combined_totals(), expected);
        assert_eq!(freqs.overflow_totals(), expected);
    }

    #[test]
    fn empty_tables() {
        let freqs = SizeFrequencies::new();
        assert!(freqs.is_empty());
        assert_eq!(freqs.combined_totals(), Totals::default());
    }
}
