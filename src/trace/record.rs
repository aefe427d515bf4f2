use thiserror::Error;

/// How the allocator tracks an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tracking {
    /// Allocated with type information; scanned precisely and charged the
    /// per-object bookkeeping overhead in precise waste accounting.
    Scanned,
    /// Allocated as an opaque block that is never scanned.
    NoScan,
}

impl Tracking {
    /// Both tracking modes, in table order.
    pub const ALL: [Tracking; 2] = [Tracking::Scanned, Tracking::NoScan];

    /// Interpret the trace's no-scan column: any non-zero value means `NoScan`.
    pub fn from_no_scan_flag(flag: i64) -> Self {
        if flag != 0 {
            Tracking::NoScan
        } else {
            Tracking::Scanned
        }
    }

    /// Whether objects of this kind are precisely tracked.
    pub fn is_precise(self) -> bool {
        matches!(self, Tracking::Scanned)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Tracking::Scanned => 0,
            Tracking::NoScan => 1,
        }
    }
}

/// Errors raised when constructing a [`Record`] directly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Allocation sizes must be strictly positive.
    #[error("allocation size must be greater than zero")]
    ZeroSize,
}

/// One observed allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    size: u64,
    tracking: Tracking,
}

impl Record {
    /// Construct a record, rejecting zero-sized requests.
    pub fn new(size: u64, tracking: Tracking) -> Result<Self, RecordError> {
        if size == 0 {
            return Err(RecordError::ZeroSize);
        }
        Ok(Self { size, tracking })
    }

    /// Shorthand for a precisely tracked (scanned) record.
    pub fn scanned(size: u64) -> Result<Self, RecordError> {
        Self::new(size, Tracking::Scanned)
    }

    /// Shorthand for an untracked (no-scan) record.
    pub fn no_scan(size: u64) -> Result<Self, RecordError> {
        Self::new(size, Tracking::NoScan)
    }

    /// Requested size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Tracking mode of the allocation.
    pub fn tracking(&self) -> Tracking {
        self.tracking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(Record::new(0, Tracking::NoScan), Err(RecordError::ZeroSize));
    }

    #[test]
    fn no_scan_flag_is_inverted_precision() {
        assert_eq!(Tracking::from_no_scan_flag(1), Tracking::NoScan);
        assert_eq!(Tracking::from_no_scan_flag(7), Tracking::NoScan);
        assert_eq!(Tracking::from_no_scan_flag(0), Tracking::Scanned);
        assert!(Tracking::Scanned.is_precise());
        assert!(!Tracking::NoScan.is_precise());
    }
}
