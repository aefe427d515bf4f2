/// Page size; requests above it fall into the overflow bin.
pub const PAGE_SIZE: u64 = 4096;

/// Capacities of the fixed bin ladder: powers of two from 16 to [`PAGE_SIZE`].
pub const BIN_CAPACITIES: [u64; 9] = [16, 32, 64, 128, 256, 512, 1024, 2048, 4096];

/// Number of bins in the ladder (overflow excluded).
pub const NUM_BINS: usize = BIN_CAPACITIES.len();

/// One size class of the ladder.
///
/// A bin holds every request in `lower..=capacity`; `lower` is one past the
/// capacity of the bin below, or 1 for the first bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bin {
    /// Smallest request size served by this bin.
    pub lower: u64,
    /// Bytes actually handed out for every object in this bin.
    pub capacity: u64,
}

impl Bin {
    /// Whether a request of `size` bytes lands in this bin.
    pub fn contains(&self, size: u64) -> bool {
        size >= self.lower && size <= self.capacity
    }
}

/// Where a request of a given size is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinSlot {
    /// Index into [`BIN_CAPACITIES`].
    Ladder(usize),
    /// Larger than a page.
    Overflow,
}

/// The bin ladder in ascending order.
pub fn ladder() -> impl Iterator<Item = Bin> + Clone {
    BIN_CAPACITIES.iter().enumerate().map(|(i, &capacity)| Bin {
        lower: if i == 0 { 1 } else { BIN_CAPACITIES[i - 1] + 1 },
        capacity,
    })
}

/// Smallest bin whose capacity covers `size`, or the overflow bin.
pub fn bin_for(size: u64) -> BinSlot {
    BIN_CAPACITIES
        .iter()
        .position(|&capacity| size <= capacity)
        .map_or(BinSlot::Overflow, BinSlot::Ladder)
}
