// src/common/types.rs

use core::fmt;

/// Half-open acceptance range `[low, high)` for raw sensor samples.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PlausibleRange {
    pub low: u16,
    pub high: u16,
}

impl PlausibleRange {
    /// Readings the CO2 sensor produces while healthy, in ppm.
    pub const CO2_PPM: PlausibleRange = PlausibleRange { low: 300, high: 10_000 };

    pub const fn new(low: u16, high: u16) -> Self {
        PlausibleRange { low, high }
    }

    #[inline]
    pub const fn contains(&self, value: u16) -> bool {
        value >= self.low && value < self.high
    }
}

impl Default for PlausibleRange {
    fn default() -> Self {
        Self::CO2_PPM
    }
}

impl fmt::Display for PlausibleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.low, self.high)
    }
}

/// Running totals of one averaging run.
#[derive(Debug, Clone)]
pub struct SampleAccumulator {
    range: PlausibleRange,
    sum: u32,
    accepted: u16,
    rejected: u16,
}

impl SampleAccumulator {
    pub fn new(range: PlausibleRange) -> Self {
        SampleAccumulator { range, sum: 0, accepted: 0, rejected: 0 }
    }

    /// Adds `value` if it lies in the plausible range. Returns whether it was kept.
    pub fn push(&mut self, value: u16) -> bool {
        if self.range.contains(value) {
            self.sum += u32::from(value);
            self.accepted += 1;
            true
        } else {
            self.rejected += 1;
            false
        }
    }

    /// Counts a sample that never produced a value (failed read).
    pub fn reject(&mut self) {
        self.rejected += 1;
    }

    pub fn accepted(&self) -> u16 {
        self.accepted
    }

    pub fn rejected(&self) -> u16 {
        self.rejected
    }

    pub fn taken(&self) -> u16 {
        self.accepted + self.rejected
    }

    /// Integer (truncated) mean of the accepted samples.
    pub fn mean(&self) -> Option<u16> {
        if self.accepted == 0 {
            return None;
        }
        // Every accepted value is < high <= u16::MAX, so the mean fits.
        Some((self.sum / u32::from(self.accepted)) as u16)
    }
}
