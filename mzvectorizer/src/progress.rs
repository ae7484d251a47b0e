use std::iter::Sum;
use std::ops::{Add, AddAssign};

use mzvector::ProcessingStatus;

/// Tallies of what happened to the spectra in a batch
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ProgressRecord {
    pub spectra: usize,
    pub processed: usize,
    pub too_few_peaks: usize,
    pub insufficient_mz_range: usize,
    pub peaks_retained: usize,
}

impl ProgressRecord {
    /// The record for a single spectrum with `peaks` peaks after processing
    pub fn from_status(status: &ProcessingStatus, peaks: usize) -> Self {
        let mut record = Self {
            spectra: 1,
            ..Default::default()
        };
        match status {
            ProcessingStatus::Processed => {
                record.processed = 1;
                record.peaks_retained = peaks;
            }
            ProcessingStatus::TooFewPeaks { .. } => record.too_few_peaks = 1,
            ProcessingStatus::InsufficientMzRange { .. } => record.insufficient_mz_range = 1,
        }
        record
    }

    pub fn rejected(&self) -> usize {
        self.too_few_peaks + self.insufficient_mz_range
    }
}

impl Add for ProgressRecord {
    type Output = ProgressRecord;

    fn add(self, rhs: Self) -> Self::Output {
        let mut dup = self;
        dup += rhs;
        dup
    }
}

impl AddAssign for ProgressRecord {
    fn add_assign(&mut self, rhs: Self) {
        self.spectra += rhs.spectra;
        self.processed += rhs.processed;
        self.too_few_peaks += rhs.too_few_peaks;
        self.insufficient_mz_range += rhs.insufficient_mz_range;
        self.peaks_retained += rhs.peaks_retained;
    }
}

impl Sum for ProgressRecord {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, x| acc + x)
    }
}
