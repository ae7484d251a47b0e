//! Fixed-width m/z bins and the dense vectors built over them.

use crate::error::SpectrumError;
use crate::peaks::PeakStore;
use crate::pipeline::l2_norm;

/// Compute the number of bins of width `bin_size` over the inclusive mass range
/// `min_mz` to `max_mz`.
///
/// This is `floor((max_mz - min_mz + 1) / bin_size)`. No validation is done, see
/// [`BinGrid::new`] for a checked constructor.
pub fn get_dim(min_mz: f64, max_mz: f64, bin_size: f64) -> usize {
    ((max_mz - min_mz + 1.0) / bin_size).floor() as usize
}

/// A partition of an m/z range into equal width bins
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBinGrid"))]
pub struct BinGrid {
    min_mz: f64,
    max_mz: f64,
    bin_size: f64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawBinGrid {
    min_mz: f64,
    max_mz: f64,
    bin_size: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawBinGrid> for BinGrid {
    type Error = SpectrumError;

    fn try_from(value: RawBinGrid) -> Result<Self, Self::Error> {
        Self::new(value.min_mz, value.max_mz, value.bin_size)
    }
}

impl BinGrid {
    pub fn new(min_mz: f64, max_mz: f64, bin_size: f64) -> Result<Self, SpectrumError> {
        if !(bin_size.is_finite() && bin_size > 0.0) {
            return Err(SpectrumError::InvalidBinSize(bin_size));
        }
        if !(min_mz.is_finite() && max_mz.is_finite()) || max_mz <= min_mz {
            return Err(SpectrumError::InvalidMzRange(min_mz, max_mz));
        }
        Ok(Self {
            min_mz,
            max_mz,
            bin_size,
        })
    }

    pub fn min_mz(&self) -> f64 {
        self.min_mz
    }

    pub fn max_mz(&self) -> f64 {
        self.max_mz
    }

    pub fn bin_size(&self) -> f64 {
        self.bin_size
    }

    /// The number of bins in the grid
    pub fn dimension(&self) -> usize {
        get_dim(self.min_mz, self.max_mz, self.bin_size)
    }

    /// The bin `mz` falls into, which may lie outside of the grid
    #[inline]
    pub fn bin_of(&self, mz: f64) -> i64 {
        ((mz - self.min_mz) / self.bin_size).floor() as i64
    }

    /// The bin `mz` falls into, or an error if it is not part of the grid
    pub fn checked_bin_of(&self, mz: f64) -> Result<usize, SpectrumError> {
        let index = self.bin_of(mz);
        let dimension = self.dimension();
        if index < 0 || index as usize >= dimension {
            Err(SpectrumError::MassOutOfGrid {
                mz,
                index,
                dimension,
            })
        } else {
            Ok(index as usize)
        }
    }

    /// Sum the intensities of `peaks` into their bins and scale the result to unit length.
    ///
    /// An all-zero vector is returned as is.
    pub fn vectorize(&self, peaks: &PeakStore) -> Result<Vec<f32>, SpectrumError> {
        let mut bins = vec![0.0f32; self.dimension()];
        for (mz, intensity) in peaks.masses().iter().zip(peaks.intensities().iter()) {
            let index = self.checked_bin_of(*mz as f64)?;
            bins[index] += *intensity;
        }

        let norm = l2_norm(&bins);
        if norm > 0.0 {
            for value in bins.iter_mut() {
                *value = (*value as f64 / norm) as f32;
            }
        }
        Ok(bins)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_dim() {
        assert_eq!(
            get_dim(100.0, 1500.0, 1.0005079),
            (1401.0f64 / 1.0005079).floor() as usize
        );
        assert_eq!(get_dim(100.0, 1500.0, 1.0005079), 1400);
        assert_eq!(get_dim(0.0, 9.0, 1.0), 10);
        assert_eq!(get_dim(0.0, 9.0, 2.0), 5);
    }

    #[test]
    fn test_grid_validation() {
        assert_eq!(
            BinGrid::new(100.0, 1500.0, 0.0),
            Err(SpectrumError::InvalidBinSize(0.0))
        );
        assert_eq!(
            BinGrid::new(100.0, 1500.0, -1.0),
            Err(SpectrumError::InvalidBinSize(-1.0))
        );
        assert_eq!(
            BinGrid::new(1500.0, 100.0, 1.0),
            Err(SpectrumError::InvalidMzRange(1500.0, 100.0))
        );
        assert_eq!(
            BinGrid::new(100.0, 100.0, 1.0),
            Err(SpectrumError::InvalidMzRange(100.0, 100.0))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let grid: BinGrid =
            serde_json::from_str(r#"{"min_mz":100.0,"max_mz":1500.0,"bin_size":1.0}"#).unwrap();
        assert_eq!(grid.dimension(), 1401);

        assert!(
            serde_json::from_str::<BinGrid>(r#"{"min_mz":100.0,"max_mz":1500.0,"bin_size":0.0}"#)
                .is_err()
        );
        assert!(
            serde_json::from_str::<BinGrid>(r#"{"min_mz":1500.0,"max_mz":100.0,"bin_size":1.0}"#)
                .is_err()
        );
    }

    #[test]
    fn test_bin_of() -> Result<(), SpectrumError> {
        let grid = BinGrid::new(100.0, 1500.0, 1.0005079)?;
        assert_eq!(grid.checked_bin_of(100.0)?, 0);
        assert_eq!(grid.checked_bin_of(1500.0)?, 1399);
        assert!(matches!(
            grid.checked_bin_of(99.0),
            Err(SpectrumError::MassOutOfGrid { index: -1, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_vectorize_sums_shared_bins() -> Result<(), SpectrumError> {
        let grid = BinGrid::new(100.0, 400.0, 1.0)?;
        let peaks = PeakStore::from_arrays(&[100.2f32, 100.7, 300.0], &[3.0f32, 4.0, 12.0], None)?;
        let vector = grid.vectorize(&peaks)?;
        assert_eq!(vector.len(), 301);
        let norm = 193.0f64.sqrt();
        assert!((vector[0] as f64 - 7.0 / norm).abs() < 1e-6);
        assert!((vector[200] as f64 - 12.0 / norm).abs() < 1e-6);
        assert!((l2_norm(&vector) - 1.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_vectorize_zero() -> Result<(), SpectrumError> {
        let grid = BinGrid::new(0.0, 9.0, 1.0)?;
        let peaks = PeakStore::from_arrays(&[1.0f32, 5.0], &[0.0f32, 0.0], None)?;
        assert_eq!(grid.vectorize(&peaks)?, vec![0.0; 10]);
        Ok(())
    }
}
