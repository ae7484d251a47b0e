//! Errors raised for malformed peak lists or parameters.
//!
//! Spectra that are rejected by a quality gate are *not* errors, see
//! [`ProcessingStatus`](crate::spectrum::ProcessingStatus).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectrumError {
    #[error(
        "Peak arrays must have equal lengths, found {masses} masses, {intensities} intensities and {annotations} annotations"
    )]
    LengthMismatch {
        masses: usize,
        intensities: usize,
        annotations: usize,
    },
    #[error("The bin size must be a positive, finite number, found {0}")]
    InvalidBinSize(f64),
    #[error("The m/z range {0}-{1} is empty or inverted")]
    InvalidMzRange(f64, f64),
    #[error("Invalid value for parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("A peak at m/z {mz} maps to bin {index}, outside of a grid with {dimension} bins")]
    MassOutOfGrid {
        mz: f64,
        index: i64,
        dimension: usize,
    },
}

impl SpectrumError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
