//! The tandem mass spectrum aggregate and its processing entry points.

use std::fmt::Display;

use mzpeaks::CentroidLike;
use num_traits::AsPrimitive;
use tracing::debug;

use crate::binning::BinGrid;
use crate::error::SpectrumError;
use crate::params::PeakProcessingParams;
use crate::peaks::{Annotation, PeakStore};
use crate::pipeline::{run_pipeline, PipelineResult, PrecursorInfo};

/// The outcome of running [`Spectrum::process`] on a well-formed spectrum.
///
/// Rejections are an expected result of quality filtering, not errors. A rejected
/// spectrum keeps its peaks exactly as they were before processing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcessingStatus {
    /// The peaks were filtered, scaled and normalized
    Processed,
    /// Too few peaks survived filtering
    TooFewPeaks { found: usize, required: usize },
    /// The surviving peaks cover too narrow an m/z range
    InsufficientMzRange { span: f64, required: f64 },
}

impl ProcessingStatus {
    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Processed)
    }
}

impl Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processed => write!(f, "processed"),
            Self::TooFewPeaks { found, required } => {
                write!(f, "too few peaks ({found} < {required})")
            }
            Self::InsufficientMzRange { span, required } => {
                write!(f, "insufficient m/z range ({span:.3} < {required})")
            }
        }
    }
}

/// A tandem mass spectrum with its precursor information, its peaks, and
/// optionally an identification when it comes from a spectral library.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spectrum {
    /// The unique identifier of the spectrum within its source file
    pub identifier: String,
    pub precursor_mz: f64,
    pub precursor_charge: Option<i32>,
    pub retention_time: Option<f64>,
    /// The peptide sequence, if known
    pub peptide: Option<String>,
    /// Whether this is a decoy library spectrum
    pub is_decoy: bool,
    peaks: PeakStore,
}

impl Spectrum {
    /// Create a new spectrum without any peaks
    pub fn new(
        identifier: impl Into<String>,
        precursor_mz: f64,
        precursor_charge: Option<i32>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            precursor_mz,
            precursor_charge,
            retention_time: None,
            peptide: None,
            is_decoy: false,
            peaks: PeakStore::default(),
        }
    }

    pub fn with_retention_time(mut self, retention_time: f64) -> Self {
        self.retention_time = Some(retention_time);
        self
    }

    pub fn with_peptide(mut self, peptide: impl Into<String>) -> Self {
        self.peptide = Some(peptide.into());
        self
    }

    pub fn with_decoy(mut self, is_decoy: bool) -> Self {
        self.is_decoy = is_decoy;
        self
    }

    /// Assign peaks to the spectrum, replacing any it had before.
    ///
    /// The values are converted to `f32` and stored as given, unsorted and
    /// unfiltered. The spectrum is marked as unprocessed.
    ///
    /// # Errors
    /// [`SpectrumError::LengthMismatch`] if the arrays differ in length.
    pub fn set_peaks<M, I>(
        &mut self,
        masses: &[M],
        intensities: &[I],
        annotations: Option<Vec<Annotation>>,
    ) -> Result<(), SpectrumError>
    where
        M: AsPrimitive<f32>,
        I: AsPrimitive<f32>,
    {
        self.peaks = PeakStore::from_arrays(masses, intensities, annotations)?;
        Ok(())
    }

    /// As [`Spectrum::set_peaks`], from any centroided peak type
    pub fn set_centroids<C: CentroidLike>(&mut self, peaks: &[C]) {
        self.peaks = PeakStore::from_centroids(peaks);
    }

    pub fn peaks(&self) -> &PeakStore {
        &self.peaks
    }

    /// Whether the peaks have been processed and passed every quality check
    pub fn is_processed(&self) -> bool {
        self.peaks.is_processed()
    }

    /// Clean, filter, scale and normalize the spectrum's peaks.
    ///
    /// The steps, in order, are: merging or sorting by mass, m/z range filtering,
    /// precursor removal, a minimum peak count check, top-N selection by intensity,
    /// noise removal, a minimum m/z span check, intensity scaling and unit-length
    /// normalization.
    ///
    /// If either check fails the spectrum is left untouched and the returned
    /// [`ProcessingStatus`] says why. Otherwise the processed peaks replace the
    /// current ones and the spectrum is marked as processed.
    ///
    /// # Errors
    /// If `params` fail [`PeakProcessingParams::validate`].
    pub fn process(
        &mut self,
        params: &PeakProcessingParams,
    ) -> Result<ProcessingStatus, SpectrumError> {
        params.validate()?;
        let precursor = PrecursorInfo {
            mz: self.precursor_mz,
            charge: self.precursor_charge,
        };
        match run_pipeline(&self.peaks, &precursor, params) {
            PipelineResult::Accepted(peaks) => {
                debug!(
                    "{} processed, {} of {} peaks retained",
                    self.identifier,
                    peaks.len(),
                    self.peaks.len()
                );
                self.peaks = peaks;
                Ok(ProcessingStatus::Processed)
            }
            PipelineResult::Rejected(status) => {
                debug!("{} rejected: {status}", self.identifier);
                Ok(status)
            }
        }
    }

    /// Convert the spectrum into a dense vector by binning its peaks over `grid`.
    ///
    /// Intensities of peaks sharing a bin are summed and the vector is scaled
    /// to unit length. Returns `None` if the spectrum is not processed or has
    /// no peaks.
    ///
    /// # Errors
    /// [`SpectrumError::MassOutOfGrid`] if a peak lies outside of `grid`.
    pub fn get_vector(&self, grid: &BinGrid) -> Result<Option<Vec<f32>>, SpectrumError> {
        if !self.is_processed() || self.peaks.is_empty() {
            return Ok(None);
        }
        grid.vectorize(&self.peaks).map(Some)
    }

    /// As [`Spectrum::get_vector`], building the grid from its bounds
    pub fn get_vector_with(
        &self,
        min_mz: f64,
        max_mz: f64,
        bin_size: f64,
    ) -> Result<Option<Vec<f32>>, SpectrumError> {
        let grid = BinGrid::new(min_mz, max_mz, bin_size)?;
        self.get_vector(&grid)
    }
}
