use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

use mzvector::{BinGrid, PeakProcessingParams, Spectrum, SpectrumError};

use crate::config::{ConfigError, ProcessOverrides, ProcessingConfig};
use crate::progress::ProgressRecord;

/// Processes and vectorizes many spectra in parallel with one shared set of
/// parameters.
///
/// Every spectrum is handled independently, so the work is spread over the
/// current [`rayon`] thread pool without any coordination between tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchProcessor {
    params: PeakProcessingParams,
    grid: BinGrid,
}

impl BatchProcessor {
    /// Pair processing parameters with the grid processed spectra are binned over.
    ///
    /// # Errors
    /// If `params` are invalid, or [`SpectrumError::InvalidMzRange`] if `grid` does
    /// not cover the m/z range peaks are filtered to.
    pub fn new(params: PeakProcessingParams, grid: BinGrid) -> Result<Self, SpectrumError> {
        params.validate()?;
        if grid.min_mz() > params.min_mz || params.max_mz > grid.max_mz() {
            return Err(SpectrumError::InvalidMzRange(params.min_mz, params.max_mz));
        }
        Ok(Self { params, grid })
    }

    pub fn from_config(config: &ProcessingConfig) -> Result<Self, ConfigError> {
        Self::from_config_with(config, &ProcessOverrides::default())
    }

    pub fn from_config_with(
        config: &ProcessingConfig,
        overrides: &ProcessOverrides,
    ) -> Result<Self, ConfigError> {
        let params = overrides.resolve(config);
        let grid = overrides.resolve_grid(config)?;
        Ok(Self::new(params, grid)?)
    }

    pub fn params(&self) -> &PeakProcessingParams {
        &self.params
    }

    pub fn grid(&self) -> &BinGrid {
        &self.grid
    }

    /// Process a single spectrum, reporting what happened to it
    pub fn process_one(&self, spectrum: &mut Spectrum) -> Result<ProgressRecord, SpectrumError> {
        let status = spectrum.process(&self.params)?;
        Ok(ProgressRecord::from_status(&status, spectrum.peaks().len()))
    }

    /// Process every spectrum in `spectra` in place.
    ///
    /// Rejected spectra are counted in the returned [`ProgressRecord`] and left
    /// unprocessed.
    pub fn process_all(&self, spectra: &mut [Spectrum]) -> Result<ProgressRecord, SpectrumError> {
        let started = Instant::now();
        let progress = spectra
            .par_iter_mut()
            .map(|spectrum| self.process_one(spectrum))
            .try_reduce(ProgressRecord::default, |a, b| Ok(a + b))?;
        let elapsed = started.elapsed();

        info!(
            "Processed {} of {} spectra in {:0.3?}",
            progress.processed, progress.spectra, elapsed
        );
        debug!(
            "{} spectra had too few peaks, {} covered too small an m/z range, {} peaks retained",
            progress.too_few_peaks, progress.insufficient_mz_range, progress.peaks_retained
        );
        Ok(progress)
    }

    /// Build the vector of every spectrum in `spectra`, in order.
    ///
    /// Unprocessed spectra have no vector.
    pub fn vectorize_all(
        &self,
        spectra: &[Spectrum],
    ) -> Result<Vec<Option<Vec<f32>>>, SpectrumError> {
        spectra
            .par_iter()
            .map(|spectrum| spectrum.get_vector(&self.grid))
            .collect()
    }

    /// Process `spectra` and return their vectors along with the run statistics
    pub fn process_and_vectorize(
        &self,
        spectra: &mut [Spectrum],
    ) -> Result<(ProgressRecord, Vec<Option<Vec<f32>>>), SpectrumError> {
        let progress = self.process_all(spectra)?;
        let vectors = self.vectorize_all(spectra)?;
        Ok((progress, vectors))
    }
}
