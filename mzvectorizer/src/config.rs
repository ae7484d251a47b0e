use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use mzvector::{BinGrid, PeakProcessingParams, Scaling, SpectrumError};

/// The prefix for environment variables read by [`ProcessingConfig::load`]
pub const ENV_PREFIX: &str = "MZVECTOR_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read the configuration: {0}")]
    Extraction(
        #[source]
        #[from]
        Box<figment::Error>,
    ),
    #[error("The configuration is invalid: {0}")]
    Invalid(
        #[source]
        #[from]
        SpectrumError,
    ),
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Extraction(Box::new(value))
    }
}

/// Settings for peak processing and vectorization.
///
/// Configurations are layered: built-in defaults, then an optional TOML file,
/// then environment variables prefixed with `MZVECTOR_`, e.g. `MZVECTOR_MIN_PEAKS=5`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProcessingConfig {
    /// The number of decimals masses are rounded to before merging peaks
    pub resolution: Option<u32>,
    pub min_mz: f64,
    pub max_mz: f64,
    /// The width of a vector bin in Da
    pub bin_size: f64,
    pub remove_precursor: bool,
    pub remove_precursor_tolerance: f64,
    pub min_peaks: usize,
    pub max_peaks_used: usize,
    pub min_intensity: f64,
    pub min_dynamic_range: f64,
    pub min_mz_range: f64,
    pub scaling: Scaling,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        let params = PeakProcessingParams::default();
        Self {
            resolution: params.resolution,
            min_mz: params.min_mz,
            max_mz: params.max_mz,
            bin_size: 1.0005079,
            remove_precursor: params.remove_precursor,
            remove_precursor_tolerance: params.remove_precursor_tolerance,
            min_peaks: params.min_peaks,
            max_peaks_used: params.max_peaks_used,
            min_intensity: params.min_intensity,
            min_dynamic_range: params.min_dynamic_range,
            min_mz_range: params.min_mz_range,
            scaling: params.scaling,
        }
    }
}

impl ProcessingConfig {
    /// The base [`Figment`] holding the default configuration
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    /// Extract and validate a configuration from `figment`
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from the defaults, the TOML file at `path` if one is
    /// given, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Self::figment();
        if let Some(path) = path {
            debug!("Reading configuration from {}", path.display());
            figment = figment.merge(Toml::file_exact(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));
        Self::from_figment(&figment)
    }

    /// The processing parameters this configuration describes
    pub fn processing_params(&self) -> PeakProcessingParams {
        PeakProcessingParams {
            resolution: self.resolution,
            min_mz: self.min_mz,
            max_mz: self.max_mz,
            remove_precursor: self.remove_precursor,
            remove_precursor_tolerance: self.remove_precursor_tolerance,
            min_peaks: self.min_peaks,
            max_peaks_used: self.max_peaks_used,
            min_intensity: self.min_intensity,
            min_dynamic_range: self.min_dynamic_range,
            min_mz_range: self.min_mz_range,
            scaling: self.scaling,
        }
    }

    /// The vector bin grid spanning the configured m/z range
    pub fn bin_grid(&self) -> Result<BinGrid, SpectrumError> {
        BinGrid::new(self.min_mz, self.max_mz, self.bin_size)
    }

    pub fn validate(&self) -> Result<(), SpectrumError> {
        self.processing_params().validate()?;
        self.bin_grid()?;
        Ok(())
    }
}

/// Per-call replacements for individual configuration values.
///
/// Any field left as `None` falls back to the configuration it is resolved against.
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ProcessOverrides {
    pub resolution: Option<u32>,
    pub min_mz: Option<f64>,
    pub max_mz: Option<f64>,
    pub bin_size: Option<f64>,
    pub remove_precursor: Option<bool>,
    pub remove_precursor_tolerance: Option<f64>,
    pub min_peaks: Option<usize>,
    pub max_peaks_used: Option<usize>,
    pub min_intensity: Option<f64>,
    pub min_dynamic_range: Option<f64>,
    pub min_mz_range: Option<f64>,
    pub scaling: Option<Scaling>,
}

impl ProcessOverrides {
    /// Fill in every unset value from `config`
    pub fn resolve(&self, config: &ProcessingConfig) -> PeakProcessingParams {
        PeakProcessingParams {
            resolution: self.resolution.or(config.resolution),
            min_mz: self.min_mz.unwrap_or(config.min_mz),
            max_mz: self.max_mz.unwrap_or(config.max_mz),
            remove_precursor: self.remove_precursor.unwrap_or(config.remove_precursor),
            remove_precursor_tolerance: self
                .remove_precursor_tolerance
                .unwrap_or(config.remove_precursor_tolerance),
            min_peaks: self.min_peaks.unwrap_or(config.min_peaks),
            max_peaks_used: self.max_peaks_used.unwrap_or(config.max_peaks_used),
            min_intensity: self.min_intensity.unwrap_or(config.min_intensity),
            min_dynamic_range: self.min_dynamic_range.unwrap_or(config.min_dynamic_range),
            min_mz_range: self.min_mz_range.unwrap_or(config.min_mz_range),
            scaling: self.scaling.unwrap_or(config.scaling),
        }
    }

    /// The bin grid after applying the m/z range and bin size overrides
    pub fn resolve_grid(&self, config: &ProcessingConfig) -> Result<BinGrid, SpectrumError> {
        BinGrid::new(
            self.min_mz.unwrap_or(config.min_mz),
            self.max_mz.unwrap_or(config.max_mz),
            self.bin_size.unwrap_or(config.bin_size),
        )
    }
}
