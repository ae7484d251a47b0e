//! Parameters controlling peak processing.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::SpectrumError;

/// The transformation applied to intensities before normalization
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Scaling {
    /// Leave intensities as they are
    #[default]
    None,
    /// Take the square root of each intensity to dampen very intense peaks
    Sqrt,
    /// Replace each intensity by a score derived from its intensity rank
    Rank,
}

impl Display for Scaling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scaling::None => f.write_str("none"),
            Scaling::Sqrt => f.write_str("sqrt"),
            Scaling::Rank => f.write_str("rank"),
        }
    }
}

impl FromStr for Scaling {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "sqrt" => Ok(Self::Sqrt),
            "rank" => Ok(Self::Rank),
            _ => Err(SpectrumError::invalid_parameter(
                "scaling",
                format!("`{s}` is not one of none, sqrt or rank"),
            )),
        }
    }
}

/// A package of fully resolved parameters for [`Spectrum::process`](crate::Spectrum::process)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeakProcessingParams {
    /// The number of decimals to round masses to before merging coinciding
    /// peaks, or `None` to keep masses as they are
    pub resolution: Option<u32>,
    /// The minimum m/z to keep, inclusive
    pub min_mz: f64,
    /// The maximum m/z to keep, inclusive
    pub max_mz: f64,
    /// Whether to remove peaks near the precursor m/z at each charge state
    pub remove_precursor: bool,
    /// The half-width in Da of the window removed around each precursor m/z
    pub remove_precursor_tolerance: f64,
    /// Reject spectra with fewer peaks left after m/z filtering
    pub min_peaks: usize,
    /// Keep at most this many of the most intense peaks
    pub max_peaks_used: usize,
    /// Remove peaks with a lower absolute intensity
    pub min_intensity: f64,
    /// Remove peaks with a lower intensity than this fraction of the most intense peak
    pub min_dynamic_range: f64,
    /// Reject spectra whose remaining peaks span a smaller m/z range
    pub min_mz_range: f64,
    pub scaling: Scaling,
}

impl Default for PeakProcessingParams {
    fn default() -> Self {
        Self {
            resolution: None,
            min_mz: 11.0,
            max_mz: 2010.0,
            remove_precursor: true,
            remove_precursor_tolerance: 1.5,
            min_peaks: 10,
            max_peaks_used: 50,
            min_intensity: 0.01,
            min_dynamic_range: 0.0,
            min_mz_range: 250.0,
            scaling: Scaling::Rank,
        }
    }
}

impl PeakProcessingParams {
    /// Check that the parameters describe a usable pipeline.
    pub fn validate(&self) -> Result<(), SpectrumError> {
        if !(self.min_mz.is_finite() && self.max_mz.is_finite()) || self.max_mz <= self.min_mz {
            return Err(SpectrumError::InvalidMzRange(self.min_mz, self.max_mz));
        }
        if !(self.remove_precursor_tolerance >= 0.0) {
            return Err(SpectrumError::invalid_parameter(
                "remove_precursor_tolerance",
                format!("{} is negative", self.remove_precursor_tolerance),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_dynamic_range) {
            return Err(SpectrumError::invalid_parameter(
                "min_dynamic_range",
                format!("{} is not a fraction between 0 and 1", self.min_dynamic_range),
            ));
        }
        if self.min_intensity.is_nan() {
            return Err(SpectrumError::invalid_parameter(
                "min_intensity",
                "value is NaN",
            ));
        }
        if self.min_mz_range.is_nan() {
            return Err(SpectrumError::invalid_parameter(
                "min_mz_range",
                "value is NaN",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scaling_fromstr() -> Result<(), SpectrumError> {
        assert_eq!("sqrt".parse::<Scaling>()?, Scaling::Sqrt);
        assert_eq!("Rank".parse::<Scaling>()?, Scaling::Rank);
        assert_eq!("none".parse::<Scaling>()?, Scaling::None);
        assert!("log".parse::<Scaling>().is_err());
        assert_eq!(Scaling::Sqrt.to_string(), "sqrt");
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(PeakProcessingParams::default().validate().is_ok());

        let params = PeakProcessingParams {
            min_mz: 500.0,
            max_mz: 100.0,
            ..Default::default()
        };
        assert_eq!(
            params.validate(),
            Err(SpectrumError::InvalidMzRange(500.0, 100.0))
        );

        let params = PeakProcessingParams {
            min_dynamic_range: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SpectrumError::InvalidParameter {
                name: "min_dynamic_range",
                ..
            })
        ));

        let params = PeakProcessingParams {
            remove_precursor_tolerance: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
