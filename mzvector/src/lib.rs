//! Clean tandem mass spectra and turn them into unit-length feature vectors.
//!
//! A [`Spectrum`] receives raw peaks with [`Spectrum::set_peaks`], is cleaned
//! by [`Spectrum::process`] according to [`PeakProcessingParams`], and once
//! processed can be binned into a dense vector over a [`BinGrid`] with
//! [`Spectrum::get_vector`].
//!
//! ```
//! use mzvector::{BinGrid, PeakProcessingParams, Scaling, Spectrum};
//!
//! let mut spectrum = Spectrum::new("scan=1", 650.3, Some(2));
//! spectrum
//!     .set_peaks(&[175.12f64, 262.15, 505.4, 618.3], &[10.0f64, 40.0, 25.0, 5.0], None)
//!     .unwrap();
//!
//! let params = PeakProcessingParams {
//!     min_peaks: 3,
//!     min_mz_range: 100.0,
//!     scaling: Scaling::Sqrt,
//!     ..Default::default()
//! };
//! let status = spectrum.process(&params).unwrap();
//! assert!(status.is_processed());
//!
//! let grid = BinGrid::new(11.0, 2010.0, 1.0005079).unwrap();
//! let vector = spectrum.get_vector(&grid).unwrap().unwrap();
//! assert_eq!(vector.len(), grid.dimension());
//! ```
pub mod binning;
pub mod error;
pub mod matching;
pub mod params;
pub mod peaks;
mod pipeline;
pub mod spectrum;

pub use binning::{get_dim, BinGrid};
pub use error::SpectrumError;
pub use matching::SpectrumMatch;
pub use params::{PeakProcessingParams, Scaling};
pub use peaks::{Annotation, PeakStore};
pub use spectrum::{ProcessingStatus, Spectrum};
