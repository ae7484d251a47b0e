//! Parallel-array storage for a spectrum's peaks.

use itertools::izip;
use mzpeaks::{prelude::*, CentroidPeak, IndexType, MZPeakSetType};
use num_traits::AsPrimitive;

use crate::error::SpectrumError;

/// An opaque label attached to a peak, e.g. a fragment ion annotation
pub type Annotation = Option<String>;

/// The masses, intensities and annotations of a spectrum's peaks, stored as
/// parallel arrays of equal length, along with a flag recording whether the
/// peaks went through the processing pipeline successfully.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPeakStore"))]
pub struct PeakStore {
    pub(crate) masses: Vec<f32>,
    pub(crate) intensities: Vec<f32>,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) processed: bool,
}

/// The serialized form of a [`PeakStore`], checked on the way in
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawPeakStore {
    masses: Vec<f32>,
    intensities: Vec<f32>,
    annotations: Vec<Annotation>,
    processed: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPeakStore> for PeakStore {
    type Error = SpectrumError;

    fn try_from(value: RawPeakStore) -> Result<Self, Self::Error> {
        let mut store =
            Self::from_arrays(&value.masses, &value.intensities, Some(value.annotations))?;
        store.processed = value.processed;
        Ok(store)
    }
}

impl PeakStore {
    /// Build an unprocessed store from raw arrays of any numeric type.
    ///
    /// Values are converted to `f32`. When `annotations` is `None` every peak
    /// receives an empty annotation. No sorting or filtering takes place.
    pub fn from_arrays<M, I>(
        masses: &[M],
        intensities: &[I],
        annotations: Option<Vec<Annotation>>,
    ) -> Result<Self, SpectrumError>
    where
        M: AsPrimitive<f32>,
        I: AsPrimitive<f32>,
    {
        let annotations = annotations.unwrap_or_else(|| vec![None; masses.len()]);
        if masses.len() != intensities.len() || masses.len() != annotations.len() {
            return Err(SpectrumError::LengthMismatch {
                masses: masses.len(),
                intensities: intensities.len(),
                annotations: annotations.len(),
            });
        }
        Ok(Self {
            masses: masses.iter().map(|&m| m.as_()).collect(),
            intensities: intensities.iter().map(|&i| i.as_()).collect(),
            annotations,
            processed: false,
        })
    }

    /// Build an unprocessed store from any centroided peak type
    pub fn from_centroids<C: CentroidLike>(peaks: &[C]) -> Self {
        Self {
            masses: peaks.iter().map(|p| p.mz() as f32).collect(),
            intensities: peaks.iter().map(|p| p.intensity()).collect(),
            annotations: vec![None; peaks.len()],
            processed: false,
        }
    }

    /// Assemble a store from arrays already known to be of equal length.
    pub(crate) fn from_parts(
        masses: Vec<f32>,
        intensities: Vec<f32>,
        annotations: Vec<Annotation>,
    ) -> Self {
        debug_assert_eq!(masses.len(), intensities.len());
        debug_assert_eq!(masses.len(), annotations.len());
        Self {
            masses,
            intensities,
            annotations,
            processed: false,
        }
    }

    /// Copy out the peaks at `indices`, in the order given
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        Self::from_parts(
            indices.iter().map(|i| self.masses[*i]).collect(),
            indices.iter().map(|i| self.intensities[*i]).collect(),
            indices.iter().map(|i| self.annotations[*i].clone()).collect(),
        )
    }

    pub fn masses(&self) -> &[f32] {
        &self.masses
    }

    pub fn intensities(&self) -> &[f32] {
        &self.intensities
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Whether these peaks are the output of a successful processing run
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn len(&self) -> usize {
        self.masses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    /// Iterate over `(mass, intensity, annotation)` triples
    pub fn iter(&self) -> impl Iterator<Item = (f32, f32, &Annotation)> + '_ {
        izip!(
            self.masses.iter().copied(),
            self.intensities.iter().copied(),
            self.annotations.iter()
        )
    }

    /// The total ion current of the stored peaks
    pub fn tic(&self) -> f32 {
        self.intensities.iter().sum()
    }

    /// The distance between the lowest and highest m/z, or `None` if there are no peaks.
    ///
    /// Assumes the masses are sorted.
    pub fn mz_span(&self) -> Option<f64> {
        match (self.masses.first(), self.masses.last()) {
            (Some(first), Some(last)) => Some((*last - *first) as f64),
            _ => None,
        }
    }

    /// Convert the stored peaks into an [`MZPeakSetType`], dropping annotations.
    pub fn to_peak_set(&self) -> MZPeakSetType<CentroidPeak> {
        let peaks = self
            .masses
            .iter()
            .zip(self.intensities.iter())
            .enumerate()
            .map(|(i, (mz, intensity))| CentroidPeak::new(*mz as f64, *intensity, i as IndexType))
            .collect();
        MZPeakSetType::new(peaks)
    }
}
