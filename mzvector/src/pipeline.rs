//! The individual stages of peak processing.
//!
//! Each stage either narrows the set of peaks or rejects the spectrum. Filters
//! are expressed as ordered index sets over a working copy of the peaks, so no
//! stage mutates the spectrum that is being processed. [`run_pipeline`] chains
//! the stages in order and hands back either the final peaks or the reason the
//! spectrum was rejected.

use mzpeaks::coordinate::{SimpleInterval, Span1D};
use mzpeaks::Tolerance;
use num_traits::AsPrimitive;
use tracing::{debug, trace};

use crate::params::{PeakProcessingParams, Scaling};
use crate::peaks::PeakStore;
use crate::spectrum::ProcessingStatus;

/// The precursor ion information the pipeline needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PrecursorInfo {
    pub mz: f64,
    pub charge: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PipelineResult {
    Accepted(PeakStore),
    Rejected(ProcessingStatus),
}

/// Round `value` to `decimals` decimal places, with ties going to the even neighbor.
#[inline]
pub(crate) fn round_to(value: f32, decimals: u32) -> f32 {
    let scale = 10.0f32.powi(decimals as i32);
    (value * scale).round_ties_even() / scale
}

/// The indices of `values` in a stable ascending order
fn argsort_ascending(values: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| values[*a].total_cmp(&values[*b]));
    order
}

/// The indices of `values` in a stable descending order, so equal values
/// keep their relative order.
fn argsort_descending(values: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| values[*b].total_cmp(&values[*a]));
    order
}

/// Sort the peaks by mass, keeping the input order of peaks with equal masses.
pub(crate) fn sort_by_mass(peaks: &PeakStore) -> PeakStore {
    peaks.select(&argsort_ascending(&peaks.masses))
}

/// Round masses to `decimals` and merge the peaks that end up on the same mass.
///
/// A merged peak carries the sum of the intensities of all of its members and
/// the annotation of the member that came first in the input. The output is
/// sorted by mass with no repeated masses.
pub(crate) fn merge_at_resolution(peaks: &PeakStore, decimals: u32) -> PeakStore {
    let rounded: Vec<f32> = peaks.masses.iter().map(|m| round_to(*m, decimals)).collect();
    let order = argsort_ascending(&rounded);

    let mut masses: Vec<f32> = Vec::with_capacity(order.len());
    let mut intensities: Vec<f32> = Vec::with_capacity(order.len());
    let mut annotations = Vec::with_capacity(order.len());

    // The stable sort visits the first occurrence of each mass first, so its
    // annotation is the one kept.
    for i in order {
        let mass = rounded[i];
        if masses.last() == Some(&mass) {
            if let Some(total) = intensities.last_mut() {
                *total += peaks.intensities[i];
            }
        } else {
            masses.push(mass);
            intensities.push(peaks.intensities[i]);
            annotations.push(peaks.annotations[i].clone());
        }
    }

    let n_merged = peaks.len() - masses.len();
    if n_merged > 0 {
        trace!("Merged {n_merged} peaks at {decimals} decimals");
    }
    PeakStore::from_parts(masses, intensities, annotations)
}

/// The indices of peaks within the m/z range, inclusive at both ends.
pub(crate) fn mass_range_mask(peaks: &PeakStore, min_mz: f64, max_mz: f64) -> Vec<bool> {
    let range = SimpleInterval::new(min_mz, max_mz);
    peaks
        .masses
        .iter()
        .map(|m| range.contains(&(*m as f64)))
        .collect()
}

/// The m/z windows around the precursor at every charge state considered.
///
/// Charges run from 1 up to the precursor charge, or only 1 if the charge is
/// not known. A charge of zero or below yields no windows.
pub(crate) fn precursor_windows(
    precursor: &PrecursorInfo,
    tolerance: f64,
) -> Vec<SimpleInterval<f64>> {
    let max_charge = precursor.charge.unwrap_or(1);
    if max_charge < 1 {
        trace!("Precursor charge {max_charge} has no windows to exclude");
    }
    let tolerance = Tolerance::Da(tolerance);
    (1..=max_charge)
        .map(|z| {
            let (lower, upper) = tolerance.bounds(precursor.mz / z as f64);
            SimpleInterval::new(lower, upper)
        })
        .collect()
}

/// Mark the peaks that fall in any of the precursor windows.
pub(crate) fn precursor_mask(
    peaks: &PeakStore,
    precursor: &PrecursorInfo,
    tolerance: f64,
) -> Vec<bool> {
    let windows = precursor_windows(precursor, tolerance);
    peaks
        .masses
        .iter()
        .map(|m| {
            let m = *m as f64;
            windows.iter().any(|w| w.contains(&m))
        })
        .collect()
}

/// Select the `max_peaks` most intense peaks, returning their positions in
/// `intensities` ordered from most to least intense.
pub(crate) fn top_n(intensities: &[f32], max_peaks: usize) -> Vec<usize> {
    let mut order = argsort_descending(intensities);
    order.truncate(max_peaks);
    order
}

/// The intensity below which a peak is considered noise
pub(crate) fn noise_threshold(
    max_intensity: f32,
    min_intensity: f64,
    min_dynamic_range: f64,
) -> f64 {
    min_intensity.max(min_dynamic_range * max_intensity as f64)
}

/// Transform intensities according to `scaling`.
///
/// With [`Scaling::Rank`] the most intense peak scores `max_peaks_used`, the
/// next `max_peaks_used - 1` and so on, with ties ordered by position.
pub(crate) fn scale_intensities(
    intensities: &[f32],
    scaling: Scaling,
    max_peaks_used: usize,
) -> Vec<f64> {
    match scaling {
        Scaling::None => intensities.iter().map(|i| *i as f64).collect(),
        Scaling::Sqrt => intensities.iter().map(|i| (*i as f64).sqrt()).collect(),
        Scaling::Rank => {
            let mut scores = vec![0.0; intensities.len()];
            for (rank, i) in argsort_descending(intensities).into_iter().enumerate() {
                scores[i] = max_peaks_used as f64 - rank as f64;
            }
            scores
        }
    }
}

/// The Euclidean norm of `values`
pub(crate) fn l2_norm<T: AsPrimitive<f64>>(values: &[T]) -> f64 {
    values
        .iter()
        .map(|&v| {
            let v: f64 = v.as_();
            v * v
        })
        .sum::<f64>()
        .sqrt()
}

/// Scale `values` to unit length. An all-zero input produces all zeros.
pub(crate) fn normalize(values: &[f64]) -> Vec<f32> {
    let norm = l2_norm(values);
    if norm == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v / norm) as f32).collect()
}

/// Run every stage of the pipeline over `peaks`, without modifying them.
pub(crate) fn run_pipeline(
    peaks: &PeakStore,
    precursor: &PrecursorInfo,
    params: &PeakProcessingParams,
) -> PipelineResult {
    let working = match params.resolution {
        Some(decimals) => merge_at_resolution(peaks, decimals),
        None => sort_by_mass(peaks),
    };

    let in_range = mass_range_mask(&working, params.min_mz, params.max_mz);
    let near_precursor = if params.remove_precursor {
        precursor_mask(&working, precursor, params.remove_precursor_tolerance)
    } else {
        vec![false; working.len()]
    };
    let kept: Vec<usize> = in_range
        .iter()
        .zip(near_precursor.iter())
        .enumerate()
        .filter_map(|(i, (keep, exclude))| (*keep && !*exclude).then_some(i))
        .collect();
    trace!(
        "{} of {} peaks remain after m/z filtering",
        kept.len(),
        working.len()
    );

    if kept.len() < params.min_peaks {
        debug!(
            "Rejecting spectrum with {} peaks, {} required",
            kept.len(),
            params.min_peaks
        );
        return PipelineResult::Rejected(ProcessingStatus::TooFewPeaks {
            found: kept.len(),
            required: params.min_peaks,
        });
    }
    let filtered = working.select(&kept);

    let most_intense = top_n(&filtered.intensities, params.max_peaks_used);
    let Some(max_intensity) = most_intense.first().map(|i| filtered.intensities[*i]) else {
        debug!("Rejecting spectrum with no peaks left to rank");
        return PipelineResult::Rejected(ProcessingStatus::TooFewPeaks {
            found: 0,
            required: params.min_peaks,
        });
    };

    let threshold = noise_threshold(max_intensity, params.min_intensity, params.min_dynamic_range);
    let mut in_top_n = vec![false; filtered.len()];
    for i in most_intense.iter() {
        in_top_n[*i] = true;
    }
    let kept: Vec<usize> = filtered
        .intensities
        .iter()
        .enumerate()
        .filter_map(|(i, intensity)| (in_top_n[i] && *intensity as f64 >= threshold).then_some(i))
        .collect();
    trace!(
        "{} peaks remain above an intensity threshold of {threshold}",
        kept.len()
    );
    let filtered = filtered.select(&kept);

    let Some(span) = filtered.mz_span() else {
        debug!("Rejecting spectrum with no peaks above the noise threshold");
        return PipelineResult::Rejected(ProcessingStatus::TooFewPeaks {
            found: 0,
            required: params.min_peaks,
        });
    };
    if span < params.min_mz_range {
        debug!(
            "Rejecting spectrum spanning {span:.3} m/z, {} required",
            params.min_mz_range
        );
        return PipelineResult::Rejected(ProcessingStatus::InsufficientMzRange {
            span,
            required: params.min_mz_range,
        });
    }

    let scaled = scale_intensities(&filtered.intensities, params.scaling, params.max_peaks_used);
    let intensities = normalize(&scaled);

    let PeakStore {
        masses,
        annotations,
        ..
    } = filtered;
    let mut result = PeakStore::from_parts(masses, intensities, annotations);
    result.processed = true;
    PipelineResult::Accepted(result)
}
