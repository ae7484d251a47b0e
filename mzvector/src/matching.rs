//! A record of a query spectrum's best match against a spectral library.

use std::time::Duration;

use crate::spectrum::Spectrum;

/// The identification of a query spectrum, populated by a library search.
///
/// The record copies what it needs from the spectra it is built from. The
/// performance fields start at zero and are filled in by the caller once
/// the search is done.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectrumMatch {
    pub query_id: String,
    pub retention_time: Option<f64>,
    pub charge: Option<i32>,
    pub exp_mass_to_charge: f64,

    /// The matched library peptide, if any
    pub sequence: Option<String>,
    /// The matched library spectrum's precursor m/z, if any
    pub calc_mass_to_charge: Option<f64>,
    pub is_decoy: Option<bool>,

    pub search_engine_score: f64,

    pub num_candidates: usize,
    pub time_candidates: Duration,
    pub time_match: Duration,
    pub time_total: Duration,
}

impl SpectrumMatch {
    pub fn new(query: &Spectrum, library: Option<&Spectrum>, search_engine_score: f64) -> Self {
        let mut result = Self {
            query_id: query.identifier.clone(),
            retention_time: query.retention_time,
            charge: query.precursor_charge,
            exp_mass_to_charge: query.precursor_mz,
            search_engine_score,
            ..Default::default()
        };
        if let Some(library) = library {
            result.sequence = library.peptide.clone();
            result.calc_mass_to_charge = Some(library.precursor_mz);
            result.is_decoy = Some(library.is_decoy);
        }
        result
    }

    /// A match record for a query without any library match
    pub fn unmatched(query: &Spectrum) -> Self {
        Self::new(query, None, 0.0)
    }

    pub fn is_matched(&self) -> bool {
        self.calc_mass_to_charge.is_some()
    }
}
