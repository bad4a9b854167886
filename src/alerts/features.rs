//! # Per-object summary statistics
//!
//! Overview
//! -----------------
//! [`extract_features`] reduces each [`MergedAlert`]'s detection history into a
//! fixed set of summary statistics, one [`FeatureRecord`] per object:
//!
//! * the arithmetic **mean** of each requested numeric field over all true
//!   detections (history entries carrying a magnitude), `None` when no
//!   detection populates the field;
//! * per filter band, the epoch of the **brightest** (minimum magnitude)
//!   detection, converted to a modified Julian date (`peak_mjd_<band>`),
//!   `None` when the band holds no detection.
//!
//! Records are collected into a [`FeatureTable`] sorted ascending by object
//! identifier.
//!
//! Tie-breaks
//! -----------------
//! When several detections of a band share the minimum magnitude, the first
//! occurrence **in history iteration order** wins. History order after merging
//! is an insertion artifact, so callers must not rely on which of the tied
//! epochs is reported.
use std::collections::BTreeMap;

use crate::alerts::{Candidate, FilterBand, MergedAlert};
use crate::constants::{ObjectId, JD, JDTOMJD, MJD};

/// Numeric candidate fields available for mean aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeanField {
    Ra,
    Dec,
    Distnr,
    Magpsf,
}

impl MeanField {
    /// Fields aggregated when the caller does not request a specific list.
    pub const DEFAULT: [MeanField; 3] = [MeanField::Ra, MeanField::Dec, MeanField::Distnr];

    /// Value of this field on a candidate, when populated.
    pub fn value(&self, candidate: &Candidate) -> Option<f64> {
        match self {
            MeanField::Ra => Some(candidate.ra),
            MeanField::Dec => Some(candidate.dec),
            MeanField::Distnr => candidate.distnr,
            MeanField::Magpsf => candidate.magpsf,
        }
    }
}

impl std::fmt::Display for MeanField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeanField::Ra => write!(f, "ra"),
            MeanField::Dec => write!(f, "dec"),
            MeanField::Distnr => write!(f, "distnr"),
            MeanField::Magpsf => write!(f, "magpsf"),
        }
    }
}

/// Summary statistics of one object: requested field means plus one peak epoch
/// per filter band. A feature whose inputs are absent is `None`, never zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureRecord {
    means: BTreeMap<MeanField, Option<f64>>,
    peak_mjd: BTreeMap<FilterBand, Option<MJD>>,
}

impl FeatureRecord {
    /// Mean of a requested field, `None` when no detection populated it or the
    /// field was not requested.
    pub fn mean(&self, field: MeanField) -> Option<f64> {
        self.means.get(&field).copied().flatten()
    }

    /// Epoch (MJD) of the brightest detection in a band, `None` for an empty band.
    pub fn peak_mjd(&self, band: FilterBand) -> Option<MJD> {
        self.peak_mjd.get(&band).copied().flatten()
    }

    /// The fields this record aggregated means for, in canonical order.
    pub fn mean_fields(&self) -> impl Iterator<Item = MeanField> + '_ {
        self.means.keys().copied()
    }
}

/// Output table of the pipeline: one record per object, sorted ascending by
/// object identifier.
pub type FeatureTable = BTreeMap<ObjectId, FeatureRecord>;

/// Extract summary statistics with the default field list
/// ([`MeanField::DEFAULT`]).
pub fn extract_features(merged: &[MergedAlert]) -> FeatureTable {
    extract_features_with(merged, &MeanField::DEFAULT)
}

/// Extract summary statistics for an explicit field list.
///
/// Arguments
/// ---------
/// * `merged`: the consolidated alerts, in any order
/// * `fields`: the candidate fields to aggregate means for
///
/// Return
/// ------
/// * a [`FeatureTable`] keyed and sorted ascending by object identifier
pub fn extract_features_with(merged: &[MergedAlert], fields: &[MeanField]) -> FeatureTable {
    merged
        .iter()
        .map(|alert| (alert.object_id.clone(), extract_record(alert, fields)))
        .collect()
}

fn extract_record(alert: &MergedAlert, fields: &[MeanField]) -> FeatureRecord {
    // true detections only: upper limits carry no magnitude and contribute to
    // neither the means nor the peak epochs
    let detections: Vec<&Candidate> = alert
        .full_history()
        .into_iter()
        .filter(|entry| entry.is_detection())
        .collect();

    let mut record = FeatureRecord::default();

    for &field in fields {
        let values: Vec<f64> = detections
            .iter()
            .filter_map(|&detection| field.value(detection))
            .collect();
        let mean = if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        };
        record.means.insert(field, mean);
    }

    for band in FilterBand::ALL {
        record.peak_mjd.insert(band, peak_epoch(&detections, band));
    }

    record
}

/// Epoch of the minimum-magnitude detection in `band`, as an MJD.
///
/// Ties on the minimum keep the first occurrence in iteration order.
fn peak_epoch(detections: &[&Candidate], band: FilterBand) -> Option<MJD> {
    let mut best: Option<(JD, f64)> = None;
    for detection in detections.iter().filter(|detection| detection.fid == band) {
        let Some(magpsf) = detection.magpsf else {
            continue;
        };
        match best {
            Some((_, best_mag)) if magpsf >= best_mag => {}
            _ => best = Some((detection.jd, magpsf)),
        }
    }
    best.map(|(jd, _)| jd - JDTOMJD)
}
