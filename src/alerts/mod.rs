//! # Alert data model
//!
//! This module defines the value records exchanged with the alert archive and the
//! consolidated form produced by the merger:
//!
//! - [`Candidate`] — one observational measurement (a detection, or a non-detection
//!   upper limit when no magnitude is present).
//! - [`Alert`] — one archive record for one object at one epoch: the current
//!   candidate plus the archive's accumulated window of previous candidates.
//! - [`MergedAlert`] — one consolidated alert per object, whose history is the
//!   deduplicated union of every detection reported for that object.
//!
//! ## Value equality
//!
//! Deduplication during merging is **by full-record equality**. [`Candidate`]
//! derives `PartialEq` for that purpose, and exposes a crate-internal hashable
//! projection ([`DetectionKey`]) through `f64::to_bits` so that set membership
//! is an explicit O(1) operation instead of a list scan.
pub mod display;
pub mod features;
pub mod merge;

use serde::{Deserialize, Serialize};

use crate::constants::{Degree, ObjectId, JD};

/// One of the fixed optical filter bands a detection was taken in.
///
/// The archive identifies bands by small integers; the mapping is
/// `1 → g`, `2 → r`, `3 → i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FilterBand {
    G = 1,
    R = 2,
    I = 3,
}

impl FilterBand {
    /// All bands, in archive identifier order.
    pub const ALL: [FilterBand; 3] = [FilterBand::G, FilterBand::R, FilterBand::I];
}

impl TryFrom<u8> for FilterBand {
    type Error = String;

    fn try_from(fid: u8) -> Result<Self, Self::Error> {
        match fid {
            1 => Ok(FilterBand::G),
            2 => Ok(FilterBand::R),
            3 => Ok(FilterBand::I),
            other => Err(format!("unknown filter identifier: {other}")),
        }
    }
}

impl From<FilterBand> for u8 {
    fn from(band: FilterBand) -> u8 {
        band as u8
    }
}

impl std::fmt::Display for FilterBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterBand::G => write!(f, "g"),
            FilterBand::R => write!(f, "r"),
            FilterBand::I => write!(f, "i"),
        }
    }
}

/// A single observational measurement of one object.
///
/// # Fields
///
/// * `jd` - Julian date of the measurement
/// * `fid` - The filter band the measurement was taken in
/// * `ra` - Right ascension, in degrees
/// * `dec` - Declination, in degrees
/// * `magpsf` - PSF-fit magnitude; present on genuine detections only, absent on
///   non-detection upper limits
/// * `distnr` - Distance to the nearest reference source, when measured
/// * `jd_start_hist` - Earliest Julian date contributing to the alert's history
///   window; set on current candidates, absent on previous-candidate entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub jd: JD,
    pub fid: FilterBand,
    pub ra: Degree,
    pub dec: Degree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magpsf: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distnr: Option<f64>,
    #[serde(
        rename = "jdstarthist",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub jd_start_hist: Option<JD>,
}

impl Candidate {
    /// Whether this entry is a genuine detection (carries a magnitude) rather
    /// than an upper limit.
    pub fn is_detection(&self) -> bool {
        self.magpsf.is_some()
    }

    /// Hashable projection of every field, used for deduplication by value.
    pub(crate) fn value_key(&self) -> DetectionKey {
        DetectionKey {
            jd: self.jd.to_bits(),
            fid: self.fid,
            ra: self.ra.to_bits(),
            dec: self.dec.to_bits(),
            magpsf: self.magpsf.map(f64::to_bits),
            distnr: self.distnr.map(f64::to_bits),
            jd_start_hist: self.jd_start_hist.map(f64::to_bits),
        }
    }
}

/// Bit-pattern projection of a [`Candidate`], hashable and totally comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DetectionKey {
    jd: u64,
    fid: FilterBand,
    ra: u64,
    dec: u64,
    magpsf: Option<u64>,
    distnr: Option<u64>,
    jd_start_hist: Option<u64>,
}

/// One archive record for one object at one epoch.
///
/// Successive alerts for the same object carry overlapping but not identical
/// `prv_candidates` windows, since each was generated at a different epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "objectId")]
    pub object_id: ObjectId,
    pub candidate: Candidate,
    #[serde(default)]
    pub prv_candidates: Vec<Candidate>,
}

/// One consolidated alert per object identifier.
///
/// `prv_candidates` holds the deduplicated union of every detection reported
/// for the object across all contributing alerts. Its order is an artifact of
/// the merge's prepend process and carries no meaning; consumers must treat it
/// as unordered. `candidate.jd_start_hist` is the minimum history-start
/// timestamp among the contributing alerts.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedAlert {
    pub object_id: ObjectId,
    pub candidate: Candidate,
    pub prv_candidates: Vec<Candidate>,
}

impl From<Alert> for MergedAlert {
    fn from(alert: Alert) -> Self {
        MergedAlert {
            object_id: alert.object_id,
            candidate: alert.candidate,
            prv_candidates: alert.prv_candidates,
        }
    }
}

impl MergedAlert {
    /// Full detection history: the stored entries plus the current candidate,
    /// with the current candidate included exactly once even when an identical
    /// copy ended up in the stored history during merging.
    pub fn full_history(&self) -> Vec<&Candidate> {
        let mut history: Vec<&Candidate> = self
            .prv_candidates
            .iter()
            .filter(|prv| **prv != self.candidate)
            .collect();
        history.push(&self.candidate);
        history
    }
}

#[cfg(test)]
mod alerts_test {
    use super::*;

    fn candidate(jd: f64, fid: FilterBand, magpsf: Option<f64>) -> Candidate {
        Candidate {
            jd,
            fid,
            ra: 141.13,
            dec: -32.5,
            magpsf,
            distnr: None,
            jd_start_hist: None,
        }
    }

    #[test]
    fn test_filter_band_round_trip() {
        for band in FilterBand::ALL {
            assert_eq!(FilterBand::try_from(u8::from(band)).unwrap(), band);
        }
        assert!(FilterBand::try_from(4).is_err());
    }

    #[test]
    fn test_candidate_deserialization_from_wire_names() {
        let candidate: Candidate = serde_json::from_str(
            r#"{
                "jd": 2459500.5,
                "fid": 2,
                "ra": 141.13,
                "dec": -32.5,
                "magpsf": 18.4,
                "jdstarthist": 2459480.5,
                "rb": 0.99
            }"#,
        )
        .unwrap();

        assert_eq!(candidate.fid, FilterBand::R);
        assert_eq!(candidate.magpsf, Some(18.4));
        assert_eq!(candidate.jd_start_hist, Some(2459480.5));
        assert_eq!(candidate.distnr, None);
        assert!(candidate.is_detection());
    }

    #[test]
    fn test_value_key_equality_tracks_record_equality() {
        let a = candidate(2459500.5, FilterBand::G, Some(18.2));
        let b = a.clone();
        let c = candidate(2459500.5, FilterBand::G, None);

        assert_eq!(a.value_key(), b.value_key());
        assert_ne!(a.value_key(), c.value_key());
    }

    #[test]
    fn test_full_history_counts_current_candidate_once() {
        let current = candidate(2459501.5, FilterBand::G, Some(18.0));
        let older = candidate(2459500.5, FilterBand::R, Some(18.5));

        // the stored history contains a copy of the current candidate
        let merged = MergedAlert {
            object_id: "ZTF19aapreis".to_string(),
            candidate: current.clone(),
            prv_candidates: vec![older.clone(), current.clone()],
        };

        let history = merged.full_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], &older);
        assert_eq!(history[1], &current);
    }
}
