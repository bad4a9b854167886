//! # Per-object alert consolidation
//!
//! Overview
//! -----------------
//! The archive issues one [`Alert`] per object **per epoch**, each carrying a
//! cumulative window of previous candidates. Querying a time range therefore
//! yields several alerts per object with overlapping detection histories. This
//! module consolidates them: [`merge_alerts`] groups the raw batch by object
//! identifier and produces exactly one [`MergedAlert`] per object whose history
//! is the deduplicated union of every detection ever reported for it.
//!
//! Algorithm
//! -----------------
//! Per object group:
//!
//! 1. A single alert passes through unchanged.
//! 2. Otherwise the **latest** alert is selected: maximum current-candidate
//!    Julian date, first maximal element on ties.
//! 3. Its history-start timestamp becomes the minimum across the whole group.
//! 4. The remaining alerts are walked from most recent to least recent; every
//!    candidate of theirs (previous window plus current) that is not already
//!    present **by full value equality** is prepended to the unified history.
//! 5. A new [`MergedAlert`] is built from the result; the inputs are never
//!    aliased into the output.
//!
//! The resulting history order is an artifact of the prepend process and must
//! be treated as unordered by consumers.
use std::collections::{HashMap, HashSet, VecDeque};

use ahash::RandomState;
use itertools::Itertools;

use crate::alerts::{Alert, Candidate, DetectionKey, MergedAlert};
use crate::constants::{AlertBatch, ObjectId, JD};

/// Consolidate a raw alert batch into one merged alert per object identifier.
///
/// Arguments
/// ---------
/// * `alerts`: the full materialized batch pulled from a stream, in any order
///
/// Return
/// ------
/// * one [`MergedAlert`] per distinct object identifier present in the input;
///   output order is unspecified
pub fn merge_alerts(alerts: AlertBatch) -> Vec<MergedAlert> {
    let mut groups: HashMap<ObjectId, Vec<Alert>, RandomState> = HashMap::default();
    for alert in alerts {
        groups
            .entry(alert.object_id.clone())
            .or_default()
            .push(alert);
    }

    groups.into_values().map(merge_object_group).collect()
}

/// Consolidate the alerts of a single object into one [`MergedAlert`].
///
/// The group must be non-empty and hold alerts of one object only, in input
/// order (ties on the current-candidate timestamp are broken by that order).
fn merge_object_group(mut group: Vec<Alert>) -> MergedAlert {
    if group.len() == 1 {
        return MergedAlert::from(group.remove(0));
    }

    // Latest alert: maximum current-candidate jd, first maximal element on ties.
    let mut latest_idx = 0;
    for (idx, alert) in group.iter().enumerate().skip(1) {
        if alert.candidate.jd > group[latest_idx].candidate.jd {
            latest_idx = idx;
        }
    }

    // Earliest known history start across the whole group.
    let jd_start_hist = group
        .iter()
        .filter_map(|alert| alert.candidate.jd_start_hist)
        .reduce(JD::min)
        .or(group[latest_idx].candidate.jd_start_hist);

    let latest = &group[latest_idx];
    let mut seen: HashSet<DetectionKey, RandomState> = latest
        .prv_candidates
        .iter()
        .map(Candidate::value_key)
        .collect();
    let mut history: VecDeque<Candidate> = latest.prv_candidates.iter().cloned().collect();

    // Remaining alerts from most recent to least recent; sort_by is stable so
    // equal timestamps keep their input order.
    let older = group
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != latest_idx)
        .map(|(_, alert)| alert)
        .sorted_by(|a, b| b.candidate.jd.total_cmp(&a.candidate.jd));

    for alert in older {
        for candidate in alert
            .prv_candidates
            .iter()
            .chain(std::iter::once(&alert.candidate))
        {
            if seen.insert(candidate.value_key()) {
                history.push_front(candidate.clone());
            }
        }
    }

    MergedAlert {
        object_id: latest.object_id.clone(),
        candidate: Candidate {
            jd_start_hist,
            ..latest.candidate.clone()
        },
        prv_candidates: history.into(),
    }
}
