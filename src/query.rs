//! Archive query payloads.
//!
//! A stream is created from one of two query shapes: a list of object
//! identifiers, or a Julian date interval obtained from calendar dates. Both
//! carry an optional filter predicate on candidate fields that the archive
//! evaluates server-side; the predicate is forwarded verbatim as a JSON object.
//!
//! The wire shape is
//! `{objectId?: [string], jd?: {"$gt": number, "$lt": number}, candidate: object}`.
use serde::Serialize;

use crate::constants::{CandidateFilter, JD};
use crate::skystream_errors::SkystreamError;
use crate::time::date_to_jd;

/// Half-open Julian date interval `[gt, lt)`, serialized with the archive's
/// range operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JdRange {
    #[serde(rename = "$gt")]
    pub gt: JD,
    #[serde(rename = "$lt")]
    pub lt: JD,
}

/// One query submitted to the stream-creation endpoint.
///
/// Built through [`ArchiveQuery::from_object_ids`] or
/// [`ArchiveQuery::from_time_range`], so that every query carries at least one
/// of the two selection modes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveQuery {
    #[serde(rename = "objectId", skip_serializing_if = "Option::is_none")]
    object_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    jd: Option<JdRange>,
    candidate: CandidateFilter,
}

impl ArchiveQuery {
    /// Build a by-identifier query.
    ///
    /// Arguments
    /// ---------
    /// * `object_ids`: the object identifiers to select
    /// * `candidate`: an optional filter predicate on candidate fields; `None`
    ///   serializes as an empty object
    ///
    /// Return
    /// ------
    /// * a new query payload
    pub fn from_object_ids<I, S>(object_ids: I, candidate: Option<CandidateFilter>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ArchiveQuery {
            object_ids: Some(object_ids.into_iter().map(Into::into).collect()),
            jd: None,
            candidate: candidate.unwrap_or_default(),
        }
    }

    /// Build a by-epoch query from calendar date boundaries.
    ///
    /// Arguments
    /// ---------
    /// * `start`: start of the interval (inclusive), `YYYY-MM-dd[THH:mm:ss]` UTC
    /// * `end`: end of the interval (exclusive), same format
    /// * `candidate`: an optional filter predicate on candidate fields
    ///
    /// Return
    /// ------
    /// * a new query payload, or [`SkystreamError::InvalidDateFormat`] when a
    ///   boundary cannot be parsed
    pub fn from_time_range(
        start: &str,
        end: &str,
        candidate: Option<CandidateFilter>,
    ) -> Result<Self, SkystreamError> {
        Ok(ArchiveQuery {
            object_ids: None,
            jd: Some(JdRange {
                gt: date_to_jd(start)?,
                lt: date_to_jd(end)?,
            }),
            candidate: candidate.unwrap_or_default(),
        })
    }
}
