//! # Constants and type definitions for skystream
//!
//! This module centralizes the **archive endpoints**, **retry settings**, and **common type
//! definitions** used throughout the `skystream` library.
//!
//! ## Overview
//!
//! - Default archive service endpoints and the credential environment variable
//! - Timestamp conventions (Julian date ↔ modified Julian date)
//! - Backoff settings for the stream consumer
//! - Core type aliases used across the crate
//!
//! These definitions are used by all main modules, including the stream façade, the alert
//! merger, and the feature extractor.

use std::time::Duration;

use crate::alerts::Alert;

// -------------------------------------------------------------------------------------------------
// Archive service
// -------------------------------------------------------------------------------------------------

/// Base URL of the alert archive API
pub const ARCHIVE_BASE_URL: &str = "https://ampel.zeuthen.desy.de/api/ztf/archive/v3";

/// Path of the stream-creation endpoint, relative to [`ARCHIVE_BASE_URL`]
pub const STREAM_QUERY_PATH: &str = "streams/from_query";

/// Environment variable holding the archive bearer token
pub const TOKEN_ENV_VAR: &str = "SKYSTREAM_ARCHIVE_TOKEN";

/// HTTP status reported by the archive while a stream is still being built
pub const STATUS_STREAM_LOCKED: u16 = 423;

// -------------------------------------------------------------------------------------------------
// Retry settings
// -------------------------------------------------------------------------------------------------

/// First wait of the exponential backoff when a stream is not ready yet
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Cumulative retry budget before a locked stream is reported as a timeout
pub const RETRY_MAX_ELAPSED: Duration = Duration::from_secs(3600);

// -------------------------------------------------------------------------------------------------
// Timestamp conventions
// -------------------------------------------------------------------------------------------------

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2400000.5;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Julian date (days)
pub type JD = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
/// Angle in degrees
pub type Degree = f64;
/// Archive identifier of a sky object (e.g. `"ZTF19aapreis"`)
pub type ObjectId = String;

/// The full materialized sequence of raw alerts pulled from one stream
pub type AlertBatch = Vec<Alert>;

/// Opaque filter predicate on candidate fields, forwarded verbatim to the archive
pub type CandidateFilter = serde_json::Map<String, serde_json::Value>;
