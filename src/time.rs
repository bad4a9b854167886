use hifitime::Epoch;
use std::str::FromStr;

use crate::constants::{JD, JDTOMJD, MJD};
use crate::skystream_errors::SkystreamError;

/// Transformation from a calendar date in the format YYYY-MM-dd or YYYY-MM-ddTHH:mm:ss (UTC)
/// to a Julian date (JD)
///
/// Argument
/// --------
/// * `date`: a date string, with or without a time-of-day component
///
/// Return
/// ------
/// * the input date as a Julian date, or [`SkystreamError::InvalidDateFormat`]
///   when the string cannot be parsed
pub fn date_to_jd(date: &str) -> Result<JD, SkystreamError> {
    let datetime = if date.contains('T') {
        date.to_string()
    } else {
        format!("{date}T00:00:00")
    };

    Epoch::from_str(&datetime)
        .map(|epoch| epoch.to_jde_utc_days())
        .map_err(|err| SkystreamError::InvalidDateFormat(format!("{date}: {err}")))
}

/// Transformation from Julian date (JD) to modified Julian date (MJD)
///
/// Argument
/// --------
/// * `jd`: a JD
///
/// Return
/// ------
/// * the corresponding MJD
pub fn jd_to_mjd(jd: JD) -> MJD {
    jd - JDTOMJD
}
