//! Calendar dates to decimal-year epochs.
//!
//! An epoch is `year + fraction of that year elapsed`, measured in seconds of
//! the proleptic Gregorian calendar, so leap years stretch the denominator.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use ggxf_core::Real;

use crate::error::{TimeError, TimeResult};

/// Convert `YYYY-MM-DD` or `YYYY-MM-DDThh:mm:ss[.fff][Z]` to a decimal year.
///
/// Fractional seconds are accepted but ignored.
pub fn date_to_epoch(text: &str) -> TimeResult<Real> {
    let invalid = || TimeError::InvalidDate {
        text: text.to_string(),
    };
    let datetime = parse_datetime(text.trim()).ok_or_else(invalid)?;
    decimal_year(datetime).ok_or_else(invalid)
}

/// Parse either a plain decimal year (`"2010.5"`) or a date.
pub fn parse_epoch(text: &str) -> TimeResult<Real> {
    match text.trim().parse::<Real>() {
        Ok(epoch) if epoch.is_finite() => Ok(epoch),
        _ => date_to_epoch(text),
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    if !has_date_prefix(text) {
        return None;
    }
    let (date_part, time_part) = match text.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (text, None),
    };
    if date_part.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    let time = match time_part {
        None => NaiveTime::MIN,
        Some(time) => {
            let time = time.strip_suffix('Z').unwrap_or(time);
            let whole = match time.split_once('.') {
                Some((whole, fraction)) if fraction.bytes().all(|b| b.is_ascii_digit()) => whole,
                Some(_) => return None,
                None => time,
            };
            if whole.len() != 8 {
                return None;
            }
            NaiveTime::parse_from_str(whole, "%H:%M:%S").ok()?
        }
    };
    Some(date.and_time(time))
}

/// Four-digit year starting with 1 or 2, then `-MM-DD` with two-digit fields.
fn has_date_prefix(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() < 10 {
        return false;
    }
    matches!(bytes[0], b'1' | b'2')
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && [1, 2, 3, 5, 6, 8, 9]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit())
}

fn decimal_year(datetime: NaiveDateTime) -> Option<Real> {
    let year = datetime.year();
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?.and_time(NaiveTime::MIN);
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)?.and_time(NaiveTime::MIN);
    let elapsed = datetime.signed_duration_since(start).num_seconds() as Real;
    let length = end.signed_duration_since(start).num_seconds() as Real;
    Some(year as Real + elapsed / length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggxf_core::{Tolerances, nearly_equal};

    const TOL: Tolerances = Tolerances::new(1e-7, 0.0);

    #[test]
    fn simple_dates() {
        assert!(nearly_equal(date_to_epoch("2003-01-02").unwrap(), 2003.00273972, TOL));
        assert!(nearly_equal(date_to_epoch("1998-08-29").unwrap(), 1998.6575342, TOL));
        assert_eq!(date_to_epoch("2010-01-01").unwrap(), 2010.0);
    }

    #[test]
    fn datetimes() {
        assert!(nearly_equal(
            date_to_epoch("2003-01-01T12:00:00Z").unwrap(),
            2003.00136986,
            TOL
        ));
        assert!(nearly_equal(
            date_to_epoch("1998-12-31T23:59:59").unwrap(),
            1999.0,
            TOL
        ));
        assert_eq!(
            date_to_epoch("2003-01-01T12:00:00.75Z").unwrap(),
            date_to_epoch("2003-01-01T12:00:00").unwrap()
        );
    }

    #[test]
    fn leap_year_uses_366_days() {
        let epoch = date_to_epoch("2000-12-31").unwrap();
        assert!(nearly_equal(epoch, 2000.0 + 365.0 / 366.0, TOL));
    }

    #[test]
    fn rejects_malformed_dates() {
        for text in ["2003-1-2", "3003-01-01", "2003/01/01", "2003-02-30", "2003-01-01T25:00:00", "soon"] {
            assert!(
                matches!(date_to_epoch(text), Err(TimeError::InvalidDate { .. })),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn parse_epoch_accepts_numbers_and_dates() {
        assert_eq!(parse_epoch("2010.5").unwrap(), 2010.5);
        assert_eq!(parse_epoch(" 2011-01-01 ").unwrap(), 2011.0);
        assert!(parse_epoch("NaN").is_err());
    }
}
