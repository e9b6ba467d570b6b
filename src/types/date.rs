use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use super::{CalDateTimeError, Tz};
use crate::VALUE_DELIMITER;

const DATE_LEN: usize = 8;
const TIME_SEPARATOR: char = 'T';
const UTC_SUFFIX: char = 'Z';

/// Strip a parameter-prefixed segment (`TZID=...:`) from a date value.
#[inline]
pub(crate) fn strip_params(value: &str) -> &str {
    value.rsplit(VALUE_DELIMITER).next().unwrap_or(value)
}

fn digits(value: &str, from: usize, to: usize) -> Option<u32> {
    let part = value.get(from..to)?;
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Parse a compact `YYYYMMDD` or `YYYYMMDDTHHMMSS[Z]` value.
///
/// Date-only values and any value parsed with `is_all_day` become local
/// midnight in `tz`. A trailing `Z` marks an absolute UTC instant, anything
/// else is a floating time read as wall-clock time in `tz`.
pub fn parse_date(
    value: &str,
    is_all_day: bool,
    tz: &Tz,
) -> Result<DateTime<Tz>, CalDateTimeError> {
    let value = strip_params(value).trim();
    if value.is_empty() {
        return Err(CalDateTimeError::Empty);
    }

    let invalid_date = || CalDateTimeError::InvalidDate(value.to_owned());
    let year = digits(value, 0, 4).ok_or_else(invalid_date)?;
    let month = digits(value, 4, 6).ok_or_else(invalid_date)?;
    let day = digits(value, 6, DATE_LEN).ok_or_else(invalid_date)?;
    let date = i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(invalid_date)?;

    if value.len() == DATE_LEN || is_all_day {
        return tz
            .midnight(date)
            .ok_or_else(|| CalDateTimeError::NonExistentLocalTime(value.to_owned()));
    }

    let invalid_time = || CalDateTimeError::InvalidTime(value.to_owned());
    if value[DATE_LEN..].chars().next() != Some(TIME_SEPARATOR) {
        return Err(invalid_time());
    }
    let (hour, minute, second) = (
        digits(value, 9, 11).ok_or_else(invalid_time)?,
        digits(value, 11, 13).ok_or_else(invalid_time)?,
        digits(value, 13, 15).ok_or_else(invalid_time)?,
    );
    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid_time)?;
    let naive = date.and_time(time);

    match &value[15..] {
        "" => tz
            .resolve_local(&naive)
            .ok_or_else(|| CalDateTimeError::NonExistentLocalTime(value.to_owned())),
        suffix if suffix.len() == 1 && suffix.starts_with(UTC_SUFFIX) => {
            Ok(Utc.from_utc_datetime(&naive).with_timezone(tz))
        }
        _ => Err(invalid_time()),
    }
}

/// Render `dt` as a zone-local `YYYYMMDD` or floating `YYYYMMDDTHHMMSS` value.
pub fn format_date(dt: &DateTime<Tz>, is_all_day: bool) -> String {
    let date = format!("{:04}{:02}{:02}", dt.year(), dt.month(), dt.day());
    if is_all_day {
        return date;
    }
    format!(
        "{date}{TIME_SEPARATOR}{:02}{:02}{:02}",
        dt.hour(),
        dt.minute(),
        dt.second()
    )
}

/// Render `dt` as an absolute `YYYYMMDDTHHMMSSZ` value.
pub fn format_utc<T: TimeZone>(dt: &DateTime<T>) -> String {
    dt.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

pub fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Add calendar months, rolling an overflowing day into the following month.
///
/// `2025-01-31 + 1` is `2025-03-03`, `2024-02-29 + 12` is `2025-03-01`.
pub fn add_months_rollover(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(u64::from(date.day0())))
}
