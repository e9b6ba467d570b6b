//! Selecting and grouping expanded occurrences for display.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, Utc};
use derive_more::Display;

use crate::{component::Occurrence, types::Tz};

/// Months after the current one covered by the default listing.
pub const DISPLAY_MONTHS: u32 = 5;

pub fn sort_by_start(events: &mut [Occurrence]) {
    events.sort_by_key(|event| event.start);
}

/// Occurrences starting within `from..=to`.
pub fn filter_range<'a>(
    events: &'a [Occurrence],
    from: &DateTime<Tz>,
    to: &DateTime<Tz>,
) -> impl Iterator<Item = &'a Occurrence> {
    let (from, to) = (*from, *to);
    events
        .iter()
        .filter(move |event| from <= event.start && event.start <= to)
}

/// Occurrences that have not started yet.
pub fn upcoming(events: &[Occurrence], now: DateTime<Utc>) -> impl Iterator<Item = &Occurrence> {
    events.iter().filter(move |event| event.start > now)
}

/// First and last day of the month `offset` months after the one containing `now`.
fn month_days(now: DateTime<Utc>, offset: u32, tz: &Tz) -> Option<(NaiveDate, NaiveDate)> {
    let first = now
        .with_timezone(tz)
        .date_naive()
        .with_day(1)?
        .checked_add_months(Months::new(offset))?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// `00:00:00` on the first through `23:59:59` on the last day of a month,
/// `offset` months after the current one.
pub fn month_range(
    now: DateTime<Utc>,
    offset: u32,
    tz: &Tz,
) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
    let (first, last) = month_days(now, offset, tz)?;
    let end = NaiveTime::from_hms_opt(23, 59, 59)?;
    Some((tz.midnight(first)?, tz.resolve_local(&last.and_time(end))?))
}

/// End of the default listing: the last millisecond of the month five months from now.
pub fn display_window(now: DateTime<Utc>, tz: &Tz) -> Option<(DateTime<Utc>, DateTime<Tz>)> {
    let (_, last) = month_days(now, DISPLAY_MONTHS, tz)?;
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
    Some((now, tz.resolve_local(&last.and_time(end))?))
}

/// Occurrences of the default listing, `now < start <= end`.
pub fn in_display_window<'a>(
    events: &'a [Occurrence],
    now: DateTime<Utc>,
    tz: &Tz,
) -> impl Iterator<Item = &'a Occurrence> {
    let end = display_window(now, tz).map(|(_, end)| end);
    events
        .iter()
        .filter(move |event| event.start > now && end.is_some_and(|end| event.start <= end))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{year:04}-{month:02}")]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(dt: &DateTime<Tz>) -> Self {
        MonthKey {
            year: dt.year(),
            month: dt.month(),
        }
    }

    /// Month name and year, e.g. `March 2025`.
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|date| date.format("%B %Y").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

/// Occurrences by the month they start in, each month in input order.
pub fn group_by_month<'a>(
    events: impl IntoIterator<Item = &'a Occurrence>,
) -> BTreeMap<MonthKey, Vec<&'a Occurrence>> {
    let mut months: BTreeMap<MonthKey, Vec<&'a Occurrence>> = BTreeMap::new();
    for event in events {
        months.entry(MonthKey::of(&event.start)).or_default().push(event);
    }
    months
}

/// Human readable length of an occurrence, e.g. `2h 30m`.
pub fn format_duration(duration: TimeDelta) -> String {
    let minutes = duration.num_minutes().max(0);
    match (minutes / 60, minutes % 60) {
        (0, minutes) => format!("{minutes}m"),
        (hours, 0) => format!("{hours}h"),
        (hours, minutes) => format!("{hours}h {minutes}m"),
    }
}
