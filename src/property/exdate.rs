use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};

use crate::{
    PARAM_VALUE_DELIMITER,
    types::{Tz, parse_date, strip_params},
};

/// Calendar days excluded from a recurring series.
///
/// Exceptions match by zone-local calendar date, their time of day is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionDates(HashSet<NaiveDate>);

impl ExceptionDates {
    /// Parse a comma-separated `EXDATE` value. Unparsable entries are skipped.
    pub fn parse(value: &str, tz: &Tz) -> Self {
        let dates = strip_params(value)
            .split(PARAM_VALUE_DELIMITER)
            .filter_map(|date| match parse_date(date, false, tz) {
                Ok(dt) => Some(dt.date_naive()),
                Err(err) => {
                    tracing::debug!(%err, "skipping EXDATE entry");
                    None
                }
            })
            .collect();
        ExceptionDates(dates)
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    #[inline]
    pub fn excludes(&self, dt: &DateTime<Tz>) -> bool {
        self.contains(dt.date_naive())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<NaiveDate> for ExceptionDates {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        ExceptionDates(iter.into_iter().collect())
    }
}
