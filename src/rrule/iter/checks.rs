use chrono::{Datelike, NaiveDate};

use crate::{
    rrule::{ByDay, RecurrenceRule},
    types::{days_in_month, days_in_year},
};

/// Resolve a signed ordinal against a period of `len` days.
///
/// Positive ordinals count from 1, negative ones from the end (`-1` is the
/// last day). Zero never matches.
#[inline]
fn matches_ordinal(ordinal: i32, position: u32, len: u32) -> bool {
    let position = i64::from(position);
    match ordinal {
        0 => false,
        ordinal if ordinal > 0 => i64::from(ordinal) == position,
        ordinal => i64::from(len) + i64::from(ordinal) + 1 == position,
    }
}

pub(crate) fn matches_by_day(date: NaiveDate, rules: &[ByDay]) -> bool {
    let weekday = date.weekday();
    let day = date.day();
    rules.iter().any(|rule| {
        if rule.day != weekday {
            return false;
        }
        let Some(nth) = rule.nth else {
            return true;
        };
        let occurrence = if nth > 0 {
            (day - 1) / 7 + 1
        } else {
            (days_in_month(date.year(), date.month()) - day) / 7 + 1
        };
        i64::from(nth.unsigned_abs()) == i64::from(occurrence)
    })
}

pub(crate) fn matches_by_month_day(date: NaiveDate, days: &[i32]) -> bool {
    let len = days_in_month(date.year(), date.month());
    days.iter()
        .any(|ordinal| matches_ordinal(*ordinal, date.day(), len))
}

pub(crate) fn matches_by_month(date: NaiveDate, months: &[i32]) -> bool {
    months.iter().any(|month| i64::from(*month) == i64::from(date.month()))
}

pub(crate) fn matches_by_year_day(date: NaiveDate, days: &[i32]) -> bool {
    let len = days_in_year(date.year());
    days.iter()
        .any(|ordinal| matches_ordinal(*ordinal, date.ordinal(), len))
}

/// The BY* filters of a rule, parsed once per expansion. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ByFilters {
    pub(crate) by_day: Option<Vec<ByDay>>,
    pub(crate) by_month_day: Option<Vec<i32>>,
    pub(crate) by_month: Option<Vec<i32>>,
    pub(crate) by_year_day: Option<Vec<i32>>,
}

impl ByFilters {
    pub(crate) fn from_rule(rule: &RecurrenceRule) -> Self {
        ByFilters {
            by_day: rule.by_day(),
            by_month_day: rule.by_month_day(),
            by_month: rule.by_month(),
            by_year_day: rule.by_year_day(),
        }
    }

    /// Whether a filter selects days inside a month or year.
    pub(crate) fn has_day_filter(&self) -> bool {
        self.by_day.is_some() || self.by_month_day.is_some() || self.by_year_day.is_some()
    }

    pub(crate) fn matches(&self, date: NaiveDate) -> bool {
        self.by_day
            .as_deref()
            .is_none_or(|rules| matches_by_day(date, rules))
            && self
                .by_month_day
                .as_deref()
                .is_none_or(|days| matches_by_month_day(date, days))
            && self
                .by_month
                .as_deref()
                .is_none_or(|months| matches_by_month(date, months))
            && self
                .by_year_day
                .as_deref()
                .is_none_or(|days| matches_by_year_day(date, days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use rstest::rstest;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[rstest]
    // 2025-03-03 is the first Monday of March
    #[case(ymd(2025, 3, 3), ByDay::nth(1, Weekday::Mon), true)]
    #[case(ymd(2025, 3, 10), ByDay::nth(1, Weekday::Mon), false)]
    #[case(ymd(2025, 3, 10), ByDay::nth(2, Weekday::Mon), true)]
    #[case(ymd(2025, 3, 31), ByDay::nth(5, Weekday::Mon), true)]
    #[case(ymd(2025, 3, 31), ByDay::nth(-1, Weekday::Mon), true)]
    #[case(ymd(2025, 3, 24), ByDay::nth(-1, Weekday::Mon), false)]
    #[case(ymd(2025, 3, 24), ByDay::nth(-2, Weekday::Mon), true)]
    #[case(ymd(2025, 3, 3), ByDay::nth(-5, Weekday::Mon), true)]
    #[case(ymd(2025, 2, 28), ByDay::nth(-1, Weekday::Fri), true)]
    #[case(ymd(2025, 3, 4), ByDay::every(Weekday::Tue), true)]
    #[case(ymd(2025, 3, 4), ByDay::every(Weekday::Wed), false)]
    #[case(ymd(2025, 3, 3), ByDay::nth(0, Weekday::Mon), false)]
    fn by_day(#[case] date: NaiveDate, #[case] rule: ByDay, #[case] expected: bool) {
        assert_eq!(matches_by_day(date, &[rule]), expected);
    }

    #[rstest]
    #[case(ymd(2025, 1, 31), true)]
    #[case(ymd(2025, 2, 28), true)]
    #[case(ymd(2024, 2, 29), true)]
    #[case(ymd(2024, 2, 28), false)]
    #[case(ymd(2025, 4, 30), true)]
    #[case(ymd(2025, 4, 29), false)]
    fn last_day_of_month(#[case] date: NaiveDate, #[case] expected: bool) {
        assert_eq!(matches_by_month_day(date, &[-1]), expected);
    }

    #[rstest]
    #[case(ymd(2025, 1, 15), &[15], true)]
    #[case(ymd(2025, 1, 15), &[1, 14], false)]
    #[case(ymd(2025, 1, 30), &[-2], true)]
    #[case(ymd(2025, 1, 1), &[0], false)]
    fn by_month_day(#[case] date: NaiveDate, #[case] days: &[i32], #[case] expected: bool) {
        assert_eq!(matches_by_month_day(date, days), expected);
    }

    #[rstest]
    #[case(ymd(2025, 1, 15), &[1], true)]
    #[case(ymd(2025, 12, 15), &[1, 12], true)]
    #[case(ymd(2025, 6, 15), &[5, 7], false)]
    fn by_month(#[case] date: NaiveDate, #[case] months: &[i32], #[case] expected: bool) {
        assert_eq!(matches_by_month(date, months), expected);
    }

    #[rstest]
    #[case(ymd(2025, 1, 1), &[1], true)]
    #[case(ymd(2025, 12, 31), &[365], true)]
    #[case(ymd(2025, 12, 31), &[-1], true)]
    #[case(ymd(2024, 12, 31), &[366], true)]
    #[case(ymd(2024, 12, 31), &[-1], true)]
    #[case(ymd(2024, 12, 30), &[-1], false)]
    #[case(ymd(2024, 3, 1), &[61], true)]
    #[case(ymd(2025, 3, 1), &[60], true)]
    fn by_year_day(#[case] date: NaiveDate, #[case] days: &[i32], #[case] expected: bool) {
        assert_eq!(matches_by_year_day(date, days), expected);
    }

    #[test]
    fn filters_are_anded() {
        let rule = RecurrenceRule::parse("FREQ=YEARLY;BYMONTH=11;BYDAY=4TH");
        let filters = ByFilters::from_rule(&rule);
        // Thanksgiving
        assert!(filters.matches(ymd(2025, 11, 27)));
        assert!(!filters.matches(ymd(2025, 11, 20)));
        assert!(!filters.matches(ymd(2025, 10, 23)));
    }

    #[test]
    fn empty_list_matches_nothing() {
        let filters = ByFilters::from_rule(&RecurrenceRule::parse("FREQ=DAILY;BYMONTHDAY=x"));
        assert!(!filters.matches(ymd(2025, 1, 1)));
        let filters = ByFilters::from_rule(&RecurrenceRule::parse("FREQ=DAILY"));
        assert!(filters.matches(ymd(2025, 1, 1)));
    }
}
