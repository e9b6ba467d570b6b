//! Recurrence rules.
//!
//! `RecurrenceRule` keeps the `KEY=VALUE` pairs of an `RRULE` value as raw
//! strings. Typed components are parsed on demand by the accessors, so an
//! invalid part only affects the filter that reads it.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Weekday};
use derive_more::Display;
use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    PARAM_DELIMITER, PARAM_NAME_DELIMITER, PARAM_VALUE_DELIMITER,
    types::{Tz, parse_date},
};

mod error;
pub use error::RRuleError;

pub mod iter;
pub use iter::{MAX_ITERATIONS, RecurrenceExpander};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Frequency {
    #[display("DAILY")]
    Daily,
    #[display("WEEKLY")]
    Weekly,
    #[display("MONTHLY")]
    Monthly,
    #[display("YEARLY")]
    Yearly,
}

impl FromStr for Frequency {
    type Err = RRuleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            "YEARLY" => Ok(Self::Yearly),
            other => Err(RRuleError::UnknownFrequency(other.to_owned())),
        }
    }
}

/// Two-letter weekday code used by `BYDAY`.
pub fn weekday_from_code(code: &str) -> Option<Weekday> {
    Some(match code {
        "SU" => Weekday::Sun,
        "MO" => Weekday::Mon,
        "TU" => Weekday::Tue,
        "WE" => Weekday::Wed,
        "TH" => Weekday::Thu,
        "FR" => Weekday::Fri,
        "SA" => Weekday::Sat,
        _ => return None,
    })
}

pub fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "SU",
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
    }
}

lazy_static! {
    static ref BYDAY_ENTRY: Regex = Regex::new(r"^([+-]?\d+)?([A-Z]{2})$").unwrap();
}

/// One `BYDAY` entry such as `MO`, `1MO` or `-1FR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByDay {
    /// Occurrence of the weekday within the month, negative counts from the end.
    pub nth: Option<i32>,
    pub day: Weekday,
}

impl ByDay {
    pub fn every(day: Weekday) -> Self {
        ByDay { nth: None, day }
    }

    pub fn nth(nth: i32, day: Weekday) -> Self {
        ByDay {
            nth: Some(nth),
            day,
        }
    }

    pub fn parse(entry: &str) -> Option<Self> {
        let captures = BYDAY_ENTRY.captures(entry.trim())?;
        let day = weekday_from_code(captures.get(2)?.as_str())?;
        let nth = match captures.get(1) {
            Some(nth) => Some(nth.as_str().parse().ok()?),
            None => None,
        };
        Some(ByDay { nth, day })
    }
}

impl fmt::Display for ByDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(nth) = self.nth {
            write!(f, "{nth}")?;
        }
        f.write_str(weekday_code(self.day))
    }
}

fn parse_int_list(value: &str) -> Vec<i32> {
    value
        .split(PARAM_VALUE_DELIMITER)
        .filter_map(|entry| entry.trim().parse().ok())
        .collect()
}

/// The `KEY=VALUE` pairs of an `RRULE` value.
///
/// Keys are not validated, unknown keys are kept and never read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurrenceRule(BTreeMap<String, String>);

impl RecurrenceRule {
    /// Split a rule such as `FREQ=WEEKLY;BYDAY=MO,WE;COUNT=10`.
    ///
    /// Pairs without `=` are skipped.
    pub fn parse(rule: &str) -> Self {
        let parts = rule
            .split(PARAM_DELIMITER)
            .filter_map(|part| {
                let (key, value) = part.split_once(PARAM_NAME_DELIMITER)?;
                let key = key.trim();
                (!key.is_empty()).then(|| (key.to_owned(), value.trim().to_owned()))
            })
            .collect();
        RecurrenceRule(parts)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn frequency(&self) -> Result<Frequency, RRuleError> {
        self.get("FREQ")
            .ok_or(RRuleError::MissingFrequency)?
            .parse()
    }

    /// `INTERVAL`, 1 when absent.
    pub fn interval(&self) -> Result<u32, RRuleError> {
        let Some(interval) = self.get("INTERVAL") else {
            return Ok(1);
        };
        match interval.parse() {
            Ok(0) | Err(_) => Err(RRuleError::InvalidInterval(interval.to_owned())),
            Ok(interval) => Ok(interval),
        }
    }

    /// `COUNT`, a zero or unparsable count does not bound the series.
    pub fn count(&self) -> Option<u32> {
        self.get("COUNT")
            .and_then(|count| count.parse().ok())
            .filter(|count| *count > 0)
    }

    pub fn until(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        let until = self.get("UNTIL")?;
        parse_date(until, false, tz)
            .inspect_err(|err| tracing::debug!(%err, "ignoring UNTIL"))
            .ok()
    }

    /// `BYDAY` entries. `None` when absent or when no entry is valid.
    pub fn by_day(&self) -> Option<Vec<ByDay>> {
        let entries: Vec<_> = self
            .get("BYDAY")?
            .split(PARAM_VALUE_DELIMITER)
            .filter_map(ByDay::parse)
            .collect();
        (!entries.is_empty()).then_some(entries)
    }

    pub fn by_month_day(&self) -> Option<Vec<i32>> {
        self.get("BYMONTHDAY").map(parse_int_list)
    }

    /// `BYMONTH` as 1-based month numbers.
    pub fn by_month(&self) -> Option<Vec<i32>> {
        self.get("BYMONTH").map(parse_int_list)
    }

    pub fn by_year_day(&self) -> Option<Vec<i32>> {
        self.get("BYYEARDAY").map(parse_int_list)
    }
}

impl FromStr for RecurrenceRule {
    type Err = std::convert::Infallible;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(rule))
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{PARAM_DELIMITER}")?;
            }
            write!(f, "{key}{PARAM_NAME_DELIMITER}{value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn splits_pairs() {
        let rule = RecurrenceRule::parse("FREQ=WEEKLY;BYDAY=MO,WE;COUNT=10;X-NAME=kept");
        assert_eq!(rule.get("FREQ"), Some("WEEKLY"));
        assert_eq!(rule.get("BYDAY"), Some("MO,WE"));
        assert_eq!(rule.get("X-NAME"), Some("kept"));
        assert_eq!(rule.frequency(), Ok(Frequency::Weekly));
        assert_eq!(rule.count(), Some(10));
        assert_eq!(rule.interval(), Ok(1));
    }

    #[test]
    fn skips_malformed_pairs() {
        let rule = RecurrenceRule::parse("FREQ=DAILY;garbage;;=3;INTERVAL=2;");
        assert_eq!(rule.to_string(), "FREQ=DAILY;INTERVAL=2");
        assert_eq!(rule.interval(), Ok(2));
    }

    #[rstest]
    #[case("FREQ=HOURLY", Err(RRuleError::UnknownFrequency("HOURLY".to_owned())))]
    #[case("INTERVAL=2", Err(RRuleError::MissingFrequency))]
    #[case("FREQ=YEARLY", Ok(Frequency::Yearly))]
    fn frequency(#[case] rule: &str, #[case] expected: Result<Frequency, RRuleError>) {
        assert_eq!(RecurrenceRule::parse(rule).frequency(), expected);
    }

    #[rstest]
    #[case("FREQ=DAILY;INTERVAL=0")]
    #[case("FREQ=DAILY;INTERVAL=-2")]
    #[case("FREQ=DAILY;INTERVAL=often")]
    fn invalid_interval(#[case] rule: &str) {
        assert!(matches!(
            RecurrenceRule::parse(rule).interval(),
            Err(RRuleError::InvalidInterval(_))
        ));
    }

    #[rstest]
    #[case("FREQ=DAILY", None)]
    #[case("FREQ=DAILY;COUNT=0", None)]
    #[case("FREQ=DAILY;COUNT=x", None)]
    #[case("FREQ=DAILY;COUNT=3", Some(3))]
    fn count(#[case] rule: &str, #[case] expected: Option<u32>) {
        assert_eq!(RecurrenceRule::parse(rule).count(), expected);
    }

    #[test]
    fn until() {
        let tz = Tz::Olson(chrono_tz::America::New_York);
        let rule = RecurrenceRule::parse("FREQ=DAILY;UNTIL=20250131T045959Z");
        assert_eq!(
            rule.until(&tz).map(|until| until.date_naive()),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 30)
        );
        assert_eq!(RecurrenceRule::parse("FREQ=DAILY;UNTIL=soon").until(&tz), None);
    }

    #[rstest]
    #[case("MO", Some(ByDay::every(Weekday::Mon)))]
    #[case("1MO", Some(ByDay::nth(1, Weekday::Mon)))]
    #[case("+2TU", Some(ByDay::nth(2, Weekday::Tue)))]
    #[case("-1FR", Some(ByDay::nth(-1, Weekday::Fri)))]
    #[case("XX", None)]
    #[case("mo", None)]
    #[case("1", None)]
    fn by_day_entry(#[case] entry: &str, #[case] expected: Option<ByDay>) {
        assert_eq!(ByDay::parse(entry), expected);
    }

    #[test]
    fn by_day_display() {
        assert_eq!(ByDay::nth(-1, Weekday::Sun).to_string(), "-1SU");
        assert_eq!(ByDay::every(Weekday::Thu).to_string(), "TH");
    }

    #[test]
    fn by_day_list() {
        let rule = RecurrenceRule::parse("FREQ=MONTHLY;BYDAY=1MO,bogus,-1FR");
        assert_eq!(
            rule.by_day(),
            Some(vec![ByDay::nth(1, Weekday::Mon), ByDay::nth(-1, Weekday::Fri)])
        );
        assert_eq!(RecurrenceRule::parse("FREQ=MONTHLY;BYDAY=bogus").by_day(), None);
    }

    #[test]
    fn int_lists() {
        let rule = RecurrenceRule::parse("FREQ=YEARLY;BYMONTH=1,x,12;BYMONTHDAY=-1;BYYEARDAY=");
        assert_eq!(rule.by_month(), Some(vec![1, 12]));
        assert_eq!(rule.by_month_day(), Some(vec![-1]));
        assert_eq!(rule.by_year_day(), Some(vec![]));
    }
}
